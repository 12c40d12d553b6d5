use crate::models::Patient;
use crate::session::SessionState;
use crate::storage::{FileStore, LogStore};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// Shared service state. Lock order is `sessions` before `store`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<LogStore<FileStore>>>,
    pub sessions: Arc<Mutex<HashMap<Option<String>, SessionState>>>,
    pub patients: Arc<Vec<Patient>>,
}

impl AppState {
    pub fn new(store: LogStore<FileStore>, patients: Vec<Patient>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            patients: Arc::new(patients),
        }
    }
}
