use crate::models::Patient;
use crate::storage::{DEFAULT_STORAGE_KEY, MOCK_PATIENT_ID, StorageKeys};
use std::{env, net::SocketAddr, path::PathBuf};

pub const DATA_PATH_VAR: &str = "PHYSIO_TRACK_DATA_PATH";
pub const STORAGE_KEY_VAR: &str = "PHYSIO_TRACK_STORAGE_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub storage_keys: StorageKeys,
    pub patients: Vec<Patient>,
}

/// Roster shown on the physio dashboard.
pub fn default_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: MOCK_PATIENT_ID.to_string(),
            name: "Joshua Góngora".to_string(),
        },
        Patient {
            id: "another-patient-id".to_string(),
            name: "Laura Martinez".to_string(),
        },
    ]
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_path = env::var(DATA_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/storage.json"));

        let base = env::var(STORAGE_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let storage_keys = StorageKeys::default().with_base(base);

        Self {
            port,
            data_path,
            storage_keys,
            patients: default_patients(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
