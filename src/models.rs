use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest pain or fatigue level the sliders allow.
pub const MAX_LEVEL: u8 = 10;

pub const DEFAULT_FATIGUE_LEVEL: u8 = 3;

pub const EXERCISES: [&str; 8] = [
    "Squats",
    "Glute Bridge",
    "Calf Raises",
    "Hamstring Stretch",
    "Plank",
    "Banded Row",
    "Shoulder External Rotation",
    "Reverse Fly",
];

/// Regions of the body diagram a pain point can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPart {
    Head,
    Neck,
    Torso,
    ShoulderLeft,
    ShoulderRight,
    ArmLeft,
    ArmRight,
    HandLeft,
    HandRight,
    Hips,
    LegLeft,
    LegRight,
    FootLeft,
    FootRight,
}

impl BodyPart {
    pub const ALL: [BodyPart; 14] = [
        BodyPart::Head,
        BodyPart::Neck,
        BodyPart::Torso,
        BodyPart::ShoulderLeft,
        BodyPart::ShoulderRight,
        BodyPart::ArmLeft,
        BodyPart::ArmRight,
        BodyPart::HandLeft,
        BodyPart::HandRight,
        BodyPart::Hips,
        BodyPart::LegLeft,
        BodyPart::LegRight,
        BodyPart::FootLeft,
        BodyPart::FootRight,
    ];

    /// Identifier used by the diagram and in persisted logs.
    pub fn id(self) -> &'static str {
        match self {
            BodyPart::Head => "head",
            BodyPart::Neck => "neck",
            BodyPart::Torso => "torso",
            BodyPart::ShoulderLeft => "shoulder-left",
            BodyPart::ShoulderRight => "shoulder-right",
            BodyPart::ArmLeft => "arm-left",
            BodyPart::ArmRight => "arm-right",
            BodyPart::HandLeft => "hand-left",
            BodyPart::HandRight => "hand-right",
            BodyPart::Hips => "hips",
            BodyPart::LegLeft => "leg-left",
            BodyPart::LegRight => "leg-right",
            BodyPart::FootLeft => "foot-left",
            BodyPart::FootRight => "foot-right",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyPart::Head => "head",
            BodyPart::Neck => "neck",
            BodyPart::Torso => "torso",
            BodyPart::ShoulderLeft => "left shoulder",
            BodyPart::ShoulderRight => "right shoulder",
            BodyPart::ArmLeft => "left arm",
            BodyPart::ArmRight => "right arm",
            BodyPart::HandLeft => "left hand",
            BodyPart::HandRight => "right hand",
            BodyPart::Hips => "hips",
            BodyPart::LegLeft => "left leg",
            BodyPart::LegRight => "right leg",
            BodyPart::FootLeft => "left foot",
            BodyPart::FootRight => "right foot",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.id() == id)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A point in the body diagram's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub cx: f64,
    pub cy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPoint {
    pub part_id: BodyPart,
    #[serde(deserialize_with = "lenient::level")]
    pub level: u8,
    #[serde(flatten)]
    pub coords: Coords,
}

/// A saved session. Immutable once written; only deletion touches it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    pub id: String,
    pub exercise: String,
    #[serde(default)]
    pub pain_points: Vec<PainPoint>,
    #[serde(deserialize_with = "lenient::level")]
    pub fatigue_level: u8,
    #[serde(deserialize_with = "lenient::duration")]
    pub work_time: f64,
    #[serde(deserialize_with = "lenient::duration")]
    pub rest_time: f64,
    #[serde(default)]
    pub comments: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionLog {
    /// Calendar date the session was recorded on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Login,
    ExerciseSelection,
    SessionLogging,
    PainLogging,
    PhysioDashboard,
    PatientDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Physio,
}

impl Role {
    /// First view shown after logging in with this role.
    pub fn home_view(self) -> View {
        match self {
            Role::Patient => View::ExerciseSelection,
            Role::Physio => View::PhysioDashboard,
        }
    }
}

/// A patient on the physio dashboard roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub last_session: Option<NaiveDate>,
}

/// Optional identity attached to every request; absent means the shared default key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Owner {
    pub user: Option<String>,
}

impl Owner {
    pub fn id(&self) -> Option<&str> {
        self.user.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct BodyPartInfo {
    pub id: BodyPart,
    pub label: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub exercise: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: View,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPatientRequest {
    pub patient_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPainRequest {
    pub part_id: BodyPart,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
}

impl SelectPainRequest {
    pub fn coords(&self) -> Option<Coords> {
        match (self.cx, self.cy) {
            (Some(cx), Some(cy)) => Some(Coords { cx, cy }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitPainRequest {
    pub level: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    pub fatigue_level: Option<u8>,
    pub work_time: Option<String>,
    pub rest_time: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    pub logs: Vec<SessionLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub log_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Older records stored raw form input, so numbers may arrive as strings.
mod lenient {
    use super::MAX_LEVEL;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(value) => Ok(value),
            NumberOrText::Text(text) if text.trim().is_empty() => Ok(0.0),
            NumberOrText::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
        }
    }

    /// Work and rest times: finite and non-negative.
    pub fn duration<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = number(deserializer)?;
        if !value.is_finite() || value < 0.0 {
            return Err(D::Error::custom(format!("duration {value} must be a non-negative number")));
        }
        Ok(value)
    }

    pub fn level<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = number(deserializer)?;
        if value.fract() != 0.0 || !(0.0..=f64::from(MAX_LEVEL)).contains(&value) {
            return Err(D::Error::custom(format!("level {value} is outside 0-{MAX_LEVEL}")));
        }
        Ok(value as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_string_fields_are_accepted() {
        let raw = r#"{
            "id": "a1",
            "exercise": "Squats",
            "painPoints": [{"partId": "shoulder-left", "level": 4, "cx": 12.5, "cy": 40}],
            "fatigueLevel": "7",
            "workTime": "45",
            "restTime": "",
            "comments": "tight",
            "timestamp": "2024-03-01T10:00:00.000Z"
        }"#;
        let log: SessionLog = serde_json::from_str(raw).unwrap();
        assert_eq!(log.fatigue_level, 7);
        assert_eq!(log.work_time, 45.0);
        assert_eq!(log.rest_time, 0.0);
        assert_eq!(log.pain_points[0].part_id, BodyPart::ShoulderLeft);
        assert_eq!(log.pain_points[0].coords, Coords { cx: 12.5, cy: 40.0 });
        assert_eq!(log.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn out_of_range_fatigue_is_rejected() {
        let raw = r#"{"id":"x","exercise":"Plank","fatigueLevel":11,"workTime":0,"restTime":0,"timestamp":"2024-03-01T10:00:00Z"}"#;
        assert!(serde_json::from_str::<SessionLog>(raw).is_err());
    }

    #[test]
    fn negative_or_non_finite_times_are_rejected() {
        for (work, rest) in [("-5", "0"), ("0", "\"-2\""), ("\"NaN\"", "0"), ("\"inf\"", "0")] {
            let raw = format!(
                r#"{{"id":"x","exercise":"Plank","fatigueLevel":3,"workTime":{work},"restTime":{rest},"timestamp":"2024-03-01T10:00:00Z"}}"#
            );
            assert!(
                serde_json::from_str::<SessionLog>(&raw).is_err(),
                "accepted workTime={work} restTime={rest}"
            );
        }
    }

    #[test]
    fn out_of_range_pain_level_is_rejected() {
        let raw = r#"{"partId":"neck","level":42,"cx":1,"cy":2}"#;
        assert!(serde_json::from_str::<PainPoint>(raw).is_err());
    }

    #[test]
    fn pain_points_serialize_flat() {
        let point = PainPoint {
            part_id: BodyPart::FootRight,
            level: 2,
            coords: Coords { cx: 1.0, cy: 2.0 },
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "partId": "foot-right", "level": 2, "cx": 1.0, "cy": 2.0 })
        );
    }

    #[test]
    fn body_part_ids_match_serde_names() {
        for part in BodyPart::ALL {
            let encoded = serde_json::to_value(part).unwrap();
            assert_eq!(encoded, serde_json::Value::String(part.id().to_string()));
            assert_eq!(BodyPart::from_id(part.id()), Some(part));
        }
    }
}
