//! Session roles

use serde::{Deserialize, Serialize};

/// Role requested when starting a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum SessionType {
    User,
    Admin,
}

impl From<SessionType> for i32 {
    fn from(value: SessionType) -> Self {
        match value {
            SessionType::User => 0,
            SessionType::Admin => 2,
        }
    }
}

impl TryFrom<i32> for SessionType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::User),
            2 => Ok(Self::Admin),
            other => Err(format!("unknown session type {other}")),
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::User => write!(f, "user"),
            SessionType::Admin => write!(f, "admin"),
        }
    }
}
