use serde::{Deserialize, Serialize};

/// What kind of title a watched entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Series,
}

/// Tracking service a watched entry was collected from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Serializd,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Serializd => "serializd",
        }
    }
}
