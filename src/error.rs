use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskpilotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} with id {id} already exists")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} {id} references missing {field} {target}")]
    DanglingReference {
        kind: &'static str,
        id: String,
        field: &'static str,
        target: String,
    },

    #[error("Invalid workflow {id}: {reason}")]
    InvalidWorkflow { id: String, reason: String },

    #[error("Execution log {id} cannot move from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl TaskpilotError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for the recoverable "id not in collection" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, TaskpilotError>;
