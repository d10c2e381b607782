use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("State '{state}' is listed in both the {first} and {second} sets")]
    OverlappingStates {
        state: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}
