use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An intent rule or topic route points at an id the catalogue does not contain.
    #[error("intent '{intent}' references unknown entry '{entry}'")]
    UnknownEntry { intent: String, entry: String },

    #[error("intent '{0}' is declared more than once")]
    DuplicateIntent(String),
}

pub type Result<T> = std::result::Result<T, FaqError>;
