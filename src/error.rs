use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No valid TLDs loaded")]
    EmptyTldSet,

    #[error("No domain variations generated")]
    NoCandidates,

    #[error("File error at '{path}': {message}")]
    File { path: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Resolver error: {0}")]
    Resolver(String),

    #[error("Operation cancelled by user")]
    Interrupted,
}

impl ProbeError {
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config(message.into())
    }

    pub fn file<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
