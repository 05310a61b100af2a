use thiserror::Error;

/// Errors surfaced by the store and the configuration layer.
///
/// `Connection` and `Config` are fatal at startup. `Query` and `Validation`
/// happen while serving and are shown to the user on the dashboard.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not connect to the task store: {0}")]
    Connection(String),

    #[error("Task store query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Errors the user can fix by changing their input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
