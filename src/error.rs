/// Failures of the terminal front end. Game-state outcomes (ship lost,
/// shield on cooldown) are never errors.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// Terminal or log file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command line could not be understood
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
