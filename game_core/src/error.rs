use thiserror::Error;

pub type CommandResult<T = ()> = Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    /// A participant asked for something the game does not allow right now.
    /// The reason is sent back to the channel and nothing changes.
    #[error("{0}")]
    Rejected(String),
    /// The session cannot go on with what it was configured with (such as
    /// running out of answers). The module ends the session.
    #[error("Session cannot continue: {0}")]
    Exhausted(String),
    /// Something went wrong that no participant caused, logged and reported generically
    #[error("Encountered a fatal error handling command: {0}")]
    Critical(#[from] anyhow::Error),
}

pub trait CommandErrorUtils<T> {
    fn critical(self) -> Result<T, CommandError>;
    fn rejected(self) -> Result<T, CommandError>;
}

impl<T> CommandErrorUtils<T> for &str {
    fn critical(self) -> Result<T, CommandError> {
        Err(CommandError::Critical(anyhow::anyhow!(self.to_string())))
    }

    fn rejected(self) -> Result<T, CommandError> {
        Err(CommandError::Rejected(self.to_string()))
    }
}

impl<T> CommandErrorUtils<T> for String {
    fn critical(self) -> Result<T, CommandError> {
        Err(CommandError::Critical(anyhow::anyhow!(self)))
    }

    fn rejected(self) -> Result<T, CommandError> {
        Err(CommandError::Rejected(self))
    }
}

impl<T, E: std::error::Error + Send + Sync + 'static> CommandErrorUtils<T> for Result<T, E> {
    fn critical(self) -> Result<T, CommandError> {
        self.map_err(|e| CommandError::Critical(anyhow::Error::from(e)))
    }

    fn rejected(self) -> Result<T, CommandError> {
        self.map_err(|e| CommandError::Rejected(e.to_string()))
    }
}

impl From<String> for CommandError {
    fn from(value: String) -> Self {
        Self::Rejected(value)
    }
}

impl From<&str> for CommandError {
    fn from(value: &str) -> Self {
        Self::Rejected(String::from(value))
    }
}

impl CommandError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, CommandError::Rejected(_))
    }
}
