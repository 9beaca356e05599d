use roomlink_api::Response;

/// Broad class of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Protocol,
    Auth,
    Validation,
}

/// Reasons a command is answered locally with an error instead of being
/// executed or forwarded. The display text is what the client receives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid command format")]
    InvalidFormat,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unknown command")]
    UnknownCommand,

    #[error("Room ID is required")]
    RoomIdRequired,

    #[error("State is required")]
    StateRequired,
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::InvalidFormat => ErrorKind::Protocol,
            CommandError::InvalidToken => ErrorKind::Auth,
            CommandError::UnknownCommand => ErrorKind::Validation,
            CommandError::RoomIdRequired => ErrorKind::Validation,
            CommandError::StateRequired => ErrorKind::Validation,
        }
    }
}

impl From<CommandError> for Response {
    fn from(error: CommandError) -> Self {
        Response::error(error.to_string())
    }
}
