use std::sync::Arc;

use roomlink_api::{Command, CommandKind, ControllerInfo, Response, RoomStatePatch};

use crate::errors::CommandError;
use crate::services::RoomRegistry;

/// Which rooms a `set_state` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Room(&'a str),
    All,
}

/// A command that passed authentication and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request<'a> {
    GetInfo,
    GetState { room_id: &'a str },
    SetState { target: Target<'a>, patch: &'a RoomStatePatch },
    DoorUnlock { room_id: &'a str },
    DoorLock { room_id: &'a str },
}

impl Request<'_> {
    pub fn kind(&self) -> CommandKind {
        match self {
            Request::GetInfo => CommandKind::GetInfo,
            Request::GetState { .. } => CommandKind::GetState,
            Request::SetState { .. } => CommandKind::SetState,
            Request::DoorUnlock { .. } => CommandKind::DoorUnlock,
            Request::DoorLock { .. } => CommandKind::DoorLock,
        }
    }
}

/// Interprets the controller command vocabulary.
///
/// The token is checked before the type so that an unauthenticated caller
/// learns nothing about which commands exist.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    info: Arc<ControllerInfo>,
}

impl CommandRouter {
    pub fn new(info: ControllerInfo) -> Self {
        Self {
            info: Arc::new(info),
        }
    }

    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn token(&self) -> &str {
        &self.info.token
    }

    pub fn authorize<'a>(&self, command: &'a Command) -> Result<Request<'a>, CommandError> {
        let kind = command.command_kind();

        if kind.is_none_or(|kind| kind.requires_token())
            && !token_matches(self.token(), command.token.as_deref())
        {
            return Err(CommandError::InvalidToken);
        }

        let kind = kind.ok_or(CommandError::UnknownCommand)?;
        let room = command.room();

        let request = match kind {
            CommandKind::GetInfo => Request::GetInfo,
            CommandKind::GetState => Request::GetState {
                room_id: room.ok_or(CommandError::RoomIdRequired)?,
            },
            CommandKind::SetState => {
                let target = match (command.is_global(), room) {
                    (true, _) => Target::All,
                    (false, Some(room_id)) => Target::Room(room_id),
                    (false, None) => return Err(CommandError::RoomIdRequired),
                };
                let patch = command.state.as_ref().ok_or(CommandError::StateRequired)?;

                Request::SetState { target, patch }
            }
            CommandKind::DoorUnlock => Request::DoorUnlock {
                room_id: room.ok_or(CommandError::RoomIdRequired)?,
            },
            CommandKind::DoorLock => Request::DoorLock {
                room_id: room.ok_or(CommandError::RoomIdRequired)?,
            },
        };

        Ok(request)
    }

    /// Run an authorized request against `registry`.
    pub async fn execute(&self, request: Request<'_>, registry: &Arc<RoomRegistry>) -> Response {
        tracing::trace!("Executing {}", request.kind());

        match request {
            Request::GetInfo => Response::info(&self.info),
            Request::GetState { room_id } => {
                Response::state(registry.get_or_create(room_id).await).with_room(room_id)
            }
            Request::SetState {
                target: Target::All,
                patch,
            } => {
                let rooms = registry.apply_all(patch).await;
                tracing::debug!("Global state update applied to {} rooms", rooms);
                Response::success("Global state updated")
            }
            Request::SetState {
                target: Target::Room(room_id),
                patch,
            } => Response::state(registry.apply(room_id, patch).await).with_room(room_id),
            Request::DoorUnlock { room_id } => Response::success("Door unlocked")
                .with_room(room_id)
                .with_state(registry.unlock(room_id).await),
            Request::DoorLock { room_id } => Response::success("Door locked")
                .with_room(room_id)
                .with_state(registry.lock(room_id).await),
        }
    }

    /// Authorize and execute in one step, turning rejections into error
    /// responses.
    pub async fn handle(&self, command: &Command, registry: &Arc<RoomRegistry>) -> Response {
        match self.authorize(command) {
            Ok(request) => self.execute(request, registry).await,
            Err(e) => {
                tracing::debug!("Rejected {} command ({:?}): {}", command.kind, e.kind(), e);
                e.into()
            }
        }
    }
}

/// Compare without short-circuiting on the first differing byte.
fn token_matches(expected: &str, provided: Option<&str>) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    let (expected, provided) = (expected.as_bytes(), provided.as_bytes());

    expected.len() == provided.len()
        && expected
            .iter()
            .zip(provided)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
