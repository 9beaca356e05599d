mod backoff;
mod drift;
mod link;
mod registry;
mod router;
mod session;
mod simulation;
pub mod transport;

pub use backoff::{Backoff, ReconnectConfig, delay_for};
pub use drift::{nudge, spawn_drift};
pub use link::{ControllerLink, ControllerMessage, LinkEvent, fill_info_token};
pub use registry::{RoomRegistry, random_room};
pub use router::{CommandRouter, Request, Target};
pub use session::{ConnectionState, Session, SessionConfig, SessionContext};
pub use simulation::Simulation;
