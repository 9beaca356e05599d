mod settings;

pub use settings::{Controller, Logger, Rooms, Server, Session, Settings};
