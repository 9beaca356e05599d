mod command;
mod controller;
mod response;
mod room;

pub use command::*;
pub use controller::*;
pub use response::*;
pub use room::*;
