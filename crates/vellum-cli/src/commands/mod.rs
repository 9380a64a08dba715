//! Command handlers.

mod config;
mod open;
mod seal;
mod throttle;
mod verify;

pub use config::handle_config;
pub use open::handle_open;
pub use seal::{handle_seal, SealArgs};
pub use throttle::handle_throttle;
pub use verify::handle_verify;
