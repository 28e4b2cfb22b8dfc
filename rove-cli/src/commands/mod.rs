//! CLI command implementations

pub mod clean;
pub mod config;
pub mod jump;
pub mod list;
pub mod pin;

pub use clean::CleanArgs;
pub use config::ConfigArgs;
pub use jump::JumpArgs;
pub use list::ListArgs;
pub use pin::{PinArgs, UnpinArgs};
