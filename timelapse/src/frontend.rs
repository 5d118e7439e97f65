//! An interactive console for capturing and encoding, one command per line.

pub mod app;
pub mod command;
pub mod console;
pub mod settings;

pub use app::{App, Event, Flow, Phase};
pub use command::Command;
pub use settings::Settings;
