#![doc = include_str!("../README.md")]

mod block;
mod conformance;
mod instance;
mod module;
mod session;

pub use block::{BlockError, MAX_AUDIO_PORTS, ProcessBlock};
pub use conformance::{Check, Outcome, Report, validate_entry};
pub use instance::{ActivateError, Instance, Lifecycle, ProcessFault};
pub use module::{LoadError, Module};
pub use session::Session;
