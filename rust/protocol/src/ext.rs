//! Standard extensions.
//!
//! Each submodule defines one extension: its id constant, its trait, and
//! the data types it exchanges. The negotiation machinery they ride on
//! lives in [`crate::extension`].

pub mod audio_ports;
pub mod transport;
