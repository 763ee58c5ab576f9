//! Audio port layout published by plug-ins.
//!
//! A host needs to know how many ports a plug-in has and how many
//! channels each carries before it can allocate buffers. Plug-ins whose
//! layout differs from the default publish it through [`AudioPorts`];
//! hosts fall back to [`default_port`] on each side otherwise.

use crate::audio::PortId;
use crate::extension::ExtensionId;
use const_format::concatcp;

const VERSION: u32 = 1;

/// The id under which plug-ins provide [`AudioPorts`].
pub const AUDIO_PORTS: ExtensionId = ExtensionId::new(concatcp!("baton.audio-ports/", VERSION));

/// Which way audio flows through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Host to plug-in.
    Input,

    /// Plug-in to host.
    Output,
}

/// Metadata for one audio port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// The id process-call buffers carry to refer to this port.
    ///
    /// Stable for the life of the plug-in and unique within its
    /// direction.
    pub id: PortId,

    /// Human-readable port name.
    pub name: String,

    /// The number of channels the port carries.
    pub num_channels: usize,
}

/// The port layout a plug-in publishes.
///
/// Answers must stay the same for the whole life of the plug-in.
/// Main-thread only.
pub trait AudioPorts: Send + Sync {
    /// The number of ports in `direction`.
    fn count(&self, direction: PortDirection) -> usize;

    /// Metadata for the port at `index` within `direction`.
    ///
    /// `None` past the end; indices below [`count`](AudioPorts::count)
    /// must answer `Some`.
    fn get(&self, direction: PortDirection, index: usize) -> Option<PortInfo>;
}

/// The port a host assumes on each side of a plug-in that does not
/// provide [`AudioPorts`]: a single stereo pair.
#[must_use]
pub fn default_port() -> PortInfo {
    PortInfo {
        id: PortId(0),
        name: "main".to_owned(),
        num_channels: 2,
    }
}
