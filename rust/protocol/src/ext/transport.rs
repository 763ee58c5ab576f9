//! Host transport control requested by plug-ins.
//!
//! Lets a plug-in with transport widgets on its own surface drive the
//! host's playback. Hosts with a transport provide [`TransportControl`];
//! plug-ins treat its absence as a host without one.

use crate::extension::ExtensionId;
use const_format::concatcp;


const VERSION: u32 = 0;

/// The id under which hosts provide [`TransportControl`].
///
/// A draft interface: the id changes whenever the interface does, so two
/// sides that negotiate it successfully always mean the same thing.
pub const TRANSPORT_CONTROL: ExtensionId =
    ExtensionId::new(concatcp!("baton.transport-control.draft/", VERSION));

/// A position on the host's musical timeline, in fixed-point beats.
///
/// One beat is a quarter note and carries [`UNITS_PER_BEAT`] ticks, so
/// positions are exact across hosts regardless of float rounding.
/// Positions before the timeline origin are negative.
///
/// [`UNITS_PER_BEAT`]: BeatTime::UNITS_PER_BEAT
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeatTime(i64);

impl BeatTime {
    /// Ticks per quarter note.
    pub const UNITS_PER_BEAT: i64 = 1 << 31;

    /// The timeline origin.
    pub const ZERO: BeatTime = BeatTime(0);

    /// A position from its raw tick count.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw tick count of this position.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// The position nearest to `beats` quarter notes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_beats(beats: f64) -> Self {
        Self((beats * Self::UNITS_PER_BEAT as f64).round() as i64)
    }

    /// This position in quarter notes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_beats(self) -> f64 {
        self.0 as f64 / Self::UNITS_PER_BEAT as f64
    }
}

/// Playback requests a plug-in may make of its host.
///
/// Requests are asynchronous: the host applies them at its own pace and
/// the outcome shows up in the transport state of later process calls.
/// A host is free to ignore a request that does not fit its current
/// state. Main-thread only.
pub trait TransportControl: Send + Sync {
    /// Rewind to the beginning and start playback.
    fn request_start(&self);

    /// Start playback from the current position.
    fn request_continue(&self);

    /// Pause playback, keeping the current position.
    fn request_pause(&self);

    /// Stop playback and rewind to the beginning.
    fn request_stop(&self);

    /// Move the playhead to `position` without starting or stopping
    /// playback.
    fn request_jump(&self, position: BeatTime);

    /// Toggle between playing and paused, as a space bar does.
    fn request_toggle_play(&self);
}
