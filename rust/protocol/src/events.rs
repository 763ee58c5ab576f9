//! Event lists exchanged during a process call.
//!
//! Each process call carries one input list (host to plug-in) and one
//! output list (plug-in to host). Both directions share the same
//! invariants: events are ordered by non-decreasing sample offset, and
//! every offset falls inside the call's frame range. [`InputEvents`]
//! enforces this at construction; [`OutputEvents`] enforces it on every
//! push, so a list handed across the boundary is valid by type.


/// Data for note on and note off events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteData {
    /// Which channel the note is on.
    pub channel: u8,

    /// The note's key number, 0 through 127 with 60 as middle C.
    pub key: u8,

    /// How hard the note was pressed or released, from 0 through 1.
    pub velocity: f32,
}

/// Data for a parameter value change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamValueData {
    /// Which parameter changed.
    pub id: u32,

    /// The new value.
    pub value: f64,
}

/// The payload of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Data {
    /// A note began.
    NoteOn {
        /// Data for the note.
        data: NoteData,
    },

    /// A note ended.
    NoteOff {
        /// Data for the note.
        data: NoteData,
    },

    /// A parameter took a new value.
    ParamValue {
        /// Data for the change.
        data: ParamValueData,
    },

    /// A raw short MIDI message.
    Midi {
        /// The message bytes, status first.
        bytes: [u8; 3],
    },
}

/// An event placed at a specific frame of a process call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// How many frames into the call the event takes effect.
    pub sample_offset: usize,

    /// The payload.
    pub data: Data,
}

/// Whether `events` satisfies the event list invariants for a call of
/// `frames_count` frames.
///
/// The invariants are non-decreasing sample offsets and every offset
/// strictly below `frames_count`. An empty list satisfies them trivially.
#[must_use]
pub fn check_events_invariants(events: &[Event], frames_count: usize) -> bool {
    events.iter().all(|event| event.sample_offset < frames_count)
        && events
            .windows(2)
            .all(|pair| pair[0].sample_offset <= pair[1].sample_offset)
}

/// A validated, host-provided list of events for one process call.
///
/// # Examples
///
/// ```
/// # use baton_protocol::events::{Data, Event, InputEvents, NoteData};
/// let events = [Event {
///     sample_offset: 2,
///     data: Data::NoteOn {
///         data: NoteData {
///             channel: 0,
///             key: 60,
///             velocity: 0.5,
///         },
///     },
/// }];
/// assert!(InputEvents::new(&events, 8).is_some());
///
/// // An event at or past the end of the call is rejected.
/// assert!(InputEvents::new(&events, 2).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InputEvents<'a> {
    events: &'a [Event],
}

impl<'a> InputEvents<'a> {
    /// Wrap `events` for a call of `frames_count` frames.
    ///
    /// Returns `None` unless [`check_events_invariants`] holds.
    #[must_use]
    pub fn new(events: &'a [Event], frames_count: usize) -> Option<Self> {
        check_events_invariants(events, frames_count).then_some(Self { events })
    }

    /// A list containing no events.
    #[must_use]
    pub const fn empty() -> Self {
        Self { events: &[] }
    }

    /// The number of events in the list.
    #[must_use]
    pub fn len(self) -> usize {
        self.events.len()
    }

    /// Whether the list contains no events.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over the events in offset order.
    #[must_use]
    pub fn iter(self) -> std::slice::Iter<'a, Event> {
        self.events.iter()
    }

    /// The events as a slice, in offset order.
    #[must_use]
    pub fn as_slice(self) -> &'a [Event] {
        self.events
    }
}

impl<'a> IntoIterator for InputEvents<'a> {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The reason an event could not be appended to an [`OutputEvents`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The event would land before the previous one.
    #[error("event at offset {offset} precedes the previous event at offset {last}")]
    OutOfOrder {
        /// The rejected event's offset.
        offset: usize,

        /// The offset of the last accepted event.
        last: usize,
    },

    /// The event would land at or past the end of the call.
    #[error("event at offset {offset} lies outside a call of {frames_count} frames")]
    OutOfBounds {
        /// The rejected event's offset.
        offset: usize,

        /// The frame count of the call.
        frames_count: usize,
    },
}

/// An event list the plug-in fills during a process call.
///
/// The list only accepts events that keep the invariants, so the host can
/// consume it afterwards without re-validating. Pushing past the reserved
/// capacity grows the backing storage; real-time hosts preallocate with
/// [`with_capacity`](OutputEvents::with_capacity) and rearm the same list
/// with [`reset`](OutputEvents::reset) between calls.
#[derive(Debug)]
pub struct OutputEvents {
    events: Vec<Event>,
    frames_count: usize,
}

impl OutputEvents {
    /// An empty list for a call of `frames_count` frames.
    #[must_use]
    pub fn new(frames_count: usize) -> Self {
        Self {
            events: Vec::new(),
            frames_count,
        }
    }

    /// An empty list with room for `capacity` events before any
    /// reallocation.
    #[must_use]
    pub fn with_capacity(frames_count: usize, capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            frames_count,
        }
    }

    /// Clear the list and ready it for a call of `frames_count` frames.
    ///
    /// Keeps the allocation.
    pub fn reset(&mut self, frames_count: usize) {
        self.events.clear();
        self.frames_count = frames_count;
    }

    /// Append `event`, keeping the list's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::OutOfBounds`] if the event's offset is at or
    /// past the end of the call, or [`PushError::OutOfOrder`] if it
    /// precedes the last accepted event. The list is unchanged on error.
    pub fn try_push(&mut self, event: Event) -> Result<(), PushError> {
        if event.sample_offset >= self.frames_count {
            return Err(PushError::OutOfBounds {
                offset: event.sample_offset,
                frames_count: self.frames_count,
            });
        }
        if let Some(last) = self.events.last()
            && event.sample_offset < last.sample_offset
        {
            return Err(PushError::OutOfOrder {
                offset: event.sample_offset,
                last: last.sample_offset,
            });
        }
        self.events.push(event);
        Ok(())
    }

    /// The accepted events, in offset order.
    #[must_use]
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// The number of accepted events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The frame count of the call the list belongs to.
    #[must_use]
    pub fn frames_count(&self) -> usize {
        self.frames_count
    }
}
