//! The data handed to a plug-in for one process call.
//!
//! A [`Process`] bundles everything the call may touch: borrowed audio
//! buffers for each port, the host's event list, an output event list to
//! fill, the frame count, and the host's steady clock. The bundle only
//! constructs when every piece is consistent, so a plug-in receiving one
//! can rely on the invariants without checking them on the audio thread.

use crate::audio::{AudioInput, AudioOutput};
use crate::events::{Event, InputEvents, OutputEvents};


/// How a process call ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Output was produced and the plug-in wants the next call.
    Continue,

    /// Output was produced and the plug-in has gone quiet.
    ///
    /// The host may stop calling until new input events arrive; a plug-in
    /// must come back correctly whenever the next call happens.
    Sleep,
}

/// The process call failed.
///
/// The host discards the call's audio and event output. The plug-in stays
/// active and the host may keep calling; a plug-in returning this must
/// remain in a state where the next call can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the plug-in could not process the buffer and its output was discarded")]
pub struct ProcessError;

/// Everything a plug-in may touch during one process call.
///
/// Constructed by the host for each call; the borrows end with the call.
///
/// # Examples
///
/// Host-side assembly and plug-in-side consumption of one call:
///
/// ```
/// # use baton_protocol::audio::{
/// #     AudioInput, AudioOutput, BufferData, ConstantMask, PortId, SampleData, SampleDataMut,
/// # };
/// # use baton_protocol::events::OutputEvents;
/// # use baton_protocol::process::Process;
/// let input_data = BufferData::new_stereo([0.5f32; 4], [0.25; 4]);
/// let mut output_data = BufferData::<f32>::new(2, 4);
/// let inputs = [AudioInput {
///     data: SampleData::F32(&input_data),
///     latency: 0,
///     constant_mask: ConstantMask::NONE,
///     port_id: PortId(0),
/// }];
/// let mut outputs = [AudioOutput {
///     data: SampleDataMut::F32(&mut output_data),
///     latency: 0,
///     constant_mask: ConstantMask::NONE,
///     port_id: PortId(0),
/// }];
/// let mut out_events = OutputEvents::new(4);
/// let mut process =
///     Process::new(0, 4, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
///
/// // The plug-in side: copy the input port to the output port.
/// let (inputs, outputs) = process.audio();
/// let from = inputs[0].data.as_f32().unwrap();
/// let to = outputs[0].data.as_f32_mut().unwrap();
/// for (from, to) in from.channels().zip(to.channels_mut()) {
///     to.copy_from_slice(from);
/// }
///
/// drop(process);
/// assert_eq!(output_data.channel(1), &[0.25; 4]);
/// ```
#[derive(Debug)]
pub struct Process<'a, 'b> {
    steady_time: i64,
    frames_count: usize,
    has_transport: bool,
    audio_inputs: &'a [AudioInput<'b>],
    audio_outputs: &'a mut [AudioOutput<'b>],
    in_events: InputEvents<'a>,
    out_events: &'a mut OutputEvents,
}

impl<'a, 'b> Process<'a, 'b> {
    /// Bundle the pieces of one process call.
    ///
    /// Returns `None` unless the pieces are consistent: every port buffer
    /// must hold at least `frames_count` frames, `in_events` must satisfy
    /// the event list invariants for the call, and `out_events` must be
    /// armed for the same frame count.
    #[must_use]
    pub fn new(
        steady_time: i64,
        frames_count: usize,
        has_transport: bool,
        audio_inputs: &'a [AudioInput<'b>],
        audio_outputs: &'a mut [AudioOutput<'b>],
        in_events: &'a [Event],
        out_events: &'a mut OutputEvents,
    ) -> Option<Self> {
        if audio_inputs
            .iter()
            .any(|input| input.data.num_frames() < frames_count)
        {
            return None;
        }
        if audio_outputs
            .iter()
            .any(|output| output.data.num_frames() < frames_count)
        {
            return None;
        }
        if out_events.frames_count() != frames_count {
            return None;
        }
        let in_events = InputEvents::new(in_events, frames_count)?;
        Some(Self {
            steady_time,
            frames_count,
            has_transport,
            audio_inputs,
            audio_outputs,
            in_events,
            out_events,
        })
    }

    /// The host's steady sample clock at the first frame of this call.
    ///
    /// Monotonically non-decreasing across the calls of one activation.
    #[must_use]
    pub fn steady_time(&self) -> i64 {
        self.steady_time
    }

    /// The number of frames to process.
    ///
    /// Port buffers may hold more; the call covers exactly the first
    /// `frames_count` frames of each.
    #[must_use]
    pub fn frames_count(&self) -> usize {
        self.frames_count
    }

    /// Whether the host's transport is running during this call.
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.has_transport
    }

    /// The input port buffers, in port order.
    #[must_use]
    pub fn audio_inputs(&self) -> &[AudioInput<'b>] {
        self.audio_inputs
    }

    /// The output port buffers, in port order.
    #[must_use]
    pub fn audio_outputs(&mut self) -> &mut [AudioOutput<'b>] {
        self.audio_outputs
    }

    /// Both sides of the audio at once, for reading input while writing
    /// output.
    #[must_use]
    pub fn audio(&mut self) -> (&[AudioInput<'b>], &mut [AudioOutput<'b>]) {
        (self.audio_inputs, &mut *self.audio_outputs)
    }

    /// The host's events for this call.
    #[must_use]
    pub fn in_events(&self) -> InputEvents<'a> {
        self.in_events
    }

    /// The event list the plug-in fills for the host.
    pub fn out_events(&mut self) -> &mut OutputEvents {
        self.out_events
    }
}
