//! Buffer ownership and event staging for repeated process calls.

use arrayvec::ArrayVec;
use baton_protocol::audio::{
    AudioInput, AudioOutput, BufferData, ConstantMask, PortId, SampleData, SampleDataMut,
};
use baton_protocol::events::{Event, OutputEvents};
use baton_protocol::ext::audio_ports::{
    AUDIO_PORTS, AudioPorts, PortDirection, PortInfo, default_port,
};
use baton_protocol::process::{Process, ProcessStatus};

use crate::instance::{Instance, ProcessFault};

#[cfg(test)]
mod tests;

/// The most ports a block will stage in either direction.
pub const MAX_AUDIO_PORTS: usize = 16;

/// The reason a [`ProcessBlock`] could not be built, or a call through
/// one could not be staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// The plug-in publishes more ports in one direction than a block
    /// can stage.
    #[error(
        "the plug-in publishes {count} audio ports in one direction, over the block limit of {limit}",
        limit = MAX_AUDIO_PORTS
    )]
    TooManyPorts {
        /// The published port count.
        count: usize,
    },

    /// The audio-ports capability answered `None` below its own count.
    #[error("the audio-ports capability published no info for port {index}")]
    MissingPortInfo {
        /// The index the capability failed to answer.
        index: usize,
    },

    /// A staged event lies at or past the end of the call.
    #[error("a staged event lies outside a call of {frames_count} frames")]
    EventOutOfRange {
        /// The frame count of the rejected call.
        frames_count: usize,
    },

    /// The instance refused the call, or the plug-in failed it.
    #[error(transparent)]
    Fault(#[from] ProcessFault),
}

// For inputs the mask is the host's advisory hint and persists until
// changed; for outputs it is whatever the plug-in reported on the last
// successful call.
#[derive(Debug)]
struct PortBuffer {
    id: PortId,
    data: BufferData<f32>,
    constant_mask: ConstantMask,
}

/// Reusable buffers and event staging for the calls of one activation.
///
/// A block allocates every port buffer up front, sized by the plug-in's
/// published port layout and a maximum call length, and stages the borrowed
/// per-call views in fixed-capacity arrays. Between calls the host fills
/// input samples and stages events; each [`process`](ProcessBlock::process)
/// assembles the views, drives the instance, and advances the block's
/// steady clock by the frames processed.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use baton_host::{Module, ProcessBlock, Session};
/// use baton_plugin::EntryPoint;
/// use baton_plugin::test_utils::{PASSTHROUGH_CLASSES, PASSTHROUGH_ID};
/// use baton_protocol::process::ProcessStatus;
///
/// static ENTRY: EntryPoint = EntryPoint::new(&PASSTHROUGH_CLASSES);
///
/// let host = Session::new("Example", "Example Audio", "https://example.test", "1.0").into_host();
/// let module = Module::open(&ENTRY, host, Path::new("/tmp/example.baton"));
/// let mut instance = module.create(PASSTHROUGH_ID)?;
/// instance.activate(48_000.0)?;
///
/// let mut block = ProcessBlock::for_instance(&instance, 64)?;
/// block.input_mut(0).channel_mut(0)[..4].copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
/// let status = block.process(&mut instance, 4)?;
/// assert_eq!(status, ProcessStatus::Continue);
/// assert_eq!(&block.output(0).channel(0)[..4], &[0.1, 0.2, 0.3, 0.4]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ProcessBlock {
    max_frames: usize,
    steady_time: i64,
    has_transport: bool,
    inputs: Vec<PortBuffer>,
    outputs: Vec<PortBuffer>,
    in_events: Vec<Event>,
    out_events: OutputEvents,
}

impl ProcessBlock {
    /// A block over explicit port layouts.
    ///
    /// Buffers come up zero-filled at `max_frames` frames each, with
    /// every input mask clear.
    ///
    /// # Errors
    ///
    /// [`BlockError::TooManyPorts`] if either direction lists more than
    /// [`MAX_AUDIO_PORTS`] ports.
    pub fn new(
        inputs: impl IntoIterator<Item = PortInfo>,
        outputs: impl IntoIterator<Item = PortInfo>,
        max_frames: usize,
    ) -> Result<Self, BlockError> {
        Ok(Self {
            max_frames,
            steady_time: 0,
            has_transport: false,
            inputs: allocate(inputs, max_frames)?,
            outputs: allocate(outputs, max_frames)?,
            in_events: Vec::new(),
            out_events: OutputEvents::new(0),
        })
    }

    /// A block matching `instance`'s published port layout.
    ///
    /// Reads the audio-ports capability when the plug-in provides one
    /// and assumes the default stereo pair on each side otherwise.
    ///
    /// # Errors
    ///
    /// [`BlockError::TooManyPorts`] and [`BlockError::MissingPortInfo`]
    /// when the published layout cannot be staged.
    pub fn for_instance(instance: &Instance, max_frames: usize) -> Result<Self, BlockError> {
        match instance
            .extension(AUDIO_PORTS.as_str())
            .and_then(|capability| capability.cast::<dyn AudioPorts>())
        {
            Some(ports) => Self::new(
                collect_ports(ports, PortDirection::Input)?,
                collect_ports(ports, PortDirection::Output)?,
                max_frames,
            ),
            None => Self::new([default_port()], [default_port()], max_frames),
        }
    }

    /// The number of input ports the block stages.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// The number of output ports the block stages.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// The id of input port `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_inputs()`.
    #[must_use]
    pub fn input_id(&self, index: usize) -> PortId {
        self.inputs[index].id
    }

    /// The id of output port `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_outputs()`.
    #[must_use]
    pub fn output_id(&self, index: usize) -> PortId {
        self.outputs[index].id
    }

    /// The samples of input port `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_inputs()`.
    #[must_use]
    pub fn input(&self, index: usize) -> &BufferData<f32> {
        &self.inputs[index].data
    }

    /// Mutable samples of input port `index`, for the host to fill
    /// between calls.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_inputs()`.
    #[must_use]
    pub fn input_mut(&mut self, index: usize) -> &mut BufferData<f32> {
        &mut self.inputs[index].data
    }

    /// The samples of output port `index`, as the plug-in left them.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_outputs()`.
    #[must_use]
    pub fn output(&self, index: usize) -> &BufferData<f32> {
        &self.outputs[index].data
    }

    /// Flag the constant channels of input port `index` for following
    /// calls.
    ///
    /// The hint persists until changed again.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_inputs()`.
    pub fn set_input_constant_mask(&mut self, index: usize, mask: ConstantMask) {
        self.inputs[index].constant_mask = mask;
    }

    /// The constant-channel hint the plug-in reported for output port
    /// `index` on the last successful call.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_outputs()`.
    #[must_use]
    pub fn output_constant_mask(&self, index: usize) -> ConstantMask {
        self.outputs[index].constant_mask
    }

    /// Stage `event` for the next call.
    ///
    /// Events may arrive in any order; the block sorts them by offset at
    /// dispatch and validates them against that call's frame count.
    pub fn push_event(&mut self, event: Event) {
        self.in_events.push(event);
    }

    /// Whether events are staged for the next call.
    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.in_events.is_empty()
    }

    /// The events the plug-in emitted on the last successful call, in
    /// offset order.
    #[must_use]
    pub fn output_events(&self) -> &[Event] {
        self.out_events.as_slice()
    }

    /// Set whether following calls run under a rolling transport.
    pub fn set_transport(&mut self, has_transport: bool) {
        self.has_transport = has_transport;
    }

    /// The steady time the next call will carry.
    ///
    /// Starts at zero and advances by the frame count of each successful
    /// call.
    #[must_use]
    pub fn steady_time(&self) -> i64 {
        self.steady_time
    }

    /// The largest frame count a call through this block may carry.
    #[must_use]
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Drive one call of `frames_count` frames through `instance`.
    ///
    /// Assembles the borrowed views over the block's buffers and staged
    /// events and runs the instance. On success the plug-in's output
    /// masks and emitted events become readable and the steady clock
    /// advances by `frames_count`; on error the clock and the stored
    /// masks are untouched. Staged input events are consumed by the call
    /// either way.
    ///
    /// # Errors
    ///
    /// [`BlockError::EventOutOfRange`] if a staged event lies outside
    /// the call, and [`BlockError::Fault`] when the instance refuses the
    /// call or the plug-in fails it.
    ///
    /// # Panics
    ///
    /// Panics if `frames_count > self.max_frames()`.
    pub fn process(
        &mut self,
        instance: &mut Instance,
        frames_count: usize,
    ) -> Result<ProcessStatus, BlockError> {
        assert!(
            frames_count <= self.max_frames,
            "a block of {} frames cannot stage a {frames_count}-frame call",
            self.max_frames
        );
        // Stable sort keeps the staging order of events sharing an offset.
        self.in_events.sort_by_key(|event| event.sample_offset);
        self.out_events.reset(frames_count);
        let inputs: ArrayVec<AudioInput<'_>, MAX_AUDIO_PORTS> = self
            .inputs
            .iter()
            .map(|port| AudioInput {
                data: SampleData::F32(&port.data),
                latency: 0,
                constant_mask: port.constant_mask,
                port_id: port.id,
            })
            .collect();
        let mut outputs: ArrayVec<AudioOutput<'_>, MAX_AUDIO_PORTS> = self
            .outputs
            .iter_mut()
            .map(|port| AudioOutput {
                data: SampleDataMut::F32(&mut port.data),
                latency: 0,
                constant_mask: ConstantMask::NONE,
                port_id: port.id,
            })
            .collect();
        let status = {
            let Some(mut process) = Process::new(
                self.steady_time,
                frames_count,
                self.has_transport,
                &inputs,
                &mut outputs,
                &self.in_events,
                &mut self.out_events,
            ) else {
                // Buffers and the output list are sized by construction;
                // only a staged event can fail validation here.
                self.in_events.clear();
                return Err(BlockError::EventOutOfRange { frames_count });
            };
            instance.process(&mut process)
        };
        let masks: ArrayVec<ConstantMask, MAX_AUDIO_PORTS> =
            outputs.iter().map(|view| view.constant_mask).collect();
        // The output views keep the port buffers borrowed until dropped.
        drop(outputs);
        self.in_events.clear();
        let status = status?;
        for (port, mask) in self.outputs.iter_mut().zip(masks) {
            port.constant_mask = mask;
        }
        self.steady_time += frames_count as i64;
        Ok(status)
    }
}

fn collect_ports(
    ports: &dyn AudioPorts,
    direction: PortDirection,
) -> Result<Vec<PortInfo>, BlockError> {
    (0..ports.count(direction))
        .map(|index| {
            ports
                .get(direction, index)
                .ok_or(BlockError::MissingPortInfo { index })
        })
        .collect()
}

fn allocate(
    ports: impl IntoIterator<Item = PortInfo>,
    max_frames: usize,
) -> Result<Vec<PortBuffer>, BlockError> {
    let ports: Vec<PortInfo> = ports.into_iter().collect();
    if ports.len() > MAX_AUDIO_PORTS {
        return Err(BlockError::TooManyPorts { count: ports.len() });
    }
    Ok(ports
        .into_iter()
        .map(|port| PortBuffer {
            id: port.id,
            data: BufferData::new(port.num_channels, max_frames),
            constant_mask: ConstantMask::NONE,
        })
        .collect())
}
