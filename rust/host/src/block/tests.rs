use std::sync::{Arc, Mutex};

use baton_protocol::audio::{ConstantMask, PortId};
use baton_protocol::descriptor::{DescriptorRef, Features};
use baton_protocol::events::{Data, Event};
use baton_protocol::ext::audio_ports::{AUDIO_PORTS, AudioPorts, PortDirection, PortInfo};
use baton_protocol::extension::{Capability, Extensions};
use baton_protocol::process::{Process, ProcessError, ProcessStatus};
use baton_protocol::{ActivationError, Plugin, VERSION};

use super::{BlockError, ProcessBlock};
use crate::instance::{Instance, Lifecycle, ProcessFault};

const RECORDER: DescriptorRef<'static> = DescriptorRef {
    protocol_version: VERSION,
    id: "test.recorder",
    name: "Recorder",
    vendor: "Baton Project",
    url: "https://github.com/baton-audio/baton",
    manual_url: "https://github.com/baton-audio/baton",
    support_url: "https://github.com/baton-audio/baton/issues",
    version: "0.0.0",
    description: "Records what each process call delivered",
    features: Features::AUDIO_EFFECT,
};

/// What the plug-in saw, one entry per process call.
#[derive(Default)]
struct CallLog {
    steady_times: Vec<i64>,
    frame_counts: Vec<usize>,
    events: Vec<Vec<Event>>,
    input_masks: Vec<ConstantMask>,
}

/// A plug-in that logs every call and answers it as configured.
struct Recorder {
    extensions: Extensions,
    log: Arc<Mutex<CallLog>>,
    output_mask: ConstantMask,
    fill: Option<f32>,
    emit: Vec<Event>,
    status: Result<ProcessStatus, ProcessError>,
}

impl Plugin for Recorder {
    fn descriptor(&self) -> DescriptorRef<'_> {
        RECORDER
    }

    fn activate(&mut self, _sample_rate: f64) -> Result<(), ActivationError> {
        Ok(())
    }

    fn deactivate(&mut self) {}

    fn process(&mut self, process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError> {
        let frames_count = process.frames_count();
        {
            let mut log = self.log.lock().unwrap();
            log.steady_times.push(process.steady_time());
            log.frame_counts.push(frames_count);
            log.events.push(process.in_events().as_slice().to_vec());
            log.input_masks.push(
                process
                    .audio_inputs()
                    .first()
                    .map_or(ConstantMask::NONE, |input| input.constant_mask),
            );
        }
        for output in process.audio_outputs() {
            if let Some(value) = self.fill {
                let Some(data) = output.data.as_f32_mut() else {
                    return Err(ProcessError);
                };
                for channel in data.channels_mut() {
                    channel[..frames_count].fill(value);
                }
            }
            output.constant_mask = self.output_mask;
        }
        for &event in &self.emit {
            if process.out_events().try_push(event).is_err() {
                return Err(ProcessError);
            }
        }
        self.status
    }

    fn extension(&self, id: &str) -> Option<Capability<'_>> {
        self.extensions.get(id)
    }
}

/// A capability publishing fixed port tables.
struct FixedPorts {
    inputs: Vec<PortInfo>,
    outputs: Vec<PortInfo>,
}

impl AudioPorts for FixedPorts {
    fn count(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => self.inputs.len(),
            PortDirection::Output => self.outputs.len(),
        }
    }

    fn get(&self, direction: PortDirection, index: usize) -> Option<PortInfo> {
        match direction {
            PortDirection::Input => self.inputs.get(index).cloned(),
            PortDirection::Output => self.outputs.get(index).cloned(),
        }
    }
}

/// A capability whose count promises more ports than it can describe.
struct LyingPorts;

impl AudioPorts for LyingPorts {
    fn count(&self, _direction: PortDirection) -> usize {
        2
    }

    fn get(&self, _direction: PortDirection, index: usize) -> Option<PortInfo> {
        (index == 0).then(|| PortInfo {
            id: PortId(0),
            name: "only".to_owned(),
            num_channels: 1,
        })
    }
}

fn port(id: u32, num_channels: usize) -> PortInfo {
    PortInfo {
        id: PortId(id),
        name: format!("port {id}"),
        num_channels,
    }
}

fn midi_at(sample_offset: usize) -> Event {
    Event {
        sample_offset,
        data: Data::Midi {
            bytes: [0x90, 60, 100],
        },
    }
}

fn recorder() -> Recorder {
    Recorder {
        extensions: Extensions::new(),
        log: Arc::default(),
        output_mask: ConstantMask::NONE,
        fill: None,
        emit: Vec::new(),
        status: Ok(ProcessStatus::Continue),
    }
}

fn with_ports(inputs: &[PortInfo], outputs: &[PortInfo]) -> Extensions {
    Extensions::new().with::<dyn AudioPorts>(
        AUDIO_PORTS,
        Box::new(FixedPorts {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        }),
    )
}

fn instance_of(recorder: Recorder) -> (Instance, Arc<Mutex<CallLog>>) {
    let log = Arc::clone(&recorder.log);
    (Instance::new(Box::new(recorder)), log)
}

#[test]
fn derives_the_default_stereo_pair_without_the_capability() {
    let (instance, _log) = instance_of(recorder());
    let block = ProcessBlock::for_instance(&instance, 64).unwrap();
    assert_eq!(block.num_inputs(), 1);
    assert_eq!(block.num_outputs(), 1);
    assert_eq!(block.input_id(0), PortId(0));
    assert_eq!(block.output_id(0), PortId(0));
    assert_eq!(block.input(0).num_channels(), 2);
    assert_eq!(block.output(0).num_channels(), 2);
    assert_eq!(block.input(0).num_frames(), 64);
}

#[test]
fn stages_the_published_port_layout() {
    let (instance, _log) = instance_of(Recorder {
        extensions: with_ports(&[port(1, 1), port(2, 4)], &[port(7, 2)]),
        ..recorder()
    });
    let block = ProcessBlock::for_instance(&instance, 32).unwrap();
    assert_eq!(block.num_inputs(), 2);
    assert_eq!(block.num_outputs(), 1);
    assert_eq!(block.input_id(0), PortId(1));
    assert_eq!(block.input_id(1), PortId(2));
    assert_eq!(block.output_id(0), PortId(7));
    assert_eq!(block.input(1).num_channels(), 4);
    assert_eq!(block.output(0).num_channels(), 2);
}

#[test]
fn refuses_layouts_beyond_the_port_limit() {
    let inputs: Vec<PortInfo> = (0..17u32).map(|id| port(id, 1)).collect();
    let error = ProcessBlock::new(inputs, [port(0, 1)], 16).unwrap_err();
    assert_eq!(error, BlockError::TooManyPorts { count: 17 });
}

#[test]
fn missing_port_info_is_reported() {
    let (instance, _log) = instance_of(Recorder {
        extensions: Extensions::new().with::<dyn AudioPorts>(AUDIO_PORTS, Box::new(LyingPorts)),
        ..recorder()
    });
    let error = ProcessBlock::for_instance(&instance, 16).unwrap_err();
    assert_eq!(error, BlockError::MissingPortInfo { index: 1 });
}

#[test]
fn delivers_events_sorted_and_in_range() {
    let (mut instance, log) = instance_of(recorder());
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    block.push_event(midi_at(5));
    block.push_event(midi_at(1));
    block.push_event(midi_at(3));
    assert!(block.has_pending_events());
    block.process(&mut instance, 8).unwrap();
    assert!(!block.has_pending_events());
    assert_eq!(log.lock().unwrap().events[0], [midi_at(1), midi_at(3), midi_at(5)]);
}

#[test]
fn out_of_range_events_fail_the_call_without_reaching_the_plugin() {
    let (mut instance, log) = instance_of(recorder());
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    block.push_event(midi_at(8));
    let error = block.process(&mut instance, 8).unwrap_err();
    assert_eq!(error, BlockError::EventOutOfRange { frames_count: 8 });
    assert!(log.lock().unwrap().steady_times.is_empty());
    // The failed call still consumed its staged events.
    assert!(!block.has_pending_events());
    block.process(&mut instance, 8).unwrap();
    assert_eq!(log.lock().unwrap().steady_times, [0]);
}

#[test]
fn advances_the_steady_clock_per_successful_call() {
    let (mut instance, log) = instance_of(recorder());
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    assert_eq!(block.steady_time(), 0);
    block.process(&mut instance, 8).unwrap();
    block.process(&mut instance, 4).unwrap();
    assert_eq!(block.steady_time(), 12);
    let log = log.lock().unwrap();
    assert_eq!(log.steady_times, [0, 8]);
    assert_eq!(log.frame_counts, [8, 4]);
}

#[test]
fn a_failed_call_does_not_advance_the_clock() {
    let (mut instance, _log) = instance_of(Recorder {
        status: Err(ProcessError),
        ..recorder()
    });
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    let error = block.process(&mut instance, 8).unwrap_err();
    assert_eq!(error, BlockError::Fault(ProcessFault::Plugin(ProcessError)));
    assert_eq!(block.steady_time(), 0);
}

#[test]
fn input_masks_ride_along_and_output_masks_come_back() {
    let reported = ConstantMask::NONE.with_constant(1);
    let (mut instance, log) = instance_of(Recorder {
        output_mask: reported,
        ..recorder()
    });
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    let hint = ConstantMask::NONE.with_constant(0);
    block.set_input_constant_mask(0, hint);
    assert_eq!(block.output_constant_mask(0), ConstantMask::NONE);
    block.process(&mut instance, 8).unwrap();
    assert_eq!(log.lock().unwrap().input_masks, [hint]);
    assert_eq!(block.output_constant_mask(0), reported);
}

#[test]
fn inactive_instances_are_refused_through_the_block() {
    let (mut instance, log) = instance_of(recorder());
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    let error = block.process(&mut instance, 8).unwrap_err();
    assert_eq!(
        error,
        BlockError::Fault(ProcessFault::Inactive(Lifecycle::Created))
    );
    assert!(log.lock().unwrap().steady_times.is_empty());
}

#[test]
#[should_panic(expected = "cannot stage")]
fn calls_longer_than_the_block_panic() {
    let (mut instance, _log) = instance_of(recorder());
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 16).unwrap();
    let _ = block.process(&mut instance, 17);
}

#[test]
fn plugin_written_samples_are_readable() {
    let (mut instance, _log) = instance_of(Recorder {
        fill: Some(0.25),
        ..recorder()
    });
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 8).unwrap();
    block.process(&mut instance, 8).unwrap();
    assert_eq!(block.output(0).channel(0), [0.25; 8]);
    assert_eq!(block.output(0).channel(1), [0.25; 8]);
}

#[test]
fn emitted_events_are_readable_after_the_call() {
    let (mut instance, _log) = instance_of(Recorder {
        emit: vec![midi_at(0), midi_at(2)],
        ..recorder()
    });
    instance.activate(48_000.0).unwrap();
    let mut block = ProcessBlock::for_instance(&instance, 8).unwrap();
    block.process(&mut instance, 4).unwrap();
    assert_eq!(block.output_events(), [midi_at(0), midi_at(2)]);
    block.process(&mut instance, 4).unwrap();
    assert_eq!(block.output_events(), [midi_at(0), midi_at(2)]);
}
