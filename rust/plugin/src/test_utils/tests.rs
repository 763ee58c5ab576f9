use baton_protocol::ProtocolVersion;
use baton_protocol::audio::{
    AudioInput, AudioOutput, BufferData, ConstantMask, PortId, SampleData, SampleDataMut,
};
use baton_protocol::events::OutputEvents;
use baton_protocol::ext::audio_ports::{AUDIO_PORTS, AudioPorts, PortDirection};
use baton_protocol::process::{Process, ProcessError, ProcessStatus};

use super::{Broken, Passthrough, TestHost};
use crate::{Component, ProcessingEnvironment, Processor};

fn passthrough_processor() -> super::PassthroughProcessor {
    Passthrough
        .create_processor(&ProcessingEnvironment {
            sample_rate: 48000.0,
        })
        .unwrap()
}

fn input_view(data: &BufferData<f32>, constant_mask: ConstantMask) -> AudioInput<'_> {
    AudioInput {
        data: SampleData::F32(data),
        latency: 0,
        constant_mask,
        port_id: PortId(0),
    }
}

fn output_view(data: &mut BufferData<f32>) -> AudioOutput<'_> {
    AudioOutput {
        data: SampleDataMut::F32(data),
        latency: 0,
        constant_mask: ConstantMask::NONE,
        port_id: PortId(0),
    }
}

#[test]
fn copies_f32_input_bit_exactly() {
    let mut processor = passthrough_processor();
    let input_data =
        BufferData::new_stereo((0u8..8).map(f32::from), (0u8..8).map(|i| -f32::from(i)));
    let mut output_data = BufferData::<f32>::new(2, 8);
    let inputs = [input_view(&input_data, ConstantMask::NONE)];
    let mut outputs = [output_view(&mut output_data)];
    let mut out_events = OutputEvents::new(8);
    let mut process =
        Process::new(0, 8, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
    assert_eq!(processor.process(&mut process), Ok(ProcessStatus::Continue));
    drop(process);
    drop(outputs);
    assert_eq!(output_data, input_data);
}

#[test]
fn copies_f64_input_bit_exactly() {
    let mut processor = passthrough_processor();
    let input_data = BufferData::new_mono(vec![0.5f64, -0.5, 0.25, -0.25]);
    let mut output_data = BufferData::<f64>::new(1, 4);
    let inputs = [AudioInput {
        data: SampleData::F64(&input_data),
        latency: 0,
        constant_mask: ConstantMask::NONE,
        port_id: PortId(0),
    }];
    let mut outputs = [AudioOutput {
        data: SampleDataMut::F64(&mut output_data),
        latency: 0,
        constant_mask: ConstantMask::NONE,
        port_id: PortId(0),
    }];
    let mut out_events = OutputEvents::new(4);
    let mut process =
        Process::new(0, 4, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
    assert_eq!(processor.process(&mut process), Ok(ProcessStatus::Continue));
    drop(process);
    drop(outputs);
    assert_eq!(output_data, input_data);
}

#[test]
fn propagates_constant_masks() {
    let mut processor = passthrough_processor();
    let mask = ConstantMask::NONE.with_constant(1);
    let input_data = BufferData::<f32>::new(2, 4);
    let mut output_data = BufferData::<f32>::new(2, 4);
    let inputs = [input_view(&input_data, mask)];
    let mut outputs = [output_view(&mut output_data)];
    let mut out_events = OutputEvents::new(4);
    let mut process =
        Process::new(0, 4, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
    processor.process(&mut process).unwrap();
    drop(process);
    assert_eq!(outputs[0].constant_mask, mask);
}

#[test]
fn copies_only_the_frame_range_of_oversized_buffers() {
    let mut processor = passthrough_processor();
    let input_data = BufferData::new_stereo([1.0f32; 8], [2.0; 8]);
    let mut output_data = BufferData::<f32>::new(2, 8);
    for channel in output_data.channels_mut() {
        channel.fill(9.0);
    }
    let inputs = [input_view(&input_data, ConstantMask::NONE)];
    let mut outputs = [output_view(&mut output_data)];
    let mut out_events = OutputEvents::new(4);
    let mut process =
        Process::new(0, 4, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
    processor.process(&mut process).unwrap();
    drop(process);
    drop(outputs);
    assert_eq!(output_data.channel(0), &[1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0]);
    assert_eq!(output_data.channel(1), &[2.0, 2.0, 2.0, 2.0, 9.0, 9.0, 9.0, 9.0]);
}

#[test]
fn mismatched_precision_fails_the_call() {
    let mut processor = passthrough_processor();
    let input_data = BufferData::<f32>::new(2, 4);
    let mut output_data = BufferData::<f64>::new(2, 4);
    let inputs = [input_view(&input_data, ConstantMask::NONE)];
    let mut outputs = [AudioOutput {
        data: SampleDataMut::F64(&mut output_data),
        latency: 0,
        constant_mask: ConstantMask::NONE,
        port_id: PortId(0),
    }];
    let mut out_events = OutputEvents::new(4);
    let mut process =
        Process::new(0, 4, false, &inputs, &mut outputs, &[], &mut out_events).unwrap();
    assert_eq!(processor.process(&mut process), Err(ProcessError));
}

#[test]
fn publishes_the_default_stereo_layout() {
    let extensions = Passthrough.extensions();
    let capability = extensions.get(AUDIO_PORTS.as_str()).unwrap();
    let ports = capability.cast::<dyn AudioPorts>().unwrap();
    assert_eq!(ports.count(PortDirection::Input), 1);
    assert_eq!(ports.count(PortDirection::Output), 1);
    let info = ports.get(PortDirection::Output, 0).unwrap();
    assert_eq!(info.num_channels, 2);
    assert!(ports.get(PortDirection::Input, 1).is_none());
}

#[test]
fn broken_component_declines_activation() {
    assert!(
        Broken
            .create_processor(&ProcessingEnvironment {
                sample_rate: 48000.0,
            })
            .is_err()
    );
}

#[test]
fn test_host_reports_the_requested_version() {
    let host = TestHost::with_version(ProtocolVersion::new(9));
    assert_eq!(host.info().protocol_version, ProtocolVersion::new(9));
    assert!(host.extension("anything/1").is_none());
    assert_eq!(
        TestHost::new().info().protocol_version,
        baton_protocol::VERSION
    );
}
