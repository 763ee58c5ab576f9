//! Fixtures for exercising hosts and wrappers.
//!
//! Nothing here is part of the protocol. The components are deliberately
//! small and fully predictable, so a host test can assert exact output.
//! Enabled with the `test-utils` feature.

use std::sync::Arc;

use baton_protocol::audio::{SampleData, SampleDataMut};
use baton_protocol::descriptor::{DescriptorRef, Features};
use baton_protocol::ext::audio_ports::{
    AUDIO_PORTS, AudioPorts, PortDirection, PortInfo, default_port,
};
use baton_protocol::extension::{Capability, Extensions};
use baton_protocol::process::{Process, ProcessError, ProcessStatus};
use baton_protocol::{ActivationError, Host, HostInfo, ProtocolVersion, VERSION};

use crate::{Component, PluginClass, PluginFactory, ProcessingEnvironment, Processor};

#[cfg(test)]
mod tests;

/// Identifier of the passthrough class.
pub const PASSTHROUGH_ID: &str = "test.passthrough";

/// Identifier of the class that refuses every activation.
pub const BROKEN_ID: &str = "test.broken";

/// Descriptor of the passthrough class.
pub const PASSTHROUGH_DESCRIPTOR: DescriptorRef<'static> = DescriptorRef {
    protocol_version: VERSION,
    id: PASSTHROUGH_ID,
    name: "Passthrough",
    vendor: "Baton Project",
    url: "https://github.com/baton-audio/baton",
    manual_url: "https://github.com/baton-audio/baton",
    support_url: "https://github.com/baton-audio/baton/issues",
    version: "0.2.0",
    description: "Copies every input port to the matching output port",
    features: Features::AUDIO_EFFECT,
};

/// Descriptor of the class that refuses every activation.
pub const BROKEN_DESCRIPTOR: DescriptorRef<'static> = DescriptorRef {
    protocol_version: VERSION,
    id: BROKEN_ID,
    name: "Broken",
    vendor: "Baton Project",
    url: "https://github.com/baton-audio/baton",
    manual_url: "https://github.com/baton-audio/baton",
    support_url: "https://github.com/baton-audio/baton/issues",
    version: "0.2.0",
    description: "Declines every activation, for failure-path tests",
    features: Features::AUDIO_EFFECT,
};

/// A component that copies every input port to the matching output port.
///
/// Ports pair up by table position, samples copy only when both sides
/// use the same precision, and input constant masks travel to the
/// output unchanged. Output is bit-identical to input.
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

struct PassthroughPorts;

impl AudioPorts for PassthroughPorts {
    fn count(&self, _direction: PortDirection) -> usize {
        1
    }

    fn get(&self, _direction: PortDirection, index: usize) -> Option<PortInfo> {
        (index == 0).then(default_port)
    }
}

/// Processor of [`Passthrough`].
#[derive(Debug)]
pub struct PassthroughProcessor;

impl Processor for PassthroughProcessor {
    fn process(&mut self, process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError> {
        let frames_count = process.frames_count();
        let (inputs, outputs) = process.audio();
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            match (input.data, &mut output.data) {
                (SampleData::F32(from), SampleDataMut::F32(to)) => {
                    for (from, to) in from.channels().zip(to.channels_mut()) {
                        to[..frames_count].copy_from_slice(&from[..frames_count]);
                    }
                }
                (SampleData::F64(from), SampleDataMut::F64(to)) => {
                    for (from, to) in from.channels().zip(to.channels_mut()) {
                        to[..frames_count].copy_from_slice(&from[..frames_count]);
                    }
                }
                _ => return Err(ProcessError),
            }
            output.constant_mask = input.constant_mask;
        }
        Ok(ProcessStatus::Continue)
    }
}

impl Component for Passthrough {
    type Processor = PassthroughProcessor;

    fn extensions(&self) -> Extensions {
        Extensions::new().with::<dyn AudioPorts>(AUDIO_PORTS, Box::new(PassthroughPorts))
    }

    fn create_processor(
        &self,
        _environment: &ProcessingEnvironment,
    ) -> Result<PassthroughProcessor, ActivationError> {
        Ok(PassthroughProcessor)
    }
}

/// A component that declines every activation.
#[derive(Debug, Clone, Default)]
pub struct Broken;

/// Processor of [`Broken`]; no value of it is ever created.
#[derive(Debug)]
pub struct BrokenProcessor;

impl Processor for BrokenProcessor {
    fn process(&mut self, _process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError> {
        unimplemented!("the broken component never activates")
    }
}

impl Component for Broken {
    type Processor = BrokenProcessor;

    fn create_processor(
        &self,
        _environment: &ProcessingEnvironment,
    ) -> Result<BrokenProcessor, ActivationError> {
        Err(ActivationError)
    }
}

fn create_passthrough(_host: Arc<dyn Host>) -> Passthrough {
    Passthrough
}

fn create_broken(_host: Arc<dyn Host>) -> Broken {
    Broken
}

static PASSTHROUGH_CLASS: PluginClass<fn(Arc<dyn Host>) -> Passthrough> = PluginClass {
    descriptor: PASSTHROUGH_DESCRIPTOR,
    factory: create_passthrough,
};

static BROKEN_CLASS: PluginClass<fn(Arc<dyn Host>) -> Broken> = PluginClass {
    descriptor: BROKEN_DESCRIPTOR,
    factory: create_broken,
};

/// A class table containing only the passthrough class.
///
/// Each test should wrap this in its own `EntryPoint`, so parallel tests
/// never share module state.
pub static PASSTHROUGH_CLASSES: [&dyn PluginFactory; 1] = [&PASSTHROUGH_CLASS];

/// A class table containing only the broken class.
pub static BROKEN_CLASSES: [&dyn PluginFactory; 1] = [&BROKEN_CLASS];

/// A class table containing every fixture class.
pub static TEST_CLASSES: [&dyn PluginFactory; 2] = [&PASSTHROUGH_CLASS, &BROKEN_CLASS];

/// A host record for exercising plug-ins without a real host.
#[derive(Debug)]
pub struct TestHost {
    info: HostInfo,
}

impl TestHost {
    /// A host speaking this crate's protocol revision.
    #[must_use]
    pub fn new() -> Arc<dyn Host> {
        Self::with_version(VERSION)
    }

    /// A host claiming `version` as its protocol revision.
    #[must_use]
    pub fn with_version(version: ProtocolVersion) -> Arc<dyn Host> {
        Arc::new(TestHost {
            info: HostInfo {
                protocol_version: version,
                name: "Baton Test Host".to_owned(),
                vendor: "Baton Project".to_owned(),
                url: "https://github.com/baton-audio/baton".to_owned(),
                version: "0.0.0".to_owned(),
            },
        })
    }
}

impl Host for TestHost {
    fn info(&self) -> &HostInfo {
        &self.info
    }

    fn extension(&self, _id: &str) -> Option<Capability<'_>> {
        None
    }
}
