//! The state machine between a component and the protocol.

use baton_protocol::descriptor::DescriptorRef;
use baton_protocol::extension::{Capability, Extensions};
use baton_protocol::process::{Process, ProcessError, ProcessStatus};
use baton_protocol::{ActivationError, Plugin};

use crate::{Component, ProcessingEnvironment, Processor};


// Invariant: `Active` holds exactly while a processor exists, so dropping
// the stage is always a correct deactivation.
enum Stage<P> {
    Idle,
    Active { processor: P },
}

/// Wraps a [`Component`] as a protocol [`Plugin`].
///
/// The shell owns the lifecycle: it creates a processor from the
/// component at activation, routes process calls to it while active, and
/// drops it at deactivation. Dropping the shell while active drops the
/// processor too, which is the implicit deactivation the protocol
/// requires of destruction.
///
/// Calls that violate the lifecycle (process or deactivate while
/// inactive, activate while active) panic in debug builds and are
/// refused in release builds.
pub struct Shell<C: Component> {
    descriptor: DescriptorRef<'static>,
    component: C,
    extensions: Extensions,
    stage: Stage<C::Processor>,
}

impl<C: Component> Shell<C> {
    /// A deactivated instance of `component` advertised by `descriptor`.
    #[must_use]
    pub fn new(descriptor: DescriptorRef<'static>, component: C) -> Self {
        let extensions = component.extensions();
        Self {
            descriptor,
            component,
            extensions,
            stage: Stage::Idle,
        }
    }
}

impl<C: Component> Plugin for Shell<C> {
    fn descriptor(&self) -> DescriptorRef<'_> {
        self.descriptor
    }

    fn activate(&mut self, sample_rate: f64) -> Result<(), ActivationError> {
        if matches!(self.stage, Stage::Active { .. }) {
            debug_assert!(false, "activate called on an active plug-in");
            return Err(ActivationError);
        }
        let processor = self
            .component
            .create_processor(&ProcessingEnvironment { sample_rate })?;
        self.stage = Stage::Active { processor };
        Ok(())
    }

    fn deactivate(&mut self) {
        debug_assert!(
            matches!(self.stage, Stage::Active { .. }),
            "deactivate called on an inactive plug-in"
        );
        self.stage = Stage::Idle;
    }

    fn process(&mut self, process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError> {
        let Stage::Active { processor } = &mut self.stage else {
            debug_assert!(false, "process called on an inactive plug-in");
            return Err(ProcessError);
        };
        processor.process(process)
    }

    fn extension(&self, id: &str) -> Option<Capability<'_>> {
        self.extensions.get(id)
    }
}
