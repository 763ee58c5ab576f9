#![doc = include_str!("../README.md")]

use std::sync::Arc;

use baton_protocol::descriptor::DescriptorRef;
use baton_protocol::extension::Extensions;
use baton_protocol::process::{Process, ProcessError, ProcessStatus};
use baton_protocol::{ActivationError, Host, Plugin};

mod entry;
mod shell;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use entry::EntryPoint;
pub use shell::Shell;

/// The processing environment a processor will run in.
///
/// Passed to [`Component::create_processor`] at every activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingEnvironment {
    /// The sample rate of the audio, in frames per second.
    pub sample_rate: f64,
}

/// The main plug-in abstraction of this crate.
///
/// A component is the part of a plug-in that exists for the instance's
/// whole life: it publishes the instance's capabilities and creates a
/// fresh [`Processor`] for each activation. It holds no audio state of
/// its own; everything the audio thread touches lives in the processor.
///
/// A plug-in has exactly one component representing the whole plug-in.
/// Compose the parts of a plug-in with your own abstractions underneath
/// it.
pub trait Component: Send {
    /// The processor this component creates at activation.
    type Processor: Processor;

    /// The capabilities this component provides.
    ///
    /// Called once at instance creation; the returned set answers every
    /// capability query for the instance's whole life, in any lifecycle
    /// state.
    fn extensions(&self) -> Extensions {
        Extensions::new()
    }

    /// Create the processor that will actually process audio.
    ///
    /// Called at every activation. Allocate everything the audio thread
    /// needs here; the process call itself must not. A processor is never
    /// reused across activations, so a freshly created one is the state
    /// reset the protocol requires.
    ///
    /// # Errors
    ///
    /// [`ActivationError`] if no processor can be built for
    /// `environment`. The component must stay usable; a later attempt
    /// with a different environment may succeed.
    fn create_processor(
        &self,
        environment: &ProcessingEnvironment,
    ) -> Result<Self::Processor, ActivationError>;
}

/// The audio-thread half of a plug-in.
///
/// Created by a [`Component`] at activation and dropped at deactivation.
pub trait Processor: Send {
    /// Process one buffer's worth of audio and events.
    ///
    /// Must never block, allocate, or take a lock shared with non-audio
    /// threads.
    ///
    /// # Errors
    ///
    /// [`ProcessError`] if this call produced nothing usable. The
    /// processor must remain able to handle the next call.
    fn process(&mut self, process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError>;
}

/// A component factory that can create a component.
///
/// The factory sees the host at creation time, so it can return a
/// component specialized to the host. Closures taking an
/// `Arc<dyn Host>` implement this automatically.
pub trait ComponentFactory: Send + Sync {
    /// The type of component this factory creates.
    type Component;

    /// Create a component for an instance owned by `host`.
    fn create(&self, host: Arc<dyn Host>) -> Self::Component;
}

impl<C, F: Fn(Arc<dyn Host>) -> C + Send + Sync> ComponentFactory for F {
    type Component = C;

    fn create(&self, host: Arc<dyn Host>) -> C {
        (self)(host)
    }
}

/// One plug-in class: a descriptor and the factory for its component.
pub struct PluginClass<CF> {
    /// The descriptor hosts browse before creating anything.
    pub descriptor: DescriptorRef<'static>,

    /// The actual factory.
    pub factory: CF,
}

/// An element of an [`EntryPoint`] class table.
///
/// [`PluginClass`] implements this for any component factory by wrapping
/// the component in a [`Shell`]. Implement it directly only to replace
/// the shell itself.
pub trait PluginFactory: Send + Sync {
    /// The descriptor of this class.
    fn descriptor(&self) -> DescriptorRef<'static>;

    /// A new instance for `host`, born deactivated.
    fn create(&self, host: Arc<dyn Host>) -> Box<dyn Plugin>;
}

impl<CF: ComponentFactory<Component: Component<Processor: 'static> + 'static> + 'static>
    PluginFactory for PluginClass<CF>
{
    fn descriptor(&self) -> DescriptorRef<'static> {
        self.descriptor
    }

    fn create(&self, host: Arc<dyn Host>) -> Box<dyn Plugin> {
        Box::new(Shell::new(self.descriptor, self.factory.create(host)))
    }
}

/// Create a Baton plug-in module entry point.
///
/// This must be invoked exactly once in each plug-in binary. It exports
/// the module's discovery surface under the symbol `BATON_ENTRY`, which
/// is where hosts look for it.
///
/// A module can contain multiple classes, so this takes a table of
/// [`PluginClass`] instances.
///
/// To build a loadable module, add this to your `Cargo.toml`:
///
/// ```toml
/// [lib]
/// crate-type = ["cdylib"]
/// ```
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use baton_plugin::{Component, PluginClass, ProcessingEnvironment, Processor};
/// use baton_protocol::descriptor::{DescriptorRef, Features};
/// use baton_protocol::process::{Process, ProcessError, ProcessStatus};
/// use baton_protocol::{ActivationError, Host};
///
/// #[derive(Clone, Debug, Default)]
/// pub struct Gain {}
///
/// pub struct GainProcessor {}
///
/// impl Processor for GainProcessor {
///     fn process(
///         &mut self,
///         process: &mut Process<'_, '_>,
///     ) -> Result<ProcessStatus, ProcessError> {
///         let frames_count = process.frames_count();
///         let (inputs, outputs) = process.audio();
///         for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
///             let (Some(from), Some(to)) = (input.data.as_f32(), output.data.as_f32_mut())
///             else {
///                 return Err(ProcessError);
///             };
///             for (from, to) in from.channels().zip(to.channels_mut()) {
///                 for (from, to) in from[..frames_count].iter().zip(&mut to[..frames_count]) {
///                     *to = 0.5 * from;
///                 }
///             }
///         }
///         Ok(ProcessStatus::Continue)
///     }
/// }
///
/// impl Component for Gain {
///     type Processor = GainProcessor;
///
///     fn create_processor(
///         &self,
///         _environment: &ProcessingEnvironment,
///     ) -> Result<GainProcessor, ActivationError> {
///         Ok(GainProcessor {})
///     }
/// }
///
/// const DESCRIPTOR: DescriptorRef<'static> = DescriptorRef {
///     protocol_version: baton_protocol::VERSION,
///     id: "com.example.gain",
///     name: "Gain",
///     vendor: "My vendor name",
///     url: "https://www.example.com",
///     manual_url: "https://www.example.com/manual",
///     support_url: "https://www.example.com/support",
///     version: "1.0.0",
///     description: "Halves whatever comes in",
///     features: Features::AUDIO_EFFECT,
/// };
///
/// baton_plugin::entry!(&const {
///     [&PluginClass {
///         descriptor: DESCRIPTOR,
///         factory: |_: Arc<dyn Host>| -> Gain { Default::default() },
///     }]
/// });
/// ```
#[macro_export]
macro_rules! entry {
    ($CLASSES:expr) => {
        /// The discovery surface of this plug-in module.
        #[unsafe(no_mangle)]
        pub static BATON_ENTRY: baton_plugin::EntryPoint = baton_plugin::EntryPoint::new($CLASSES);
    };
}
