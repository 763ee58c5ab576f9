//! Driving one plug-in instance through its lifecycle.

use baton_protocol::descriptor::DescriptorRef;
use baton_protocol::extension::Capability;
use baton_protocol::process::{Process, ProcessError, ProcessStatus};
use baton_protocol::{ActivationError, Plugin};


// Pins each thread role to its first caller. Debug builds only; the
// release form carries no state and compiles to nothing.
#[cfg(debug_assertions)]
#[derive(Default)]
struct ThreadRoles {
    main: std::sync::OnceLock<std::thread::ThreadId>,
    audio: std::sync::OnceLock<std::thread::ThreadId>,
}

#[cfg(debug_assertions)]
impl ThreadRoles {
    fn check_main(&self) {
        let current = std::thread::current().id();
        assert_eq!(
            *self.main.get_or_init(|| current),
            current,
            "main-thread operations must stay on the thread that first used them"
        );
    }

    fn check_audio(&self) {
        let current = std::thread::current().id();
        assert_eq!(
            *self.audio.get_or_init(|| current),
            current,
            "process calls must stay on the thread that first made them"
        );
    }
}

#[cfg(not(debug_assertions))]
#[derive(Default)]
struct ThreadRoles;

#[cfg(not(debug_assertions))]
impl ThreadRoles {
    fn check_main(&self) {}

    fn check_audio(&self) {}
}

/// Where an [`Instance`] stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created and never yet activated.
    Created,

    /// Activated and able to process.
    Active,

    /// Deactivated after having been active.
    Deactivated,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Lifecycle::Created => "created",
            Lifecycle::Active => "active",
            Lifecycle::Deactivated => "deactivated",
        })
    }
}

/// The reason an [`Instance`] could not be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActivateError {
    /// The instance is already active.
    #[error("the plug-in is already active")]
    AlreadyActive,

    /// The plug-in declined the activation.
    #[error(transparent)]
    Failed(#[from] ActivationError),
}

/// The reason a process call was refused or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProcessFault {
    /// The instance is not active; the plug-in was not invoked.
    #[error("process requires an active plug-in, but this one is {0}")]
    Inactive(Lifecycle),

    /// The call's steady time precedes the previous successful call's;
    /// the plug-in was not invoked.
    #[error("steady time ran backwards between calls, from {previous} to {current}")]
    SteadyTimeRegression {
        /// The steady time of the last successful call.
        previous: i64,

        /// The steady time of the rejected call.
        current: i64,
    },

    /// The plug-in reported that the call produced nothing usable.
    #[error(transparent)]
    Plugin(#[from] ProcessError),
}

/// One plug-in instance with its host-side bookkeeping.
///
/// The instance keeps the lifecycle, the steady-clock watermark and the
/// sleep flag next to the plug-in, and refuses calls the contract
/// forbids before they reach it. Created by
/// [`Module::create`](crate::Module::create); dropping an active
/// instance deactivates it first.
///
/// Lifecycle operations belong to one thread and process calls to one
/// thread. Debug builds pin each role to its first caller and panic when
/// a later call strays; capability queries are free of both roles.
pub struct Instance {
    plugin: Box<dyn Plugin>,
    lifecycle: Lifecycle,
    last_steady_time: Option<i64>,
    asleep: bool,
    roles: ThreadRoles,
}

impl Instance {
    pub(crate) fn new(plugin: Box<dyn Plugin>) -> Self {
        Self {
            plugin,
            lifecycle: Lifecycle::Created,
            last_steady_time: None,
            asleep: false,
            roles: ThreadRoles::default(),
        }
    }

    /// The descriptor of the class this instance was created from.
    #[must_use]
    pub fn descriptor(&self) -> DescriptorRef<'_> {
        self.plugin.descriptor()
    }

    /// Where the instance stands in its lifecycle.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the last successful call asked the host to stop calling.
    #[must_use]
    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Whether the next process call is worth making.
    ///
    /// An awake instance always wants the call; a sleeping one only when
    /// events are pending for it.
    #[must_use]
    pub fn wants_process(&self, events_pending: bool) -> bool {
        !self.asleep || events_pending
    }

    /// Look up the extension the plug-in registered under `id`.
    ///
    /// Callable from any thread, in any lifecycle state, with the same
    /// answer.
    #[must_use]
    pub fn extension(&self, id: &str) -> Option<Capability<'_>> {
        self.plugin.extension(id)
    }

    /// Prepare the plug-in to process audio at `sample_rate`.
    ///
    /// # Errors
    ///
    /// [`ActivateError::AlreadyActive`] if the instance is already
    /// active, and [`ActivateError::Failed`] if the plug-in declines.
    /// After a failure the instance stays in its previous state and a
    /// later attempt may succeed.
    pub fn activate(&mut self, sample_rate: f64) -> Result<(), ActivateError> {
        self.roles.check_main();
        if self.lifecycle == Lifecycle::Active {
            return Err(ActivateError::AlreadyActive);
        }
        self.plugin.activate(sample_rate)?;
        self.lifecycle = Lifecycle::Active;
        self.last_steady_time = None;
        self.asleep = false;
        Ok(())
    }

    /// Release everything activation acquired.
    ///
    /// Only valid on an active instance; debug builds panic on the
    /// misuse, release builds ignore the call.
    pub fn deactivate(&mut self) {
        self.roles.check_main();
        if self.lifecycle != Lifecycle::Active {
            debug_assert!(false, "deactivate called on an inactive plug-in");
            return;
        }
        self.plugin.deactivate();
        self.lifecycle = Lifecycle::Deactivated;
        self.asleep = false;
    }

    /// Drive one process call, with the contract checked on the way in.
    ///
    /// The call's steady time must not precede the previous successful
    /// call's; standing still is allowed. On success the watermark
    /// advances and the sleep flag follows the returned status. A failed
    /// call leaves both untouched.
    ///
    /// # Errors
    ///
    /// [`ProcessFault::Inactive`] and
    /// [`ProcessFault::SteadyTimeRegression`] are refusals the plug-in
    /// never sees; [`ProcessFault::Plugin`] carries the plug-in's own
    /// failure through.
    pub fn process(
        &mut self,
        process: &mut Process<'_, '_>,
    ) -> Result<ProcessStatus, ProcessFault> {
        self.roles.check_audio();
        if self.lifecycle != Lifecycle::Active {
            return Err(ProcessFault::Inactive(self.lifecycle));
        }
        let current = process.steady_time();
        if let Some(previous) = self.last_steady_time
            && current < previous
        {
            return Err(ProcessFault::SteadyTimeRegression { previous, current });
        }
        let status = self.plugin.process(process)?;
        self.last_steady_time = Some(current);
        self.asleep = matches!(status, ProcessStatus::Sleep);
        Ok(status)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.plugin.descriptor().id)
            .field("lifecycle", &self.lifecycle)
            .field("asleep", &self.asleep)
            .finish_non_exhaustive()
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Active {
            self.plugin.deactivate();
        }
    }
}
