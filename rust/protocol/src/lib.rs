#![warn(
    nonstandard_style,
    rust_2018_idioms,
    future_incompatible,
    missing_docs,
    rustdoc::private_doc_tests,
    rustdoc::unescaped_backticks,
    clippy::pedantic,
    clippy::todo
)]
#![allow(
    clippy::type_complexity,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::default_trait_access,
    clippy::module_name_repetitions
)]
#![doc = include_str!("../README.md")]

use std::path::Path;
use std::sync::Arc;

pub mod audio;
pub mod descriptor;
pub mod events;
pub mod ext;
pub mod extension;
pub mod process;


use descriptor::{Descriptor, DescriptorRef};
use extension::Capability;
use process::{Process, ProcessError, ProcessStatus};

/// The protocol revision spoken by an implementation.
///
/// Every plug-in descriptor and every host record carries one of these. Two
/// sides interoperate only when their versions are [compatible]; a mismatch
/// is a legitimate reason for [`Entry::create_plugin`] to decline.
///
/// [compatible]: ProtocolVersion::is_compatible_with
///
/// # Examples
///
/// ```
/// # use baton_protocol::{ProtocolVersion, VERSION};
/// assert!(VERSION.is_compatible_with(VERSION));
/// assert!(!VERSION.is_compatible_with(ProtocolVersion::new(VERSION.get() + 1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion(u32);

/// The protocol revision implemented by this crate.
pub const VERSION: ProtocolVersion = ProtocolVersion::new(1);

impl ProtocolVersion {
    /// Create a version marker from its raw integer value.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// The raw integer value of this version marker.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether two implementations carrying these markers can interoperate.
    ///
    /// The version is a single integer, so compatibility is plain equality.
    #[must_use]
    pub const fn is_compatible_with(self, other: ProtocolVersion) -> bool {
        self.0 == other.0
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a host session.
///
/// One of these describes the host to every plug-in it creates. Name and
/// version are mandatory in spirit; empty strings are tolerated but give
/// plug-ins nothing to key host-specific behavior on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Protocol revision the host speaks.
    pub protocol_version: ProtocolVersion,

    /// Name of the host, e.g. `"Baton Reference Host"`.
    pub name: String,

    /// Vendor of the host.
    pub vendor: String,

    /// The vendor's URL.
    pub url: String,

    /// Version of the host, e.g. `"1.3.14"`.
    pub version: String,
}

/// The host side of the protocol.
///
/// One instance exists per host session and is shared, read-only, by every
/// plug-in instance created in that session (plug-ins receive an
/// `Arc<dyn Host>` at creation and may hold it for their whole life).
///
/// Both operations are callable from any thread at any time.
pub trait Host: Send + Sync {
    /// The host's identity record.
    fn info(&self) -> &HostInfo;

    /// Query an optional host capability by identifier.
    ///
    /// Unrecognized identifiers return `None`; this must never fail or
    /// crash. See [`extension`](crate::extension) for the registry
    /// mechanics.
    fn extension(&self, id: &str) -> Option<Capability<'_>>;
}

/// Activation was declined; the plug-in remains in its previous state.
///
/// The contract deliberately carries no failure reason across the boundary.
/// The host may retry with different parameters (e.g. another sample rate)
/// or abandon the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("activation failed and the plug-in remains in its previous state")]
pub struct ActivationError;

/// One plug-in instance.
///
/// An instance moves through a fixed lifecycle: it is born deactivated
/// (after [`Entry::create_plugin`]), becomes active through
/// [`activate`](Plugin::activate), processes audio while active, returns to
/// the deactivated state through [`deactivate`](Plugin::deactivate), and is
/// destroyed by dropping it. Dropping an active instance must deactivate it
/// implicitly.
///
/// Thread affinity is part of the contract, not the type system: `activate`
/// and `deactivate` belong to the main thread, `process` to the audio
/// thread, and `extension` may be called from any thread in any state.
/// Hosts that need stronger guarantees layer them on top (the reference
/// host adds a debug-build affinity guard).
pub trait Plugin: Send {
    /// The descriptor this instance was created from.
    ///
    /// Stable for the instance's whole life.
    fn descriptor(&self) -> DescriptorRef<'_>;

    /// Prepare for processing at the given sample rate. Main-thread only.
    ///
    /// Legal while deactivated. On success the instance is active; on
    /// failure it stays exactly as it was and a later attempt may still
    /// succeed. Re-activation after [`deactivate`](Plugin::deactivate) must
    /// reset all sample-rate-dependent state, as if the instance had been
    /// activated once, fresh.
    ///
    /// # Errors
    ///
    /// [`ActivationError`] if the plug-in cannot prepare (the instance is
    /// unchanged).
    fn activate(&mut self, sample_rate: f64) -> Result<(), ActivationError>;

    /// Release everything acquired by [`activate`](Plugin::activate).
    /// Main-thread only.
    ///
    /// Legal while active, even if no [`process`](Plugin::process) call
    /// ever happened. Afterwards the instance is equivalent to a freshly
    /// created one.
    fn deactivate(&mut self);

    /// Process one buffer's worth of audio and events. Audio-thread only.
    ///
    /// Legal only while active. Must never block, allocate, or take a lock
    /// shared with non-audio threads; that requirement is a hard invariant
    /// of the contract even though no type system enforces it.
    ///
    /// # Errors
    ///
    /// [`ProcessError`] if this call failed; the host must discard the
    /// call's output and may keep calling on subsequent buffers.
    fn process(&mut self, process: &mut Process<'_, '_>) -> Result<ProcessStatus, ProcessError>;

    /// Query an optional plug-in capability by identifier.
    ///
    /// Callable from any thread, in any state, including before the first
    /// activation. Unrecognized identifiers return `None`; this must never
    /// fail or crash.
    fn extension(&self, id: &str) -> Option<Capability<'_>>;
}

/// The discovery surface of a plug-in module.
///
/// A module exposes exactly one of these (see the `entry!` macro in
/// `baton_plugin` for the exported-symbol shape). Every operation must be
/// safe to call concurrently from multiple threads; none may assume
/// exclusive access.
pub trait Entry: Send + Sync {
    /// One-time module setup, given the module's install location.
    ///
    /// Must be called before any other operation and exactly once per
    /// load; implementations treat repeated calls as a no-op rather than
    /// re-running setup.
    fn init(&self, plugin_path: &Path);

    /// Release all module-wide state.
    ///
    /// After this returns, no other operation may be called until
    /// [`init`](Entry::init) runs again.
    fn deinit(&self);

    /// Number of distinct plug-in identifiers this module exposes.
    ///
    /// Stable for the process lifetime once [`init`](Entry::init) has run.
    fn plugin_count(&self) -> usize;

    /// Read-only descriptor for `0 <= index < plugin_count()`.
    ///
    /// Out-of-range indexes return `None`. The host identity is provided
    /// so a module may specialize what it advertises.
    fn plugin_descriptor(&self, host: &HostInfo, index: usize) -> Option<Descriptor>;

    /// Instantiate the plug-in whose descriptor identifier matches `id`
    /// exactly.
    ///
    /// Returns `None` if no identifier matches or the host's declared
    /// protocol version is incompatible. Creation succeeds fully or not at
    /// all; no partial instance is ever exposed.
    fn create_plugin(&self, host: Arc<dyn Host>, id: &str) -> Option<Box<dyn Plugin>>;
}
