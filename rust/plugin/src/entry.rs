//! The discovery surface a module exports.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use baton_protocol::descriptor::Descriptor;
use baton_protocol::{Entry, Host, HostInfo, Plugin, VERSION};
use itertools::Itertools;

use crate::PluginFactory;


/// A module entry point over a table of classes.
///
/// The entry point is a one-shot barrier around the class table: until
/// [`Entry::init`] runs it answers as an empty module, and after
/// [`Entry::deinit`] it does so again. Repeated `init` calls are no-ops,
/// so racing loaders cannot run setup twice. The stored module path is
/// the only module-wide state.
///
/// Constructible in a `const` context, so a module can expose one as a
/// plain `static`; the [`entry!`](crate::entry) macro does exactly that
/// under the exported symbol name.
pub struct EntryPoint {
    classes: &'static [&'static dyn PluginFactory],
    state: Mutex<Option<PathBuf>>,
}

impl EntryPoint {
    /// An uninitialized entry point exposing `classes`.
    #[must_use]
    pub const fn new(classes: &'static [&'static dyn PluginFactory]) -> Self {
        Self {
            classes,
            state: Mutex::new(None),
        }
    }

    // A poisoned lock means another thread panicked mid-init. The state is
    // a plain Option, valid regardless, so recover it.
    fn state(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn initialized(&self) -> bool {
        self.state().is_some()
    }
}

impl Entry for EntryPoint {
    fn init(&self, plugin_path: &Path) {
        let mut state = self.state();
        if state.is_some() {
            return;
        }
        debug_assert_eq!(
            self.classes
                .iter()
                .map(|class| class.descriptor().id)
                .duplicates()
                .count(),
            0,
            "descriptor ids within an entry point must be unique"
        );
        *state = Some(plugin_path.to_owned());
    }

    fn deinit(&self) {
        *self.state() = None;
    }

    fn plugin_count(&self) -> usize {
        if !self.initialized() {
            return 0;
        }
        self.classes.len()
    }

    fn plugin_descriptor(&self, _host: &HostInfo, index: usize) -> Option<Descriptor> {
        if !self.initialized() {
            return None;
        }
        self.classes.get(index).map(|class| class.descriptor().into())
    }

    fn create_plugin(&self, host: Arc<dyn Host>, id: &str) -> Option<Box<dyn Plugin>> {
        if !self.initialized() {
            return None;
        }
        if !host.info().protocol_version.is_compatible_with(VERSION) {
            return None;
        }
        self.classes
            .iter()
            .find(|class| class.descriptor().id == id)
            .map(|class| class.create(host))
    }
}
