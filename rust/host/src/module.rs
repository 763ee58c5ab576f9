//! Loading plug-in modules and creating instances from them.

use std::path::Path;
use std::sync::Arc;

use baton_protocol::descriptor::Descriptor;
use baton_protocol::{Entry, Host, ProtocolVersion};

use crate::instance::Instance;

#[cfg(test)]
mod tests;

/// The reason a [`Module`] could not create a plug-in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No descriptor in the module carries the requested id.
    #[error("the module lists no plug-in with id {id:?}")]
    NotFound {
        /// The requested plug-in id.
        id: String,
    },

    /// The descriptor carries a protocol version this host does not speak.
    #[error("plug-in {id:?} was built against protocol version {plugin}, this host speaks {host}")]
    IncompatibleVersion {
        /// The requested plug-in id.
        id: String,

        /// The version the plug-in was built against.
        plugin: ProtocolVersion,

        /// The version this host speaks.
        host: ProtocolVersion,
    },

    /// The entry point answered the creation request with nothing.
    #[error("the module declined to create plug-in {id:?}")]
    Rejected {
        /// The requested plug-in id.
        id: String,
    },
}

/// An opened plug-in module.
///
/// Opening a module initializes its [`Entry`] point; dropping the module
/// closes the entry again. Open each entry through at most one module at
/// a time, and drop every [`Instance`] created from a module before the
/// module itself.
pub struct Module {
    entry: &'static dyn Entry,
    host: Arc<dyn Host>,
}

impl Module {
    /// Open a module by initializing its entry point.
    ///
    /// `path` is the location of the binary the entry was loaded from;
    /// the entry may read resources stored next to it.
    #[must_use]
    pub fn open(entry: &'static dyn Entry, host: Arc<dyn Host>, path: &Path) -> Self {
        entry.init(path);
        log::debug!("opened plug-in module at {}", path.display());
        Self { entry, host }
    }

    /// The number of plug-in classes the module exposes.
    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.entry.plugin_count()
    }

    /// The descriptors of every class in the module, in index order.
    pub fn descriptors(&self) -> impl Iterator<Item = Descriptor> + '_ {
        (0..self.entry.plugin_count())
            .filter_map(|index| self.entry.plugin_descriptor(self.host.info(), index))
    }

    /// Create an instance of the class with the given id.
    ///
    /// The protocol version of the matching descriptor is checked against
    /// this host's version before the entry point runs, so an entry never
    /// sees a creation request it cannot serve.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] if no descriptor carries `id`,
    /// [`LoadError::IncompatibleVersion`] if the version check fails, and
    /// [`LoadError::Rejected`] if the entry point declines the request.
    pub fn create(&self, id: &str) -> Result<Instance, LoadError> {
        let descriptor = self
            .descriptors()
            .find(|descriptor| descriptor.id == id)
            .ok_or_else(|| LoadError::NotFound { id: id.to_owned() })?;
        let host_version = self.host.info().protocol_version;
        if !descriptor.protocol_version.is_compatible_with(host_version) {
            return Err(LoadError::IncompatibleVersion {
                id: id.to_owned(),
                plugin: descriptor.protocol_version,
                host: host_version,
            });
        }
        match self.entry.create_plugin(Arc::clone(&self.host), id) {
            Some(plugin) => Ok(Instance::new(plugin)),
            None => {
                log::warn!("entry point declined to create {id:?}");
                Err(LoadError::Rejected { id: id.to_owned() })
            }
        }
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        self.entry.deinit();
        log::debug!("closed plug-in module");
    }
}
