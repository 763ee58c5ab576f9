//! Host identity and host-side capabilities.

use std::sync::Arc;

use baton_protocol::extension::{Capability, ExtensionId, Extensions};
use baton_protocol::{Host, HostInfo, VERSION};


/// The host half of the contract.
///
/// A session carries the identity plug-ins see through [`HostInfo`] and
/// the extension objects they may query back. Build one per host process,
/// convert it with [`into_host`](Session::into_host) and hand the same
/// handle to every module you open.
///
/// # Examples
///
/// ```
/// # use baton_host::Session;
/// # use baton_protocol::Host;
/// let host = Session::new("Example Host", "Example Audio", "https://example.test", "1.0.0")
///     .into_host();
/// assert_eq!(host.info().name, "Example Host");
/// assert!(host.extension("example.unknown/1").is_none());
/// ```
#[derive(Debug)]
pub struct Session {
    info: HostInfo,
    extensions: Extensions,
}

impl Session {
    /// A session describing this host, speaking the current protocol version.
    #[must_use]
    pub fn new(name: &str, vendor: &str, url: &str, version: &str) -> Self {
        Self {
            info: HostInfo {
                protocol_version: VERSION,
                name: name.to_owned(),
                vendor: vendor.to_owned(),
                url: url.to_owned(),
                version: version.to_owned(),
            },
            extensions: Extensions::new(),
        }
    }

    /// Add a host-side extension object under `id`.
    ///
    /// Register under the trait-object type plug-ins will cast to, as in
    /// `with_extension::<dyn SomeExtension>(id, Box::new(implementation))`.
    #[must_use]
    pub fn with_extension<T: ?Sized + Send + Sync + 'static>(
        mut self,
        id: ExtensionId,
        object: Box<T>,
    ) -> Self {
        self.extensions = self.extensions.with(id, object);
        self
    }

    /// The finished session as a shared [`Host`] handle.
    #[must_use]
    pub fn into_host(self) -> Arc<dyn Host> {
        Arc::new(self)
    }
}

impl Host for Session {
    fn info(&self) -> &HostInfo {
        &self.info
    }

    fn extension(&self, id: &str) -> Option<Capability<'_>> {
        self.extensions.get(id)
    }
}
