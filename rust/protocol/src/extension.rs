//! Capability negotiation between hosts and plug-ins.
//!
//! Everything beyond the baseline contract is an extension: a named
//! interface one side may query from the other by string id. A side that
//! does not recognize an id answers `None` and both sides continue with
//! the baseline behavior, so independently evolved hosts and plug-ins
//! interoperate on whatever subset they share.
//!
//! Providers collect their extension objects in an [`Extensions`]
//! registry; queries come back as an untyped [`Capability`] that the
//! caller casts to the extension's trait. Standard extensions live in
//! [`crate::ext`], but any id both sides agree on works.

use fxhash::FxHashMap;
use std::any::Any;


/// The identifier of an extension.
///
/// Ids are versioned strings such as `"baton.audio-ports/1"`; both sides
/// must use the exact same string for the same interface. Draft
/// extensions carry `.draft` in the id and may change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionId(&'static str);

impl ExtensionId {
    /// An id from its string form.
    #[must_use]
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// The string form of the id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl std::borrow::Borrow<str> for ExtensionId {
    fn borrow(&self) -> &str {
        self.0
    }
}

/// An extension object with its type erased.
///
/// Handed out by [`Extensions::get`]; borrow it back as the extension's
/// trait with [`cast`](Capability::cast). The capability borrows the
/// provider, so it cannot outlive the object that answered the query.
#[derive(Clone, Copy)]
pub struct Capability<'a> {
    object: &'a (dyn Any + Send + Sync),
}

impl<'a> Capability<'a> {
    fn new(object: &'a (dyn Any + Send + Sync)) -> Self {
        Self { object }
    }

    /// The extension object, if it was registered as a `Box<T>`.
    ///
    /// `T` is usually a trait object: a capability registered with
    /// `with::<dyn SomeExtension>` casts back with
    /// `cast::<dyn SomeExtension>`. Any other type answers `None`.
    #[must_use]
    pub fn cast<T: ?Sized + 'static>(self) -> Option<&'a T> {
        self.object.downcast_ref::<Box<T>>().map(|object| &**object)
    }
}

impl std::fmt::Debug for Capability<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability").finish_non_exhaustive()
    }
}

/// The set of extensions a host or plug-in provides.
///
/// # Examples
///
/// ```
/// # use baton_protocol::extension::{ExtensionId, Extensions};
/// pub trait Shout: Send + Sync {
///     fn shout(&self) -> String;
/// }
///
/// pub const SHOUT: ExtensionId = ExtensionId::new("example.shout/1");
///
/// struct Loud;
///
/// impl Shout for Loud {
///     fn shout(&self) -> String {
///         "HEY".to_owned()
///     }
/// }
///
/// let extensions = Extensions::new().with::<dyn Shout>(SHOUT, Box::new(Loud));
/// let capability = extensions.get(SHOUT.as_str()).unwrap();
/// assert_eq!(capability.cast::<dyn Shout>().unwrap().shout(), "HEY");
/// assert!(extensions.get("example.unknown/1").is_none());
/// ```
#[derive(Default)]
pub struct Extensions {
    objects: FxHashMap<ExtensionId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension object under `id`.
    ///
    /// Register under the trait-object type callers will cast to, as in
    /// `with::<dyn SomeExtension>(id, Box::new(implementation))`. A second
    /// registration under the same id replaces the first.
    #[must_use]
    pub fn with<T: ?Sized + Send + Sync + 'static>(
        mut self,
        id: ExtensionId,
        object: Box<T>,
    ) -> Self {
        self.objects.insert(id, Box::new(object));
        self
    }

    /// Look up the extension registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Capability<'_>> {
        self.objects
            .get(id)
            .map(|object| Capability::new(object.as_ref()))
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("ids", &self.objects.keys().collect::<Vec<_>>())
            .finish()
    }
}
