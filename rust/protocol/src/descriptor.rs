//! Descriptors advertise a plug-in class before any instance of it exists.
//!
//! Hosts browse descriptors to build their plug-in lists, so everything
//! here must be available without creating a plug-in. Plug-in authors
//! usually declare one [`DescriptorRef`] as a constant; hosts that need to
//! keep descriptors past the entry point's lifetime convert them to the
//! owned [`Descriptor`] form.

use crate::ProtocolVersion;


/// Named category bits describing what a plug-in class does.
///
/// A class may claim any combination of categories. Bit positions are part
/// of the wire contract: independently built hosts and plug-ins must agree
/// on them, and unknown bits are preserved through
/// [`bits`](Features::bits)/[`from_bits`](Features::from_bits) so newer
/// categories survive a round-trip through older code.
///
/// # Examples
///
/// ```
/// # use baton_protocol::descriptor::Features;
/// let features = Features::INSTRUMENT | Features::ANALYZER;
/// assert!(features.contains(Features::INSTRUMENT));
/// assert!(!features.contains(Features::AUDIO_EFFECT));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features(u64);

impl Features {
    /// No category claimed.
    pub const NONE: Features = Features(0);

    /// Produces audio from note events. Bit 0.
    pub const INSTRUMENT: Features = Features(1 << 0);

    /// Transforms incoming audio. Bit 1.
    pub const AUDIO_EFFECT: Features = Features(1 << 1);

    /// Transforms incoming events. Bit 2.
    pub const EVENT_EFFECT: Features = Features(1 << 2);

    /// Inspects its input without changing it. Bit 3.
    pub const ANALYZER: Features = Features(1 << 3);

    /// Rebuild a set of categories from its raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bits of this set.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every category in `other` is also claimed by `self`.
    #[must_use]
    pub const fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    /// The categories claimed by either set.
    #[must_use]
    pub const fn union(self, other: Features) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Features {
    fn bitor_assign(&mut self, rhs: Features) {
        *self = self.union(rhs);
    }
}

/// A borrowed descriptor for a plug-in class.
///
/// This is the form plug-ins publish, usually as a `'static` constant.
///
/// # Examples
///
/// ```
/// # use baton_protocol::descriptor::{DescriptorRef, Features};
/// const DESCRIPTOR: DescriptorRef<'static> = DescriptorRef {
///     protocol_version: baton_protocol::VERSION,
///     id: "com.example.gain",
///     name: "Gain",
///     vendor: "Example Audio",
///     url: "https://example.com/gain",
///     manual_url: "https://example.com/gain/manual",
///     support_url: "https://example.com/support",
///     version: "1.0.0",
///     description: "Utility gain",
///     features: Features::AUDIO_EFFECT,
/// };
/// # assert_eq!(DESCRIPTOR.id, "com.example.gain");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorRef<'a> {
    /// The protocol version the class was built against.
    ///
    /// Hosts refuse to instantiate a class whose version is incompatible
    /// with their own.
    pub protocol_version: ProtocolVersion,

    /// Stable identifier for the class, unique within its entry point.
    ///
    /// Reverse-domain style (`com.example.gain`) keeps ids unique across
    /// vendors. Hosts key sessions and presets on this, so it must never
    /// change between releases.
    pub id: &'a str,

    /// Human-readable class name.
    pub name: &'a str,

    /// The vendor shipping the class.
    pub vendor: &'a str,

    /// The vendor's product page for the class.
    pub url: &'a str,

    /// Where the manual lives.
    pub manual_url: &'a str,

    /// Where users get support.
    pub support_url: &'a str,

    /// Vendor version string, independent of the protocol version.
    pub version: &'a str,

    /// A sentence describing what the class does.
    pub description: &'a str,

    /// The categories the class claims.
    pub features: Features,
}

/// An owned descriptor for a plug-in class.
///
/// Identical to [`DescriptorRef`] but owning its strings, for hosts that
/// keep descriptors beyond the borrow they were published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// The protocol version the class was built against.
    pub protocol_version: ProtocolVersion,

    /// Stable identifier for the class, unique within its entry point.
    pub id: String,

    /// Human-readable class name.
    pub name: String,

    /// The vendor shipping the class.
    pub vendor: String,

    /// The vendor's product page for the class.
    pub url: String,

    /// Where the manual lives.
    pub manual_url: String,

    /// Where users get support.
    pub support_url: String,

    /// Vendor version string, independent of the protocol version.
    pub version: String,

    /// A sentence describing what the class does.
    pub description: String,

    /// The categories the class claims.
    pub features: Features,
}

impl From<DescriptorRef<'_>> for Descriptor {
    fn from(descriptor: DescriptorRef<'_>) -> Self {
        Self {
            protocol_version: descriptor.protocol_version,
            id: descriptor.id.to_owned(),
            name: descriptor.name.to_owned(),
            vendor: descriptor.vendor.to_owned(),
            url: descriptor.url.to_owned(),
            manual_url: descriptor.manual_url.to_owned(),
            support_url: descriptor.support_url.to_owned(),
            version: descriptor.version.to_owned(),
            description: descriptor.description.to_owned(),
            features: descriptor.features,
        }
    }
}

impl<'a> From<&'a Descriptor> for DescriptorRef<'a> {
    fn from(descriptor: &'a Descriptor) -> Self {
        Self {
            protocol_version: descriptor.protocol_version,
            id: &descriptor.id,
            name: &descriptor.name,
            vendor: &descriptor.vendor,
            url: &descriptor.url,
            manual_url: &descriptor.manual_url,
            support_url: &descriptor.support_url,
            version: &descriptor.version,
            description: &descriptor.description,
            features: descriptor.features,
        }
    }
}
