//! The audio buffer model.
//!
//! Audio moves through the protocol one port at a time: each port owns a
//! group of channels, and each channel is a contiguous slice of samples.
//! During a process call the host lends the plug-in one [`AudioInput`] view
//! per input port and one [`AudioOutput`] view per output port; the views
//! borrow storage owned by the host ([`BufferData`]) and die with the call.
//!
//! A buffer carries its samples in exactly one precision, `f32` or `f64`.
//! The [`SampleData`] enum makes a dual-precision buffer unrepresentable.


/// A sample format the protocol can carry.
///
/// Implemented for `f32` and `f64`; buffers are generic over it.
pub trait Sample: Copy + Default + PartialEq + 'static {}

impl Sample for f32 {}
impl Sample for f64 {}

/// Correlates a buffer to port metadata published by the audio-ports
/// capability ([`crate::ext::audio_ports`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub u32);

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-channel hint that a channel holds one constant value for a whole
/// buffer.
///
/// Bit *i* set means channel *i* is constant for the call. The mask is an
/// optimization hint only: correctness must never depend on it being
/// accurate, in either direction. Channels beyond the 64th cannot be
/// described and always read as non-constant.
///
/// Bit positions are part of the wire contract and survive
/// [`bits`](ConstantMask::bits)/[`from_bits`](ConstantMask::from_bits)
/// round-trips exactly, so independently built hosts and plug-ins agree.
///
/// # Examples
///
/// ```
/// # use baton_protocol::audio::ConstantMask;
/// let mask = ConstantMask::NONE.with_constant(1);
/// assert!(!mask.is_constant(0));
/// assert!(mask.is_constant(1));
/// assert_eq!(mask.bits(), 0b10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantMask(u64);

impl ConstantMask {
    /// No channel is constant.
    pub const NONE: ConstantMask = ConstantMask(0);

    /// Rebuild a mask from its raw bits.
    ///
    /// Unknown high bits are kept as-is so masks from newer implementations
    /// survive a round-trip.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bits of this mask.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether channel `channel` is flagged constant.
    #[must_use]
    pub const fn is_constant(self, channel: usize) -> bool {
        channel < 64 && self.0 & (1 << channel) != 0
    }

    /// A copy of this mask with channel `channel` flagged constant.
    ///
    /// Channels beyond the 64th cannot be represented; the mask is returned
    /// unchanged for those.
    #[must_use]
    pub const fn with_constant(self, channel: usize) -> Self {
        if channel < 64 {
            Self(self.0 | 1 << channel)
        } else {
            self
        }
    }

    /// Flag channel `channel` as constant in place.
    pub fn set_constant(&mut self, channel: usize) {
        *self = self.with_constant(channel);
    }

    /// Clear channel `channel`'s constant flag in place.
    pub fn clear_constant(&mut self, channel: usize) {
        if channel < 64 {
            self.0 &= !(1 << channel);
        }
    }
}

/// Owned, host-side sample storage for one port.
///
/// Channels are stored back to back in one flat allocation; every channel
/// has the same number of frames.
///
/// # Examples
///
/// ```
/// # use baton_protocol::audio::BufferData;
/// let buffer = BufferData::new_stereo([1.0f32, 2.0], [3.0, 4.0]);
/// assert!(buffer.channels().eq([[1.0, 2.0], [3.0, 4.0]]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BufferData<S = f32> {
    num_channels: usize,
    num_frames: usize,
    data: Vec<S>,
}

impl<S: Sample> BufferData<S> {
    /// A zero-filled buffer of `num_channels` channels by `num_frames`
    /// frames.
    #[must_use]
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            num_channels,
            num_frames,
            data: vec![S::default(); num_channels * num_frames],
        }
    }

    /// A single-channel buffer owning `data`.
    #[must_use]
    pub fn new_mono(data: Vec<S>) -> Self {
        Self {
            num_channels: 1,
            num_frames: data.len(),
            data,
        }
    }

    /// A two-channel buffer from left and right channels.
    ///
    /// # Panics
    ///
    /// Panics if the two channels have different lengths.
    #[must_use]
    pub fn new_stereo<L: IntoIterator<Item = S>, R: IntoIterator<Item = S>>(
        left: L,
        right: R,
    ) -> Self {
        let mut data: Vec<_> = left.into_iter().collect();
        let left_len = data.len();
        data.extend(right);
        assert_eq!(left_len * 2, data.len());
        Self {
            num_channels: 2,
            num_frames: left_len,
            data,
        }
    }

    /// The number of channels in the buffer.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// The number of frames in the buffer.
    ///
    /// Each channel contains this many samples.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// All samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= self.num_channels()`.
    #[must_use]
    pub fn channel(&self, channel: usize) -> &[S] {
        assert!(channel < self.num_channels);
        &self.data[channel * self.num_frames..(channel + 1) * self.num_frames]
    }

    /// Mutable access to all samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= self.num_channels()`.
    #[must_use]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [S] {
        assert!(channel < self.num_channels);
        &mut self.data[channel * self.num_frames..(channel + 1) * self.num_frames]
    }

    /// Iterate over the channels of the buffer.
    pub fn channels(&self) -> impl Iterator<Item = &[S]> {
        // A zero-frame buffer has no storage; the clamp keeps the chunk
        // size legal.
        self.data.chunks_exact(self.num_frames.max(1))
    }

    /// Iterate mutably over the channels of the buffer.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [S]> {
        self.data.chunks_exact_mut(self.num_frames.max(1))
    }
}

/// Read-only sample storage in exactly one precision.
#[derive(Debug, Clone, Copy)]
pub enum SampleData<'a> {
    /// Single-precision samples.
    F32(&'a BufferData<f32>),

    /// Double-precision samples.
    F64(&'a BufferData<f64>),
}

impl<'a> SampleData<'a> {
    /// The number of channels behind this view.
    #[must_use]
    pub fn num_channels(self) -> usize {
        match self {
            SampleData::F32(data) => data.num_channels(),
            SampleData::F64(data) => data.num_channels(),
        }
    }

    /// The number of frames behind this view.
    #[must_use]
    pub fn num_frames(self) -> usize {
        match self {
            SampleData::F32(data) => data.num_frames(),
            SampleData::F64(data) => data.num_frames(),
        }
    }

    /// The storage, if it is single-precision.
    #[must_use]
    pub fn as_f32(self) -> Option<&'a BufferData<f32>> {
        match self {
            SampleData::F32(data) => Some(data),
            SampleData::F64(_) => None,
        }
    }

    /// The storage, if it is double-precision.
    #[must_use]
    pub fn as_f64(self) -> Option<&'a BufferData<f64>> {
        match self {
            SampleData::F32(_) => None,
            SampleData::F64(data) => Some(data),
        }
    }
}

/// Writable sample storage in exactly one precision.
#[derive(Debug)]
pub enum SampleDataMut<'a> {
    /// Single-precision samples.
    F32(&'a mut BufferData<f32>),

    /// Double-precision samples.
    F64(&'a mut BufferData<f64>),
}

impl SampleDataMut<'_> {
    /// The number of channels behind this view.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        match self {
            SampleDataMut::F32(data) => data.num_channels(),
            SampleDataMut::F64(data) => data.num_channels(),
        }
    }

    /// The number of frames behind this view.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        match self {
            SampleDataMut::F32(data) => data.num_frames(),
            SampleDataMut::F64(data) => data.num_frames(),
        }
    }

    /// The storage, if it is single-precision.
    #[must_use]
    pub fn as_f32(&self) -> Option<&BufferData<f32>> {
        match self {
            SampleDataMut::F32(data) => Some(data),
            SampleDataMut::F64(_) => None,
        }
    }

    /// Mutable storage, if it is single-precision.
    #[must_use]
    pub fn as_f32_mut(&mut self) -> Option<&mut BufferData<f32>> {
        match self {
            SampleDataMut::F32(data) => Some(data),
            SampleDataMut::F64(_) => None,
        }
    }

    /// The storage, if it is double-precision.
    #[must_use]
    pub fn as_f64(&self) -> Option<&BufferData<f64>> {
        match self {
            SampleDataMut::F32(_) => None,
            SampleDataMut::F64(data) => Some(data),
        }
    }

    /// Mutable storage, if it is double-precision.
    #[must_use]
    pub fn as_f64_mut(&mut self) -> Option<&mut BufferData<f64>> {
        match self {
            SampleDataMut::F32(_) => None,
            SampleDataMut::F64(data) => Some(data),
        }
    }
}

/// One input port's buffer for the duration of one process call.
#[derive(Debug, Clone, Copy)]
pub struct AudioInput<'a> {
    /// The samples, in exactly one precision.
    pub data: SampleData<'a>,

    /// Latency from the audio interface to this buffer, in frames.
    pub latency: usize,

    /// Constant-channel hint for this call.
    pub constant_mask: ConstantMask,

    /// The port this buffer belongs to.
    pub port_id: PortId,
}

impl AudioInput<'_> {
    /// The number of channels on this port.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.data.num_channels()
    }
}

/// One output port's buffer for the duration of one process call.
///
/// The plug-in writes samples through [`data`](AudioOutput::data) and may
/// flag constant channels through
/// [`constant_mask`](AudioOutput::constant_mask) before returning.
#[derive(Debug)]
pub struct AudioOutput<'a> {
    /// The samples, in exactly one precision.
    pub data: SampleDataMut<'a>,

    /// Latency from this buffer to the audio interface, in frames.
    pub latency: usize,

    /// Constant-channel hint produced by the plug-in for this call.
    pub constant_mask: ConstantMask,

    /// The port this buffer belongs to.
    pub port_id: PortId,
}

impl AudioOutput<'_> {
    /// The number of channels on this port.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.data.num_channels()
    }
}
