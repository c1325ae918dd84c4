//! Shared stream policy: flags and limits.
//!
//! [`StreamConfig`] is the only part of a stream that may be touched from
//! several threads at once. Every field is an independent relaxed atomic: a
//! change becomes visible to other threads eventually and is not ordered
//! against frames already in flight. Framing operations load one
//! [`Snapshot`] and use it for the whole operation.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::codec::{header_size, CHECKSUM_SIZE, LENGTH_SIZE, MAX_FRAME_SIZE};
use crate::error::{FrameError, Result};

bitflags! {
    /// Stream feature flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Length and checksum fields use wire (big-endian) order.
        const ENDIAN = 1 << 0;

        /// Every frame carries a checksum field.
        const CHECKSUM = 1 << 1;
    }
}

/// Largest payload a frame may carry under `max_frame_size`.
///
/// A `max_frame_size` of 0 means [`MAX_FRAME_SIZE`]; larger values are
/// clamped to it. The length field, and the checksum field when enabled,
/// are subtracted, floored at zero.
pub fn effective_max_payload(max_frame_size: usize, checksum: bool) -> usize {
    let overhead = if checksum {
        LENGTH_SIZE + CHECKSUM_SIZE
    } else {
        LENGTH_SIZE
    };
    frame_budget(max_frame_size).saturating_sub(overhead)
}

/// Resolve the 0 sentinel and clamp to the protocol maximum.
pub fn frame_budget(max_frame_size: usize) -> usize {
    if max_frame_size == 0 {
        MAX_FRAME_SIZE
    } else {
        max_frame_size.min(MAX_FRAME_SIZE)
    }
}

/// Atomically updatable stream policy.
///
/// Share between an encoder, a decoder and any controlling thread with
/// `Arc<StreamConfig>`.
#[derive(Debug, Default)]
pub struct StreamConfig {
    flags: AtomicU32,
    max_frame_size: AtomicUsize,
    capacity: AtomicUsize,
}

impl StreamConfig {
    /// Create a config with no flags set.
    ///
    /// `max_frame_size` 0 means the protocol maximum; `capacity` 0 means
    /// unbounded queues.
    pub fn new(max_frame_size: usize, capacity: usize) -> Self {
        Self {
            flags: AtomicU32::new(0),
            max_frame_size: AtomicUsize::new(max_frame_size),
            capacity: AtomicUsize::new(capacity),
        }
    }

    /// Builder-style flag initialisation.
    pub fn with_flags(self, flags: Flags) -> Self {
        self.flags.store(flags.bits(), Ordering::Relaxed);
        self
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.flags.load(Ordering::Relaxed))
    }

    pub fn contains(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    /// Set or clear `flag`, leaving other bits untouched.
    pub fn set_flag(&self, flag: Flags, enabled: bool) {
        if enabled {
            self.insert_flags(flag);
        } else {
            self.remove_flags(flag);
        }
    }

    /// OR `flags` in. Returns the previous flags.
    pub fn insert_flags(&self, flags: Flags) -> Flags {
        Flags::from_bits_retain(self.flags.fetch_or(flags.bits(), Ordering::Relaxed))
    }

    /// Clear `flags`. Returns the previous flags.
    pub fn remove_flags(&self, flags: Flags) -> Flags {
        Flags::from_bits_retain(self.flags.fetch_and(!flags.bits(), Ordering::Relaxed))
    }

    /// Swap in `flags`. Returns the previous flags.
    pub fn replace_flags(&self, flags: Flags) -> Flags {
        Flags::from_bits_retain(self.flags.swap(flags.bits(), Ordering::Relaxed))
    }

    pub fn clear_flags(&self) {
        self.flags.store(0, Ordering::Relaxed);
    }

    /// Update both limits. Each store is independent.
    pub fn limit(&self, max_frame_size: usize, capacity: usize) {
        self.max_frame_size.store(max_frame_size, Ordering::Relaxed);
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    /// Raw configured max frame size (0 = protocol maximum).
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size.load(Ordering::Relaxed)
    }

    /// Raw configured queue capacity (0 = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Load every field once.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            flags: self.flags(),
            max_frame_size: self.max_frame_size(),
            capacity: self.capacity(),
        }
    }
}

impl From<&StreamSettings> for StreamConfig {
    fn from(settings: &StreamSettings) -> Self {
        StreamConfig::new(settings.max_frame_size, settings.capacity).with_flags(settings.flags())
    }
}

/// One coherent view of a [`StreamConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub flags: Flags,
    pub max_frame_size: usize,
    pub capacity: usize,
}

impl Snapshot {
    pub fn endian(&self) -> bool {
        self.flags.contains(Flags::ENDIAN)
    }

    pub fn checksum(&self) -> bool {
        self.flags.contains(Flags::CHECKSUM)
    }

    pub fn max_payload(&self) -> usize {
        effective_max_payload(self.max_frame_size, self.checksum())
    }

    pub fn frame_budget(&self) -> usize {
        frame_budget(self.max_frame_size)
    }

    pub fn header_size(&self) -> usize {
        header_size(self.flags)
    }

    /// Fails when the frame budget cannot hold a header under these flags.
    pub fn check_limit(&self) -> Result<()> {
        let header = self.header_size();
        if self.frame_budget() < header {
            return Err(FrameError::LimitTooSmall {
                limit: self.max_frame_size,
                header,
            });
        }
        Ok(())
    }

    /// Whether a queue currently holding `len` messages accepts another.
    pub fn admits(&self, len: usize) -> bool {
        self.capacity == 0 || len < self.capacity
    }
}

/// Serializable form of a stream policy.
///
/// ```
/// use bytestream_frame::{Flags, StreamConfig, StreamSettings};
///
/// let settings: StreamSettings =
///     serde_json::from_str(r#"{"checksum": true, "max_frame_size": 4096}"#).unwrap();
/// let config = StreamConfig::from(&settings);
/// assert_eq!(config.flags(), Flags::CHECKSUM);
/// assert_eq!(config.capacity(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Use wire order for length and checksum fields.
    pub endian: bool,
    /// Append a checksum field to every frame.
    pub checksum: bool,
    /// Maximum frame size in bytes, header included (0 = protocol maximum).
    pub max_frame_size: usize,
    /// Maximum queued messages (0 = unbounded).
    pub capacity: usize,
}

impl StreamSettings {
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        flags.set(Flags::ENDIAN, self.endian);
        flags.set(Flags::CHECKSUM, self.checksum);
        flags
    }
}
