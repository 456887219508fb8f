//! Domain newtypes
//!
//! Strongly-typed wrappers for the digest and cycle counter values.

use std::fmt::{self, Display, Formatter};

// ============================================================================
// ContentFingerprint
// ============================================================================

/// Fixed-size digest of a file's full byte content
///
/// Produced by the filesystem adapter (MD5, 16 bytes). Used purely for
/// change detection between a source file and its replica counterpart;
/// it carries no integrity guarantee against deliberate collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 16]);

impl ContentFingerprint {
    /// Length of the digest in bytes
    pub const LEN: usize = 16;

    /// Wrap raw digest bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex rendering (32 characters)
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Display for ContentFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ============================================================================
// CycleId
// ============================================================================

/// Sequence number of a sync cycle, starting at 1 for the first cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(u64);

impl CycleId {
    /// The first cycle of a run
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// The cycle following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Display for CycleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
