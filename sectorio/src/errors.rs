// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for SectorIO operations.
pub type SectorIOResult<T = ()> = core::result::Result<T, SectorIOError>;

/// Error type for SectorIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorIOError {
    Other(&'static str),
    /// The sector lies beyond the end of the backing storage.
    OutOfBounds { lba: u64 },
    Unsupported,
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl SectorIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            SectorIOError::Other(msg) => *msg,
            SectorIOError::OutOfBounds { .. } => "Out of bounds",
            SectorIOError::Unsupported => "Unsupported operation",
            #[cfg(feature = "std")]
            SectorIOError::Io(_) => "I/O error",
        }
    }
}

impl From<&'static str> for SectorIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        SectorIOError::Other(msg)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for SectorIOError {
    #[cold]
    #[inline(never)]
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => SectorIOError::Other("short read past end of device"),
            kind => SectorIOError::Io(kind),
        }
    }
}

impl fmt::Display for SectorIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorIOError::OutOfBounds { lba } => write!(f, "Sector {lba} is out of bounds"),
            #[cfg(feature = "std")]
            SectorIOError::Io(kind) => write!(f, "I/O error: {kind}"),
            other => write!(f, "{}", other.msg()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SectorIOError {}
