//! Error types.
//!
//! Failures fall in four groups: the context is not open ([`Error::NotOpen`]),
//! libxl reported a status code ([`LibxlError`]), a value could not be carried
//! across the boundary ([`MarshalError`]), or a batch stopped on its first
//! failure ([`Error::Evacuation`]). Nothing here is retried internally.

use std::ffi::c_int;

use thiserror::Error;

use crate::{bitmap::ParseBitmapError, PoolId};

/// Result type alias for xenlight operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted on a closed [`crate::Context`].
    #[error("libxl context not opened")]
    NotOpen,

    /// Status code returned by libxl.
    #[error(transparent)]
    Libxl(#[from] LibxlError),

    #[error("marshaling failure: {0}")]
    Marshal(#[from] MarshalError),

    /// `libxenlight.so` (or one of its symbols) could not be loaded.
    #[error("unable to load libxl: {0}")]
    Load(#[from] libloading::Error),

    /// The xentoollog stream backing the diagnostic sink could not be created.
    #[error("cannot open xentoollog stdiostream")]
    Logger,

    /// libxl belongs to a Xen release whose structures this crate does not
    /// lay out.
    #[error("unsupported Xen version {major}.{minor}")]
    UnsupportedVersion { major: i32, minor: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseBitmapError),

    /// Removing CPUs from `poolid` failed while freeing a CPU set. Pools handled
    /// before this one keep their changes.
    #[error("unable to remove cpus from cpupool {poolid}: {source}")]
    Evacuation {
        poolid: PoolId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Map a libxl return value, zero being success.
    pub(crate) fn check(ret: c_int) -> Result<()> {
        if ret == 0 {
            Ok(())
        } else {
            Err(Error::Libxl(LibxlError::from_code(ret)))
        }
    }

    /// Map a count-style return value, negative values being errors.
    pub(crate) fn check_count(ret: c_int) -> Result<u32> {
        u32::try_from(ret).map_err(|_| Error::Libxl(LibxlError::from_code(ret)))
    }
}

macro_rules! libxl_errors {
    ($($variant:ident = $code:literal => $msg:literal,)*) => {
        /// Error codes of libxl (`ERROR_*` in `libxl.h`).
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum LibxlError {
            $($variant,)*
            /// Any code missing from the table above.
            Unknown(i32),
        }

        impl LibxlError {
            /// Every known error, in code order.
            pub const ALL: &'static [LibxlError] = &[$(LibxlError::$variant,)*];

            pub fn from_code(code: c_int) -> Self {
                match code {
                    $($code => LibxlError::$variant,)*
                    other => LibxlError::Unknown(other),
                }
            }

            pub fn code(self) -> c_int {
                match self {
                    $(LibxlError::$variant => $code,)*
                    LibxlError::Unknown(code) => code,
                }
            }

            fn message(self) -> Option<&'static str> {
                match self {
                    $(LibxlError::$variant => Some($msg),)*
                    LibxlError::Unknown(_) => None,
                }
            }
        }
    };
}

libxl_errors! {
    Nonspecific = -1 => "Non-specific error",
    Version = -2 => "Wrong version",
    Fail = -3 => "Failed",
    Ni = -4 => "Not Implemented",
    Nomem = -5 => "No memory",
    Inval = -6 => "Invalid argument",
    Badfail = -7 => "Bad Fail",
    GuestTimedout = -8 => "Guest timed out",
    Timedout = -9 => "Timed out",
    Noparavirt = -10 => "No Paravirtualization",
    NotReady = -11 => "Not ready",
    OseventRegFail = -12 => "OS event registration failed",
    Bufferfull = -13 => "Buffer full",
    UnknownChild = -14 => "Unknown child",
    LockFail = -15 => "Lock failed",
    JsonConfigEmpty = -16 => "JSON config empty",
    DeviceExists = -17 => "Device exists",
    CheckpointDevopsDoesNotMatch = -18 => "Checkpoint devops does not match",
    CheckpointDeviceNotSupported = -19 => "Checkpoint device not supported",
    VnumaConfigInvalid = -20 => "VNUMA config invalid",
    DomainNotfound = -21 => "Domain not found",
    Aborted = -22 => "Aborted",
    Notfound = -23 => "Not found",
    DomainDestroyed = -24 => "Domain destroyed",
    FeatureRemoved = -25 => "Feature removed",
}

impl std::fmt::Display for LibxlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(msg) => f.write_str(msg),
            None => write!(f, "unknown libxl error: {}", self.code()),
        }
    }
}

impl std::error::Error for LibxlError {}

/// Name not matching any value of a libxl enumeration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Failure to move a value across the libxl boundary.
///
/// Encoders release everything they allocated before returning one of these.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("allocation of {bytes} bytes failed")]
    OutOfMemory { bytes: usize },

    /// A count reported by libxl is negative or does not fit.
    #[error("invalid length {0} reported by libxl")]
    InvalidLength(i64),

    /// A native length does not fit the foreign length field.
    #[error("length {0} does not fit the foreign representation")]
    LengthOverflow(usize),

    /// A non-empty buffer came with a null pointer.
    #[error("null buffer for {0} element(s)")]
    NullBuffer(usize),

    /// No sentinel found within the scan limit.
    #[error("list not terminated within {0} entries")]
    Unterminated(usize),

    /// Strings crossing the boundary are NUL-terminated.
    #[error("string contains an interior NUL byte at {0}")]
    InteriorNul(usize),

    /// A pass-through value was asked for its native form.
    #[error("opaque value has no native representation")]
    Opaque,
}
