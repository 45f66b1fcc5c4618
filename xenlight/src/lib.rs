//! Rust bindings for the libxl Xen toolstack library
//!
//! The crate is split in layers, leaves first:
//!   * [`bitmap`]: byte-backed CPU/node sets with range notation (`"2,4-8,10"`).
//!   * [`codec`]: conversions between libxl structures and owned Rust values.
//!   * [`libxl`]: the foreign entry points, resolved at runtime from `libxenlight.so`.
//!   * [`Context`]: lifetime of a libxl handle and its diagnostic sink.
//!   * [`host`], [`domain`], [`cpupool`]: typed queries and actions on an open context.
//!
//! ```no_run
//! use xenlight::{cpupool::CpupoolPlacement, Bitmap, Context};
//!
//! # fn main() -> xenlight::Result<()> {
//! let ctx = Context::open_default()?;
//! let cpus: Bitmap = "4-7".parse()?;
//! ctx.cpupool_make_free(&cpus)?;
//! # Ok(())
//! # }
//! ```

/// Mirror of a libxl IDL enumeration, with the names libxl uses for it.
///
/// Values unknown to this crate are kept as `Other`.
macro_rules! libxl_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $str:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            Other(i32),
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn from_raw(raw: ::std::ffi::c_int) -> Self {
                match raw {
                    $($value => $name::$variant,)*
                    other => $name::Other(other),
                }
            }

            pub fn as_raw(self) -> ::std::ffi::c_int {
                match self {
                    $($name::$variant => $value,)*
                    $name::Other(raw) => raw,
                }
            }

            /// Name libxl gives to this value.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $($name::$variant => Some($str),)*
                    $name::Other(_) => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}", self.as_raw()),
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::ParseEnumError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.name().is_some_and(|name| name.eq_ignore_ascii_case(s)))
                    .ok_or_else(|| $crate::error::ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

pub mod bitmap;
pub mod codec;
pub mod context;
pub mod cpupool;
pub mod domain;
pub mod error;
pub mod ffi;
pub mod host;
pub mod libxl;

#[cfg(test)]
mod mock;

use std::fmt;

use serde::Serialize;

pub use bitmap::Bitmap;
pub use context::{Context, ContextConfig, LibxlHandle, SinkFlags, SinkLevel};
pub use error::{Error, LibxlError, MarshalError, Result};

/// Commonly used traits, so callers get every facade method with one import.
pub mod prelude {
    pub use crate::context::LibxlHandle;
    pub use crate::cpupool::{CpupoolControl, CpupoolPlacement};
    pub use crate::domain::DomainControl;
    pub use crate::host::HostInfo;
}

/// Abstraction of a domain ID. This is the number used by Xen to identify a
/// single domain at runtime.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct DomId(pub u32);

/// Device index within a domain.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct DevId(pub i32);

/// Cpupool identifier.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct PoolId(pub u32);

impl PoolId {
    /// Let libxl pick the identifier of a new pool.
    pub const ANY: PoolId = PoolId(ffi::LIBXL_CPUPOOL_POOLID_ANY);
}

/// Amount of memory in KiB, as libxl reports it.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct MemKb(pub u64);

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DevId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MemKb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} KiB", self.0)
    }
}
