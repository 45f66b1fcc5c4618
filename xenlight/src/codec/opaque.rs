//! Values carried across without a native decoding.

use std::convert::Infallible;

use super::{Dispose, Foreign, FromLibxl, ToLibxl};
use crate::{error::MarshalError, ffi::LibxlCpuidPolicyList};

/// Foreign value held as-is. Never inspected, never released by us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForeignToken<R>(R);

impl<R: Copy> ForeignToken<R> {
    pub fn raw(&self) -> R {
        self.0
    }
}

/// Either a native value or a pass-through foreign one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opaque<T, R> {
    Native(T),
    Passthrough(ForeignToken<R>),
}

impl<T, R: Copy + Dispose> Opaque<T, R> {
    /// Native value, [`MarshalError::Opaque`] for pass-through values.
    pub fn native(&self) -> Result<&T, MarshalError> {
        match self {
            Opaque::Native(value) => Ok(value),
            Opaque::Passthrough(_) => Err(MarshalError::Opaque),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Opaque::Passthrough(_))
    }

    /// Hand a pass-through value back to libxl, unchanged.
    pub fn lend(&self) -> Option<Foreign<R>> {
        match self {
            Opaque::Native(_) => None,
            Opaque::Passthrough(token) => Some(Foreign::lend(token.0)),
        }
    }
}

impl<T, R: Copy> FromLibxl<R> for Opaque<T, R> {
    unsafe fn from_libxl(raw: &R) -> Result<Self, MarshalError> {
        Ok(Opaque::Passthrough(ForeignToken(*raw)))
    }
}

impl<T: ToLibxl<Raw = R>, R: Copy + Dispose> ToLibxl for Opaque<T, R> {
    type Raw = R;

    fn to_libxl(&self) -> Result<Foreign<R>, MarshalError> {
        match self {
            Opaque::Native(value) => value.to_libxl(),
            Opaque::Passthrough(token) => Ok(Foreign::lend(token.0)),
        }
    }
}

/// `libxl_cpuid_policy_list`, only ever passed through.
///
/// The token stays valid as long as the libxl structure it was read from.
pub type CpuidPolicyList = Opaque<Infallible, LibxlCpuidPolicyList>;

impl Dispose for LibxlCpuidPolicyList {
    /// Owned by libxl, released along with the structure holding it.
    unsafe fn dispose(&mut self) {}
}
