//! libxl value conversions
//!
//! Values coming out of libxl are deep-copied into owned Rust values with
//! [`FromLibxl`], before the libxl memory they came from is released.
//! Values going into libxl are allocated with the C allocator by [`ToLibxl`]
//! and wrapped into a [`Foreign`] token, which frees them when dropped; the
//! token is kept alive across the call consuming the value and nothing points
//! back into it afterwards.
//!
//! Memory owned by libxl itself (list results, structures filled by a call)
//! is released through [`Scoped`], which runs the matching libxl free
//! function on every exit path.

mod bitmap;
mod fixed;
mod list;
mod opaque;


use core::{
    mem::{size_of, ManuallyDrop},
    ops::{Deref, DerefMut},
    ptr, slice,
};
use std::ffi::{c_char, c_int, CStr};

use nix::libc;

use crate::error::{self, LibxlError, MarshalError};

pub use fixed::{Defbool, Hwcap, Mac, MsVmGenid, ParseMacError};
pub use list::{KeyValueList, StringList, MAX_LIST_ENTRIES};
pub use opaque::{CpuidPolicyList, ForeignToken, Opaque};

/// Deep copy of a libxl value.
pub trait FromLibxl<Raw>: Sized {
    /// # Safety
    ///
    /// Every pointer reachable from `raw` must be valid for reads, and stay so
    /// for the duration of the call.
    unsafe fn from_libxl(raw: &Raw) -> Result<Self, MarshalError>;
}

/// Encoding of a value into freshly allocated libxl memory.
///
/// Encoding is all-or-nothing: on failure, whatever was allocated is freed
/// before the error is returned.
pub trait ToLibxl {
    type Raw: Dispose;

    fn to_libxl(&self) -> Result<Foreign<Self::Raw>, MarshalError>;
}

/// Release rule of a raw value built by a [`ToLibxl`] encoder.
pub trait Dispose {
    /// Free what the value points to and leave it empty.
    ///
    /// # Safety
    ///
    /// The value must have been produced by an encoder of this module, and not
    /// be in use by libxl anymore.
    unsafe fn dispose(&mut self);
}

/// Raw value allocated on the native side for libxl consumption.
///
/// Releases the value when dropped, unless it was only lent (see
/// [`Foreign::lend`]).
#[derive(Debug)]
pub struct Foreign<R: Dispose> {
    raw: R,
    owned: bool,
}

impl<R: Dispose> Foreign<R> {
    /// # Safety
    ///
    /// `raw` must be owned by the caller and releasable with [`Dispose`].
    pub(crate) unsafe fn from_raw(raw: R) -> Self {
        Self { raw, owned: true }
    }

    /// Wrap a value owned by someone else. Dropping the token does nothing.
    pub(crate) fn lend(raw: R) -> Self {
        Self { raw, owned: false }
    }

    pub fn as_raw(&self) -> &R {
        &self.raw
    }

    pub fn as_ptr(&self) -> *const R {
        &self.raw
    }

    /// Give up ownership, the caller becomes responsible for releasing it.
    pub fn into_raw(self) -> R
    where
        R: Copy,
    {
        let this = ManuallyDrop::new(self);
        this.raw
    }
}

impl<R: Dispose> Drop for Foreign<R> {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: Owned values come from `from_raw`, whose caller vouched
            //         for the release rule.
            unsafe { self.raw.dispose() }
        }
    }
}

/// A value paired with the function releasing it, run once on drop.
pub struct Scoped<T, F: FnOnce(&mut T)> {
    value: T,
    release: Option<F>,
}

impl<T, F: FnOnce(&mut T)> Scoped<T, F> {
    pub fn new(value: T, release: F) -> Self {
        Self {
            value,
            release: Some(release),
        }
    }
}

impl<T, F: FnOnce(&mut T)> Deref for Scoped<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F: FnOnce(&mut T)> DerefMut for Scoped<T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T, F: FnOnce(&mut T)> Drop for Scoped<T, F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&mut self.value);
        }
    }
}

/// Allocate a zeroed array of `n` elements with the C allocator.
pub(crate) fn alloc_zeroed<T>(n: usize) -> Result<*mut T, MarshalError> {
    let bytes = n
        .checked_mul(size_of::<T>())
        .ok_or(MarshalError::LengthOverflow(n))?;

    // SAFETY: calloc has no preconditions; null is checked below.
    let ptr = unsafe { libc::calloc(n.max(1), size_of::<T>().max(1)) };

    if ptr.is_null() {
        Err(MarshalError::OutOfMemory { bytes })
    } else {
        Ok(ptr.cast())
    }
}

/// Copy a C string into memory owned by the C allocator.
pub(crate) fn dup_cstr(s: &CStr) -> Result<*mut c_char, MarshalError> {
    // SAFETY: `s` is a valid NUL-terminated string.
    let ptr = unsafe { libc::strdup(s.as_ptr()) };

    if ptr.is_null() {
        Err(MarshalError::OutOfMemory {
            bytes: s.to_bytes_with_nul().len(),
        })
    } else {
        Ok(ptr)
    }
}

/// Free memory from the C allocator. Null is accepted.
pub(crate) unsafe fn free<T>(ptr: *mut T) {
    libc::free(ptr.cast())
}

/// Owned copy of a nullable C string. Invalid UTF-8 is replaced.
pub(crate) unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// View `len` elements at `ptr`, with `len` as reported by libxl.
pub(crate) unsafe fn slice_from_count<'a, T>(
    ptr: *const T,
    count: c_int,
) -> Result<&'a [T], MarshalError> {
    let len = usize::try_from(count).map_err(|_| MarshalError::InvalidLength(count.into()))?;
    slice_from_len(ptr, len)
}

pub(crate) unsafe fn slice_from_len<'a, T>(
    ptr: *const T,
    len: usize,
) -> Result<&'a [T], MarshalError> {
    if len == 0 {
        Ok(&[])
    } else if ptr.is_null() {
        Err(MarshalError::NullBuffer(len))
    } else {
        Ok(slice::from_raw_parts(ptr, len))
    }
}

/// Decode every element of a counted libxl array.
pub(crate) unsafe fn decode_array<R, T: FromLibxl<R>>(
    ptr: *const R,
    count: c_int,
) -> Result<Vec<T>, MarshalError> {
    slice_from_count(ptr, count)?
        .iter()
        .map(|raw| T::from_libxl(raw))
        .collect()
}

/// Decode a list returned by libxl, then release it with `free`.
///
/// A null list is how libxl reports a failure of the listing call.
pub(crate) unsafe fn take_list<R, T: FromLibxl<R>>(
    list: *mut R,
    count: c_int,
    free: impl FnOnce(*mut R, c_int),
) -> error::Result<Vec<T>> {
    let list = Scoped::new(list, |list| {
        if !list.is_null() {
            free(*list, count)
        }
    });

    if list.is_null() {
        return Err(LibxlError::Fail.into());
    }

    Ok(decode_array(*list, count)?)
}

/// Copy `bytes` into a new C allocation.
pub(crate) fn dup_bytes(bytes: &[u8]) -> Result<*mut u8, MarshalError> {
    let ptr = alloc_zeroed::<u8>(bytes.len())?;

    // SAFETY: `ptr` was just allocated for at least `bytes.len()` bytes.
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };

    Ok(ptr)
}
