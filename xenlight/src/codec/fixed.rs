//! Fixed-size values, carried by copy.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use super::{Dispose, Foreign, FromLibxl, ToLibxl};
use crate::{
    error::{LibxlError, MarshalError},
    ffi::{LibxlDefbool, LibxlHwcap, LibxlMac, LibxlMsVmGenid, LibxlUuid},
};

macro_rules! inline_dispose {
    ($($raw:ty),*) => {
        $(
            impl Dispose for $raw {
                unsafe fn dispose(&mut self) {}
            }
        )*
    };
}

inline_dispose!(LibxlUuid, LibxlMac, LibxlHwcap, LibxlMsVmGenid, LibxlDefbool);

impl FromLibxl<LibxlUuid> for Uuid {
    unsafe fn from_libxl(raw: &LibxlUuid) -> Result<Self, MarshalError> {
        Ok(Uuid::from_bytes(raw.uuid))
    }
}

impl ToLibxl for Uuid {
    type Raw = LibxlUuid;

    fn to_libxl(&self) -> Result<Foreign<LibxlUuid>, MarshalError> {
        // SAFETY: Inline value, nothing to release.
        Ok(unsafe {
            Foreign::from_raw(LibxlUuid {
                uuid: *self.as_bytes(),
            })
        })
    }
}

/// Ethernet hardware address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mac(pub [u8; 6]);

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid MAC address: {0:?}")]
pub struct ParseMacError(String);

impl FromStr for Mac {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mac = [0u8; 6];
        let mut octets = s.split(':');

        for byte in mac.iter_mut() {
            *byte = octets
                .next()
                .filter(|o| o.len() == 2)
                .and_then(|o| u8::from_str_radix(o, 16).ok())
                .ok_or_else(|| ParseMacError(s.to_string()))?;
        }

        if octets.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }

        Ok(Mac(mac))
    }
}

impl Serialize for Mac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromLibxl<LibxlMac> for Mac {
    unsafe fn from_libxl(raw: &LibxlMac) -> Result<Self, MarshalError> {
        Ok(Mac(*raw))
    }
}

impl ToLibxl for Mac {
    type Raw = LibxlMac;

    fn to_libxl(&self) -> Result<Foreign<LibxlMac>, MarshalError> {
        // SAFETY: Inline value.
        Ok(unsafe { Foreign::from_raw(self.0) })
    }
}

/// Hardware capability words, as reported in physinfo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Hwcap(pub [u32; 8]);

impl FromLibxl<LibxlHwcap> for Hwcap {
    unsafe fn from_libxl(raw: &LibxlHwcap) -> Result<Self, MarshalError> {
        Ok(Hwcap(*raw))
    }
}

impl ToLibxl for Hwcap {
    type Raw = LibxlHwcap;

    fn to_libxl(&self) -> Result<Foreign<LibxlHwcap>, MarshalError> {
        // SAFETY: Inline value.
        Ok(unsafe { Foreign::from_raw(self.0) })
    }
}

/// VM generation id exposed to Windows guests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MsVmGenid(pub [u8; 16]);

impl MsVmGenid {
    /// All-zero means "no generation id".
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }
}

impl FromLibxl<LibxlMsVmGenid> for MsVmGenid {
    unsafe fn from_libxl(raw: &LibxlMsVmGenid) -> Result<Self, MarshalError> {
        Ok(MsVmGenid(raw.bytes))
    }
}

impl ToLibxl for MsVmGenid {
    type Raw = LibxlMsVmGenid;

    fn to_libxl(&self) -> Result<Foreign<LibxlMsVmGenid>, MarshalError> {
        // SAFETY: Inline value.
        Ok(unsafe { Foreign::from_raw(LibxlMsVmGenid { bytes: self.0 }) })
    }
}

/// Boolean that may be left for libxl to decide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Defbool(Option<bool>);

impl Defbool {
    pub const DEFAULT: Defbool = Defbool(None);

    pub fn new(value: bool) -> Self {
        Defbool(Some(value))
    }

    pub fn set(&mut self, value: bool) {
        self.0 = Some(value);
    }

    pub fn unset(&mut self) {
        self.0 = None;
    }

    /// Set only if still default.
    pub fn set_if_default(&mut self, value: bool) {
        self.0.get_or_insert(value);
    }

    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }

    /// Explicit value, [`LibxlError::Inval`] if still default.
    pub fn val(&self) -> Result<bool, LibxlError> {
        self.0.ok_or(LibxlError::Inval)
    }
}

impl fmt::Display for Defbool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("<default>"),
            Some(true) => f.write_str("True"),
            Some(false) => f.write_str("False"),
        }
    }
}

impl FromLibxl<LibxlDefbool> for Defbool {
    unsafe fn from_libxl(raw: &LibxlDefbool) -> Result<Self, MarshalError> {
        Ok(Defbool(match raw.val {
            0 => None,
            v => Some(v > 0),
        }))
    }
}

impl ToLibxl for Defbool {
    type Raw = LibxlDefbool;

    fn to_libxl(&self) -> Result<Foreign<LibxlDefbool>, MarshalError> {
        let val = match self.0 {
            None => 0,
            Some(true) => 1,
            Some(false) => -1,
        };

        // SAFETY: Inline value.
        Ok(unsafe { Foreign::from_raw(LibxlDefbool { val }) })
    }
}
