//! NULL-terminated string arrays.

use std::ffi::{c_char, CString};

use indexmap::IndexMap;
use serde::Serialize;

use super::{alloc_zeroed, dup_cstr, free, string_from_ptr, Dispose, Foreign, FromLibxl, ToLibxl};
use crate::{
    error::MarshalError,
    ffi::{LibxlKeyValueList, LibxlStringList},
};

/// Upper bound on the number of entries read from a NULL-terminated array.
pub const MAX_LIST_ENTRIES: usize = 1 << 16;

/// Read entries of a NULL-terminated pointer array, at most `limit` of them.
///
/// A null array is empty. Hitting `limit` without meeting the terminator is
/// only an error when `limit` is [`MAX_LIST_ENTRIES`]; a smaller limit is a
/// length reported by libxl.
unsafe fn collect_terminated(
    array: *const *mut c_char,
    limit: usize,
) -> Result<Vec<*mut c_char>, MarshalError> {
    let mut entries = vec![];

    if array.is_null() {
        return Ok(entries);
    }

    for i in 0..limit {
        let entry = *array.add(i);

        if entry.is_null() {
            return Ok(entries);
        }

        entries.push(entry);
    }

    if limit >= MAX_LIST_ENTRIES {
        Err(MarshalError::Unterminated(limit))
    } else {
        Ok(entries)
    }
}

fn to_cstring(s: &str) -> Result<CString, MarshalError> {
    CString::new(s).map_err(|e| MarshalError::InteriorNul(e.nul_position()))
}

/// `libxl_string_list`
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    /// Decode at most `len` entries, stopping early on a terminator.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to at least `len` readable entries, or a
    /// terminated array shorter than that.
    pub unsafe fn from_libxl_bounded(
        raw: &LibxlStringList,
        len: usize,
    ) -> Result<Self, MarshalError> {
        let entries = collect_terminated(raw.0, len.min(MAX_LIST_ENTRIES))?;

        Ok(StringList(
            entries
                .into_iter()
                .filter_map(|entry| string_from_ptr(entry))
                .collect(),
        ))
    }
}

impl<S: Into<String>> FromIterator<S> for StringList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StringList(iter.into_iter().map(Into::into).collect())
    }
}

impl FromLibxl<LibxlStringList> for StringList {
    unsafe fn from_libxl(raw: &LibxlStringList) -> Result<Self, MarshalError> {
        Self::from_libxl_bounded(raw, MAX_LIST_ENTRIES)
    }
}

impl ToLibxl for StringList {
    type Raw = LibxlStringList;

    fn to_libxl(&self) -> Result<Foreign<LibxlStringList>, MarshalError> {
        // Validate everything before allocating anything.
        let strings = self
            .0
            .iter()
            .map(|s| to_cstring(s))
            .collect::<Result<Vec<_>, _>>()?;

        let slots = alloc_zeroed::<*mut c_char>(strings.len() + 1)?;

        // SAFETY: Fresh zeroed array, filled below one entry at a time so that
        //         it is terminated at every step.
        let list = unsafe { Foreign::from_raw(LibxlStringList(slots)) };

        for (i, s) in strings.iter().enumerate() {
            let entry = dup_cstr(s)?;

            // SAFETY: `slots` holds `strings.len() + 1` entries.
            unsafe { *slots.add(i) = entry };
        }

        Ok(list)
    }
}

impl Dispose for LibxlStringList {
    unsafe fn dispose(&mut self) {
        if self.0.is_null() {
            return;
        }

        let mut i = 0;
        while !(*self.0.add(i)).is_null() {
            free(*self.0.add(i));
            i += 1;
        }

        free(self.0);
        self.0 = std::ptr::null_mut();
    }
}

/// `libxl_key_value_list`, in insertion order.
///
/// When a key shows up more than once, the last value wins and the key keeps
/// its first position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyValueList(pub IndexMap<String, String>);

impl KeyValueList {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode at most `pairs` pairs, stopping early on a terminator.
    ///
    /// A null value decodes as an empty string.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to a terminated array, or one holding at
    /// least `2 * pairs` readable entries.
    pub unsafe fn from_libxl_bounded(
        raw: &LibxlKeyValueList,
        pairs: usize,
    ) -> Result<Self, MarshalError> {
        let mut map = IndexMap::new();

        if raw.0.is_null() {
            return Ok(KeyValueList(map));
        }

        for i in 0..pairs.min(MAX_LIST_ENTRIES) {
            let key = *raw.0.add(2 * i);

            let Some(key) = string_from_ptr(key) else {
                return Ok(KeyValueList(map));
            };
            let value = string_from_ptr(*raw.0.add(2 * i + 1)).unwrap_or_default();

            map.insert(key, value);
        }

        if pairs >= MAX_LIST_ENTRIES {
            Err(MarshalError::Unterminated(2 * MAX_LIST_ENTRIES))
        } else {
            Ok(KeyValueList(map))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = KeyValueList::default();
        for (key, value) in iter {
            list.insert(key, value);
        }
        list
    }
}

impl FromLibxl<LibxlKeyValueList> for KeyValueList {
    unsafe fn from_libxl(raw: &LibxlKeyValueList) -> Result<Self, MarshalError> {
        Self::from_libxl_bounded(raw, MAX_LIST_ENTRIES)
    }
}

impl ToLibxl for KeyValueList {
    type Raw = LibxlKeyValueList;

    fn to_libxl(&self) -> Result<Foreign<LibxlKeyValueList>, MarshalError> {
        let pairs = self
            .0
            .iter()
            .map(|(k, v)| Ok((to_cstring(k)?, to_cstring(v)?)))
            .collect::<Result<Vec<_>, MarshalError>>()?;

        let slots = alloc_zeroed::<*mut c_char>(2 * pairs.len() + 1)?;

        // SAFETY: Fresh zeroed array. Keys are written before their value so
        //         a partially filled list still disposes cleanly.
        let list = unsafe { Foreign::from_raw(LibxlKeyValueList(slots)) };

        for (i, (key, value)) in pairs.iter().enumerate() {
            let key = dup_cstr(key)?;
            // SAFETY: `slots` holds `2 * pairs.len() + 1` entries.
            unsafe { *slots.add(2 * i) = key };

            let value = dup_cstr(value)?;
            // SAFETY: Same as above.
            unsafe { *slots.add(2 * i + 1) = value };
        }

        Ok(list)
    }
}

impl Dispose for LibxlKeyValueList {
    unsafe fn dispose(&mut self) {
        if self.0.is_null() {
            return;
        }

        let mut i = 0;
        while !(*self.0.add(i)).is_null() {
            free(*self.0.add(i));
            free(*self.0.add(i + 1));
            i += 2;
        }

        free(self.0);
        self.0 = std::ptr::null_mut();
    }
}
