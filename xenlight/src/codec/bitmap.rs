use super::{dup_bytes, free, slice_from_len, Dispose, Foreign, FromLibxl, ToLibxl};
use crate::{bitmap::Bitmap, error::MarshalError, ffi::LibxlBitmap};

impl FromLibxl<LibxlBitmap> for Bitmap {
    unsafe fn from_libxl(raw: &LibxlBitmap) -> Result<Self, MarshalError> {
        let bytes = slice_from_len(raw.map, raw.size as usize)?;
        Ok(Bitmap::from_bytes(bytes.to_vec()))
    }
}

impl ToLibxl for Bitmap {
    type Raw = LibxlBitmap;

    fn to_libxl(&self) -> Result<Foreign<LibxlBitmap>, MarshalError> {
        let bytes = self.as_bytes();
        let size =
            u32::try_from(bytes.len()).map_err(|_| MarshalError::LengthOverflow(bytes.len()))?;

        let map = if bytes.is_empty() {
            std::ptr::null_mut()
        } else {
            dup_bytes(bytes)?
        };

        // SAFETY: `map` is null or a fresh C allocation.
        Ok(unsafe { Foreign::from_raw(LibxlBitmap { size, map }) })
    }
}

impl Dispose for LibxlBitmap {
    unsafe fn dispose(&mut self) {
        free(self.map);
        self.map = std::ptr::null_mut();
        self.size = 0;
    }
}
