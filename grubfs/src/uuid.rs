// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{self, Debug, Display, Formatter};
use uefi::data_types::FromStrWithBufError;
use uefi::CStr16;

/// Longest volume UUID string accepted, in characters.
///
/// This fits the canonical `8-4-4-4-12` form.
pub const UUID_MAX_CHARS: usize = 36;

/// Volume UUID converted to a host string.
///
/// The characters live in a fixed buffer inside the value, so no allocation
/// is involved.
#[derive(Clone, Copy)]
pub struct VolumeUuid {
    chars: [u16; UUID_MAX_CHARS + 1],
    len: usize,
}

impl VolumeUuid {
    /// Converts a UUID reported by a driver.
    pub fn new(uuid: &str) -> Result<Self, FromStrWithBufError> {
        let mut chars = [0; UUID_MAX_CHARS + 1];
        let len = CStr16::from_str_with_buf(uuid, &mut chars)?.num_chars();
        Ok(Self { chars, len })
    }

    /// The UUID as a null-terminated UCS-2 string.
    #[must_use]
    pub fn as_cstr16(&self) -> &CStr16 {
        // SAFETY: `chars` was filled by `CStr16::from_str_with_buf`, which
        // validated every character and terminated the string at `len`.
        unsafe { CStr16::from_u16_with_nul_unchecked(&self.chars[..=self.len]) }
    }
}

impl Display for VolumeUuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.as_cstr16(), f)
    }
}

impl Debug for VolumeUuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VolumeUuid")
            .field(&self.as_cstr16())
            .finish()
    }
}

impl PartialEq<str> for VolumeUuid {
    fn eq(&self, other: &str) -> bool {
        self.chars[..self.len]
            .iter()
            .copied()
            .eq(other.encode_utf16())
    }
}
