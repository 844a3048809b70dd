//! objectGUID reformatting.
//!
//! Active Directory stores objectGUID as 16 raw bytes with the first three
//! GUID fields in little-endian order. This module renders that layout as
//! the canonical hyphenated string form.

use std::fmt::Write;

use crate::error::{DirectoryError, DirectoryResult};

/// Length in bytes of a raw objectGUID value.
pub const GUID_LEN: usize = 16;

/// Input byte index for each output position. The first three fields are
/// stored little-endian and must be reversed; the last two are emitted in
/// storage order.
const BYTE_ORDER: [usize; GUID_LEN] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

/// Format a raw 16-byte objectGUID as its canonical string form
/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` (lowercase hex).
///
/// Values that are not exactly 16 bytes are rejected with
/// [`DirectoryError::InvalidGuid`] rather than silently truncated or padded.
///
/// ```
/// use ldap_session::guid::format_guid;
///
/// let raw = [
///     0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
///     0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
/// ];
/// assert_eq!(format_guid(&raw).unwrap(), "04030201-0605-0807-090a-0b0c0d0e0f10");
/// ```
pub fn format_guid(bytes: &[u8]) -> DirectoryResult<String> {
    if bytes.len() != GUID_LEN {
        return Err(DirectoryError::InvalidGuid {
            length: bytes.len(),
        });
    }

    let mut out = String::with_capacity(36);
    for (pos, &idx) in BYTE_ORDER.iter().enumerate() {
        // Hyphens fall before output bytes 4, 6, 8 and 10.
        if matches!(pos, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{:02x}", bytes[idx]);
    }

    Ok(out)
}
