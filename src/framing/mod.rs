//! JSON array framing shared by the packer and its tests.
//!
//! A chunk on the wire is `[` + comma-separated request objects + `]`. The
//! helpers here compute framed lengths without building the buffer so the
//! packer can test membership with plain arithmetic.

use bytes::{BufMut, BytesMut};

/// Opening bracket of a chunk.
pub const ARRAY_OPEN: u8 = b'[';
/// Closing bracket of a chunk.
pub const ARRAY_CLOSE: u8 = b']';
/// Separator between two request objects.
pub const SEPARATOR: u8 = b',';
/// Bytes contributed by the two brackets.
pub const FRAMING_OVERHEAD: usize = 2;

/// Length of `[` + element + `]`, or `None` on overflow.
#[must_use]
pub const fn wrapped_len(element_len: usize) -> Option<usize> {
    element_len.checked_add(FRAMING_OVERHEAD)
}

/// Length of the array joining elements of the given lengths.
///
/// An empty input yields the two-byte `[]`. Returns `None` on overflow.
///
/// # Examples
///
/// ```
/// use plcrpc::framing::joined_len;
///
/// assert_eq!(joined_len([40, 40, 40]), Some(124));
/// assert_eq!(joined_len([]), Some(2));
/// ```
#[must_use]
pub fn joined_len<I>(element_lens: I) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut total = FRAMING_OVERHEAD;
    for (index, len) in element_lens.into_iter().enumerate() {
        let separator = usize::from(index > 0);
        total = total.checked_add(len)?.checked_add(separator)?;
    }
    Some(total)
}

/// Join elements into a JSON array buffer.
#[must_use]
pub fn join_array<'a, I>(elements: I) -> BytesMut
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut buf = BytesMut::new();
    buf.put_u8(ARRAY_OPEN);
    for (index, element) in elements.into_iter().enumerate() {
        if index > 0 {
            buf.put_u8(SEPARATOR);
        }
        buf.put_slice(element);
    }
    buf.put_u8(ARRAY_CLOSE);
    buf
}

#[cfg(kani)]
mod kani;
