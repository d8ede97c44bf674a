//! BCPL-style length-prefixed strings
//!
//! Device names in the mount list are BSTRs: one length byte followed by up to
//! 255 payload bytes, no terminator. Comparison is case-insensitive for ASCII
//! letters only, the same way AmigaDOS matches device names.

use core::fmt;

/// Maximum payload length of a BSTR
pub const MAX_LEN: usize = u8::MAX as usize;

/// Borrowed view of a length-prefixed name
///
/// The wrapped slice always holds the length byte followed by exactly that many
/// payload bytes.
#[derive(Clone, Copy)]
pub struct BStr<'a> {
    raw: &'a [u8],
}

impl<'a> BStr<'a> {
    /// Wrap a length-prefixed buffer
    ///
    /// Returns `None` if the buffer is empty or shorter than its length byte
    /// claims. Bytes past the declared length are ignored.
    pub fn from_prefixed(raw: &'a [u8]) -> Option<Self> {
        let (&len, payload) = raw.split_first()?;
        if payload.len() < len as usize {
            return None;
        }
        Some(Self {
            raw: &raw[..=len as usize],
        })
    }

    /// Wrap a literal such as `b"\x06WB_1.3"`
    ///
    /// # Panics
    /// If the length byte does not match the literal. In a `const` item this is
    /// a compile error.
    pub const fn literal(raw: &'a [u8]) -> Self {
        assert!(
            !raw.is_empty() && raw.len() == raw[0] as usize + 1,
            "BSTR literal length byte does not match payload"
        );
        Self { raw }
    }

    /// Payload length in bytes
    pub const fn len(&self) -> usize {
        self.raw[0] as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.raw[0] == 0
    }

    /// Payload without the length byte
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.raw[1..]
    }

    /// Length byte plus payload, as stored in memory
    pub fn as_prefixed(&self) -> &'a [u8] {
        self.raw
    }

    /// Case-insensitive comparison, see [`names_match`]
    pub fn eq_ignore_case(&self, other: &BStr<'_>) -> bool {
        names_match(self.raw, other.raw)
    }
}

/// Fold an ASCII upper-case letter to lower case by setting bit 5
///
/// Every byte outside `A..=Z` is returned unchanged.
#[inline]
pub const fn fold_ascii(c: u8) -> u8 {
    if c.is_ascii_uppercase() {
        c | 0x20
    } else {
        c
    }
}

/// Compare two length-prefixed buffers case-insensitively
///
/// Differing length bytes are a mismatch before any payload byte is looked at.
/// Empty or truncated buffers never match.
pub fn names_match(a: &[u8], b: &[u8]) -> bool {
    let (Some(&len_a), Some(&len_b)) = (a.first(), b.first()) else {
        return false;
    };
    if len_a != len_b {
        return false;
    }

    let len = len_a as usize;
    if a.len() <= len || b.len() <= len {
        return false;
    }

    a[1..=len]
        .iter()
        .zip(&b[1..=len])
        .all(|(&x, &y)| fold_ascii(x) == fold_ascii(y))
}

impl fmt::Display for BStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.as_bytes() {
            if b == b' ' || b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BStr(\"{}\")", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WB13: BStr<'static> = BStr::literal(b"\x06WB_1.3");

    #[test]
    fn test_fold_ascii_letters_only() {
        for c in 0u8..=255 {
            let expected = if (b'A'..=b'Z').contains(&c) { c + 32 } else { c };
            assert_eq!(fold_ascii(c), expected, "byte {:#04x}", c);
        }
    }

    #[test]
    fn test_from_prefixed_trims_trailing_bytes() {
        let s = BStr::from_prefixed(b"\x03DH0garbage").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.as_bytes(), b"DH0");
        assert_eq!(s.as_prefixed(), b"\x03DH0");
    }

    #[test]
    fn test_from_prefixed_rejects_truncated() {
        assert!(BStr::from_prefixed(b"").is_none());
        assert!(BStr::from_prefixed(b"\x05DH0").is_none());
    }

    #[test]
    fn test_literal_length() {
        assert_eq!(WB13.len(), 6);
        assert!(!WB13.is_empty());
        assert!(BStr::literal(b"\x00").is_empty());
    }

    #[test]
    #[should_panic]
    fn test_literal_bad_length_panics() {
        let _ = BStr::literal(b"\x07WB_1.3");
    }

    #[test]
    fn test_case_variants_match() {
        let payload = b"WB_3.1.4";
        // Every combination of upper/lower case for each letter position
        let letters: Vec<usize> = payload
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .collect();

        for mask in 0u32..(1 << letters.len()) {
            let mut variant = vec![payload.len() as u8];
            variant.extend_from_slice(payload);
            for (bit, &pos) in letters.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    variant[pos + 1] = variant[pos + 1].to_ascii_lowercase();
                }
            }
            assert!(names_match(b"\x08WB_3.1.4", &variant), "{:?}", variant);
        }
    }

    #[test]
    fn test_length_mismatch_is_false() {
        // Same leading bytes, different length byte
        assert!(!names_match(b"\x06WB_3.1", b"\x08WB_3.1.4"));
        // Length differs even though the shorter payload is a prefix
        assert!(!names_match(b"\x05WB_3.", b"\x06WB_3.1"));
    }

    #[test]
    fn test_length_checked_before_payload() {
        // The second buffer's payload is truncated; a length mismatch must not
        // read it at all.
        assert!(!names_match(b"\x06WB_1.3", b"\x09WB"));
    }

    #[test]
    fn test_non_letters_not_folded() {
        // '[' (0x5B) and '{' (0x7B) differ only in bit 5 but are not letters
        assert!(!names_match(b"\x01[", b"\x01{"));
        // '_' and DEL likewise
        assert!(!names_match(b"\x01_", b"\x01\x7f"));
    }

    #[test]
    fn test_different_names() {
        assert!(!names_match(b"\x06WB_1.3", b"\x06WB_2.X"));
        assert!(!names_match(b"", b""));
    }

    #[test]
    fn test_eq_ignore_case() {
        let other = BStr::from_prefixed(b"\x06wb_1.3").unwrap();
        assert!(WB13.eq_ignore_case(&other));
        assert!(other.eq_ignore_case(&WB13));
    }

    #[test]
    fn test_display_escapes() {
        let s = BStr::from_prefixed(b"\x04DH\x010").unwrap();
        assert_eq!(format!("{}", s), "DH\\x010");
        assert_eq!(format!("{:?}", WB13), "BStr(\"WB_1.3\")");
    }
}
