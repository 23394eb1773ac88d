use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::status::{CspError, CspResult};

/// Character encodings of string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Charset {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// ISO-8859-1, one octet per character.
    Latin1,
}

impl Charset {
    /// Encodes `text`, without terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_base::type_traits::Charset;
    ///
    /// assert_eq!(Charset::Utf8.encode("añ").unwrap().len(), 3);
    /// assert_eq!(Charset::Utf16Be.encode("añ").unwrap().as_ref(), [0, b'a', 0, 0xF1]);
    /// assert!(Charset::Latin1.encode("€").is_err());
    /// ```
    pub fn encode(self, text: &str) -> CspResult<Cow<'_, [u8]>> {
        let bytes = match self {
            Charset::Utf8 => return Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Charset::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Charset::Utf32Le => text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
            Charset::Utf32Be => text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
            Charset::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(c).map_err(|_| {
                        CspError::invalid(format!("character {c:?} is not representable in Latin-1"))
                    })
                })
                .collect::<CspResult<Vec<u8>>>()?,
        };
        Ok(Cow::Owned(bytes))
    }

    /// Decodes octets written by [`Charset::encode`].
    pub fn decode(self, bytes: &[u8]) -> CspResult<String> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| CspError::corrupted(format!("invalid UTF-8 string: {e}"))),
            Charset::Utf16Le | Charset::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(CspError::corrupted("odd octet length of UTF-16 string"));
                }
                let units = bytes.chunks_exact(2).map(|raw| {
                    let raw = [raw[0], raw[1]];
                    if self == Charset::Utf16Le {
                        u16::from_le_bytes(raw)
                    } else {
                        u16::from_be_bytes(raw)
                    }
                });
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|e| CspError::corrupted(format!("invalid UTF-16 string: {e}")))
            }
            Charset::Utf32Le | Charset::Utf32Be => {
                if bytes.len() % 4 != 0 {
                    return Err(CspError::corrupted("UTF-32 string length is not a multiple of 4"));
                }
                bytes
                    .chunks_exact(4)
                    .map(|raw| {
                        let raw = [raw[0], raw[1], raw[2], raw[3]];
                        let code = if self == Charset::Utf32Le {
                            u32::from_le_bytes(raw)
                        } else {
                            u32::from_be_bytes(raw)
                        };
                        char::from_u32(code).ok_or_else(|| {
                            CspError::corrupted(format!("invalid UTF-32 code point {code:#x}"))
                        })
                    })
                    .collect()
            }
            Charset::Latin1 => Ok(bytes.iter().map(|b| char::from(*b)).collect()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
