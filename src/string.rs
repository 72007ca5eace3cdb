//! Byte/string conversion for the four text encodings ID3v2 frame payloads carry, plus
//! resolution of the leading encoding byte and any BOM into a concrete encoding.

use crate::error::FormatError;

/// A concrete text encoding, as distinct from the raw encoding byte a frame payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Latin1,
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    /// Whether null terminators and code units in this encoding are two bytes wide.
    pub fn double_byte(self) -> bool {
        matches!(self, Encoding::Utf16Le | Encoding::Utf16Be)
    }
}

/// The outcome of resolving a frame's encoding byte (and, for the BOM-bearing byte 0x01, its
/// leading bytes) to a concrete encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEncoding {
    pub encoding: Encoding,
    pub bom: &'static [u8],
}

/// Resolves an encoding byte (`None` defaults to 0x01) and the bytes that would follow it to a
/// concrete encoding. For byte 0x01, sniffs `content` for a BOM: UTF-16LE `[FF FE]`, UTF-16BE
/// `[FE FF]`, UTF-8 `[EF BB BF]`, and otherwise falls back to bare UTF-8 with no BOM consumed.
pub fn resolve(byte: Option<u8>, content: &[u8]) -> Result<ResolvedEncoding, FormatError> {
    let byte = byte.unwrap_or(0x01);
    let resolved = match byte {
        0x00 => ResolvedEncoding { encoding: Encoding::Latin1, bom: &[] },
        0x01 => {
            if content.starts_with(&[0xFF, 0xFE]) {
                ResolvedEncoding { encoding: Encoding::Utf16Le, bom: &[0xFF, 0xFE] }
            } else if content.starts_with(&[0xFE, 0xFF]) {
                ResolvedEncoding { encoding: Encoding::Utf16Be, bom: &[0xFE, 0xFF] }
            } else if content.starts_with(&[0xEF, 0xBB, 0xBF]) {
                ResolvedEncoding { encoding: Encoding::Utf8, bom: &[0xEF, 0xBB, 0xBF] }
            } else {
                ResolvedEncoding { encoding: Encoding::Utf8, bom: &[] }
            }
        }
        0x02 => ResolvedEncoding { encoding: Encoding::Utf16Be, bom: &[] },
        0x03 => ResolvedEncoding { encoding: Encoding::Utf8, bom: &[] },
        other => return Err(FormatError::UnknownEncodingByte(other)),
    };
    Ok(resolved)
}

/// Decodes `bytes` (with any BOM already stripped by the caller) as `encoding`.
pub fn decode(encoding: Encoding, bytes: &[u8]) -> Result<String, FormatError> {
    match encoding {
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        Encoding::Utf8 => {
            std::str::from_utf8(bytes).map(str::to_owned).map_err(|_| FormatError::InvalidEncoding)
        }
        Encoding::Utf16Le => decode_utf16le(bytes),
        Encoding::Utf16Be => {
            let mut swapped = bytes.to_vec();
            for pair in swapped.chunks_mut(2) {
                if pair.len() == 2 {
                    pair.swap(0, 1);
                }
            }
            decode_utf16le(&swapped)
        }
    }
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, FormatError> {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [lo, hi] => u16::from_le_bytes([*lo, *hi]),
            [lo] => *lo as u16,
            _ => unreachable!(),
        })
        .collect();
    char::decode_utf16(units.into_iter())
        .collect::<Result<String, _>>()
        .map_err(|_| FormatError::InvalidEncoding)
}

/// Encodes `s` in `encoding`, emitting raw code units with no BOM. `encoding` must be one of the
/// three output encodings (ISO-8859-1, UTF-8, UTF-16LE) — UTF-16BE is a decode-only source
/// encoding.
pub fn encode(encoding: Encoding, s: &str) -> Vec<u8> {
    match encoding {
        Encoding::Latin1 => {
            s.chars().map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' }).collect()
        }
        Encoding::Utf8 => s.as_bytes().to_vec(),
        Encoding::Utf16Le => {
            let mut out = Vec::with_capacity(s.len() * 2);
            for unit in s.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        Encoding::Utf16Be => {
            let mut out = Vec::with_capacity(s.len() * 2);
            for unit in s.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_LATIN1: &[u8] = b"Caf\xE9";
    const DATA_UTF8: &[u8] = "Café".as_bytes();

    #[test]
    fn decodes_latin1() {
        assert_eq!(decode(Encoding::Latin1, DATA_LATIN1).unwrap(), "Caf\u{e9}");
    }

    #[test]
    fn decodes_utf8() {
        assert_eq!(decode(Encoding::Utf8, DATA_UTF8).unwrap(), "Café");
    }

    #[test]
    fn round_trips_utf16le() {
        let encoded = encode(Encoding::Utf16Le, "Album");
        assert_eq!(decode(Encoding::Utf16Le, &encoded).unwrap(), "Album");
    }

    #[test]
    fn utf16be_decodes_via_byte_swap_to_le() {
        let le = encode(Encoding::Utf16Le, "Hi");
        let mut be = le.clone();
        for pair in be.chunks_mut(2) {
            pair.swap(0, 1);
        }
        assert_eq!(decode(Encoding::Utf16Be, &be).unwrap(), "Hi");
    }

    #[test]
    fn latin1_encode_substitutes_unrepresentable_chars() {
        assert_eq!(encode(Encoding::Latin1, "a€b"), b"a?b");
    }

    #[test]
    fn resolve_sniffs_bom_for_byte_0x01() {
        let le = resolve(Some(0x01), &[0xFF, 0xFE, b'h', 0]).unwrap();
        assert_eq!(le.encoding, Encoding::Utf16Le);
        assert_eq!(le.bom, &[0xFF, 0xFE]);

        let be = resolve(Some(0x01), &[0xFE, 0xFF, 0, b'h']).unwrap();
        assert_eq!(be.encoding, Encoding::Utf16Be);

        let utf8_bom = resolve(Some(0x01), &[0xEF, 0xBB, 0xBF, b'h']).unwrap();
        assert_eq!(utf8_bom.encoding, Encoding::Utf8);
        assert_eq!(utf8_bom.bom, &[0xEF, 0xBB, 0xBF]);

        let fallback = resolve(Some(0x01), b"hi").unwrap();
        assert_eq!(fallback.encoding, Encoding::Utf8);
        assert!(fallback.bom.is_empty());
    }

    #[test]
    fn resolve_defaults_to_0x01_when_absent() {
        let resolved = resolve(None, &[0xFF, 0xFE]).unwrap();
        assert_eq!(resolved.encoding, Encoding::Utf16Le);
    }

    #[test]
    fn resolve_rejects_unknown_byte() {
        assert_eq!(resolve(Some(0x7F), b"").unwrap_err(), FormatError::UnknownEncodingByte(0x7F));
    }
}
