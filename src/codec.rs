//! Frame payload codecs: the string/comment/popularimeter/picture frame layouts.
//!
//! Every routine here operates on a frame's payload bytes with the outer 10-byte frame header
//! already stripped off.

use crate::error::{Error, FormatError, Result};
use crate::header::Version;
use crate::string::{self, Encoding};

/// A parsed `COMM` comment frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub language: String,
    pub short: String,
    pub long: String,
}

/// A parsed `APIC` attached-picture frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub mime: String,
    pub picture_type: u8,
    pub description: String,
    pub data: Vec<u8>,
}

/// A parsed `POPM` popularimeter frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popularity {
    pub email: String,
    pub rating: u8,
    pub play_count: u64,
}

fn default_encoding(version: Version) -> (Encoding, u8, &'static [u8]) {
    if version.major >= 4 {
        (Encoding::Utf8, 0x03, &[])
    } else {
        (Encoding::Utf16Le, 0x01, &[0xFF, 0xFE])
    }
}

/// Locates the position of a null terminator within `data`. For single-byte encodings, the
/// first zero byte terminates. For double-byte encodings, only a zero pair aligned at an even
/// local offset counts; a misaligned lone zero byte is not a terminator and scanning continues
/// one byte further (not two), matching the historical parser's `++c` behavior on such bytes.
fn find_terminator(data: &[u8], double_byte: bool) -> Result<usize> {
    if !double_byte {
        return data
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Format(FormatError::UnterminatedString));
    }

    let mut i = 0;
    while i + 1 < data.len() {
        if data[i] == 0 && data[i + 1] == 0 && i % 2 == 0 {
            return Ok(i);
        }
        i += 1;
    }
    Err(Error::Format(FormatError::UnterminatedString))
}

fn terminator_width(double_byte: bool) -> usize {
    if double_byte {
        2
    } else {
        1
    }
}

/// Decodes a text frame payload: byte 0 is the encoding byte, the rest is the (possibly
/// BOM-prefixed) string content.
pub fn decode_string(payload: &[u8]) -> Result<String> {
    if payload.is_empty() {
        return Err(Error::Argument("string frame payload is empty".into()));
    }
    let content = &payload[1..];
    let resolved = string::resolve(Some(payload[0]), content)?;
    let body = &content[resolved.bom.len()..];
    Ok(string::decode(resolved.encoding, body)?)
}

/// Encodes `s` using the default encoding for `version` (UTF-16LE with BOM for v2.3, UTF-8
/// without BOM for v2.4).
pub fn encode_string(s: &str, version: Version) -> Vec<u8> {
    let (encoding, byte, bom) = default_encoding(version);
    let mut out = vec![byte];
    out.extend_from_slice(bom);
    out.extend(string::encode(encoding, s));
    out
}

/// Decodes a `COMM` payload: encoding byte, 3-byte language code, null-terminated short
/// description, then the remaining long text.
pub fn decode_comment(payload: &[u8]) -> Result<Comment> {
    if payload.len() < 4 {
        return Err(Error::Argument("comment frame payload is too short".into()));
    }
    let language = payload[1..4].iter().map(|&b| b as char).collect();
    let rest = &payload[4..];
    let resolved = string::resolve(Some(payload[0]), rest)?;
    let double_byte = resolved.encoding.double_byte();
    let body = &rest[resolved.bom.len()..];

    let term_pos = find_terminator(body, double_byte)?;
    let short = string::decode(resolved.encoding, &body[..term_pos])?;

    let mut long_bytes = &body[term_pos + terminator_width(double_byte)..];
    if long_bytes.starts_with(resolved.bom) {
        long_bytes = &long_bytes[resolved.bom.len()..];
    }
    let long = string::decode(resolved.encoding, long_bytes)?;

    Ok(Comment { language, short, long })
}

/// Encodes a `COMM` payload using the default encoding for `version`. The language is padded
/// with trailing spaces (or truncated) to exactly 3 bytes.
pub fn encode_comment(comment: &Comment, version: Version) -> Vec<u8> {
    let (encoding, byte, bom) = default_encoding(version);
    let mut out = vec![byte];

    let mut lang_bytes = comment.language.as_bytes().to_vec();
    lang_bytes.resize(3, b' ');
    lang_bytes.truncate(3);
    out.extend(lang_bytes);

    out.extend_from_slice(bom);
    out.extend(string::encode(encoding, &comment.short));
    out.extend(std::iter::repeat(0u8).take(terminator_width(encoding.double_byte())));
    out.extend_from_slice(bom);
    out.extend(string::encode(encoding, &comment.long));
    out
}

/// Decodes a `POPM` payload: null-terminated ASCII email, one rating byte, then a big-endian
/// play count occupying the remaining bytes (0 if none remain).
pub fn decode_popularity(payload: &[u8]) -> Result<Popularity> {
    let term_pos = find_terminator(payload, false)?;
    let email = string::decode(Encoding::Latin1, &payload[..term_pos])?;

    let rating_pos = term_pos + 1;
    let rating = *payload.get(rating_pos).ok_or_else(|| {
        Error::Format(FormatError::InvalidSize)
    })?;

    let count_bytes = &payload[rating_pos + 1..];
    let mut play_count: u64 = 0;
    for &b in count_bytes.iter().rev().take(8).rev() {
        play_count = (play_count << 8) | b as u64;
    }

    Ok(Popularity { email, rating, play_count })
}

/// Decodes an `APIC` payload: encoding byte, null-terminated ISO-8859-1 MIME type, one picture
/// type byte, null-terminated description in the frame's encoding, then raw picture bytes.
pub fn decode_picture(payload: &[u8]) -> Result<Picture> {
    if payload.is_empty() {
        return Err(Error::Argument("picture frame payload is empty".into()));
    }
    let enc_byte = payload[0];
    let after_enc = &payload[1..];

    let mime_end = find_terminator(after_enc, false)?;
    let mime = string::decode(Encoding::Latin1, &after_enc[..mime_end])?;

    let pic_type_pos = mime_end + 1;
    let picture_type =
        *after_enc.get(pic_type_pos).ok_or_else(|| Error::Format(FormatError::InvalidSize))?;

    let content = &after_enc[pic_type_pos + 1..];
    let resolved = string::resolve(Some(enc_byte), content)?;
    let double_byte = resolved.encoding.double_byte();
    let body = &content[resolved.bom.len()..];

    let desc_end = find_terminator(body, double_byte)?;
    let description = string::decode(resolved.encoding, &body[..desc_end])?;

    let data_start = desc_end + terminator_width(double_byte);
    let data = body[data_start..].to_vec();

    Ok(Picture { mime, picture_type, description, data })
}

/// Encodes an `APIC` payload using the default encoding for `version` for the description.
pub fn encode_picture(picture: &Picture, version: Version) -> Vec<u8> {
    let (encoding, byte, bom) = default_encoding(version);
    let mut out = vec![byte];

    out.extend(string::encode(Encoding::Latin1, &picture.mime));
    out.push(0);
    out.push(picture.picture_type);

    out.extend_from_slice(bom);
    out.extend(string::encode(encoding, &picture.description));
    out.extend(std::iter::repeat(0u8).take(terminator_width(encoding.double_byte())));

    out.extend_from_slice(&picture.data);
    out
}

/// Namespaces the codec free functions as associated functions, matching how callers reach for
/// `Decoder::decode_string(...)` rather than a bare top-level function.
pub struct Decoder;

impl Decoder {
    pub fn decode_string(payload: &[u8]) -> Result<String> {
        decode_string(payload)
    }

    pub fn encode_string(s: &str, version: Version) -> Vec<u8> {
        encode_string(s, version)
    }

    pub fn decode_comment(payload: &[u8]) -> Result<Comment> {
        decode_comment(payload)
    }

    pub fn encode_comment(comment: &Comment, version: Version) -> Vec<u8> {
        encode_comment(comment, version)
    }

    pub fn decode_popularity(payload: &[u8]) -> Result<Popularity> {
        decode_popularity(payload)
    }

    pub fn decode_picture(payload: &[u8]) -> Result<Picture> {
        decode_picture(payload)
    }

    pub fn encode_picture(picture: &Picture, version: Version) -> Vec<u8> {
        encode_picture(picture, version)
    }
}
