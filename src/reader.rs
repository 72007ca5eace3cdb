//! `read_tag`: parses a file into a [`TagData`], or synthesizes an empty one when the file
//! carries no ID3v2 header at all.

use std::path::Path;

use log::{info, warn};

use crate::error::{Error, FormatError, Result};
use crate::frame::{Frame, FrameId, FRAME_HEADER_SIZE};
use crate::header::{self, TagHeader};
use crate::io::{ByteFile, OpenMode};
use crate::tag::{Padding, TagData};

pub fn read_tag<P: AsRef<Path>>(path: P) -> Result<TagData> {
    let path = path.as_ref();
    let mut file = ByteFile::open(path, OpenMode::Read)?;
    let len = file.len()?;

    let header_len = len.min(10) as usize;
    let header_bytes =
        if header_len > 0 { file.read_slice(0, header_len)? } else { Vec::new() };

    if header_len < 3 || &header_bytes[0..3] != b"ID3" {
        info!("{} has no ID3v2 header, treating as audio-only", path.display());
        return Ok(TagData::no_header(path.to_path_buf()));
    }

    let mut raw_header = [0u8; 10];
    raw_header[..header_len].copy_from_slice(&header_bytes);
    let header = TagHeader::parse(raw_header)?;

    let content_end = header::TAG_HEADER_SIZE + header.content_size as u64;
    let has_footer = header.has_footer_flag();
    let tag_end = if has_footer { content_end + header::TAG_FOOTER_SIZE } else { content_end };

    let mut frames = Vec::new();
    let mut cursor = header::TAG_HEADER_SIZE;
    let mut padding = Padding { offset: content_end, size: 0 };

    // Frames and padding live in `header_size..content_end`; the footer (if any) is the fixed
    // 10 bytes immediately after and is never scanned for frame headers.
    while cursor < content_end {
        let marker = file.read_slice(cursor, 1)?;
        if marker[0] == 0 {
            padding = Padding { offset: cursor, size: content_end - cursor };
            break;
        }

        if content_end - cursor < FRAME_HEADER_SIZE {
            warn!("truncated frame header at offset {}, treating remainder as padding", cursor);
            padding = Padding { offset: cursor, size: content_end - cursor };
            break;
        }

        let frame_header = file.read_slice(cursor, FRAME_HEADER_SIZE as usize)?;
        let mut id_bytes = [0u8; 4];
        id_bytes.copy_from_slice(&frame_header[0..4]);
        let size = u32::from_be_bytes([
            frame_header[4],
            frame_header[5],
            frame_header[6],
            frame_header[7],
        ]) as u64;
        let flags = u16::from_be_bytes([frame_header[8], frame_header[9]]);

        let payload_offset = cursor + FRAME_HEADER_SIZE;
        if payload_offset + size > content_end {
            return Err(Error::Format(FormatError::InvalidSize));
        }
        let payload = file.read_slice(payload_offset, size as usize)?;

        let mut frame = Frame::new(FrameId::new(id_bytes), payload);
        frame.set_offset(payload_offset);
        frame.set_flags(flags);
        frames.push(frame);

        cursor = payload_offset + size;
    }

    Ok(TagData {
        version: header.version,
        flags: header.flags,
        tag_end,
        frames,
        padding,
        has_footer,
        dirty: false,
        rewrite: false,
        headerless: false,
        audio_offset: tag_end,
        source: Some(path.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use std::io::Write;

    fn write_temp(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("id3kit-reader-test-{}-{}", std::process::id(), name));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn parses_tagless_file_as_audio_only() {
        let path = write_temp("tagless", b"HELLO MP3 AUDIO");
        let tag = read_tag(&path).unwrap();
        assert_eq!(tag.version().major, 3);
        assert_eq!(tag.version().minor, 0);
        assert_eq!(tag.get_frame(FrameId::parse("TALB").unwrap()), None);
        assert_eq!(tag.padding().offset, 10);
        assert_eq!(tag.padding().size, 0);
        assert_eq!(tag.get_audio_bytes().unwrap(), b"HELLO MP3 AUDIO");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn parses_minimal_v23_tag_with_one_frame() {
        let payload: &[u8] =
            &[0x01, 0xFF, 0xFE, b'A', 0, b'l', 0, b'b', 0, b'u', 0, b'm', 0];
        let mut bytes = vec![b'I', b'D', b'3', 3, 0, 0, 0x00, 0x00, 0x00, 23];
        bytes.extend_from_slice(b"TALB");
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(b"AUDIOAUDIO");

        let path = write_temp("one-frame", &bytes);
        let tag = read_tag(&path).unwrap();
        let buf = tag.get_frame_buffer(FrameId::parse("TALB").unwrap()).unwrap();
        assert_eq!(buf, payload);
        assert_eq!(codec::decode_string(buf).unwrap(), "Album");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn parses_v24_tag_with_footer_and_no_padding() {
        // Content fills exactly up to the footer, which must not be mistaken for a frame header
        // whose id happens to start with the footer magic "3DI".
        let payload: &[u8] = &[0x03, b'h', b'i'];
        let content_size = 10 + payload.len() as u32;
        let mut bytes = vec![b'I', b'D', b'3', 4, 0, 0x10];
        bytes.extend_from_slice(&crate::syncdata::from_u28(content_size));
        bytes.extend_from_slice(b"TIT2");
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(b"3DI");
        bytes.extend_from_slice(&[4, 0, 0x10]);
        bytes.extend_from_slice(&crate::syncdata::from_u28(content_size));
        bytes.extend_from_slice(b"AUDIO");

        let path = write_temp("footer", &bytes);
        let tag = read_tag(&path).unwrap();
        assert_eq!(tag.padding().size, 0);
        assert_eq!(
            tag.get_frame_buffer(FrameId::parse("TIT2").unwrap()).unwrap(),
            payload
        );
        assert_eq!(tag.get_audio_bytes().unwrap(), b"AUDIO");
        std::fs::remove_file(&path).unwrap();
    }
}
