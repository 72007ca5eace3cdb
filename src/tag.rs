//! `TagData`: the in-memory model of a parsed (or synthesized) tag, and the frame-list
//! invariant maintenance (`realign_frames`) that keeps offsets, padding, and `tag_end`
//! consistent across mutation.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::frame::{Frame, FrameId, FRAME_HEADER_SIZE};
use crate::header::{self, TagHeader, Version};

/// The (offset, size) of the zero-byte padding region between the last frame and the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub offset: u64,
    pub size: u64,
}

/// The central object: a tag's header fields, its ordered frame list, its padding, and the
/// bookkeeping state the writer needs to decide between an in-place update and a full rewrite.
#[derive(Debug)]
pub struct TagData {
    pub(crate) version: Version,
    pub(crate) flags: u8,
    /// The byte offset one past the tag region (header + frames + padding + optional footer).
    pub(crate) tag_end: u64,
    pub(crate) frames: Vec<Frame>,
    pub(crate) padding: Padding,
    pub(crate) has_footer: bool,
    pub(crate) dirty: bool,
    pub(crate) rewrite: bool,
    /// True when this `TagData` was synthesized for a file with no real ID3v2 header: any
    /// save must perform a full rewrite, since there is no existing tag region to grow into.
    pub(crate) headerless: bool,
    /// Where the audio payload actually begins in the source file.
    pub(crate) audio_offset: u64,
    pub(crate) source: Option<PathBuf>,
}

impl TagData {
    /// Synthesizes an empty tag for a file with no ID3v2 header: zero frames, zero padding, and
    /// an audio region spanning the whole file.
    pub fn no_header<P: Into<PathBuf>>(audio_path: P) -> TagData {
        TagData {
            version: Version::V3,
            flags: 0,
            tag_end: header::TAG_HEADER_SIZE,
            frames: Vec::new(),
            padding: Padding { offset: header::TAG_HEADER_SIZE, size: 0 },
            has_footer: false,
            dirty: false,
            rewrite: false,
            headerless: true,
            audio_offset: 0,
            source: Some(audio_path.into()),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn needs_rewrite(&self) -> bool {
        self.rewrite
    }

    /// True when this tag was synthesized for a file with no real ID3v2 header present.
    pub fn is_headerless(&self) -> bool {
        self.headerless
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn tag_end(&self) -> u64 {
        self.tag_end
    }

    pub fn audio_offset(&self) -> u64 {
        self.audio_offset
    }

    /// The first frame in order with a matching id.
    pub fn get_frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    /// All frames in order with a matching id.
    pub fn get_frames(&self, id: FrameId) -> Vec<&Frame> {
        self.frames.iter().filter(|f| f.id() == id).collect()
    }

    pub fn get_frame_buffer(&self, id: FrameId) -> Option<&[u8]> {
        self.get_frame(id).map(Frame::payload)
    }

    pub fn get_frame_buffers(&self, id: FrameId) -> Vec<&[u8]> {
        self.get_frames(id).into_iter().map(Frame::payload).collect()
    }

    /// Sets the payload of the (assumed unique) frame with `id`, creating it if absent.
    pub fn set_frame_buffer(&mut self, id: FrameId, bytes: Vec<u8>) {
        self.reallocate_frame(id, bytes);
    }

    /// Removes every frame with `id`. Realigns the remaining frames if anything was removed.
    pub fn remove_frame(&mut self, id: FrameId) {
        let before = self.frames.len();
        self.frames.retain(|f| f.id() != id);
        if self.frames.len() != before {
            self.dirty = true;
            self.realign_frames();
        }
    }

    fn reallocate_frame(&mut self, id: FrameId, bytes: Vec<u8>) {
        if let Some(frame) = self.frames.iter_mut().find(|f| f.id() == id) {
            if frame.payload() == bytes.as_slice() {
                return;
            }
            let old_size = frame.size();
            frame.set_payload(bytes);
            self.dirty = true;
            if frame.size() != old_size {
                self.realign_frames();
            }
        } else {
            self.allocate_frame(id, bytes);
        }
    }

    fn allocate_frame(&mut self, id: FrameId, bytes: Vec<u8>) {
        // A headerless tag's bookkeeping padding (offset 10, size 0) never corresponds to real
        // bytes in the source file, so the first frame added always overruns it and
        // `realign_frames` naturally forces `rewrite = true` and grows `tag_end` to match.
        self.frames.push(Frame::allocate(id, bytes));
        self.dirty = true;
        self.realign_frames();
    }

    /// Walks the frame list, reassigning each frame's offset and reflowing padding.size to
    /// absorb whatever the frame list's total size changed by. If the frame list has grown past
    /// the available padding, `tag_end` grows to cover the shortfall and `rewrite` is set — the
    /// writer must then relocate the audio payload on save.
    fn realign_frames(&mut self) {
        let mut cursor = header::TAG_HEADER_SIZE;
        for frame in &mut self.frames {
            frame.set_offset(cursor + FRAME_HEADER_SIZE);
            cursor += FRAME_HEADER_SIZE + frame.size();
        }

        let delta = cursor as i64 - self.padding.offset as i64;
        self.padding.offset = cursor;
        let mut new_padding_size = self.padding.size as i64 - delta;
        if new_padding_size < 0 {
            let shortfall = (-new_padding_size) as u64;
            self.tag_end += shortfall;
            self.rewrite = true;
            new_padding_size = 0;
            info!("frame list grew past available padding by {} bytes, rewrite required", shortfall);
        }
        self.padding.size = new_padding_size as u64;
        self.dirty = true;
    }

    /// A footer and non-zero padding are mutually exclusive on output: if padding exists, the
    /// footer is discarded into it. Idempotent.
    pub(crate) fn check_footer(&mut self) {
        if self.has_footer && self.padding.size > 0 {
            warn!("discarding v2.4 footer in favor of {} bytes of padding", self.padding.size);
            self.padding.size += header::TAG_FOOTER_SIZE;
            self.has_footer = false;
            self.flags &= !header::FLAG_FOOTER;
        }
    }

    /// `tag_end` minus the header (and footer, if present) — the synsafe-encoded content size.
    pub(crate) fn content_size(&self) -> u64 {
        self.tag_end
            - header::TAG_HEADER_SIZE
            - if self.has_footer { header::TAG_FOOTER_SIZE } else { 0 }
    }

    pub(crate) fn render_header(&self) -> [u8; 10] {
        TagHeader { version: self.version, flags: self.flags, content_size: self.content_size() as u32 }
            .render()
    }

    pub(crate) fn render_footer(&self) -> [u8; 10] {
        header::render_footer(self.version, self.flags, self.content_size() as u32)
    }

    /// Reads the audio payload from the bound source file.
    pub fn get_audio_bytes(&self) -> Result<Vec<u8>> {
        let path = self
            .source
            .as_ref()
            .ok_or_else(|| Error::State("tag has no bound source file".into()))?;
        let mut file = crate::io::ByteFile::open(path, crate::io::OpenMode::Read)?;
        let len = file.len()?;
        if len <= self.audio_offset {
            return Ok(Vec::new());
        }
        file.read_slice(self.audio_offset, (len - self.audio_offset) as usize)
    }

    /// Saves back to the bound source path.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| Error::State("tag has no bound source file to save to".into()))?;
        crate::writer::write_to(self, &path)
    }

    /// Saves to `path`, which may differ from the bound source.
    pub fn write_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        crate::writer::write_to(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> FrameId {
        FrameId::parse(s).unwrap()
    }

    fn base_tag() -> TagData {
        TagData {
            version: Version::V3,
            flags: 0,
            tag_end: header::TAG_HEADER_SIZE,
            frames: Vec::new(),
            padding: Padding { offset: header::TAG_HEADER_SIZE, size: 0 },
            has_footer: false,
            dirty: false,
            rewrite: false,
            headerless: false,
            audio_offset: header::TAG_HEADER_SIZE,
            source: None,
        }
    }

    #[test]
    fn allocate_frame_realigns_and_marks_dirty() {
        let mut tag = base_tag();
        tag.allocate_frame(id("TALB"), vec![1, 2, 3]);
        assert!(tag.dirty);
        let frame = tag.get_frame(id("TALB")).unwrap();
        assert_eq!(frame.offset(), header::TAG_HEADER_SIZE + FRAME_HEADER_SIZE);
        assert_eq!(tag.padding.offset, header::TAG_HEADER_SIZE + FRAME_HEADER_SIZE + 3);
        assert_eq!(tag.padding.size, 0);
    }

    #[test]
    fn set_frame_buffer_with_identical_payload_does_not_mark_dirty() {
        let mut tag = base_tag();
        tag.allocate_frame(id("TALB"), vec![1, 2, 3]);
        tag.dirty = false;
        tag.set_frame_buffer(id("TALB"), vec![1, 2, 3]);
        assert!(!tag.dirty);
    }

    #[test]
    fn shrinking_a_frame_grows_padding() {
        let mut tag = base_tag();
        tag.allocate_frame(id("TALB"), vec![0; 14]);
        tag.padding.size = 0;
        tag.set_frame_buffer(id("TALB"), vec![0; 5]);
        assert_eq!(tag.padding.size, 9);
        assert!(!tag.rewrite);
    }

    #[test]
    fn growing_past_padding_forces_rewrite_and_grows_tag_end() {
        let mut tag = base_tag();
        tag.allocate_frame(id("TALB"), vec![0; 4]);
        tag.padding.size = 4;
        let old_tag_end = tag.tag_end;
        tag.set_frame_buffer(id("TALB"), vec![0; 14]);
        assert!(tag.rewrite);
        assert_eq!(tag.tag_end, old_tag_end + 6);
        assert_eq!(tag.padding.size, 0);
    }

    #[test]
    fn remove_frame_realigns_remaining_frames() {
        let mut tag = base_tag();
        tag.allocate_frame(id("TALB"), vec![0; 4]);
        tag.allocate_frame(id("TIT2"), vec![0; 6]);
        tag.remove_frame(id("TALB"));
        assert!(tag.get_frame(id("TALB")).is_none());
        let remaining = tag.get_frame(id("TIT2")).unwrap();
        assert_eq!(remaining.offset(), header::TAG_HEADER_SIZE + FRAME_HEADER_SIZE);
    }

    #[test]
    fn check_footer_discards_footer_into_padding() {
        let mut tag = base_tag();
        tag.has_footer = true;
        tag.flags |= header::FLAG_FOOTER;
        tag.padding.size = 20;
        tag.check_footer();
        assert!(!tag.has_footer);
        assert_eq!(tag.flags & header::FLAG_FOOTER, 0);
        assert_eq!(tag.padding.size, 30);
    }

    #[test]
    fn check_footer_is_idempotent() {
        let mut tag = base_tag();
        tag.has_footer = true;
        tag.padding.size = 20;
        tag.check_footer();
        let after_first = (tag.has_footer, tag.padding.size);
        tag.check_footer();
        assert_eq!((tag.has_footer, tag.padding.size), after_first);
    }
}
