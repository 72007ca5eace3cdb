//! The save path: decides between an in-place update (bytes beyond the tag region untouched)
//! and a full rewrite (audio payload relocated), then serializes header, frames, padding,
//! optional footer, and (when relocating) the audio payload, in that strict order.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::io;
use crate::tag::TagData;

pub(crate) fn write_to(tag: &mut TagData, destination: &Path) -> Result<()> {
    let same_file = tag.source.as_deref().map(|src| paths_equal(src, destination)).unwrap_or(false);

    if same_file && !tag.dirty {
        return Ok(());
    }

    tag.check_footer();

    let mut rendered = Vec::new();
    rendered.extend_from_slice(&tag.render_header());
    for frame in &tag.frames {
        rendered.extend_from_slice(&frame.id().inner());
        rendered.extend_from_slice(&(frame.size() as u32).to_be_bytes());
        rendered.extend_from_slice(&frame.flags().to_be_bytes());
        rendered.extend_from_slice(frame.payload());
    }
    rendered.extend(std::iter::repeat(0u8).take(tag.padding.size as usize));
    if tag.has_footer {
        rendered.extend_from_slice(&tag.render_footer());
    }

    if same_file {
        info!(
            "saving {} bytes of tag data in place at {}",
            rendered.len(),
            destination.display()
        );
        io::write_replaced(destination, &rendered, tag.audio_offset)?;
    } else {
        info!("rewriting tag to new destination {}", destination.display());
        let audio = tag.get_audio_bytes()?;
        rendered.extend_from_slice(&audio);
        std::fs::write(destination, &rendered)?;
    }

    // A `write_to` of a different path is a copy: it doesn't change what the bound source holds,
    // so the in-memory tag is still dirty relative to it and `source` must not be rebound to the
    // destination. Only a same-file save settles the tag against what's now on disk.
    if same_file {
        tag.audio_offset = tag.tag_end;
        tag.source = Some(destination.to_path_buf());
        tag.headerless = false;
        tag.dirty = false;
        tag.rewrite = false;
    }

    Ok(())
}

fn paths_equal(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
