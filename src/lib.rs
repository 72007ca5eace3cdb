//! Reads, mutates, and writes ID3v2 tags (versions 2.3 and 2.4) embedded at the head of MP3
//! files, preserving the audio payload untouched when an edit still fits in the original tag's
//! padding.

#![forbid(unsafe_code)]

mod codec;
mod error;
mod frame;
mod header;
mod io;
mod reader;
mod string;
mod syncdata;
mod tag;
mod writer;

pub use codec::{Comment, Decoder, Picture, Popularity};
pub use error::{Error, FormatError, Result};
pub use frame::{Frame, FrameId};
pub use header::Version;
pub use reader::read_tag;
pub use string::Encoding;
pub use tag::{Padding, TagData};
