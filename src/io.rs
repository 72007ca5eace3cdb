use std::error;
use std::fmt;
use std::fs;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Error;

/// How a [`ByteFile`] was opened, mirrored by what operations are legal on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    TruncatingWrite,
    InPlaceUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
}

#[derive(Debug)]
enum RangeError {
    ShortRead { wanted: usize, got: usize },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RangeError::ShortRead { wanted, got } => {
                write!(f, "wanted {} bytes but only read {}", wanted, got)
            }
        }
    }
}

impl error::Error for RangeError {}

fn short_read_error(wanted: usize, got: usize) -> io::Error {
    io::Error::new(ErrorKind::UnexpectedEof, RangeError::ShortRead { wanted, got })
}

/// A positional byte stream over a file on disk.
///
/// Mirrors a single cursor, much like a `std::fs::File`, but also exposes positional
/// (cursor-independent) reads, since the tag writer needs to read the original audio bytes
/// without disturbing the position it is writing the new tag at.
pub struct ByteFile {
    handle: fs::File,
    pos: u64,
}

impl ByteFile {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<ByteFile, Error> {
        let path = path.as_ref();
        let handle = match mode {
            OpenMode::Read => fs::OpenOptions::new().read(true).open(path)?,
            OpenMode::TruncatingWrite => fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?,
            OpenMode::InPlaceUpdate => fs::OpenOptions::new().read(true).write(true).open(path)?,
        };
        Ok(ByteFile { handle, pos: 0 })
    }

    pub fn len(&mut self) -> Result<u64, Error> {
        Ok(self.handle.metadata()?.len())
    }

    /// Reads exactly `length` bytes starting at `offset`, without moving the cursor. Errors if
    /// fewer than `length` bytes are available.
    pub fn read_slice(&mut self, offset: u64, length: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; length];
        self.handle.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        while total < length {
            match self.handle.read(&mut buf[total..])? {
                0 => break,
                n => total += n,
            }
        }
        self.handle.seek(SeekFrom::Start(self.pos))?;
        if total != length {
            return Err(short_read_error(length, total).into());
        }
        Ok(buf)
    }

    /// Writes `bytes` at the current cursor, advancing it.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        self.handle.seek(SeekFrom::Start(self.pos))?;
        self.handle.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(bytes.len())
    }

    pub fn seek(&mut self, delta: i64, origin: SeekOrigin) -> Result<(), Error> {
        let base = match origin {
            SeekOrigin::Start => 0i64,
            SeekOrigin::Current => self.pos as i64,
        };
        let new_pos = base + delta;
        if new_pos < 0 {
            return Err(Error::Argument(format!("seek to negative position {}", new_pos)));
        }
        self.pos = new_pos as u64;
        Ok(())
    }
}

/// Writes `data` to `path`, relocating whatever followed `old_end` in the previous contents of
/// `path` (if any) so that it immediately follows `data` in the new file.
///
/// When `data.len() as u64 == old_end`, the write happens in place with no relocation. This is
/// the primitive behind an in-place tag save: the caller has already arranged for `data` to be
/// exactly the bytes that should occupy `0..old_end`* in the new file (*unless growth forced a
/// full rewrite, in which case `old_end` should be passed as the file's total old length so
/// nothing trailing gets relocated awkwardly — callers needing that should read the audio bytes
/// themselves and append them to `data` instead of relying on this relocation path).
pub fn write_replaced<P: AsRef<Path>>(path: P, data: &[u8], old_end: u64) -> io::Result<()> {
    let path = path.as_ref();
    let existing_len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    if data.len() as u64 == old_end {
        let mut file = fs::OpenOptions::new().create(true).write(true).open(path)?;
        file.write_all(data)?;
        return Ok(());
    }

    let mut kept = Vec::with_capacity(existing_len.saturating_sub(old_end) as usize);
    {
        let mut file = fs::OpenOptions::new().read(true).open(path)?;
        file.seek(SeekFrom::Start(old_end))?;
        file.read_to_end(&mut kept)?;
    }

    let mut file = fs::OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    file.write_all(data)?;
    file.write_all(&kept)?;
    Ok(())
}
