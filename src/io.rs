//! Readers for the construction input streams (`.head`/`.len`/`.ssam`/
//! `.esam`/`.spos`), the pattern file format, and the binary archive
//! (`.eri`) that `RIndex::serialize`/`RIndex::load` produce and consume.
//!
//! Computing those streams from a prefix-free parse of the source text is
//! out of scope here; this module starts from the point where they already
//! exist as files or in-memory byte buffers.
use std::fs;
use std::io::{BufRead, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::index::RIndex;
use crate::phi::SampleMode;

const MAGIC: &[u8; 4] = b"ERI1";
const FORMAT_VERSION: u8 = 1;

/// Reads a `.head` file: one byte per run, the run's leading character.
pub fn read_heads(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a `.len`/`.ssam`/`.esam`/`.spos`-shaped file: `R` little-endian
/// unsigned integers, each `width` bytes wide (`width` is 4 or 5 in
/// practice).
pub fn read_fixed_width_stream(path: impl AsRef<Path>, width: usize) -> Result<Vec<u64>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() % width != 0 {
        return Err(Error::MalformedStream {
            path: path.to_path_buf(),
            width,
        });
    }
    let mut out = Vec::with_capacity(bytes.len() / width);
    for chunk in bytes.chunks_exact(width) {
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(chunk);
        out.push(u64::from_le_bytes(buf));
    }
    Ok(out)
}

fn as_usize_vec(values: Vec<u64>) -> Vec<usize> {
    values.into_iter().map(|v| v as usize).collect()
}

/// Reads the `.len` file as run lengths.
pub fn read_lengths(path: impl AsRef<Path>, width: usize) -> Result<Vec<u64>> {
    read_fixed_width_stream(path, width)
}

/// Reads the `.ssam`/`.esam`/`.spos` files as gCA positions / offsets.
pub fn read_positions(path: impl AsRef<Path>, width: usize) -> Result<Vec<usize>> {
    read_fixed_width_stream(path, width).map(as_usize_vec)
}

/// Reads pattern records: alternating header/sequence line pairs, in the
/// same loose FASTA-pair shape the construction pipeline's pattern files
/// use. Blank lines are skipped.
pub fn read_patterns<R: BufRead>(reader: R) -> Result<Vec<Vec<u8>>> {
    let mut patterns = Vec::new();
    let mut lines = reader.lines();
    while let Some(header) = lines.next() {
        let header = header?;
        if header.trim().is_empty() {
            continue;
        }
        match lines.next() {
            Some(seq) => {
                let seq = seq?;
                let seq = seq.trim();
                if !seq.is_empty() {
                    patterns.push(seq.as_bytes().to_vec());
                }
            }
            None => break,
        }
    }
    Ok(patterns)
}

/// Writes the `.eri` archive: a small self-describing header (magic,
/// format version, sampling mode) followed by the serialized run-length
/// eBWT and predecessor structure.
pub fn write_archive<W: Write>(mut out: W, index: &RIndex) -> Result<()> {
    out.write_all(MAGIC)?;
    out.write_all(&[FORMAT_VERSION])?;
    let mode_byte = match index.sample_mode() {
        SampleMode::Default => 0u8,
        SampleMode::FirstRotation => 1u8,
    };
    out.write_all(&[mode_byte])?;
    out.write_all(&(index.block_size() as u64).to_le_bytes())?;
    bincode::serialize_into(&mut out, index.rle())?;
    bincode::serialize_into(&mut out, index.phi_ref())?;
    Ok(())
}

/// Loads an archive previously written by `write_archive`.
pub fn read_archive<R: Read>(mut input: R) -> Result<RIndex> {
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic).map_err(|_| Error::TruncatedArchive)?;
    if &magic != MAGIC {
        return Err(Error::BadArchiveHeader);
    }
    let mut version = [0u8; 1];
    input
        .read_exact(&mut version)
        .map_err(|_| Error::TruncatedArchive)?;
    if version[0] != FORMAT_VERSION {
        return Err(Error::BadArchiveHeader);
    }
    let mut mode_byte = [0u8; 1];
    input
        .read_exact(&mut mode_byte)
        .map_err(|_| Error::TruncatedArchive)?;
    let mut block_size_bytes = [0u8; 8];
    input
        .read_exact(&mut block_size_bytes)
        .map_err(|_| Error::TruncatedArchive)?;
    let block_size = u64::from_le_bytes(block_size_bytes) as usize;

    let rle = bincode::deserialize_from(&mut input)?;
    let phi = bincode::deserialize_from(&mut input)?;
    Ok(RIndex::from_parts(rle, phi, block_size))
}
