//! On-disk format for the flat vector index and its chunk metadata.
//!
//! Index artifact layout (little-endian):
//!
//! ```text
//! magic    4 bytes   "LXVI"
//! version  u32       FORMAT_VERSION
//! dim      u32       vector dimension
//! count    u64       number of vectors
//! data     count * dim * f32, row-major
//! ```
//!
//! The metadata artifact is a JSON array of chunk texts in insertion order.
//! Artifacts are written to sibling `.tmp` files and renamed into place.
//! [`write_index`] replaces both artifacts or neither.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::VectorError;

pub const MAGIC: [u8; 4] = *b"LXVI";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 4 + 4 + 4 + 8;

const F32_LEN: usize = std::mem::size_of::<f32>();

/// Flat vector data read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVectors {
    pub dimension: usize,
    pub count: usize,
    pub data: Vec<f32>,
}

/// Write `data` (count * dimension floats) to the index artifact.
pub fn write_vectors(path: &Path, dimension: usize, data: &[f32]) -> Result<(), VectorError> {
    let tmp = write_temp(path, encode_vectors(dimension, data)?)?;
    commit(&tmp, path)
}

/// Replace the index and metadata artifacts together.
///
/// Both temp files are written before anything is renamed. When the metadata
/// rename fails, the previous index artifact is restored.
pub fn write_index(
    index_path: &Path,
    dimension: usize,
    data: &[f32],
    metadata_path: &Path,
    texts: &[String],
) -> Result<(), VectorError> {
    let vectors_tmp = write_temp(index_path, encode_vectors(dimension, data)?)?;
    let metadata_tmp = match encode_metadata(metadata_path, texts)
        .and_then(|bytes| write_temp(metadata_path, bytes))
    {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&vectors_tmp);
            return Err(e);
        }
    };

    let backup = sibling(index_path, ".bak");
    let had_previous = index_path.exists();
    if had_previous {
        if let Err(source) = fs::rename(index_path, &backup) {
            let _ = fs::remove_file(&vectors_tmp);
            let _ = fs::remove_file(&metadata_tmp);
            return Err(io_error(index_path, source));
        }
    }

    let restore = || {
        if had_previous {
            let _ = fs::rename(&backup, index_path);
        } else {
            let _ = fs::remove_file(index_path);
        }
    };

    if let Err(source) = fs::rename(&vectors_tmp, index_path) {
        restore();
        let _ = fs::remove_file(&vectors_tmp);
        let _ = fs::remove_file(&metadata_tmp);
        return Err(io_error(index_path, source));
    }
    if let Err(source) = fs::rename(&metadata_tmp, metadata_path) {
        restore();
        let _ = fs::remove_file(&metadata_tmp);
        return Err(io_error(metadata_path, source));
    }

    if had_previous {
        let _ = fs::remove_file(&backup);
    }
    Ok(())
}

fn encode_vectors(dimension: usize, data: &[f32]) -> Result<Vec<u8>, VectorError> {
    let count = if dimension == 0 { 0 } else { data.len() / dimension };
    let dim = u32::try_from(dimension).map_err(|_| VectorError::InvalidDimension(dimension))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + data.len() * F32_LEN);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&dim.to_le_bytes());
    bytes.extend_from_slice(&(count as u64).to_le_bytes());
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

/// Read and validate the index artifact.
pub fn read_vectors(path: &Path) -> Result<StoredVectors, VectorError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    // SAFETY: the artifact is only replaced by rename, never modified in place,
    // and the mapping is dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| io_error(path, source))?;

    let corrupt = |reason: String| VectorError::CorruptIndex {
        path: path.to_path_buf(),
        reason,
    };

    if mmap.len() < HEADER_LEN {
        return Err(corrupt(format!(
            "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
            mmap.len()
        )));
    }
    if mmap[0..4] != MAGIC {
        return Err(corrupt("bad magic bytes".to_string()));
    }
    let version = u32::from_le_bytes(le_bytes(&mmap[4..8]));
    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }
    let dimension = u32::from_le_bytes(le_bytes(&mmap[8..12])) as usize;
    let count = u64::from_le_bytes(le_bytes(&mmap[12..20]));
    if dimension == 0 {
        return Err(corrupt("stored dimension is zero".to_string()));
    }

    let expected_len = usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(dimension))
        .and_then(|floats| floats.checked_mul(F32_LEN))
        .and_then(|bytes| bytes.checked_add(HEADER_LEN))
        .ok_or_else(|| corrupt(format!("vector count {count} overflows")))?;
    if mmap.len() != expected_len {
        return Err(corrupt(format!(
            "expected {expected_len} bytes for {count} vectors of dimension {dimension}, found {}",
            mmap.len()
        )));
    }

    let data = mmap[HEADER_LEN..]
        .chunks_exact(F32_LEN)
        .map(|bytes| f32::from_le_bytes(le_bytes(bytes)))
        .collect();

    Ok(StoredVectors {
        dimension,
        count: count as usize,
        data,
    })
}

/// Write chunk texts as a JSON array.
pub fn write_metadata(path: &Path, texts: &[String]) -> Result<(), VectorError> {
    let tmp = write_temp(path, encode_metadata(path, texts)?)?;
    commit(&tmp, path)
}

fn encode_metadata(path: &Path, texts: &[String]) -> Result<Vec<u8>, VectorError> {
    serde_json::to_vec(texts).map_err(|source| VectorError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the chunk texts written by [`write_metadata`].
pub fn read_metadata(path: &Path) -> Result<Vec<String>, VectorError> {
    let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
    serde_json::from_slice(&bytes).map_err(|source| VectorError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

fn le_bytes<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn io_error(path: &Path, source: std::io::Error) -> VectorError {
    VectorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

/// Write `bytes` to the `.tmp` sibling of `path`, synced to disk.
fn write_temp(path: &Path, bytes: Vec<u8>) -> Result<PathBuf, VectorError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }
    }

    let tmp = temp_path(path);
    let result = File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    });
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(path, source));
    }
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<(), VectorError> {
    fs::rename(tmp, path).map_err(|source| {
        let _ = fs::remove_file(tmp);
        io_error(path, source)
    })
}
