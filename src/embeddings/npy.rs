//! Minimal NPY reader for pretrained embedding dumps.
//!
//! Pretrained models arrive as `entity_embeddings.npy` and
//! `relation_embeddings.npy` exported from the training framework with
//! `np.save`. Only the common case is supported: a little-endian float32
//! array saved contiguously. The shape is not taken from the header; callers
//! derive it from the id mapping that accompanies the dump.

use crate::error::{KgevalError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Read the payload of an NPY file as a flat `Vec<f32>`.
pub fn load_npy_f32(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut preamble = [0u8; 8];
    reader.read_exact(&mut preamble)?;
    if &preamble[0..6] != MAGIC {
        return Err(KgevalError::Dataset(format!(
            "{}: not an NPY file (bad magic)",
            path.display()
        )));
    }

    let version = (preamble[6], preamble[7]);
    let header_len = match version {
        (1, 0) => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        (2, 0) | (3, 0) => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
        _ => {
            return Err(KgevalError::Dataset(format!(
                "{}: unsupported NPY version {}.{}",
                path.display(),
                version.0,
                version.1
            )))
        }
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header)?;
    let header = String::from_utf8_lossy(&header);
    if !header.contains("<f4") {
        return Err(KgevalError::Dataset(format!(
            "{}: expected little-endian float32 ('<f4'), got header {}",
            path.display(),
            header.trim_end()
        )));
    }
    if header.contains("'fortran_order': True") {
        return Err(KgevalError::Dataset(format!(
            "{}: fortran-order arrays are not supported",
            path.display()
        )));
    }

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() % 4 != 0 {
        return Err(KgevalError::Dataset(format!(
            "{}: payload of {} bytes is not a whole number of f32 values",
            path.display(),
            payload.len()
        )));
    }

    Ok(payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
