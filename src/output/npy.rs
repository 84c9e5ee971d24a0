//! NumPy `.npy` persistence for raw feature arrays
//!
//! Writes format version 1.0, little-endian `f32`, C order, shape
//! `(rows, cols)`. The reader accepts what the writer produces plus 1-D
//! arrays and version 2.0 headers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::error::{GraphgenError, Result};
use crate::features::FeatureMatrix;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header (magic + version + length + dict) is padded to this alignment
const HEADER_ALIGN: usize = 64;

/// Build the padded header dictionary for a `rows × cols` f32 array
fn header(rows: usize, cols: usize) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows, cols
    );
    // magic(6) + version(2) + header_len(2)
    let preamble = MAGIC.len() + 2 + 2;
    let unpadded = preamble + dict.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;

    let mut text = dict.into_bytes();
    text.extend(std::iter::repeat(b' ').take(padding));
    text.push(b'\n');
    text
}

/// Persist a feature matrix verbatim
pub fn write_npy(matrix: &FeatureMatrix, path: &Path) -> Result<()> {
    let write_err = |e: std::io::Error| GraphgenError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let dict = header(matrix.rows(), matrix.cols());
    let header_len = u16::try_from(dict.len()).map_err(|_| GraphgenError::InvalidNpy {
        path: path.to_path_buf(),
        reason: format!("header too long ({} bytes)", dict.len()),
    })?;

    writer.write_all(MAGIC).map_err(write_err)?;
    writer.write_all(&[1, 0]).map_err(write_err)?;
    writer.write_all(&header_len.to_le_bytes()).map_err(write_err)?;
    writer.write_all(&dict).map_err(write_err)?;
    for value in matrix.as_slice() {
        writer.write_all(&value.to_le_bytes()).map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;

    debug!(
        "Wrote raw array {}x{} to {}",
        matrix.rows(),
        matrix.cols(),
        path.display()
    );
    Ok(())
}

/// Load a matrix written by `write_npy`
///
/// The sample rate is not stored, so the result carries 0.
pub fn read_npy(path: &Path) -> Result<FeatureMatrix> {
    let read_err = |e: std::io::Error| GraphgenError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    };
    let invalid = |reason: String| GraphgenError::InvalidNpy {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(read_err)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic).map_err(read_err)?;
    if &magic != MAGIC {
        return Err(invalid("bad magic".to_string()));
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version).map_err(read_err)?;
    let header_len = match version[0] {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len).map_err(read_err)?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len).map_err(read_err)?;
            u32::from_le_bytes(len) as usize
        }
        v => return Err(invalid(format!("unsupported version {}", v))),
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header).map_err(read_err)?;
    let header = String::from_utf8_lossy(&header);

    if !header.contains("'descr': '<f4'") {
        return Err(invalid(format!("expected little-endian float32: {}", header.trim())));
    }
    if header.contains("'fortran_order': True") {
        return Err(invalid("fortran order is not supported".to_string()));
    }

    let shape = parse_shape(&header).ok_or_else(|| invalid(format!("bad shape: {}", header.trim())))?;
    let (rows, cols) = match shape.as_slice() {
        [n] => (1, *n),
        [r, c] => (*r, *c),
        other => return Err(invalid(format!("expected 1-D or 2-D array, got {:?}", other))),
    };

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(read_err)?;
    if bytes.len() != rows * cols * 4 {
        return Err(invalid(format!(
            "expected {} data bytes, found {}",
            rows * cols * 4,
            bytes.len()
        )));
    }

    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    FeatureMatrix::from_vec(rows, cols, data, 0)
}

/// Extract the integers of `'shape': (a, b, ...)`
fn parse_shape(header: &str) -> Option<Vec<usize>> {
    let start = header.find("'shape':")?;
    let rest = &header[start..];
    let open = rest.find('(')?;
    let close = rest.find(')')?;

    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}
