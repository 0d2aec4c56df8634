//! Gzip header rewriting for the original-filename record.
//!
//! The consumer that imports packages expects the gzip member header to
//! carry an FNAME record with a fixed value. `flate2` writes a bare 10-byte
//! header, so the record is spliced in after compression.

use crate::{Error, Result};

/// Original filename recorded in every exported package.
pub const ORIGINAL_NAME: &str = "archtemp.tar";

/// Gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Size of the fixed gzip member header.
pub const HEADER_LEN: usize = 10;

/// Offset of the FLG byte.
const FLAGS_OFFSET: usize = 3;

/// FHCRC flag bit.
pub const FLAG_FHCRC: u8 = 0x02;
/// FEXTRA flag bit.
pub const FLAG_FEXTRA: u8 = 0x04;
/// FNAME flag bit.
pub const FLAG_FNAME: u8 = 0x08;

fn check_header(data: &[u8]) -> Result<u8> {
    if data.len() < HEADER_LEN {
        return Err(Error::InvalidArchive(format!(
            "gzip stream truncated: {} bytes",
            data.len()
        )));
    }
    if data[..2] != GZIP_MAGIC {
        return Err(Error::InvalidArchive(format!(
            "bad gzip magic {:#04x} {:#04x}",
            data[0], data[1]
        )));
    }
    Ok(data[FLAGS_OFFSET])
}

/// Returns the offset where the FNAME field starts (or would start).
fn name_offset(data: &[u8], flags: u8) -> Result<usize> {
    if flags & FLAG_FEXTRA == 0 {
        return Ok(HEADER_LEN);
    }
    let xlen_end = HEADER_LEN + 2;
    if data.len() < xlen_end {
        return Err(Error::InvalidArchive("truncated FEXTRA length".into()));
    }
    let xlen = u16::from_le_bytes([data[HEADER_LEN], data[HEADER_LEN + 1]]) as usize;
    let end = xlen_end + xlen;
    if data.len() < end {
        return Err(Error::InvalidArchive("truncated FEXTRA field".into()));
    }
    Ok(end)
}

/// Returns the length of the NUL-terminated string at `offset`, including the NUL.
fn terminated_len(data: &[u8], offset: usize) -> Result<usize> {
    data[offset..]
        .iter()
        .position(|&b| b == 0)
        .map(|pos| pos + 1)
        .ok_or_else(|| Error::InvalidArchive("unterminated FNAME field".into()))
}

/// Sets the FNAME flag and writes `name` into the gzip header.
///
/// The name is inserted right after the fixed header (after FEXTRA when that
/// field is present) and the rest of the stream is shifted. An existing FNAME
/// record is replaced.
///
/// # Errors
///
/// Returns [`Error::InvalidArchive`] if `data` is not a gzip stream, if
/// `name` contains a NUL byte, or if the header carries a header CRC (which
/// the splice would invalidate).
pub fn inject_original_name(data: &[u8], name: &str) -> Result<Vec<u8>> {
    let flags = check_header(data)?;
    if name.as_bytes().contains(&0) {
        return Err(Error::InvalidArchive(
            "original name contains NUL byte".into(),
        ));
    }
    if flags & FLAG_FHCRC != 0 {
        return Err(Error::InvalidArchive(
            "cannot rewrite a gzip header protected by FHCRC".into(),
        ));
    }

    let offset = name_offset(data, flags)?;
    let skip = if flags & FLAG_FNAME != 0 {
        terminated_len(data, offset)?
    } else {
        0
    };

    let mut out = Vec::with_capacity(data.len() + name.len() + 1);
    out.extend_from_slice(&data[..offset]);
    out[FLAGS_OFFSET] |= FLAG_FNAME;
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(&data[offset + skip..]);
    Ok(out)
}

/// Reads the FNAME record of a gzip stream, if present.
pub fn original_name(data: &[u8]) -> Option<String> {
    let flags = check_header(data).ok()?;
    if flags & FLAG_FNAME == 0 {
        return None;
    }
    let offset = name_offset(data, flags).ok()?;
    let len = terminated_len(data, offset).ok()?;
    // FNAME is ISO-8859-1 by definition
    Some(data[offset..offset + len - 1].iter().map(|&b| b as char).collect())
}
