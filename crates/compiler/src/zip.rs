// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal store-only ZIP reader and writer.
//!
//! Bundles are plain ZIP archives with compression method 0 (store): a
//! local file header per entry followed by the raw bytes, a central
//! directory mirroring the entries, and an end-of-central-directory
//! record. All multi-byte integers are little-endian.
//!
//! Reading locates the end record by scanning backward for its signature
//! (bounded by the maximum comment length), then walks the central
//! directory. Anything other than stored entries is rejected.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::{Error, Result};

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_DIRECTORY_FILE_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_RECORD_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = 0xffff;

/// One named blob inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ZipEntry {
    /// Creates an entry from a name and raw bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        ZipEntry { name: name.into(), data }
    }
}

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xedb8_8320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = build_crc_table();

/// CRC-32 (IEEE 802.3 polynomial) over a byte slice.
fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &byte in data {
        crc = CRC_TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    crc ^ 0xffff_ffff
}

/// Encodes an instant into MS-DOS time and date words.
fn dos_time_date(at: DateTime<Utc>) -> (u16, u16) {
    let year = at.year().max(1980) as u16;
    let time =
        ((at.hour() as u16 & 0x1f) << 11) | ((at.minute() as u16 & 0x3f) << 5) | ((at.second() as u16 & 0x3f) / 2);
    let date = (((year - 1980) & 0x7f) << 9) | ((at.month() as u16 & 0x0f) << 5) | (at.day() as u16 & 0x1f);
    (time, date)
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Writes a store-only archive containing the given entries, in order.
///
/// `modified` becomes every entry's DOS timestamp, so identical inputs
/// produce identical archives.
pub fn create_zip(entries: &[ZipEntry], modified: DateTime<Utc>) -> Vec<u8> {
    let (dos_time, dos_date) = dos_time_date(modified);

    let mut local = Vec::new();
    let mut central = Vec::new();

    for entry in entries {
        let name = entry.name.as_bytes();
        let crc = crc32(&entry.data);
        let size = entry.data.len() as u32;
        let offset = local.len() as u32;

        push_u32(&mut local, LOCAL_FILE_HEADER_SIGNATURE);
        push_u16(&mut local, 20); // version needed to extract
        push_u16(&mut local, 0); // flags
        push_u16(&mut local, 0); // compression: store
        push_u16(&mut local, dos_time);
        push_u16(&mut local, dos_date);
        push_u32(&mut local, crc);
        push_u32(&mut local, size); // compressed
        push_u32(&mut local, size); // uncompressed
        push_u16(&mut local, name.len() as u16);
        push_u16(&mut local, 0); // extra length
        local.extend_from_slice(name);
        local.extend_from_slice(&entry.data);

        push_u32(&mut central, CENTRAL_DIRECTORY_FILE_HEADER_SIGNATURE);
        push_u16(&mut central, 20); // version made by
        push_u16(&mut central, 20); // version needed to extract
        push_u16(&mut central, 0); // flags
        push_u16(&mut central, 0); // compression: store
        push_u16(&mut central, dos_time);
        push_u16(&mut central, dos_date);
        push_u32(&mut central, crc);
        push_u32(&mut central, size);
        push_u32(&mut central, size);
        push_u16(&mut central, name.len() as u16);
        push_u16(&mut central, 0); // extra length
        push_u16(&mut central, 0); // comment length
        push_u16(&mut central, 0); // disk number start
        push_u16(&mut central, 0); // internal attributes
        push_u32(&mut central, 0); // external attributes
        push_u32(&mut central, offset);
        central.extend_from_slice(name);
    }

    let central_size = central.len() as u32;
    let central_offset = local.len() as u32;

    let mut out = local;
    out.extend_from_slice(&central);

    push_u32(&mut out, END_OF_CENTRAL_DIRECTORY_SIGNATURE);
    push_u16(&mut out, 0); // disk number
    push_u16(&mut out, 0); // central directory start disk
    push_u16(&mut out, entries.len() as u16);
    push_u16(&mut out, entries.len() as u16);
    push_u32(&mut out, central_size);
    push_u32(&mut out, central_offset);
    push_u16(&mut out, 0); // comment length

    out
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| Error::InvalidArchive("truncated record".into()))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| Error::InvalidArchive("truncated record".into()))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Finds the end-of-central-directory record by scanning backward.
fn find_end_record(data: &[u8]) -> Result<usize> {
    if data.len() < END_RECORD_LEN {
        return Err(Error::InvalidArchive("end of central directory not found".into()));
    }

    let start = data.len().saturating_sub(END_RECORD_LEN + MAX_COMMENT_LEN);
    let mut offset = data.len() - END_RECORD_LEN;
    loop {
        if read_u32(data, offset)? == END_OF_CENTRAL_DIRECTORY_SIGNATURE {
            return Ok(offset);
        }
        if offset == start {
            return Err(Error::InvalidArchive("end of central directory not found".into()));
        }
        offset -= 1;
    }
}

/// Reads a store-only archive into a name-to-bytes mapping.
///
/// Rejects archives using any compression method other than store, and
/// fails closed on any malformed or truncated record.
pub fn read_zip(data: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let end_offset = find_end_record(data)?;
    let total_entries = read_u16(data, end_offset + 10)? as usize;
    let central_offset = read_u32(data, end_offset + 16)? as usize;

    let mut entries = BTreeMap::new();
    let mut offset = central_offset;

    for _ in 0..total_entries {
        if read_u32(data, offset)? != CENTRAL_DIRECTORY_FILE_HEADER_SIGNATURE {
            return Err(Error::InvalidArchive("malformed central directory".into()));
        }

        let compression = read_u16(data, offset + 10)?;
        if compression != 0 {
            return Err(Error::UnsupportedCompression);
        }

        let compressed_size = read_u32(data, offset + 20)? as usize;
        let name_len = read_u16(data, offset + 28)? as usize;
        let extra_len = read_u16(data, offset + 30)? as usize;
        let comment_len = read_u16(data, offset + 32)? as usize;
        let local_offset = read_u32(data, offset + 42)? as usize;

        let name_bytes = data
            .get(offset + CENTRAL_HEADER_LEN..offset + CENTRAL_HEADER_LEN + name_len)
            .ok_or_else(|| Error::InvalidArchive("truncated entry name".into()))?;
        let name = String::from_utf8_lossy(name_bytes).into_owned();

        if read_u32(data, local_offset)? != LOCAL_FILE_HEADER_SIGNATURE {
            return Err(Error::InvalidArchive("malformed local header".into()));
        }
        let local_name_len = read_u16(data, local_offset + 26)? as usize;
        let local_extra_len = read_u16(data, local_offset + 28)? as usize;

        let file_start = local_offset + LOCAL_HEADER_LEN + local_name_len + local_extra_len;
        let bytes = data
            .get(file_start..file_start + compressed_size)
            .ok_or_else(|| Error::InvalidArchive("truncated entry data".into()))?;
        entries.insert(name, bytes.to_vec());

        offset += CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
    }

    Ok(entries)
}

#[cfg(test)]
#[path = "zip_tests.rs"]
mod tests;
