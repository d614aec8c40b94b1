/*
    Koios, SPICE kernel access and comparison tooling
    Copyright (C) 2024 Koios Developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Double-precision Array File (DAF) access.
//!
//! A DAF is a sequence of 1024-byte records. Record one is the file record
//! (id word, summary format, record links, binary file format); summary
//! records form a doubly linked list, each paired with a name record; array
//! data lives between them, addressed by 1-based double-precision word.
//!
//! Files written on either byte order are readable: the format comes from
//! the file record when the file carries one, and is inferred from the
//! summary-format integers for files predating the format tag.

use snafu::Snafu;
use std::fmt;
use std::path::Path;

mod writer;
pub use writer::DafWriter;

/// Bytes per DAF record.
pub const RECORD_LEN: usize = 1024;
/// Double-precision words per record.
pub const WORDS_PER_RECORD: usize = 128;

/// The FTP corruption-check string carried in the file record.
pub(crate) const FTP_MARKER: &[u8] = b"FTPSTR:";
pub(crate) const FTP_END: &[u8] = b"ENDFTP";
pub(crate) const FTP_BODY: &[u8] = b"\r:\n:\r\n:\r\x00:\x81:\x10\xce:";

#[derive(Debug, Snafu)]
pub enum DafError {
    #[snafu(display("could not read DAF '{path}': {source}"))]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("could not write DAF '{path}': {source}"))]
    FileWrite {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("'{path}' is not a DAF: id word is '{idword}'"))]
    NotADaf { path: String, idword: String },
    #[snafu(display("cannot determine the binary format of '{path}'"))]
    UnknownFormat { path: String },
    #[snafu(display("'{path}' uses binary format {format}, which this reader does not decode"))]
    UnsupportedFormat {
        path: String,
        format: BinaryFormat,
    },
    #[snafu(display("the FTP check string of '{path}' is damaged; the file was likely corrupted in transfer"))]
    FtpDamaged { path: String },
    #[snafu(display("'{path}' ends before record {record}"))]
    Truncated { path: String, record: usize },
    #[snafu(display("summary record chain of '{path}' is damaged at record {record}"))]
    BadSummaryChain { path: String, record: usize },
    #[snafu(display("word address range {first}..{last} is not valid"))]
    BadAddress { first: usize, last: usize },
    #[snafu(display("a DAF needs 1 <= ND <= 124 and 2 <= NI <= 250, got ND={nd}, NI={ni}"))]
    BadSummaryFormat { nd: usize, ni: usize },
}

/// Binary file formats a DAF can declare.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryFormat {
    BigIeee,
    LtlIeee,
    VaxGflt,
    VaxDflt,
}

impl BinaryFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            BinaryFormat::BigIeee => "BIG-IEEE",
            BinaryFormat::LtlIeee => "LTL-IEEE",
            BinaryFormat::VaxGflt => "VAX-GFLT",
            BinaryFormat::VaxDflt => "VAX-DFLT",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "BIG-IEEE" => Some(BinaryFormat::BigIeee),
            "LTL-IEEE" => Some(BinaryFormat::LtlIeee),
            "VAX-GFLT" => Some(BinaryFormat::VaxGflt),
            "VAX-DFLT" => Some(BinaryFormat::VaxDflt),
            _ => None,
        }
    }

    fn decode_u32(&self, bytes: [u8; 4]) -> u32 {
        match self {
            BinaryFormat::BigIeee => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        }
    }

    fn decode_i32(&self, bytes: [u8; 4]) -> i32 {
        match self {
            BinaryFormat::BigIeee => i32::from_be_bytes(bytes),
            _ => i32::from_le_bytes(bytes),
        }
    }

    fn decode_f64(&self, bytes: [u8; 8]) -> f64 {
        match self {
            BinaryFormat::BigIeee => f64::from_be_bytes(bytes),
            _ => f64::from_le_bytes(bytes),
        }
    }
}

impl fmt::Display for BinaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The decoded file record.
#[derive(Clone, Debug)]
pub struct FileRecord {
    /// Id word, e.g. `DAF/SPK`.
    pub idword: String,
    /// Doubles per summary.
    pub nd: usize,
    /// Integers per summary.
    pub ni: usize,
    /// Internal file name.
    pub ifname: String,
    /// First and last summary record numbers.
    pub fward: usize,
    pub bward: usize,
    /// First free word address.
    pub free: usize,
    pub format: BinaryFormat,
}

impl FileRecord {
    /// Doubles one summary occupies.
    pub fn summary_size(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    /// The file type half of the id word (`SPK` for `DAF/SPK`).
    pub fn file_type(&self) -> &str {
        match self.idword.split_once('/') {
            Some((_, t)) => t.trim(),
            None => "",
        }
    }
}

/// One array summary: its name, and the unpacked double and integer
/// descriptor components.
#[derive(Clone, Debug)]
pub struct Summary {
    pub name: String,
    pub dc: Vec<f64>,
    pub ic: Vec<i32>,
}

/// A DAF held in memory.
#[derive(Debug)]
pub struct DafFile {
    pub path: String,
    pub record: FileRecord,
    bytes: Vec<u8>,
}

impl DafFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DafError> {
        let display = path.as_ref().display().to_string();
        let bytes = std::fs::read(&path).map_err(|source| DafError::FileRead {
            path: display.clone(),
            source,
        })?;
        Self::from_bytes(display, bytes)
    }

    /// Decodes an in-memory DAF image. `path` only labels diagnostics.
    pub fn from_bytes(path: String, bytes: Vec<u8>) -> Result<Self, DafError> {
        if bytes.len() < RECORD_LEN {
            return Err(DafError::Truncated { path, record: 1 });
        }
        let record = decode_file_record(&path, &bytes[..RECORD_LEN])?;
        debug!(
            "opened {path}: {} ({}), ND={}, NI={}",
            record.idword, record.format, record.nd, record.ni
        );
        Ok(Self { path, record, bytes })
    }

    /// All summaries with their names, walking the forward chain.
    pub fn summaries(&self) -> Result<Vec<Summary>, DafError> {
        let mut out = Vec::new();
        let ss = self.record.summary_size();
        let mut record = self.record.fward;
        let mut hops = 0usize;
        while record != 0 {
            // A cycle in the chain would spin forever; no real file has
            // more linked records than fit in the file.
            hops += 1;
            if hops > self.bytes.len() / RECORD_LEN + 1 {
                return Err(DafError::BadSummaryChain {
                    path: self.path.clone(),
                    record,
                });
            }
            let summary_rec = self.record_bytes(record)?;
            let name_rec = self.record_bytes(record + 1)?;
            let next = self.record.format.decode_f64(take8(summary_rec, 0)) as usize;
            let nsum = self.record.format.decode_f64(take8(summary_rec, 16)) as usize;
            if nsum > (WORDS_PER_RECORD - 3) / ss {
                return Err(DafError::BadSummaryChain {
                    path: self.path.clone(),
                    record,
                });
            }
            for i in 0..nsum {
                let start = 24 + i * ss * 8;
                let mut dc = Vec::with_capacity(self.record.nd);
                for d in 0..self.record.nd {
                    dc.push(self.record.format.decode_f64(take8(summary_rec, start + d * 8)));
                }
                let ic_start = start + self.record.nd * 8;
                let mut ic = Vec::with_capacity(self.record.ni);
                for n in 0..self.record.ni {
                    ic.push(self.record.format.decode_i32(take4(summary_rec, ic_start + n * 4)));
                }
                let name_start = i * ss * 8;
                let name = ascii(&name_rec[name_start..name_start + ss * 8])
                    .trim_end()
                    .to_string();
                out.push(Summary { name, dc, ic });
            }
            record = next;
        }
        Ok(out)
    }

    /// Reads the inclusive word address range `first..=last` (DAFGDA
    /// analogue; addresses are 1-based).
    pub fn read_doubles(&self, first: usize, last: usize) -> Result<Vec<f64>, DafError> {
        if first == 0 || last < first {
            return Err(DafError::BadAddress { first, last });
        }
        let start = (first - 1) * 8;
        let end = last * 8;
        if end > self.bytes.len() {
            return Err(DafError::Truncated {
                path: self.path.clone(),
                record: last / WORDS_PER_RECORD + 1,
            });
        }
        Ok(self.bytes[start..end]
            .chunks_exact(8)
            .map(|chunk| self.record.format.decode_f64(chunk.try_into().unwrap()))
            .collect())
    }

    fn record_bytes(&self, record: usize) -> Result<&[u8], DafError> {
        let start = (record - 1) * RECORD_LEN;
        let end = start + RECORD_LEN;
        if record == 0 || end > self.bytes.len() {
            return Err(DafError::Truncated {
                path: self.path.clone(),
                record,
            });
        }
        Ok(&self.bytes[start..end])
    }
}

fn take8(bytes: &[u8], at: usize) -> [u8; 8] {
    bytes[at..at + 8].try_into().unwrap()
}

fn take4(bytes: &[u8], at: usize) -> [u8; 4] {
    bytes[at..at + 4].try_into().unwrap()
}

fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Decodes and validates the file record, auto-detecting the binary format.
fn decode_file_record(path: &str, rec: &[u8]) -> Result<FileRecord, DafError> {
    let idword = ascii(&rec[0..8]).trim_end().to_string();
    if !(idword.starts_with("DAF/") || idword == "NAIF/DAF") {
        return Err(DafError::NotADaf {
            path: path.to_string(),
            idword,
        });
    }
    check_ftp(path, rec)?;

    let format = detect_format(path, rec)?;
    if matches!(format, BinaryFormat::VaxGflt | BinaryFormat::VaxDflt) {
        return Err(DafError::UnsupportedFormat {
            path: path.to_string(),
            format,
        });
    }

    let nd = format.decode_u32(take4(rec, 8)) as usize;
    let ni = format.decode_u32(take4(rec, 12)) as usize;
    if !plausible(nd, ni) {
        return Err(DafError::BadSummaryFormat { nd, ni });
    }
    Ok(FileRecord {
        idword,
        nd,
        ni,
        ifname: ascii(&rec[16..76]).trim_end().to_string(),
        fward: format.decode_u32(take4(rec, 76)) as usize,
        bward: format.decode_u32(take4(rec, 80)) as usize,
        free: format.decode_u32(take4(rec, 84)) as usize,
        format,
    })
}

/// A readable summary format: ND in 1..=124, NI in 2..=250.
fn plausible(nd: usize, ni: usize) -> bool {
    (1..=124).contains(&nd) && (2..=250).contains(&ni)
}

/// Picks the binary format from the format tag, falling back to inspecting
/// the ND/NI byte patterns for files that predate the tag.
fn detect_format(path: &str, rec: &[u8]) -> Result<BinaryFormat, DafError> {
    let tag = ascii(&rec[88..96]);
    if let Some(format) = BinaryFormat::from_tag(&tag) {
        return Ok(format);
    }
    let nd_be = u32::from_be_bytes(take4(rec, 8)) as usize;
    let ni_be = u32::from_be_bytes(take4(rec, 12)) as usize;
    let nd_le = u32::from_le_bytes(take4(rec, 8)) as usize;
    let ni_le = u32::from_le_bytes(take4(rec, 12)) as usize;
    match (plausible(nd_be, ni_be), plausible(nd_le, ni_le)) {
        (true, false) => {
            info!("{path}: no format tag, summary format reads big-endian");
            Ok(BinaryFormat::BigIeee)
        }
        (false, true) => {
            info!("{path}: no format tag, summary format reads little-endian");
            Ok(BinaryFormat::LtlIeee)
        }
        _ => Err(DafError::UnknownFormat {
            path: path.to_string(),
        }),
    }
}

/// Validates the FTP check string when the file carries one. Old files
/// without the string pass; a mangled string means the file went through a
/// text-mode transfer.
fn check_ftp(path: &str, rec: &[u8]) -> Result<(), DafError> {
    let region = &rec[500..];
    let start = match find(region, FTP_MARKER) {
        Some(at) => at,
        None => return Ok(()),
    };
    let body = &region[start + FTP_MARKER.len()..];
    let end = match find(body, FTP_END) {
        Some(at) => at,
        None => {
            return Err(DafError::FtpDamaged {
                path: path.to_string(),
            })
        }
    };
    if &body[..end] != FTP_BODY {
        return Err(DafError::FtpDamaged {
            path: path.to_string(),
        });
    }
    Ok(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_daf(format: BinaryFormat) -> Vec<u8> {
        let mut writer = DafWriter::new("DAF/SPK", "test daf", 2, 6, format);
        writer.add_array(
            "SEGMENT ONE",
            &[0.0, 100.0],
            &[399, 3, 1, 2],
            &[1.0, 2.0, 3.0],
        );
        writer.build()
    }

    #[test]
    fn reads_both_byte_orders() {
        for format in [BinaryFormat::BigIeee, BinaryFormat::LtlIeee] {
            let bytes = minimal_daf(format);
            let daf = DafFile::from_bytes("mem".into(), bytes).unwrap();
            assert_eq!(daf.record.format, format);
            assert_eq!(daf.record.nd, 2);
            assert_eq!(daf.record.ni, 6);
            assert_eq!(daf.record.file_type(), "SPK");
            let summaries = daf.summaries().unwrap();
            assert_eq!(summaries.len(), 1);
            assert_eq!(summaries[0].name, "SEGMENT ONE");
            assert_eq!(summaries[0].dc, vec![0.0, 100.0]);
            assert_eq!(&summaries[0].ic[..4], &[399, 3, 1, 2]);
            // Begin/end addresses appended by the writer
            let begin = summaries[0].ic[4] as usize;
            let end = summaries[0].ic[5] as usize;
            assert_eq!(daf.read_doubles(begin, end).unwrap(), vec![1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn rejects_non_daf() {
        let mut bytes = minimal_daf(BinaryFormat::LtlIeee);
        bytes[..8].copy_from_slice(b"XXX/YYY ");
        let err = DafFile::from_bytes("mem".into(), bytes).unwrap_err();
        assert!(matches!(err, DafError::NotADaf { .. }));
    }

    #[test]
    fn rejects_truncated() {
        let err = DafFile::from_bytes("mem".into(), vec![0u8; 100]).unwrap_err();
        assert!(matches!(err, DafError::Truncated { .. }));
    }

    #[test]
    fn detects_format_without_tag() {
        for format in [BinaryFormat::BigIeee, BinaryFormat::LtlIeee] {
            let mut bytes = minimal_daf(format);
            // Blank out the format tag and the FTP string, as an old
            // toolkit would have left them.
            bytes[88..96].fill(b' ');
            for b in bytes[500..RECORD_LEN].iter_mut() {
                *b = 0;
            }
            let daf = DafFile::from_bytes("mem".into(), bytes).unwrap();
            assert_eq!(daf.record.format, format);
        }
    }

    #[test]
    fn vax_formats_are_recognized_but_rejected() {
        let mut bytes = minimal_daf(BinaryFormat::LtlIeee);
        bytes[88..96].copy_from_slice(b"VAX-GFLT");
        let err = DafFile::from_bytes("mem".into(), bytes).unwrap_err();
        assert!(matches!(
            err,
            DafError::UnsupportedFormat {
                format: BinaryFormat::VaxGflt,
                ..
            }
        ));
    }

    #[test]
    fn damaged_ftp_string_detected() {
        let mut bytes = minimal_daf(BinaryFormat::LtlIeee);
        // Simulate a text-mode transfer mangling CR into LF inside the
        // check string.
        let at = 500 + find(&bytes[500..RECORD_LEN], FTP_MARKER).unwrap() + FTP_MARKER.len();
        bytes[at] = b'\n';
        let err = DafFile::from_bytes("mem".into(), bytes).unwrap_err();
        assert!(matches!(err, DafError::FtpDamaged { .. }));
    }

    #[test]
    fn bad_addresses_rejected() {
        let daf = DafFile::from_bytes("mem".into(), minimal_daf(BinaryFormat::LtlIeee)).unwrap();
        assert!(matches!(
            daf.read_doubles(0, 5),
            Err(DafError::BadAddress { .. })
        ));
        assert!(matches!(
            daf.read_doubles(10, 5),
            Err(DafError::BadAddress { .. })
        ));
        assert!(matches!(
            daf.read_doubles(1, 1_000_000),
            Err(DafError::Truncated { .. })
        ));
    }
}
