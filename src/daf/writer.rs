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

//! Builds new DAF images.
//!
//! The writer lays the file out as: file record, then summary/name record
//! pairs, then array data. The last two integer components of every
//! summary are reserved by the DAF convention for the array's begin and
//! end word addresses, and are filled in here.

use bytes::BufMut;
use std::path::Path;

use super::{
    BinaryFormat, DafError, FTP_BODY, FTP_END, FTP_MARKER, RECORD_LEN, WORDS_PER_RECORD,
};

struct PendingArray {
    name: String,
    dc: Vec<f64>,
    ic_head: Vec<i32>,
    data: Vec<f64>,
}

pub struct DafWriter {
    idword: String,
    ifname: String,
    nd: usize,
    ni: usize,
    format: BinaryFormat,
    arrays: Vec<PendingArray>,
}

impl DafWriter {
    /// Starts a DAF with the given id word, internal file name, and
    /// summary format. `ni` counts the two address components the writer
    /// manages itself.
    pub fn new(idword: &str, ifname: &str, nd: usize, ni: usize, format: BinaryFormat) -> Self {
        Self {
            idword: idword.to_string(),
            ifname: ifname.to_string(),
            nd,
            ni,
            arrays: Vec::new(),
            format,
        }
    }

    /// Appends an array. `dc` and `ic_head` are padded with zeros or
    /// truncated to ND and NI−2 components; the begin/end addresses are
    /// appended once the layout is known.
    pub fn add_array(&mut self, name: &str, dc: &[f64], ic_head: &[i32], data: &[f64]) {
        let mut dc = dc.to_vec();
        dc.resize(self.nd, 0.0);
        let mut ic_head = ic_head.to_vec();
        ic_head.resize(self.ni.saturating_sub(2), 0);
        self.arrays.push(PendingArray {
            name: name.to_string(),
            dc,
            ic_head,
            data: data.to_vec(),
        });
    }

    /// Lays out and serializes the file image.
    pub fn build(&self) -> Vec<u8> {
        let ss = self.nd + (self.ni + 1) / 2;
        let per_record = (WORDS_PER_RECORD - 3) / ss;
        let pairs = self.arrays.len().div_ceil(per_record).max(1);
        let first_data_record = 2 + 2 * pairs;
        let mut next_word = (first_data_record - 1) * WORDS_PER_RECORD + 1;

        // Assign addresses in file order.
        let mut addressed = Vec::with_capacity(self.arrays.len());
        for array in &self.arrays {
            let begin = next_word;
            let end = begin + array.data.len().saturating_sub(1);
            next_word = end + 1;
            addressed.push((array, begin, end));
        }
        let free = next_word;

        let mut out = Vec::new();
        self.put_file_record(&mut out, pairs, free);

        for pair in 0..pairs {
            let chunk =
                &addressed[pair * per_record..addressed.len().min((pair + 1) * per_record)];
            let next = if pair + 1 < pairs { 2 + 2 * (pair + 1) } else { 0 };
            let prev = if pair > 0 { 2 + 2 * (pair - 1) } else { 0 };

            // Summary record: three control doubles, then packed summaries.
            let mut rec = Vec::with_capacity(RECORD_LEN);
            self.put_f64(&mut rec, next as f64);
            self.put_f64(&mut rec, prev as f64);
            self.put_f64(&mut rec, chunk.len() as f64);
            for (array, begin, end) in chunk {
                for &d in &array.dc {
                    self.put_f64(&mut rec, d);
                }
                for &n in &array.ic_head {
                    self.put_i32(&mut rec, n);
                }
                self.put_i32(&mut rec, *begin as i32);
                self.put_i32(&mut rec, *end as i32);
                if self.ni % 2 == 1 {
                    rec.put_bytes(0, 4);
                }
            }
            rec.resize(RECORD_LEN, 0);
            out.extend_from_slice(&rec);

            // Matching name record.
            let mut names = Vec::with_capacity(RECORD_LEN);
            for (array, _, _) in chunk {
                names.extend_from_slice(&padded(&array.name, ss * 8));
            }
            names.resize(RECORD_LEN, b' ');
            out.extend_from_slice(&names);
        }

        for (array, _, _) in &addressed {
            for &d in &array.data {
                self.put_f64(&mut out, d);
            }
        }
        // Round the image out to a whole record.
        let tail = out.len() % RECORD_LEN;
        if tail != 0 {
            out.resize(out.len() + RECORD_LEN - tail, 0);
        }
        out
    }

    /// Serializes and writes the image to disk.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DafError> {
        std::fs::write(&path, self.build()).map_err(|source| DafError::FileWrite {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    fn put_file_record(&self, out: &mut Vec<u8>, pairs: usize, free: usize) {
        let mut rec = Vec::with_capacity(RECORD_LEN);
        rec.extend_from_slice(&padded(&self.idword, 8));
        self.put_u32(&mut rec, self.nd as u32);
        self.put_u32(&mut rec, self.ni as u32);
        rec.extend_from_slice(&padded(&self.ifname, 60));
        self.put_u32(&mut rec, 2); // fward
        self.put_u32(&mut rec, (2 + 2 * (pairs - 1)) as u32); // bward
        self.put_u32(&mut rec, free as u32);
        rec.extend_from_slice(self.format.tag().as_bytes());
        rec.resize(699, 0);
        rec.extend_from_slice(FTP_MARKER);
        rec.extend_from_slice(FTP_BODY);
        rec.extend_from_slice(FTP_END);
        rec.resize(RECORD_LEN, 0);
        out.extend_from_slice(&rec);
    }

    fn put_f64(&self, out: &mut Vec<u8>, value: f64) {
        match self.format {
            BinaryFormat::BigIeee => out.put_f64(value),
            _ => out.put_f64_le(value),
        }
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        match self.format {
            BinaryFormat::BigIeee => out.put_u32(value),
            _ => out.put_u32_le(value),
        }
    }

    fn put_i32(&self, out: &mut Vec<u8>, value: i32) {
        match self.format {
            BinaryFormat::BigIeee => out.put_i32(value),
            _ => out.put_i32_le(value),
        }
    }
}

fn padded(text: &str, len: usize) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    out.truncate(len);
    out.resize(len, b' ');
    out
}
