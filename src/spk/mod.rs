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

//! SPK ephemeris files: segment descriptors, per-body coverage, and state
//! evaluation.
//!
//! Evaluation is geometric (no aberration corrections) and stays within
//! one file: the target's segment chain and the center's segment chain are
//! walked toward a common node and differenced. All chained segments must
//! share the request's reference frame.

use snafu::Snafu;
use std::path::Path;

use crate::daf::{DafError, DafFile, Summary};
use crate::linalg::Vector6;
use crate::windows::Window;

mod segment;
mod writer;
pub use writer::SpkWriter;

/// Doubles in an SPK summary.
pub const ND: usize = 2;
/// Integers in an SPK summary.
pub const NI: usize = 6;

#[derive(Debug, Snafu)]
pub enum SpkError {
    #[snafu(display("{source}"))]
    Daf { source: DafError },
    #[snafu(display("'{path}' is a DAF but not an SPK: its type is '{file_type}'"))]
    NotAnSpk { path: String, file_type: String },
    #[snafu(display("no SPK data for body {body} at {et:.6} TDB seconds"))]
    NoData { body: i32, et: f64 },
    #[snafu(display(
        "no segment chain links body {body} to center {center} at {et:.6} TDB seconds"
    ))]
    NoLink { body: i32, center: i32, et: f64 },
    #[snafu(display(
        "segment '{name}' is relative to frame {have} but frame {want} was requested"
    ))]
    FrameMismatch { name: String, have: i32, want: i32 },
    #[snafu(display("SPK data type {data_type} is not supported"))]
    UnsupportedType { data_type: i32 },
    #[snafu(display("segment '{name}' is malformed: {reason}"))]
    MalformedSegment { name: String, reason: String },
    #[snafu(display("cannot write segment '{name}': {reason}"))]
    InvalidSegment { name: String, reason: String },
}

impl From<DafError> for SpkError {
    fn from(source: DafError) -> Self {
        SpkError::Daf { source }
    }
}

/// One SPK segment: the unpacked descriptor plus its name.
#[derive(Clone, Debug)]
pub struct SpkSegment {
    pub name: String,
    pub body: i32,
    pub center: i32,
    pub frame: i32,
    pub data_type: i32,
    pub begin: usize,
    pub end: usize,
    pub start_et: f64,
    pub stop_et: f64,
}

impl SpkSegment {
    fn from_summary(summary: &Summary) -> Self {
        Self {
            name: summary.name.clone(),
            body: summary.ic[0],
            center: summary.ic[1],
            frame: summary.ic[2],
            data_type: summary.ic[3],
            begin: summary.ic[4] as usize,
            end: summary.ic[5] as usize,
            start_et: summary.dc[0],
            stop_et: summary.dc[1],
        }
    }

    pub fn covers(&self, et: f64) -> bool {
        self.start_et <= et && et <= self.stop_et
    }
}

/// An SPK file, its segments in file order.
#[derive(Debug)]
pub struct SpkFile {
    daf: DafFile,
    pub segments: Vec<SpkSegment>,
}

impl SpkFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SpkError> {
        Self::from_daf(DafFile::open(path)?)
    }

    pub fn from_bytes(path: String, bytes: Vec<u8>) -> Result<Self, SpkError> {
        Self::from_daf(DafFile::from_bytes(path, bytes)?)
    }

    fn from_daf(daf: DafFile) -> Result<Self, SpkError> {
        // Legacy NAIF/DAF files carry no type tag and are presumed SPKs.
        if daf.record.idword != "NAIF/DAF" && daf.record.file_type() != "SPK" {
            return Err(SpkError::NotAnSpk {
                path: daf.path.clone(),
                file_type: daf.record.file_type().to_string(),
            });
        }
        let segments = daf
            .summaries()?
            .iter()
            .map(SpkSegment::from_summary)
            .collect();
        Ok(Self { daf, segments })
    }

    pub fn path(&self) -> &str {
        &self.daf.path
    }

    /// Coverage window for `body`: the union of its segment intervals
    /// (SPKCOV analogue).
    pub fn coverage(&self, body: i32) -> Window {
        let mut window = Window::new();
        for segment in &self.segments {
            if segment.body != body {
                continue;
            }
            if window.insert(segment.start_et, segment.stop_et).is_err() {
                warn!(
                    "segment '{}' of {} has a reversed interval, skipped",
                    segment.name, self.path()
                );
            }
        }
        window
    }

    /// The segment used for `body` at `et`: the matching segment closest
    /// to the end of the file, which is the one a loaded-file search would
    /// find first.
    pub fn segment_for(&self, body: i32, et: f64) -> Option<&SpkSegment> {
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.body == body && segment.covers(et))
    }

    /// Geometric state of `body` relative to `center` in `frame` at `et`
    /// TDB seconds, in km and km/s.
    pub fn state_at(&self, body: i32, center: i32, frame: i32, et: f64) -> Result<Vector6<f64>, SpkError> {
        if body == center {
            return Ok(Vector6::zeros());
        }
        let body_chain = self.chain(body, frame, et)?;
        if let Some(state) = lookup(&body_chain, center) {
            return Ok(state);
        }
        let center_chain = self.chain(center, frame, et)?;
        if let Some(state) = lookup(&center_chain, body) {
            return Ok(-state);
        }
        for (node, to_node) in &body_chain {
            if let Some(center_to_node) = lookup(&center_chain, *node) {
                return Ok(to_node - center_to_node);
            }
        }
        Err(SpkError::NoLink { body, center, et })
    }

    /// Walks up the center links from `start`, accumulating the state of
    /// `start` relative to each node passed.
    fn chain(&self, start: i32, frame: i32, et: f64) -> Result<Vec<(i32, Vector6<f64>)>, SpkError> {
        let mut node = start;
        let mut cumulative = Vector6::zeros();
        let mut out = Vec::new();
        while let Some(segment) = self.segment_for(node, et) {
            if segment.frame != frame {
                return Err(SpkError::FrameMismatch {
                    name: segment.name.clone(),
                    have: segment.frame,
                    want: frame,
                });
            }
            cumulative += segment::evaluate(&self.daf, segment, et)?;
            node = segment.center;
            out.push((node, cumulative));
            if out.len() > self.segments.len() {
                // center links loop; treat as no data rather than spinning
                break;
            }
        }
        if out.is_empty() {
            return Err(SpkError::NoData { body: start, et });
        }
        Ok(out)
    }
}

fn lookup(chain: &[(i32, Vector6<f64>)], node: i32) -> Option<Vector6<f64>> {
    chain
        .iter()
        .find(|(candidate, _)| *candidate == node)
        .map(|(_, state)| *state)
}
