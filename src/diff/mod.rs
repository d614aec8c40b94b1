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

//! Comparison of the trajectories two SPK files describe.
//!
//! [`args`] turns an `ephdiff` command line into a [`DiffSetup`], filling
//! defaults from the first file and validating every combination the way
//! the original tool does. [`evaluate`] samples both files over the
//! comparison interval, and [`report`] renders the requested summary.

use serde_derive::{Deserialize, Serialize};
use snafu::Snafu;

use crate::linalg::Vector6;
use crate::spk::{SpkError, SpkFile};

pub mod args;
mod report;
pub use report::render;

/// Hard cap on the number of comparison states.
pub const MAX_STATES: usize = 1_000_000;
/// Default number of comparison states.
pub const DEFAULT_STATES: usize = 1000;
/// Smallest allowed time step, seconds.
pub const MIN_STEP: f64 = 1e-8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Basic,
    Stats,
    Dump,
    DumpVf,
}

impl ReportKind {
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "stats" => Some(Self::Stats),
            "dump" => Some(Self::Dump),
            "dumpvf" => Some(Self::DumpVf),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Stats => "stats",
            Self::Dump => "dump",
            Self::DumpVf => "dumpvf",
        }
    }
}

/// Everything a comparison run needs, resolved and validated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffSetup {
    pub spk: [String; 2],
    pub body_name: [String; 2],
    pub body_id: [i32; 2],
    pub center_name: [String; 2],
    pub center_id: [i32; 2],
    pub frame: [String; 2],
    pub frame_id: [i32; 2],
    /// Start and stop rendered for banners, calendar TDB.
    pub time_label: [String; 2],
    /// Start and stop, TDB seconds past J2000.
    pub et: [f64; 2],
    pub count: usize,
    pub step: f64,
    pub report: ReportKind,
    pub time_format: Option<String>,
    /// Supporting kernels furnished from the command line.
    pub kernels: Vec<String>,
}

impl DiffSetup {
    /// The comparison epochs: `count` steps from the start, clamped to the
    /// stop so an explicit step lands its final point on the interval end.
    pub fn epochs(&self) -> Vec<f64> {
        (0..self.count)
            .map(|i| (self.et[0] + i as f64 * self.step).min(self.et[1]))
            .collect()
    }
}

#[derive(Debug, Snafu)]
pub enum DiffError {
    #[snafu(display("{source}"))]
    Evaluation { source: SpkError },
    #[snafu(display("output time format '{format}' is not usable: {reason}"))]
    BadTimeFormat { format: String, reason: String },
}

impl From<SpkError> for DiffError {
    fn from(source: SpkError) -> Self {
        DiffError::Evaluation { source }
    }
}

/// The two state samplings to compare.
#[derive(Clone, Debug, Default)]
pub struct StateTable {
    pub times: Vec<f64>,
    pub first: Vec<Vector6<f64>>,
    pub second: Vec<Vector6<f64>>,
}

/// Samples both SPK files at the comparison epochs.
pub fn evaluate(setup: &DiffSetup) -> Result<StateTable, DiffError> {
    let times = setup.epochs();
    let mut table = StateTable {
        times: times.clone(),
        first: Vec::with_capacity(times.len()),
        second: Vec::with_capacity(times.len()),
    };
    for (file_no, path) in setup.spk.iter().enumerate() {
        let spk = SpkFile::open(path)?;
        let states = if file_no == 0 {
            &mut table.first
        } else {
            &mut table.second
        };
        for &et in &times {
            states.push(spk.state_at(
                setup.body_id[file_no],
                setup.center_id[file_no],
                setup.frame_id[file_no],
                et,
            )?);
        }
    }
    Ok(table)
}

/// Short run description printed above basic and stats reports.
pub fn banner(setup: &DiffSetup) -> String {
    let mut out = String::new();
    for (label, value) in [
        ("First SPK", setup.spk[0].as_str()),
        ("Second SPK", setup.spk[1].as_str()),
    ] {
        out.push_str(&format!("# {label:<26} {value}\n"));
    }
    for (label, names, ids) in [
        ("Bodies", &setup.body_name, &setup.body_id),
        ("Centers", &setup.center_name, &setup.center_id),
    ] {
        out.push_str(&format!(
            "# {label:<26} '{}' ({}) / '{}' ({})\n",
            names[0], ids[0], names[1], ids[1]
        ));
    }
    out.push_str(&format!(
        "# {:<26} {} / {}\n",
        "Frames", setup.frame[0], setup.frame[1]
    ));
    out.push_str(&format!("# {:<26} {}\n", "Interval start", setup.time_label[0]));
    out.push_str(&format!("# {:<26} {}\n", "Interval stop", setup.time_label[1]));
    out.push_str(&format!(
        "# {:<26} {} states, step {:.6} seconds\n",
        "Sampling", setup.count, setup.step
    ));
    if !setup.kernels.is_empty() {
        out.push_str(&format!(
            "# {:<26} {}\n",
            "Supporting kernels",
            setup.kernels.join(" ")
        ));
    }
    out
}
