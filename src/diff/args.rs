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

//! The `ephdiff` command line surface.
//!
//! The tool keeps the historical key style: single-dash, multi-character,
//! case-insensitive keys with space-separated values, and the two SPK
//! paths as the last two tokens. A key's value runs to the next key; a
//! repeated key keeps its last value.
//!
//! Resolution fills anything not given on the line: one-sided
//! body/center/frame values mirror to the other side, wholly missing ones
//! come from the first file's segments (preferring the requested body,
//! then the last spacecraft segment, then the last segment), and missing
//! time bounds come from the intersection of the two files' coverage.

use hifitime::{Epoch, TimeScale};
use snafu::Snafu;
use std::collections::HashMap;
use std::str::FromStr;

use crate::bodies::BodyError;
use crate::frames;
use crate::kernels::{identify, KernelError, KernelManager};
use crate::spk::{SpkError, SpkFile};
use crate::windows::Window;

use super::{DiffSetup, ReportKind, DEFAULT_STATES, MAX_STATES, MIN_STEP};

/// Recognized command line keys.
pub const KEYS: [&str; 17] = [
    "-b1", "-c1", "-r1", "-b2", "-c2", "-r2", "-k", "-b", "-e", "-n", "-s", "-f", "-t", "-usage",
    "-u", "-help", "-h",
];

const HELP_KEYS: [&str; 4] = ["-usage", "-u", "-help", "-h"];

#[derive(Debug, Snafu)]
pub enum SetupError {
    #[snafu(display("File '{path}' specified as the second to last argument on the command line does not exist."))]
    Spk1DoesNotExist { path: String },
    #[snafu(display("File '{path}' specified as the last argument on the command line does not exist."))]
    Spk2DoesNotExist { path: String },
    #[snafu(display("File '{path}' specified as the second to last argument on the command line is not an SPK file."))]
    NotAnSpkFile1 { path: String },
    #[snafu(display("File '{path}' specified as the last argument on the command line is not an SPK file."))]
    NotAnSpkFile2 { path: String },
    #[snafu(display("Although '-k' key was provided on the command line no kernel file names were following it."))]
    MissingKernelNames,
    #[snafu(display("'{value}' specified after '{key}' key is neither an integer number representing a legitimate NAIF ID nor an object name recognized in SPICE."))]
    BadBodySpec { key: &'static str, value: String },
    #[snafu(display("Cannot recognize frame '{name}' provided on the command line after '{key}' key."))]
    BadFrameName { key: &'static str, name: String },
    #[snafu(display("Cannot parse '{input}' specified after '{key}' key as a time: {reason}"))]
    InvalidTime {
        key: &'static str,
        input: String,
        reason: String,
    },
    #[snafu(display("Specified start time '{start}' is greater than specified stop time '{stop}'."))]
    InconsistentTimes { start: String, stop: String },
    #[snafu(display("Body and center specified on the command line must be distinct. They were '{body_name}'({body_id}) and '{center_name}'({center_id})."))]
    SameBodyAndCenter {
        /// Which of the four input combinations collided (1: -b1/-c1,
        /// 2: -b2/-c2, 3: -b1/-c2, 4: -b2/-c1).
        combo: u8,
        body_name: String,
        body_id: i32,
        center_name: String,
        center_id: i32,
    },
    #[snafu(display("Body and center picked from SPK and/or command line must be distinct. They were '{body_name}'({body_id}) and '{center_name}'({center_id})."))]
    SamePickedBodyAndCenter {
        /// 3 for the first pair, 4 for the second.
        combo: u8,
        body_name: String,
        body_id: i32,
        center_name: String,
        center_id: i32,
    },
    #[snafu(display("SPK file '{path}' does not contain any data for body '{name}'({id}) specified on the command line."))]
    NoDataForBody {
        /// 1: defaults scan of the first SPK; 2/3: coverage of the
        /// first/second SPK.
        which: u8,
        path: String,
        name: String,
        id: i32,
    },
    #[snafu(display("Cannot retrieve default values from SPK file '{path}'. It either is damaged or contains no data segments."))]
    CannotGetDefaults { path: String },
    #[snafu(display("Cannot pick default frame for this run. Please, specify the frame relative to which states should be computed using '-r1' or '-r2' command line keys."))]
    CannotPickFrame,
    #[snafu(display("Coverage for body '{body1}'({id1}) provided by SPK '{spk1}' and coverage for body '{body2}'({id2}) provided by SPK '{spk2}' do not overlap{clip}."))]
    NoOverlap {
        /// 1: unclipped, 2: clipped by the stop time, 3: by the start time.
        which: u8,
        body1: String,
        id1: i32,
        spk1: String,
        body2: String,
        id2: i32,
        spk2: String,
        clip: String,
    },
    #[snafu(display("The intersection of coverage for body '{body1}'({id1}) provided by SPK '{spk1}' and coverage for body '{body2}'({id2}) provided by SPK '{spk2}'{clip} includes more than one continuous window."))]
    MoreThanOneInterval {
        which: u8,
        body1: String,
        id1: i32,
        spk1: String,
        body2: String,
        id2: i32,
        spk2: String,
        clip: String,
    },
    #[snafu(display("Time step '{value}' specified after '-s' key is smaller than {MIN_STEP} seconds."))]
    StepTooSmall { value: String },
    #[snafu(display("The number of states, {states}, computed using step of {step} seconds within the time interval is greater than can fit into program's buffers ({MAX_STATES} states maximum). Increase step or make the time window smaller in order to run the program."))]
    StepTooSmall2 { states: f64, step: f64 },
    #[snafu(display("Time step '{value}' specified after '-s' key is not a DP number."))]
    NotADpNumber { value: String },
    #[snafu(display("Number of states must be an integer number between 2 and {MAX_STATES}. It was {value}."))]
    BadNumberOfStates { value: i64 },
    #[snafu(display("Number of states '{value}' specified after '-n' key is not an integer number."))]
    NotAnIntegerNumber { value: String },
    #[snafu(display("Output type '{value}' specified after '-t' key is not recognized. Recognized output types are 'basic', 'stats', 'dump', and 'dumpvf'."))]
    BadOutputType { value: String },
    #[snafu(display("Output time format specified after '-f' key is blank."))]
    BlankTimeFormat,
    #[snafu(display("{source}"))]
    KernelLoad { source: KernelError },
    #[snafu(display("{source}"))]
    SpkAccess { source: SpkError },
    #[snafu(display("{source}"))]
    BodyMapping { source: BodyError },
}

impl SetupError {
    /// The structured condition name, in the toolkit's `SPICE(...)`
    /// convention.
    pub fn condition(&self) -> String {
        match self {
            SetupError::Spk1DoesNotExist { .. } => "SPICE(SPK1DOESNOTEXIST)".into(),
            SetupError::Spk2DoesNotExist { .. } => "SPICE(SPK2DOESNOTEXIST)".into(),
            SetupError::NotAnSpkFile1 { .. } => "SPICE(NOTANSPKFILE1)".into(),
            SetupError::NotAnSpkFile2 { .. } => "SPICE(NOTANSPKFILE2)".into(),
            SetupError::MissingKernelNames => "SPICE(MISSINGKERNELNAMES)".into(),
            SetupError::BadBodySpec { key, .. } => match *key {
                "-b1" => "SPICE(BADBODY1SPEC)".into(),
                "-b2" => "SPICE(BADBODY2SPEC)".into(),
                "-c1" => "SPICE(BADCENTER1SPEC)".into(),
                _ => "SPICE(BADCENTER2SPEC)".into(),
            },
            SetupError::BadFrameName { key, .. } => match *key {
                "-r1" => "SPICE(BADFRAME1NAME)".into(),
                _ => "SPICE(BADFRAME2NAME)".into(),
            },
            SetupError::InvalidTime { .. } => "SPICE(INVALIDTIMESTRING)".into(),
            SetupError::InconsistentTimes { .. } => "SPICE(INCONSISTENTTIMES)".into(),
            SetupError::SameBodyAndCenter { combo, .. } => match combo {
                1 => "SPICE(SAMEBODY1CENTER1)".into(),
                2 => "SPICE(SAMEBODY2CENTER2)".into(),
                3 => "SPICE(SAMEBODY1CENTER2)".into(),
                _ => "SPICE(SAMEBODY2CENTER1)".into(),
            },
            SetupError::SamePickedBodyAndCenter { combo, .. } => {
                format!("SPICE(SAMEBODYANDCENTER{combo})")
            }
            SetupError::NoDataForBody { which, .. } => format!("SPICE({which}NODATAFORBODY)"),
            SetupError::CannotGetDefaults { .. } => "SPICE(CANNOTGETDEFAULTS)".into(),
            SetupError::CannotPickFrame => "SPICE(CANNOTPICKFRAME)".into(),
            SetupError::NoOverlap { which, .. } => format!("SPICE(NOOVERLAP{which})"),
            SetupError::MoreThanOneInterval { which, .. } => {
                format!("SPICE(MORETHAN1INTERVAL{which})")
            }
            SetupError::StepTooSmall { .. } => "SPICE(STEPTOOSMALL1)".into(),
            SetupError::StepTooSmall2 { .. } => "SPICE(STEPTOOSMALL2)".into(),
            SetupError::NotADpNumber { .. } => "SPICE(NOTANDPNUMBER)".into(),
            SetupError::BadNumberOfStates { .. } => "SPICE(BADNOFSTATES)".into(),
            SetupError::NotAnIntegerNumber { .. } => "SPICE(NOTANINTEGERNUMBER)".into(),
            SetupError::BadOutputType { .. } => "SPICE(BADOUTPUTTYPE)".into(),
            SetupError::BlankTimeFormat => "SPICE(BLANKTIMEFORMAT)".into(),
            SetupError::KernelLoad { .. } => "SPICE(KERNELLOADFAILED)".into(),
            SetupError::SpkAccess { .. } => "SPICE(INVALIDSPKFILE)".into(),
            SetupError::BodyMapping { .. } => "SPICE(BADDIMENSIONS)".into(),
        }
    }
}

impl From<SpkError> for SetupError {
    fn from(source: SpkError) -> Self {
        SetupError::SpkAccess { source }
    }
}

impl From<BodyError> for SetupError {
    fn from(source: BodyError) -> Self {
        SetupError::BodyMapping { source }
    }
}

/// Outcome of command line processing.
#[derive(Debug)]
pub enum Resolved {
    /// Help requested or too few arguments: show version and usage.
    Help,
    Run(Box<DiffSetup>),
}

/// Key/value view of the tokens before the two positional paths. Keys
/// match case-insensitively; a value runs to the next key; the last
/// occurrence of a repeated key wins.
fn scan(tokens: &[String]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut current: Option<String> = None;
    let mut value = String::new();
    for token in tokens {
        let lowered = token.to_lowercase();
        if KEYS.contains(&lowered.as_str()) {
            if let Some(key) = current.take() {
                out.insert(key, value.trim().to_string());
            }
            current = Some(lowered);
            value.clear();
        } else if current.is_some() {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(token);
        }
        // Tokens before any key are ignored, as the original scanner does.
    }
    if let Some(key) = current {
        out.insert(key, value.trim().to_string());
    }
    out
}

fn et_label(et: f64) -> String {
    format!(
        "{} TDB",
        Epoch::from_et_seconds(et)
            .to_time_scale(TimeScale::TDB)
            .to_isoformat()
    )
}

/// Processes the command line into a run setup, furnishing `-k` kernels
/// into `manager` along the way (CHWCML analogue).
pub fn resolve(args: &[String], manager: &mut KernelManager) -> Result<Resolved, SetupError> {
    // Insufficient arguments or any help key: usage display.
    if args.len() < 2
        || args
            .iter()
            .any(|token| HELP_KEYS.contains(&token.to_lowercase().as_str()))
    {
        return Ok(Resolved::Help);
    }

    let spk = [
        args[args.len() - 2].clone(),
        args[args.len() - 1].clone(),
    ];
    let values = scan(&args[..args.len() - 2]);

    // Both positional files must exist and be SPKs before anything else.
    for (file_no, path) in spk.iter().enumerate() {
        if !std::path::Path::new(path).exists() {
            return Err(if file_no == 0 {
                SetupError::Spk1DoesNotExist { path: path.clone() }
            } else {
                SetupError::Spk2DoesNotExist { path: path.clone() }
            });
        }
        let is_spk = matches!(
            identify(path),
            Ok((arch, file_type)) if arch == "DAF" && file_type == "SPK"
        );
        if !is_spk {
            return Err(if file_no == 0 {
                SetupError::NotAnSpkFile1 { path: path.clone() }
            } else {
                SetupError::NotAnSpkFile2 { path: path.clone() }
            });
        }
    }

    // Supporting kernels first: they may define the very mappings the
    // remaining keys rely on.
    let mut kernels = Vec::new();
    if let Some(list) = values.get("-k") {
        if list.is_empty() {
            return Err(SetupError::MissingKernelNames);
        }
        for name in list.split_whitespace() {
            manager
                .furnish(name)
                .map_err(|source| SetupError::KernelLoad { source })?;
            kernels.push(name.to_string());
        }
    }

    let mut center: [Option<(i32, String)>; 2] = [None, None];
    let mut body: [Option<(i32, String)>; 2] = [None, None];
    let mut frame: [Option<(i32, String)>; 2] = [None, None];

    for (key, slot) in [("-c1", 0), ("-b1", 0), ("-r1", 0), ("-c2", 1), ("-b2", 1), ("-r2", 1)] {
        let value = match values.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        match &key[1..2] {
            "r" => {
                let key_name: &'static str = if slot == 0 { "-r1" } else { "-r2" };
                match frames::name_to_id(manager.pool(), value) {
                    Some(id) => frame[slot] = Some((id, value.clone())),
                    None => {
                        return Err(SetupError::BadFrameName {
                            key: key_name,
                            name: value.clone(),
                        })
                    }
                }
            }
            kind => {
                let key_name: &'static str = match (kind, slot) {
                    ("b", 0) => "-b1",
                    ("b", _) => "-b2",
                    ("c", 0) => "-c1",
                    _ => "-c2",
                };
                let resolved = resolve_body(manager, value)?.ok_or_else(|| {
                    SetupError::BadBodySpec {
                        key: key_name,
                        value: value.clone(),
                    }
                })?;
                if kind == "b" {
                    body[slot] = Some(resolved);
                } else {
                    center[slot] = Some(resolved);
                }
            }
        }
    }

    // Start and stop times.
    let mut et: [Option<(f64, String)>; 2] = [None, None];
    for (key, slot) in [("-b", 0), ("-e", 1)] {
        if let Some(value) = values.get(key) {
            let key_name: &'static str = if slot == 0 { "-b" } else { "-e" };
            let epoch = Epoch::from_str(value).map_err(|e| SetupError::InvalidTime {
                key: key_name,
                input: value.clone(),
                reason: e.to_string(),
            })?;
            et[slot] = Some((epoch.to_et_seconds(), value.clone()));
        }
    }
    if let (Some((start, start_str)), Some((stop, stop_str))) = (&et[0], &et[1]) {
        if stop < start {
            return Err(SetupError::InconsistentTimes {
                start: start_str.clone(),
                stop: stop_str.clone(),
            });
        }
    }

    // Body and center must be distinct for every combination actually
    // given on the command line.
    let collision = |combo: u8,
                     body: &(i32, String),
                     center: &(i32, String)|
     -> Result<(), SetupError> {
        if body.0 == center.0 {
            return Err(SetupError::SameBodyAndCenter {
                combo,
                body_name: body.1.clone(),
                body_id: body.0,
                center_name: center.1.clone(),
                center_id: center.0,
            });
        }
        Ok(())
    };
    if let (Some(b), Some(c)) = (&body[0], &center[0]) {
        collision(1, b, c)?;
    } else if let (Some(b), Some(c)) = (&body[1], &center[1]) {
        collision(2, b, c)?;
    } else if let (Some(b), Some(c), None) = (&body[0], &center[1], &center[0]) {
        collision(3, b, c)?;
    } else if let (Some(b), Some(c), None) = (&body[1], &center[0], &center[1]) {
        collision(4, b, c)?;
    }

    // Mirror one-sided values to the other side.
    mirror(&mut body);
    mirror(&mut center);
    mirror(&mut frame);

    // Fill anything still missing from the first SPK's segments.
    if body[0].is_none() || center[0].is_none() || frame[0].is_none() {
        let file = SpkFile::open(&spk[0])?;
        let mut last_any = None;
        let mut last_spacecraft = None;
        let mut last_for_body = None;
        for segment in &file.segments {
            last_any = Some(segment);
            if segment.body < 0 {
                last_spacecraft = Some(segment);
            }
            if let Some((wanted, _)) = &body[0] {
                if segment.body == *wanted {
                    last_for_body = Some(segment);
                }
            }
        }
        let template = if let Some((id, name)) = &body[0] {
            last_for_body.ok_or_else(|| SetupError::NoDataForBody {
                which: 1,
                path: spk[0].clone(),
                name: name.clone(),
                id: *id,
            })?
        } else if let Some(segment) = last_spacecraft {
            segment
        } else {
            last_any.ok_or_else(|| SetupError::CannotGetDefaults { path: spk[0].clone() })?
        };
        debug!(
            "defaults from segment '{}' of {}: body {}, center {}, frame {}",
            template.name, spk[0], template.body, template.center, template.frame
        );

        if body[0].is_none() {
            let name = manager
                .body_name(template.body)?
                .unwrap_or_else(|| template.body.to_string());
            body = [
                Some((template.body, name.clone())),
                Some((template.body, name)),
            ];
        }
        if center[0].is_none() {
            let name = manager
                .body_name(template.center)?
                .unwrap_or_else(|| template.center.to_string());
            center = [
                Some((template.center, name.clone())),
                Some((template.center, name)),
            ];
        }
        if frame[0].is_none() {
            let name = frames::id_to_name(manager.pool(), template.frame)
                .ok_or(SetupError::CannotPickFrame)?;
            frame = [
                Some((template.frame, name.clone())),
                Some((template.frame, name)),
            ];
        }
    }

    let body = [body[0].clone().unwrap(), body[1].clone().unwrap()];
    let center = [center[0].clone().unwrap(), center[1].clone().unwrap()];
    let frame = [frame[0].clone().unwrap(), frame[1].clone().unwrap()];

    // The pairs now in hand must still be distinct.
    for (combo, pair) in [(3u8, 0usize), (4, 1)] {
        if body[pair].0 == center[pair].0 {
            return Err(SetupError::SamePickedBodyAndCenter {
                combo,
                body_name: body[pair].1.clone(),
                body_id: body[pair].0,
                center_name: center[pair].1.clone(),
                center_id: center[pair].0,
            });
        }
    }

    // Missing time bounds come from the coverage intersection.
    let bounds = if et[0].is_none() || et[1].is_none() {
        Some(coverage_bounds(&spk, &body, &et)?)
    } else {
        None
    };
    let et = match (et[0].clone(), et[1].clone()) {
        (Some((start, _)), Some((stop, _))) => [start, stop],
        _ => bounds.unwrap(),
    };
    let time_label = [et_label(et[0]), et_label(et[1])];

    // Step has priority over count.
    let span = et[1] - et[0];
    let (count, step) = if let Some(value) = values.get("-s") {
        let step = f64::from_str(value).map_err(|_| SetupError::NotADpNumber {
            value: value.clone(),
        })?;
        if step < MIN_STEP {
            return Err(SetupError::StepTooSmall { value: value.clone() });
        }
        let quotient = (span / step).floor();
        if quotient > (MAX_STATES as f64) {
            return Err(SetupError::StepTooSmall2 {
                states: quotient,
                step,
            });
        }
        let remainder = span - quotient * step;
        let count = if quotient == 0.0 {
            2
        } else if remainder <= MIN_STEP {
            quotient as usize + 1
        } else {
            quotient as usize + 2
        };
        if count > MAX_STATES {
            return Err(SetupError::StepTooSmall2 {
                states: count as f64,
                step,
            });
        }
        (count, step)
    } else {
        let count = if let Some(value) = values.get("-n") {
            let count = i64::from_str(value).map_err(|_| SetupError::NotAnIntegerNumber {
                value: value.clone(),
            })?;
            if !(2..=MAX_STATES as i64).contains(&count) {
                return Err(SetupError::BadNumberOfStates { value: count });
            }
            count as usize
        } else if span == 0.0 {
            2
        } else {
            DEFAULT_STATES
        };
        (count, span / (count - 1) as f64)
    };

    let report = match values.get("-t") {
        Some(value) => ReportKind::from_keyword(value).ok_or_else(|| {
            SetupError::BadOutputType { value: value.clone() }
        })?,
        None => ReportKind::Basic,
    };

    // The format picture itself is validated downstream on first use;
    // only blankness is caught here.
    let time_format = if matches!(report, ReportKind::Dump | ReportKind::DumpVf) {
        match values.get("-f") {
            Some(value) if value.is_empty() => return Err(SetupError::BlankTimeFormat),
            Some(value) => Some(value.clone()),
            None => None,
        }
    } else {
        None
    };

    Ok(Resolved::Run(Box::new(DiffSetup {
        spk,
        body_name: [body[0].1.clone(), body[1].1.clone()],
        body_id: [body[0].0, body[1].0],
        center_name: [center[0].1.clone(), center[1].1.clone()],
        center_id: [center[0].0, center[1].0],
        frame: [frame[0].1.clone(), frame[1].1.clone()],
        frame_id: [frame[0].0, frame[1].0],
        time_label,
        et,
        count,
        step,
        report,
        time_format,
        kernels,
    })))
}

fn mirror(pair: &mut [Option<(i32, String)>; 2]) {
    if pair[0].is_none() && pair[1].is_some() {
        pair[0] = pair[1].clone();
    } else if pair[1].is_none() && pair[0].is_some() {
        pair[1] = pair[0].clone();
    }
}

/// Integer text is the ID itself (named when the catalog knows it);
/// anything else must resolve as a name.
fn resolve_body(
    manager: &KernelManager,
    value: &str,
) -> Result<Option<(i32, String)>, SetupError> {
    if let Ok(id) = value.trim().parse::<i32>() {
        let name = manager.body_name(id)?.unwrap_or_else(|| value.to_string());
        return Ok(Some((id, name)));
    }
    Ok(manager
        .catalog()
        .name_to_id(manager.pool(), value)?
        .map(|id| (id, value.to_string())))
}

/// Coverage intersection of the two files, possibly clipped by the one
/// given bound, reduced to a single interval.
fn coverage_bounds(
    spk: &[String; 2],
    body: &[(i32, String); 2],
    et: &[Option<(f64, String)>; 2],
) -> Result<[f64; 2], SetupError> {
    let mut covers = Vec::with_capacity(2);
    for file_no in 0..2 {
        let cover = SpkFile::open(&spk[file_no])?.coverage(body[file_no].0);
        if cover.is_empty() {
            return Err(SetupError::NoDataForBody {
                which: file_no as u8 + 2,
                path: spk[file_no].clone(),
                name: body[file_no].1.clone(),
                id: body[file_no].0,
            });
        }
        covers.push(cover);
    }
    let both = covers[0].intersect(&covers[1]);
    let overlap_error = |which: u8, clip: String| SetupError::NoOverlap {
        which,
        body1: body[0].1.clone(),
        id1: body[0].0,
        spk1: spk[0].clone(),
        body2: body[1].1.clone(),
        id2: body[1].0,
        spk2: spk[1].clone(),
        clip,
    };
    if both.is_empty() {
        return Err(overlap_error(1, String::new()));
    }

    let (which, clip, clipped) = match (&et[0], &et[1]) {
        (None, None) => (1u8, String::new(), both),
        (None, Some((stop, stop_str))) => {
            let limit = Window::from_intervals(&[(f64::MIN, *stop)]).unwrap();
            (
                2,
                format!(" before '{stop_str}'({stop} TDB seconds)"),
                both.intersect(&limit),
            )
        }
        (Some((start, start_str)), None) => {
            let limit = Window::from_intervals(&[(*start, f64::MAX)]).unwrap();
            (
                3,
                format!(" after '{start_str}'({start} TDB seconds)"),
                both.intersect(&limit),
            )
        }
        // Both bounds given: this function is never called.
        (Some((start, _)), Some((stop, _))) => return Ok([*start, *stop]),
    };
    if clipped.is_empty() {
        return Err(overlap_error(which, clip));
    }
    if clipped.card() > 1 {
        return Err(SetupError::MoreThanOneInterval {
            which,
            body1: body[0].1.clone(),
            id1: body[0].0,
            spk1: spk[0].clone(),
            body2: body[1].1.clone(),
            id2: body[1].0,
            spk2: spk[1].clone(),
            clip,
        });
    }
    let (start, stop) = clipped.first().unwrap();
    Ok([start, stop])
}

/// The version banner, three lines like the original's.
pub fn version_banner() -> String {
    format!(
        " \nephdiff -- Version {}\n \n",
        env!("CARGO_PKG_VERSION")
    )
}

/// The usage display shown for help keys or insufficient arguments.
pub fn usage() -> String {
    format!(
        "   ephdiff computes differences between geometric states obtained from \n\
         \x20  two SPK files and either displays these differences or shows statistics \n\
         \x20  about them. The program usage is:\n\
         \n\
         \x20     % ephdiff [options] <first SPK file> <second SPK file>\n\
         \n\
         \x20  Options are shown below. Order and case of keys are not significant.\n\
         \x20  Values must be space-separated from keys, i.e. '-n 10', not '-n10'.\n\
         \n\
         \x20     -b1 <first body name or ID>\n\
         \x20     -c1 <first center name or ID>\n\
         \x20     -r1 <first reference frame name>\n\
         \x20     -b2 <second body name or ID>\n\
         \x20     -c2 <second center name or ID>\n\
         \x20     -r2 <second reference frame name>\n\
         \x20     -k  <other kernel file name(s)>\n\
         \x20     -b  <interval start time>\n\
         \x20     -e  <interval stop time>\n\
         \x20     -s  <time step in seconds>\n\
         \x20     -n  <number of states: 2 to {MAX_STATES} (default: {DEFAULT_STATES})>\n\
         \x20     -f  <output time format (default: TDB seconds past J2000)>\n\
         \x20     -t  <report type: basic|stats|dump|dumpvf (default: basic)>\n"
    )
}
