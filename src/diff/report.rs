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

//! Rendering of the four comparison summaries.
//!
//! The view frame for the per-state decomposition comes from the first
//! file's state: down track along the velocity, normal to the orbit
//! plane, and completing the right-handed set in the plane.

use hifitime::prelude::{Epoch, Format, Formatter};
use std::fmt::Write;
use std::str::FromStr;

use crate::linalg::{Vector3, Vector6};

use super::{DiffError, ReportKind, StateTable};

/// Renders the requested summary of the differences.
pub fn render(
    table: &StateTable,
    kind: ReportKind,
    time_format: Option<&str>,
) -> Result<String, DiffError> {
    match kind {
        ReportKind::Dump => dump(table, time_format),
        ReportKind::DumpVf => dump_view_frame(table, time_format),
        ReportKind::Stats => Ok(stats(table)),
        ReportKind::Basic => Ok(basic(table)),
    }
}

fn position(state: &Vector6<f64>) -> Vector3<f64> {
    Vector3::new(state[0], state[1], state[2])
}

fn velocity(state: &Vector6<f64>) -> Vector3<f64> {
    Vector3::new(state[3], state[4], state[5])
}

/// Relative difference of two vectors: |a-b| / max(|a|, |b|), zero for
/// two zero vectors.
fn vrel(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm().max(b.norm());
    if denom == 0.0 {
        0.0
    } else {
        (a - b).norm() / denom
    }
}

/// 14 significant digits, scientific, two-digit signed exponent.
fn sci14(value: f64) -> String {
    let raw = format!("{value:.13E}");
    match raw.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{:0>2}", digits)
        }
        None => raw,
    }
}

/// Leading '+' on non-negative numbers, the way the dumps mark signs.
fn signed(text: String) -> String {
    if text.starts_with('-') {
        text
    } else {
        format!("+{text}")
    }
}

/// 14 significant digits in fixed notation.
fn fixed14(value: f64) -> String {
    let magnitude = value.abs();
    let integer_digits = if magnitude < 1.0 {
        1
    } else {
        magnitude.log10().floor() as i32 + 1
    };
    let decimals = (14 - integer_digits).clamp(0, 20) as usize;
    format!("{value:.decimals$}")
}

fn time_string(et: f64, format: Option<&str>) -> Result<String, DiffError> {
    match format {
        None => Ok(sci14(et)),
        Some(picture) => {
            let format = Format::from_str(picture).map_err(|e| DiffError::BadTimeFormat {
                format: picture.to_string(),
                reason: format!("{e:?}"),
            })?;
            Ok(Formatter::new(Epoch::from_et_seconds(et), format).to_string())
        }
    }
}

fn dump(table: &StateTable, time_format: Option<&str>) -> Result<String, DiffError> {
    let mut out = String::new();
    out.push_str(
        "# time, (x1-x2), (y1-y2), (z1-z2), (vx1-vx2), (vy1-vy2), (vz1-vz2)\n",
    );
    for (j, &et) in table.times.iter().enumerate() {
        let mut row = time_string(et, time_format)?;
        let diff = table.first[j] - table.second[j];
        for c in 0..6 {
            row.push(' ');
            row.push_str(&signed(sci14(diff[c])));
        }
        out.push_str(&row);
        out.push('\n');
    }
    Ok(out)
}

/// Unit axes of the view frame, or None when position and velocity are
/// linearly dependent.
fn view_axes(state: &Vector6<f64>) -> Option<[Vector3<f64>; 3]> {
    let down = velocity(state);
    let normal = position(state).cross(&down);
    let in_plane = down.cross(&normal);
    if down.norm() == 0.0 || normal.norm() == 0.0 || in_plane.norm() == 0.0 {
        return None;
    }
    Some([
        down / down.norm(),
        normal / normal.norm(),
        in_plane / in_plane.norm(),
    ])
}

fn dump_view_frame(table: &StateTable, time_format: Option<&str>) -> Result<String, DiffError> {
    if table.first.iter().any(|state| view_axes(state).is_none()) {
        return Ok("\nNo view frame difference table can be generated because in one or more cases\n\
                   the state computed from the first SPK has linearly dependent position and\n\
                   velocity, which makes constructing the view frame impossible.\n\n"
            .to_string());
    }
    let mut out = String::new();
    out.push_str(
        "# time, down_track_p_diff, normal_to_plane_p_diff, in_plane_p_diff, \
         down_track_v_diff, normal_to_plane_v_diff, in_plane_v_diff\n",
    );
    for (j, &et) in table.times.iter().enumerate() {
        let axes = view_axes(&table.first[j]).unwrap();
        let diff = table.first[j] - table.second[j];
        let dp = position(&diff);
        let dv = velocity(&diff);
        let mut row = time_string(et, time_format)?;
        for axis in &axes {
            row.push(' ');
            row.push_str(&signed(sci14(dp.dot(axis))));
        }
        for axis in &axes {
            row.push(' ');
            row.push_str(&signed(sci14(dv.dot(axis))));
        }
        out.push_str(&row);
        out.push('\n');
    }
    Ok(out)
}

#[derive(Default)]
struct Accumulated {
    n: f64,
    // view-frame position/velocity component sums, |sums|, and squares
    sum_p: [f64; 3],
    sum_v: [f64; 3],
    sum_pa: [f64; 3],
    sum_va: [f64; 3],
    sum_ps: [f64; 3],
    sum_dt: f64,
    sum_adt: f64,
    sum_sdt: f64,
    // worst cases
    max_pos: f64,
    max_vel: f64,
    max_rel_pos: f64,
    max_rel_vel: f64,
    // view-frame components and epochs of the worst absolute/relative
    // position differences
    worst_abs: ([f64; 3], f64, f64),
    worst_rel: ([f64; 3], f64, f64),
    // averages of magnitudes
    avg_pos: f64,
    avg_vel: f64,
    avg_rel_pos: f64,
    avg_rel_vel: f64,
    degenerate: bool,
}

fn accumulate(table: &StateTable) -> Accumulated {
    let mut acc = Accumulated {
        max_pos: f64::MIN,
        max_vel: f64::MIN,
        max_rel_pos: f64::MIN,
        max_rel_vel: f64::MIN,
        n: table.times.len() as f64,
        ..Default::default()
    };
    let mut pos_sum = 0.0;
    let mut vel_sum = 0.0;
    let mut rel_pos_sum = 0.0;
    let mut rel_vel_sum = 0.0;

    for (j, &et) in table.times.iter().enumerate() {
        let a = &table.first[j];
        let b = &table.second[j];
        let diff = a - b;
        let dp = position(&diff);
        let dv = velocity(&diff);

        let pos_mag = dp.norm();
        let vel_mag = dv.norm();
        let pos_rel = vrel(&position(a), &position(b));
        let vel_rel = vrel(&velocity(a), &velocity(b));
        pos_sum += pos_mag;
        vel_sum += vel_mag;
        rel_pos_sum += pos_rel;
        rel_vel_sum += vel_rel;

        let new_abs_worst = pos_mag > acc.max_pos;
        let new_rel_worst = pos_rel > acc.max_rel_pos;
        acc.max_pos = acc.max_pos.max(pos_mag);
        acc.max_vel = acc.max_vel.max(vel_mag);
        acc.max_rel_pos = acc.max_rel_pos.max(pos_rel);
        acc.max_rel_vel = acc.max_rel_vel.max(vel_rel);

        let axes = match view_axes(a) {
            Some(axes) => axes,
            None => {
                acc.degenerate = true;
                continue;
            }
        };
        if acc.degenerate {
            continue;
        }
        let p_comp = [dp.dot(&axes[0]), dp.dot(&axes[1]), dp.dot(&axes[2])];
        let v_comp = [dv.dot(&axes[0]), dv.dot(&axes[1]), dv.dot(&axes[2])];
        // Down-track position error over the speed: the timing error
        // along the flight path.
        let delta_t = p_comp[0] / velocity(a).norm();
        acc.sum_dt += delta_t;
        acc.sum_adt += delta_t.abs();
        acc.sum_sdt += delta_t * delta_t;
        for i in 0..3 {
            acc.sum_p[i] += p_comp[i];
            acc.sum_v[i] += v_comp[i];
            acc.sum_pa[i] += p_comp[i].abs();
            acc.sum_va[i] += v_comp[i].abs();
            acc.sum_ps[i] += p_comp[i] * p_comp[i];
        }
        if new_abs_worst {
            acc.worst_abs = (p_comp, delta_t, et);
        }
        if new_rel_worst {
            acc.worst_rel = (p_comp, delta_t, et);
        }
    }
    acc.avg_pos = pos_sum / acc.n;
    acc.avg_vel = vel_sum / acc.n;
    acc.avg_rel_pos = rel_pos_sum / acc.n;
    acc.avg_rel_vel = rel_vel_sum / acc.n;
    acc
}

fn basic(table: &StateTable) -> String {
    let acc = accumulate(table);
    let mut out = String::new();
    out.push('\n');
    out.push_str("Relative differences in state vectors:\n\n");
    out.push_str("                              maximum                 average\n\n");
    let _ = writeln!(
        out,
        "  Position:             {}      {}",
        sci14(acc.max_rel_pos),
        sci14(acc.avg_rel_pos)
    );
    let _ = writeln!(
        out,
        "  Velocity:             {}      {}",
        sci14(acc.max_rel_vel),
        sci14(acc.avg_rel_vel)
    );
    out.push('\n');
    out.push_str("Absolute differences in state vectors:\n\n");
    out.push_str("                              maximum                 average\n\n");
    let _ = writeln!(
        out,
        "  Position (km):        {}      {}",
        sci14(acc.max_pos),
        sci14(acc.avg_pos)
    );
    let _ = writeln!(
        out,
        "  Velocity (km/s):      {}      {}",
        sci14(acc.max_vel),
        sci14(acc.avg_vel)
    );
    out.push('\n');
    out
}

fn stats(table: &StateTable) -> String {
    let acc = accumulate(table);
    if acc.degenerate {
        warn!("view frame undefined for at least one state, statistics skipped");
        return String::new();
    }
    let n = acc.n;
    let mut out = String::new();

    let block = |out: &mut String, title: &str, rows: &[(&str, f64)]| {
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for (label, value) in rows {
            let _ = writeln!(out, "\n{:<46}{}", label, fixed14(*value));
        }
        out.push('\n');
    };

    block(
        &mut out,
        "1) Average components of position difference vectors in view \n   frame coordinates:",
        &[
            ("   1a) Down track (km):                       ", acc.sum_p[0] / n),
            ("   1b) In orbit plane (km):                   ", acc.sum_p[2] / n),
            ("   1c) Normal to orbit plane (km):            ", acc.sum_p[1] / n),
            ("   1d) Average delta time down track (sec):   ", acc.sum_dt / n),
        ],
    );
    block(
        &mut out,
        "2) Average |components| of position difference vectors in \n   view frame coordinates:",
        &[
            ("   2a) Down track (km):                       ", acc.sum_pa[0] / n),
            ("   2b) In orbit plane (km):                   ", acc.sum_pa[2] / n),
            ("   2c) Normal to orbit plane (km):            ", acc.sum_pa[1] / n),
            ("   2d) Average |delta time| down track (sec): ", acc.sum_adt / n),
        ],
    );
    block(
        &mut out,
        "3) RMS of position difference vectors in view frame coordinates:",
        &[
            ("   3a) Down track (km):                       ", (acc.sum_ps[0] / n).sqrt()),
            ("   3b) In orbit plane (km):                   ", (acc.sum_ps[2] / n).sqrt()),
            ("   3c) Normal to orbit plane (km):            ", (acc.sum_ps[1] / n).sqrt()),
            ("   3d) RMS delta time down track (sec):       ", (acc.sum_sdt / n).sqrt()),
        ],
    );
    let (rel_comp, rel_dt, rel_et) = acc.worst_rel;
    block(
        &mut out,
        "4) Components of the position difference vector in view frame\n   \
         coordinates for the states with the MAXIMUM RELATIVE \n   difference in position: ",
        &[
            ("   4a) Down track (km):                       ", rel_comp[0]),
            ("   4b) In orbit plane (km):                   ", rel_comp[2]),
            ("   4c) Normal to orbit plane (km):            ", rel_comp[1]),
            ("   4d) Delta time down track (sec):           ", rel_dt),
            ("   4e) Epoch (TDB, seconds past J2000):       ", rel_et),
        ],
    );
    let (abs_comp, abs_dt, abs_et) = acc.worst_abs;
    block(
        &mut out,
        "5) Components of the position difference vector in view frame\n   \
         coordinates for the states with the MAXIMUM ABSOLUTE \n   difference in position: ",
        &[
            ("   5a) Down track (km):                       ", abs_comp[0]),
            ("   5b) In orbit plane (km):                   ", abs_comp[2]),
            ("   5c) Normal to orbit plane (km):            ", abs_comp[1]),
            ("   5d) Delta time down track (sec):           ", abs_dt),
            ("   5e) Epoch (TDB, seconds past J2000):       ", abs_et),
        ],
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StateTable {
        // Circular-ish motion along x with brisk velocity along y, offset
        // by a fixed 3-4-0 km error in the second file.
        let times: Vec<f64> = (0..5).map(|i| i as f64 * 10.0).collect();
        let first: Vec<Vector6<f64>> = times
            .iter()
            .map(|&t| Vector6::new(7000.0 + t, 0.0, 0.0, 0.0, 7.5, 0.0))
            .collect();
        let second: Vec<Vector6<f64>> = first
            .iter()
            .map(|s| s + Vector6::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0))
            .collect();
        StateTable { times, first, second }
    }

    #[test]
    fn sci14_format() {
        assert_eq!(sci14(123.45), "1.2345000000000E+02");
        assert_eq!(sci14(-0.5), "-5.0000000000000E-01");
        assert_eq!(sci14(0.0), "0.0000000000000E+00");
        assert_eq!(signed(sci14(1.0)), "+1.0000000000000E+00");
        assert_eq!(signed(sci14(-1.0)), "-1.0000000000000E+00");
    }

    #[test]
    fn fixed14_format() {
        assert_eq!(fixed14(1.5), "1.5000000000000");
        assert_eq!(fixed14(12345.0), "12345.000000000");
        assert_eq!(fixed14(-0.25), "-0.2500000000000");
    }

    #[test]
    fn vrel_definition() {
        let a = Vector3::new(3.0, 4.0, 0.0);
        let b = Vector3::new(3.0, 3.0, 0.0);
        assert!((vrel(&a, &b) - 1.0 / 5.0).abs() < 1e-14);
        assert_eq!(vrel(&Vector3::zeros(), &Vector3::zeros()), 0.0);
    }

    #[test]
    fn dump_rows() {
        let report = render(&table(), ReportKind::Dump, None).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines[0],
            "# time, (x1-x2), (y1-y2), (z1-z2), (vx1-vx2), (vy1-vy2), (vz1-vz2)"
        );
        assert_eq!(lines.len(), 6);
        // STA - STB = (-3, -4, 0, 0, 0, 0)
        assert!(lines[1].contains("-3.0000000000000E+00"));
        assert!(lines[1].contains("-4.0000000000000E+00"));
        assert!(lines[1].contains("+0.0000000000000E+00"));
    }

    #[test]
    fn dump_honors_time_format() {
        let report = render(&table(), ReportKind::Dump, Some("%Y-%m-%d")).unwrap();
        assert!(report.lines().nth(1).unwrap().starts_with("2000-01-01"));
        assert!(matches!(
            render(&table(), ReportKind::Dump, Some("%Q")),
            Err(DiffError::BadTimeFormat { .. })
        ));
    }

    #[test]
    fn dumpvf_decomposes_in_view_frame() {
        let report = render(&table(), ReportKind::DumpVf, None).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("# time, down_track_p_diff"));
        // Velocity is +y, so down track = -4; orbit normal is p x v = +z,
        // so normal = 0; in plane completes with -3.
        let row = lines[1];
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields[1], "-4.0000000000000E+00");
        assert_eq!(fields[2], "+0.0000000000000E+00");
        assert_eq!(fields[3], "-3.0000000000000E+00");
    }

    #[test]
    fn dumpvf_degenerate_states_explained() {
        let mut degenerate = table();
        // Zero velocity on one state kills the view frame.
        degenerate.first[2] = Vector6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let report = render(&degenerate, ReportKind::DumpVf, None).unwrap();
        assert!(report.contains("No view frame difference table"));
    }

    #[test]
    fn basic_report_values() {
        let report = render(&table(), ReportKind::Basic, None).unwrap();
        assert!(report.contains("Relative differences in state vectors:"));
        assert!(report.contains("Absolute differences in state vectors:"));
        // |dp| = 5 at every sample.
        assert!(report.contains("  Position (km):        5.0000000000000E+00      5.0000000000000E+00"));
        // Velocities agree.
        assert!(report.contains("  Velocity (km/s):      0.0000000000000E+00      0.0000000000000E+00"));
    }

    #[test]
    fn stats_report_blocks() {
        let report = render(&table(), ReportKind::Stats, None).unwrap();
        for needle in [
            "1) Average components",
            "2) Average |components|",
            "3) RMS",
            "4) Components of the position difference vector",
            "5) Components of the position difference vector",
            "   1a) Down track (km):",
            "   5e) Epoch (TDB, seconds past J2000):",
        ] {
            assert!(report.contains(needle), "missing {needle}");
        }
        // Down track error is -4 km at 7.5 km/s.
        assert!(report.contains("-4.0000000000000"));
    }

    #[test]
    fn stats_degenerate_is_silent() {
        let mut degenerate = table();
        degenerate.first[0] = Vector6::new(1.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let report = render(&degenerate, ReportKind::Stats, None).unwrap();
        assert!(report.is_empty());
    }
}
