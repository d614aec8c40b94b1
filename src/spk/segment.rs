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

//! Per-type SPK segment evaluation.
//!
//! Type 2 holds fixed-width Chebyshev position records (velocity is the
//! differentiated series), type 3 adds Chebyshev velocity components, and
//! types 9 and 13 hold discrete states interpolated by Lagrange and
//! Hermite polynomials respectively.

use crate::daf::DafFile;
use crate::linalg::Vector6;

use super::{SpkError, SpkSegment};

pub(crate) fn evaluate(
    daf: &DafFile,
    segment: &SpkSegment,
    et: f64,
) -> Result<Vector6<f64>, SpkError> {
    match segment.data_type {
        2 => chebyshev(daf, segment, et, 3),
        3 => chebyshev(daf, segment, et, 6),
        9 => discrete(daf, segment, et, Interp::Lagrange),
        13 => discrete(daf, segment, et, Interp::Hermite),
        other => Err(SpkError::UnsupportedType { data_type: other }),
    }
}

/// Types 2 and 3. `ncomp` is the Chebyshev component count per record.
fn chebyshev(
    daf: &DafFile,
    segment: &SpkSegment,
    et: f64,
    ncomp: usize,
) -> Result<Vector6<f64>, SpkError> {
    let trailer = daf.read_doubles(segment.end - 3, segment.end)?;
    let (init, intlen, rsize, n) = (
        trailer[0],
        trailer[1],
        trailer[2] as usize,
        trailer[3] as usize,
    );
    if intlen <= 0.0 || n == 0 || rsize < 2 + ncomp || (rsize - 2) % ncomp != 0 {
        return Err(SpkError::MalformedSegment {
            name: segment.name.clone(),
            reason: format!("bad directory (INTLEN {intlen}, RSIZE {rsize}, N {n})"),
        });
    }
    let ncoef = (rsize - 2) / ncomp;

    let index = (((et - init) / intlen).floor().max(0.0) as usize).min(n - 1);
    let first = segment.begin + index * rsize;
    let record = daf.read_doubles(first, first + rsize - 1)?;
    let (mid, radius) = (record[0], record[1]);
    if radius <= 0.0 {
        return Err(SpkError::MalformedSegment {
            name: segment.name.clone(),
            reason: "record radius is not positive".to_string(),
        });
    }

    let tau = (et - mid) / radius;
    // Chebyshev polynomials and their tau-derivatives at tau.
    let mut t = vec![0.0; ncoef];
    let mut dt = vec![0.0; ncoef];
    t[0] = 1.0;
    if ncoef > 1 {
        t[1] = tau;
        dt[1] = 1.0;
    }
    if ncoef > 2 {
        dt[2] = 4.0 * tau;
    }
    for k in 2..ncoef {
        t[k] = 2.0 * tau * t[k - 1] - t[k - 2];
        if k > 2 {
            dt[k] = 2.0 * tau * dt[k - 1] - dt[k - 2] + 2.0 * t[k - 1];
        }
    }

    let component = |c: usize, basis: &[f64]| -> f64 {
        let coeffs = &record[2 + c * ncoef..2 + (c + 1) * ncoef];
        coeffs.iter().zip(basis).map(|(a, b)| a * b).sum()
    };

    let mut state = Vector6::zeros();
    if ncomp == 3 {
        for c in 0..3 {
            state[c] = component(c, &t);
            // d/det = d/dtau * dtau/det
            state[c + 3] = component(c, &dt) / radius;
        }
    } else {
        for c in 0..3 {
            state[c] = component(c, &t);
            state[c + 3] = component(c + 3, &t);
        }
    }
    Ok(state)
}

enum Interp {
    Lagrange,
    Hermite,
}

/// Types 9 and 13: N discrete states, N epochs, then (degree, N).
fn discrete(
    daf: &DafFile,
    segment: &SpkSegment,
    et: f64,
    interp: Interp,
) -> Result<Vector6<f64>, SpkError> {
    let trailer = daf.read_doubles(segment.end - 1, segment.end)?;
    let degree = trailer[0] as usize;
    let n = trailer[1] as usize;
    let expect = 7 * n + 2;
    if n == 0 || segment.end - segment.begin + 1 != expect {
        return Err(SpkError::MalformedSegment {
            name: segment.name.clone(),
            reason: format!("directory count {n} does not match the segment size"),
        });
    }
    let group = match interp {
        Interp::Lagrange => degree + 1,
        Interp::Hermite => (degree + 1) / 2,
    };
    if group == 0 || group > n {
        return Err(SpkError::MalformedSegment {
            name: segment.name.clone(),
            reason: format!("window of {group} states but only {n} available"),
        });
    }

    let states = daf.read_doubles(segment.begin, segment.begin + 6 * n - 1)?;
    let epochs = daf.read_doubles(segment.begin + 6 * n, segment.begin + 7 * n - 1)?;

    // Center the interpolation window on the request epoch.
    let before = epochs.partition_point(|&t| t < et);
    let start = before
        .saturating_sub(group / 2 + group % 2)
        .min(n - group);
    let xs = &epochs[start..start + group];

    let mut state = Vector6::zeros();
    for c in 0..3 {
        let pos: Vec<f64> = (start..start + group).map(|i| states[6 * i + c]).collect();
        let vel: Vec<f64> = (start..start + group)
            .map(|i| states[6 * i + c + 3])
            .collect();
        match interp {
            Interp::Lagrange => {
                state[c] = lagrange(xs, &pos, et);
                state[c + 3] = lagrange(xs, &vel, et);
            }
            Interp::Hermite => {
                let (p, v) = hermite(xs, &pos, &vel, et);
                state[c] = p;
                state[c + 3] = v;
            }
        }
    }
    Ok(state)
}

/// Neville's algorithm.
fn lagrange(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    let mut work = ys.to_vec();
    for width in 1..n {
        for i in 0..n - width {
            work[i] = ((x - xs[i + width]) * work[i] + (xs[i] - x) * work[i + 1])
                / (xs[i] - xs[i + width]);
        }
    }
    work[0]
}

/// Hermite interpolation over nodes with values and derivatives, by
/// divided differences on doubled nodes. Returns the interpolated value
/// and its derivative.
fn hermite(xs: &[f64], ys: &[f64], yds: &[f64], x: f64) -> (f64, f64) {
    let m = 2 * xs.len();
    let mut z = vec![0.0; m];
    let mut prev = vec![0.0; m];
    for i in 0..xs.len() {
        z[2 * i] = xs[i];
        z[2 * i + 1] = xs[i];
        prev[2 * i] = ys[i];
        prev[2 * i + 1] = ys[i];
    }
    let mut coeffs = Vec::with_capacity(m);
    coeffs.push(prev[0]);
    let mut current = vec![0.0; m];
    for width in 1..m {
        for i in 0..m - width {
            current[i] = if z[i + width] == z[i] {
                yds[i / 2]
            } else {
                (prev[i + 1] - prev[i]) / (z[i + width] - z[i])
            };
        }
        coeffs.push(current[0]);
        std::mem::swap(&mut prev, &mut current);
    }

    // Nested evaluation of the Newton form and its derivative.
    let mut value = coeffs[m - 1];
    let mut deriv = 0.0;
    for j in (0..m - 1).rev() {
        deriv = deriv * (x - z[j]) + value;
        value = value * (x - z[j]) + coeffs[j];
    }
    (value, deriv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lagrange_reproduces_polynomials() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * x * x * x - x + 5.0).collect();
        for x in [0.5, 1.5, 2.7] {
            assert_abs_diff_eq!(
                lagrange(&xs, &ys, x),
                2.0 * x * x * x - x + 5.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn hermite_reproduces_value_and_slope() {
        // p(x) = x^3 - 2x; p'(x) = 3x^2 - 2. Two nodes carry four
        // conditions, enough for a cubic.
        let xs = [1.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| x * x * x - 2.0 * x).collect();
        let yds: Vec<f64> = xs.iter().map(|&x| 3.0 * x * x - 2.0).collect();
        for x in [1.0, 2.2, 3.9] {
            let (v, d) = hermite(&xs, &ys, &yds, x);
            assert_abs_diff_eq!(v, x * x * x - 2.0 * x, epsilon = 1e-9);
            assert_abs_diff_eq!(d, 3.0 * x * x - 2.0, epsilon = 1e-9);
        }
    }
}
