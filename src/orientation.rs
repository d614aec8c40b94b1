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

//! Body orientation from planetary-constants pool variables.
//!
//! A body's pole and prime meridian come from `BODYnnn_POLE_RA`,
//! `BODYnnn_POLE_DEC`, and `BODYnnn_PM`: quadratic polynomials in TDB
//! centuries (pole) or days (prime meridian) past J2000, in degrees.
//! When the body's barycenter defines `NUT_PREC_ANGLES`, the body's
//! `NUT_PREC_RA`/`_DEC`/`_PM` coefficients add the periodic
//! nutation-precession terms.

use snafu::Snafu;

use crate::linalg::Matrix3;
use crate::pool::KernelPool;

/// Seconds per Julian day and century.
const SPD: f64 = 86_400.0;
const SPC: f64 = 36_525.0 * SPD;

#[derive(Debug, Snafu)]
pub enum OrientationError {
    #[snafu(display("no orientation constants for body {body} are loaded (missing BODY{body}_{item})"))]
    MissingConstants { body: i32, item: String },
    #[snafu(display(
        "BODY{body}_{item} lists {have} coefficients but {angles} nutation angles are defined"
    ))]
    MismatchedSeries {
        body: i32,
        item: String,
        have: usize,
        angles: usize,
    },
}

/// Rotation about the x axis, SPICE sense: maps base-frame vectors into
/// the rotated frame.
pub fn r1(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Rotation about the z axis, SPICE sense.
pub fn r3(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// The J2000-to-body-fixed rotation for `body` at `et` TDB seconds
/// (BODMAT analogue): `R3(W) R1(pi/2 - dec) R3(pi/2 + ra)`.
pub fn rotation_to_body_fixed(
    pool: &KernelPool,
    body: i32,
    et: f64,
) -> Result<Matrix3<f64>, OrientationError> {
    let (ra, dec, w) = euler_angles(pool, body, et)?;
    let half_pi = std::f64::consts::FRAC_PI_2;
    Ok(r3(w) * r1(half_pi - dec) * r3(half_pi + ra))
}

/// The right ascension and declination of the pole and the prime meridian
/// angle, in radians.
pub fn euler_angles(
    pool: &KernelPool,
    body: i32,
    et: f64,
) -> Result<(f64, f64, f64), OrientationError> {
    let ra_terms = constants(pool, body, "POLE_RA")?;
    let dec_terms = constants(pool, body, "POLE_DEC")?;
    let pm_terms = constants(pool, body, "PM")?;

    let d = et / SPD;
    let t = et / SPC;
    let mut ra = poly2(&ra_terms, t);
    let mut dec = poly2(&dec_terms, t);
    let mut w = poly2(&pm_terms, d);

    // Nutation-precession terms hang off the barycenter of the system the
    // body belongs to.
    let barycenter = if (100..1000).contains(&body) { body / 100 } else { body };
    if let Ok(angles) = pool.body_doubles(barycenter, "NUT_PREC_ANGLES") {
        let count = angles.len() / 2;
        let thetas: Vec<f64> = (0..count)
            .map(|i| (angles[2 * i] + angles[2 * i + 1] * t).to_radians())
            .collect();
        ra += series(pool, body, "NUT_PREC_RA", &thetas, f64::sin)?;
        dec += series(pool, body, "NUT_PREC_DEC", &thetas, f64::cos)?;
        w += series(pool, body, "NUT_PREC_PM", &thetas, f64::sin)?;
    }
    Ok((ra.to_radians(), dec.to_radians(), w.to_radians()))
}

fn constants(pool: &KernelPool, body: i32, item: &str) -> Result<Vec<f64>, OrientationError> {
    pool.body_doubles(body, item)
        .map(<[f64]>::to_vec)
        .map_err(|_| OrientationError::MissingConstants {
            body,
            item: item.to_string(),
        })
}

fn poly2(terms: &[f64], x: f64) -> f64 {
    let c0 = terms.first().copied().unwrap_or(0.0);
    let c1 = terms.get(1).copied().unwrap_or(0.0);
    let c2 = terms.get(2).copied().unwrap_or(0.0);
    c0 + x * (c1 + x * c2)
}

fn series(
    pool: &KernelPool,
    body: i32,
    item: &str,
    thetas: &[f64],
    trig: fn(f64) -> f64,
) -> Result<f64, OrientationError> {
    let coeffs = match pool.body_doubles(body, item) {
        Ok(coeffs) => coeffs,
        // A body without periodic terms just uses the polynomials.
        Err(_) => return Ok(0.0),
    };
    if coeffs.len() > thetas.len() {
        return Err(OrientationError::MismatchedSeries {
            body,
            item: item.to_string(),
            have: coeffs.len(),
            angles: thetas.len(),
        });
    }
    Ok(coeffs
        .iter()
        .zip(thetas)
        .map(|(c, theta)| c * trig(*theta))
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pool_with(lines: &[&str]) -> KernelPool {
        let mut pool = KernelPool::new();
        pool.load_lines(lines).unwrap();
        pool
    }

    #[test]
    fn identity_when_pole_at_z_and_no_spin() {
        // RA = -90, DEC = 90, W = 0 makes each factor the identity.
        let pool = pool_with(&[
            "\\begindata",
            "BODY900_POLE_RA  = ( -90.  0. 0. )",
            "BODY900_POLE_DEC = (  90.  0. 0. )",
            "BODY900_PM       = (   0.  0. 0. )",
        ]);
        let m = rotation_to_body_fixed(&pool, 900, 0.0).unwrap();
        assert_abs_diff_eq!((m - Matrix3::identity()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn prime_meridian_advances_with_time() {
        let pool = pool_with(&[
            "\\begindata",
            "BODY901_POLE_RA  = ( -90.  0. 0. )",
            "BODY901_POLE_DEC = (  90.  0. 0. )",
            "BODY901_PM       = (   0. 90. 0. )",
        ]);
        // After one day W = 90 degrees: the body x axis has rotated to
        // inertial y.
        let m = rotation_to_body_fixed(&pool, 901, SPD).unwrap();
        let x_inertial = m.transpose() * crate::linalg::Vector3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(x_inertial[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x_inertial[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nutation_terms_shift_the_angles() {
        let pool = pool_with(&[
            "\\begindata",
            "BODY5_NUT_PREC_ANGLES = ( 30. 0. )",
            "BODY501_POLE_RA  = ( 10. 0. 0. )",
            "BODY501_POLE_DEC = ( 20. 0. 0. )",
            "BODY501_PM       = ( 40. 0. 0. )",
            "BODY501_NUT_PREC_RA  = ( 2. )",
            "BODY501_NUT_PREC_DEC = ( 3. )",
            "BODY501_NUT_PREC_PM  = ( 4. )",
        ]);
        let (ra, dec, w) = euler_angles(&pool, 501, 0.0).unwrap();
        let theta = 30f64.to_radians();
        assert_abs_diff_eq!(ra.to_degrees(), 10.0 + 2.0 * theta.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(dec.to_degrees(), 20.0 + 3.0 * theta.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(w.to_degrees(), 40.0 + 4.0 * theta.sin(), epsilon = 1e-12);
    }

    #[test]
    fn missing_constants_reported() {
        let pool = KernelPool::new();
        assert!(matches!(
            rotation_to_body_fixed(&pool, 399, 0.0),
            Err(OrientationError::MissingConstants { body: 399, .. })
        ));
    }

    #[test]
    fn more_coefficients_than_angles_rejected() {
        let pool = pool_with(&[
            "\\begindata",
            "BODY5_NUT_PREC_ANGLES = ( 30. 0. )",
            "BODY502_POLE_RA  = ( 10. 0. 0. )",
            "BODY502_POLE_DEC = ( 20. 0. 0. )",
            "BODY502_PM       = ( 40. 0. 0. )",
            "BODY502_NUT_PREC_RA = ( 1. 2. 3. )",
        ]);
        assert!(matches!(
            euler_angles(&pool, 502, 0.0),
            Err(OrientationError::MismatchedSeries { .. })
        ));
    }
}
