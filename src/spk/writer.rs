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

//! SPK segment writers for data types 2, 3, 9, and 13.
//!
//! Segment contents are validated before anything is laid out, so a
//! writer error leaves no partial file behind.

use std::path::Path;

use crate::daf::{BinaryFormat, DafWriter};
use crate::linalg::Vector6;

use super::{SpkError, ND, NI};

pub struct SpkWriter {
    daf: DafWriter,
}

impl SpkWriter {
    pub fn create(ifname: &str, format: BinaryFormat) -> Self {
        Self {
            daf: DafWriter::new("DAF/SPK", ifname, ND, NI, format),
        }
    }

    /// Chebyshev position records (type 2). Record `i` covers
    /// `init + i*intlen .. init + (i+1)*intlen`; every record must carry
    /// the same number of coefficients per component.
    pub fn add_type2(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        init: f64,
        intlen: f64,
        records: &[[Vec<f64>; 3]],
    ) -> Result<(), SpkError> {
        self.add_chebyshev(name, body, center, frame, init, intlen, 2, records.len(), || {
            flatten(records)
        })
    }

    /// Chebyshev position and velocity records (type 3).
    pub fn add_type3(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        init: f64,
        intlen: f64,
        records: &[[Vec<f64>; 6]],
    ) -> Result<(), SpkError> {
        self.add_chebyshev(name, body, center, frame, init, intlen, 3, records.len(), || {
            flatten(records)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn add_chebyshev<F>(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        init: f64,
        intlen: f64,
        data_type: i32,
        count: usize,
        flat: F,
    ) -> Result<(), SpkError>
    where
        F: FnOnce() -> Result<(usize, Vec<Vec<f64>>), String>,
    {
        if intlen <= 0.0 {
            return Err(invalid(name, "interval length must be positive"));
        }
        if count == 0 {
            return Err(invalid(name, "at least one record is required"));
        }
        let (ncoef, flattened) = flat().map_err(|reason| invalid(name, &reason))?;
        if ncoef == 0 {
            return Err(invalid(name, "records must carry coefficients"));
        }
        let ncomp = if data_type == 2 { 3 } else { 6 };
        let rsize = 2 + ncomp * ncoef;
        let mut data = Vec::with_capacity(count * rsize + 4);
        for (i, record) in flattened.iter().enumerate() {
            data.push(init + (i as f64 + 0.5) * intlen); // MID
            data.push(intlen / 2.0); // RADIUS
            data.extend_from_slice(record);
        }
        let stop = init + count as f64 * intlen;
        data.extend_from_slice(&[init, intlen, rsize as f64, count as f64]);
        self.daf.add_array(
            name,
            &[init, stop],
            &[body, center, frame, data_type],
            &data,
        );
        Ok(())
    }

    /// Discrete states with Lagrange interpolation (type 9).
    pub fn add_type9(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        states: &[(f64, Vector6<f64>)],
        degree: usize,
    ) -> Result<(), SpkError> {
        self.add_discrete(name, body, center, frame, states, degree, 9, degree + 1)
    }

    /// Discrete states with Hermite interpolation (type 13). The degree
    /// must be odd: each window state constrains both value and slope.
    pub fn add_type13(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        states: &[(f64, Vector6<f64>)],
        degree: usize,
    ) -> Result<(), SpkError> {
        if degree % 2 == 0 {
            return Err(invalid(name, "type 13 degree must be odd"));
        }
        self.add_discrete(name, body, center, frame, states, degree, 13, (degree + 1) / 2)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_discrete(
        &mut self,
        name: &str,
        body: i32,
        center: i32,
        frame: i32,
        states: &[(f64, Vector6<f64>)],
        degree: usize,
        data_type: i32,
        window: usize,
    ) -> Result<(), SpkError> {
        if degree == 0 {
            return Err(invalid(name, "degree must be at least 1"));
        }
        if states.len() < window {
            return Err(invalid(
                name,
                &format!(
                    "interpolation needs {window} states but only {} were given",
                    states.len()
                ),
            ));
        }
        if states.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(invalid(name, "epochs must strictly increase"));
        }
        let n = states.len();
        let mut data = Vec::with_capacity(7 * n + 2);
        for (_, state) in states {
            data.extend(state.iter());
        }
        for (epoch, _) in states {
            data.push(*epoch);
        }
        data.push(degree as f64);
        data.push(n as f64);
        self.daf.add_array(
            name,
            &[states[0].0, states[n - 1].0],
            &[body, center, frame, data_type],
            &data,
        );
        Ok(())
    }

    pub fn build(&self) -> Vec<u8> {
        self.daf.build()
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SpkError> {
        Ok(self.daf.write_to(path)?)
    }
}

fn invalid(name: &str, reason: &str) -> SpkError {
    SpkError::InvalidSegment {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Checks that every record carries the same coefficient count per
/// component and flattens them in component order.
fn flatten<const N: usize>(records: &[[Vec<f64>; N]]) -> Result<(usize, Vec<Vec<f64>>), String> {
    let ncoef = records
        .first()
        .map(|record| record[0].len())
        .unwrap_or_default();
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let mut flat = Vec::with_capacity(N * ncoef);
        for component in record {
            if component.len() != ncoef {
                return Err("all components must carry the same coefficient count".to_string());
            }
            flat.extend_from_slice(component);
        }
        out.push(flat);
    }
    Ok((ncoef, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spk::SpkFile;
    use approx::assert_abs_diff_eq;

    #[test]
    fn type2_round_trip() {
        // x(t) encoded directly in Chebyshev basis over each record:
        // record covers tau in [-1, 1]; coefficients [c0, c1] give
        // x(tau) = c0 + c1*tau.
        let mut writer = SpkWriter::create("type 2", BinaryFormat::LtlIeee);
        writer
            .add_type2(
                "lin",
                301,
                3,
                1,
                0.0,
                100.0,
                &[
                    [vec![50.0, 50.0], vec![0.0, 0.0], vec![0.0, 0.0]],
                    [vec![150.0, 50.0], vec![0.0, 0.0], vec![0.0, 0.0]],
                ],
            )
            .unwrap();
        let spk = SpkFile::from_bytes("mem".into(), writer.build()).unwrap();
        // x(et) = et across both records; vx = dtau/det * 50 = 1.
        for et in [10.0, 60.0, 110.0, 190.0] {
            let state = spk.state_at(301, 3, 1, et).unwrap();
            assert_abs_diff_eq!(state[0], et, epsilon = 1e-9);
            assert_abs_diff_eq!(state[3], 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(state[1], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn type3_round_trip() {
        let mut writer = SpkWriter::create("type 3", BinaryFormat::BigIeee);
        // Position x = 2 + tau^2 -> coefficients in T0, T1, T2: tau^2 =
        // (T2 + 1)/2, so x = 2.5*T0 + 0.5*T2. Velocity component stored
        // independently as vx = 7.
        writer
            .add_type3(
                "quad",
                499,
                4,
                1,
                0.0,
                20.0,
                &[[
                    vec![2.5, 0.0, 0.5],
                    vec![0.0; 3],
                    vec![0.0; 3],
                    vec![7.0, 0.0, 0.0],
                    vec![0.0; 3],
                    vec![0.0; 3],
                ]],
            )
            .unwrap();
        let spk = SpkFile::from_bytes("mem".into(), writer.build()).unwrap();
        let state = spk.state_at(499, 4, 1, 15.0).unwrap();
        let tau: f64 = 0.5;
        assert_abs_diff_eq!(state[0], 2.0 + tau * tau, epsilon = 1e-12);
        assert_abs_diff_eq!(state[3], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn type9_round_trip() {
        let mut writer = SpkWriter::create("type 9", BinaryFormat::LtlIeee);
        // Quadratic track sampled densely; degree 2 reproduces it.
        let states: Vec<(f64, Vector6<f64>)> = (0..=10)
            .map(|i| {
                let t = i as f64 * 10.0;
                (t, Vector6::new(t * t, t, 1.0, 2.0 * t, 1.0, 0.0))
            })
            .collect();
        writer.add_type9("quad", -77, 399, 1, &states, 2).unwrap();
        let spk = SpkFile::from_bytes("mem".into(), writer.build()).unwrap();
        let state = spk.state_at(-77, 399, 1, 42.0).unwrap();
        assert_abs_diff_eq!(state[0], 42.0 * 42.0, epsilon = 1e-6);
        assert_abs_diff_eq!(state[3], 84.0, epsilon = 1e-6);
    }

    #[test]
    fn writer_validation() {
        let mut writer = SpkWriter::create("invalid", BinaryFormat::LtlIeee);
        let states: Vec<(f64, Vector6<f64>)> =
            vec![(0.0, Vector6::zeros()), (1.0, Vector6::zeros())];
        // Even degree for type 13
        assert!(writer.add_type13("a", 1, 0, 1, &states, 2).is_err());
        // Too few states for the window
        assert!(writer.add_type9("b", 1, 0, 1, &states, 5).is_err());
        // Non-increasing epochs
        let bad = vec![(1.0, Vector6::zeros()), (1.0, Vector6::zeros())];
        assert!(writer.add_type13("c", 1, 0, 1, &bad, 1).is_err());
        // Zero-length record list for type 2
        assert!(writer.add_type2("d", 1, 0, 1, 0.0, 10.0, &[]).is_err());
        // Mismatched coefficient counts
        assert!(writer
            .add_type2(
                "e",
                1,
                0,
                1,
                0.0,
                10.0,
                &[[vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]]],
            )
            .is_err());
    }
}
