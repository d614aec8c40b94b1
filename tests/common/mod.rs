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

//! Fixtures shared by the integration test families: a scratch directory
//! per family, a planetary-constants test kernel, and generated SPKs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use koios::daf::BinaryFormat;
use koios::linalg::Vector6;
use koios::spk::SpkWriter;

/// A scratch directory unique to this process and test family.
pub fn scratch(family: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("koios_{}_{family}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes the planetary-constants test kernel: a trimmed rendition of the
/// constants file the original test utilities generate.
pub fn write_test_pck(path: &Path) {
    let content = r"KPL/PCK

Test planetary constants kernel. Generated for the test suite; values
match the 1997 IAU report subset the original test utilities carry.

\begindata

BODY399_POLE_RA        = (    0. -0.641         0. )
BODY399_POLE_DEC       = (  +90. -0.557         0. )
BODY399_PM             = (  190.16 +360.9856235  0. )
BODY399_LONG_AXIS      = (    0. )
BODY399_RADII          = ( 6378.140 6378.140 6356.750 )

BODY3_NUT_PREC_ANGLES  = (  125.045 -1935.5328
                            249.390 -3871.0656
                            196.694 -475263.3
                            176.630 +487269.6519
                            358.219 -35999.04     )

BODY301_POLE_RA        = (  270.000 0.           0. )
BODY301_POLE_DEC       = (  +66.534 0.           0. )
BODY301_PM             = (   38.314 +13.1763581  0. )
BODY301_LONG_AXIS      = (    0. )
BODY301_RADII          = ( 1737.400 1737.400 1737.400 )

BODY301_NUT_PREC_RA  = (  -3.878  -0.120 +0.070  -0.017   0.    )
BODY301_NUT_PREC_DEC = (  +1.543  +0.024 -0.028  +0.007   0.    )
BODY301_NUT_PREC_PM  = (  +3.558  +0.121 -0.064  +0.016  +0.025 )

\begintext
";
    std::fs::write(path, content).unwrap();
}

/// A text kernel adding name/ID mappings and a frame definition.
pub fn write_ids_kernel(path: &Path) {
    let content = r"KPL/FK

\begindata

NAIF_BODY_CODE  = ( -1701 )
NAIF_BODY_NAME  = ( 'PATHFINDER PROBE' )

FRAME_PROBE_VIEW = 1700101

\begintext
";
    std::fs::write(path, content).unwrap();
}

/// Writes a meta-kernel furnishing `kernels` through a path symbol.
pub fn write_meta_kernel(path: &Path, dir: &Path, kernels: &[&str]) {
    let list = kernels
        .iter()
        .map(|name| format!("'$DATA/{name}'"))
        .collect::<Vec<_>>()
        .join(",\n                    ");
    let content = format!(
        "KPL/MK\n\n\\begindata\n\n\
         PATH_VALUES     = ( '{}' )\n\
         PATH_SYMBOLS    = ( 'DATA' )\n\
         KERNELS_TO_LOAD = ( {list} )\n\n\
         \\begintext\n",
        dir.display()
    );
    std::fs::write(path, content).unwrap();
}

/// One linear track: position `base + rate*t + offset`, velocity `rate`.
pub struct Track {
    pub body: i32,
    pub center: i32,
    pub frame: i32,
    pub base: Vector6<f64>,
    pub offset: f64,
}

impl Track {
    pub fn state(&self, t: f64) -> Vector6<f64> {
        Vector6::new(
            self.base[0] + self.base[3] * t + self.offset,
            self.base[1] + self.base[4] * t,
            self.base[2] + self.base[5] * t,
            self.base[3],
            self.base[4],
            self.base[5],
        )
    }
}

/// Writes an SPK holding one type 13 segment per track, sampled every
/// `step` seconds over `[start, stop]`.
pub fn write_spk(
    path: &Path,
    format: BinaryFormat,
    tracks: &[Track],
    start: f64,
    stop: f64,
    step: f64,
) {
    let mut writer = SpkWriter::create("generated test spk", format);
    for (index, track) in tracks.iter().enumerate() {
        let count = ((stop - start) / step).round() as usize;
        let states: Vec<(f64, Vector6<f64>)> = (0..=count)
            .map(|i| {
                let t = start + i as f64 * step;
                (t, track.state(t))
            })
            .collect();
        writer
            .add_type13(
                &format!("SEG {index} BODY {}", track.body),
                track.body,
                track.center,
                track.frame,
                &states,
                3,
            )
            .unwrap();
    }
    writer.write_to(path).unwrap();
}
