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

//! Reference frame name / ID translation.
//!
//! The built-in table carries the inertial frames and the body-fixed
//! `IAU_<body>` frames this crate knows about. Text kernels extend the
//! mapping at runtime with `FRAME_<NAME> = <id>` assignments, which mask
//! built-in names.

use crate::bodies::normalize;
use crate::pool::KernelPool;

/// Inertial frames, in ID order.
#[rustfmt::skip]
const INERTIAL: [(i32, &str); 21] = [
    (1,  "J2000"),
    (2,  "B1950"),
    (3,  "FK4"),
    (4,  "DE-118"),
    (5,  "DE-96"),
    (6,  "DE-102"),
    (7,  "DE-108"),
    (8,  "DE-111"),
    (9,  "DE-114"),
    (10, "DE-122"),
    (11, "DE-125"),
    (12, "DE-130"),
    (13, "GALACTIC"),
    (14, "DE-200"),
    (15, "DE-202"),
    (16, "MARSIAU"),
    (17, "ECLIPJ2000"),
    (18, "ECLIPB1950"),
    (19, "DE-140"),
    (20, "DE-142"),
    (21, "DE-143"),
];

/// Body-fixed frames for the cataloged bodies.
#[rustfmt::skip]
const BODY_FIXED: [(i32, &str); 22] = [
    (10010, "IAU_SUN"),
    (10011, "IAU_MERCURY"),
    (10012, "IAU_VENUS"),
    (10013, "IAU_EARTH"),
    (10014, "IAU_MARS"),
    (10015, "IAU_JUPITER"),
    (10016, "IAU_SATURN"),
    (10017, "IAU_URANUS"),
    (10018, "IAU_NEPTUNE"),
    (10019, "IAU_PLUTO"),
    (10020, "IAU_MOON"),
    (10021, "IAU_PHOBOS"),
    (10022, "IAU_DEIMOS"),
    (10023, "IAU_IO"),
    (10024, "IAU_EUROPA"),
    (10025, "IAU_GANYMEDE"),
    (10026, "IAU_CALLISTO"),
    (10040, "IAU_TITAN"),
    (10041, "IAU_ENCELADUS"),
    (10061, "IAU_TRITON"),
    (10085, "IAU_CHARON"),
    (10081, "IAU_CERES"),
];

const POOL_PREFIX: &str = "FRAME_";

/// Frame name to ID (NAMFRM analogue). `None` when the name is unknown,
/// where the original answers with frame code 0.
pub fn name_to_id(pool: &KernelPool, name: &str) -> Option<i32> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    let var = format!("{POOL_PREFIX}{wanted}");
    if let Ok(values) = pool.integers(&var) {
        if let Some(&id) = values.first() {
            return Some(id as i32);
        }
    }
    builtin_iter()
        .find(|(_, candidate)| *candidate == wanted)
        .map(|(id, _)| id)
}

/// Frame ID to name (FRMNAM analogue).
pub fn id_to_name(pool: &KernelPool, id: i32) -> Option<String> {
    for var in pool.names(&format!("{POOL_PREFIX}*")) {
        // FRAME_* variables that do not hold a single integer are other
        // frame-kit data, not name assignments.
        match pool.integers(&var) {
            Ok(values) if values.len() == 1 && values[0] as i32 == id => {
                return Some(var[POOL_PREFIX.len()..].to_string());
            }
            _ => continue,
        }
    }
    builtin_iter()
        .find(|&(candidate, _)| candidate == id)
        .map(|(_, name)| name)
}

fn builtin_iter() -> impl Iterator<Item = (i32, String)> {
    INERTIAL
        .iter()
        .chain(BODY_FIXED.iter())
        .map(|&(id, name)| (id, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_frames() {
        let pool = KernelPool::new();
        assert_eq!(name_to_id(&pool, "J2000"), Some(1));
        assert_eq!(name_to_id(&pool, "j2000"), Some(1));
        assert_eq!(name_to_id(&pool, "ECLIPJ2000"), Some(17));
        assert_eq!(name_to_id(&pool, "IAU_EARTH"), Some(10013));
        assert_eq!(name_to_id(&pool, "NOT_A_FRAME"), None);
        assert_eq!(id_to_name(&pool, 1).as_deref(), Some("J2000"));
        assert_eq!(id_to_name(&pool, 10020).as_deref(), Some("IAU_MOON"));
        assert_eq!(id_to_name(&pool, 987654), None);
    }

    #[test]
    fn pool_defined_frames() {
        let mut pool = KernelPool::new();
        pool.load_lines(&["\\begindata", "FRAME_ROVER_TOPO = 1400010"])
            .unwrap();
        assert_eq!(name_to_id(&pool, "ROVER_TOPO"), Some(1400010));
        assert_eq!(id_to_name(&pool, 1400010).as_deref(), Some("ROVER_TOPO"));
        // A pool assignment masks a built-in name.
        pool.load_lines(&["\\begindata", "FRAME_J2000 = 1400011"]).unwrap();
        assert_eq!(name_to_id(&pool, "J2000"), Some(1400011));
    }
}
