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

extern crate koios;

mod common;

use approx::assert_abs_diff_eq;
use koios::pool::{KernelPool, PoolError, ValueKind};

#[test]
fn loads_the_constants_kernel() {
    let dir = common::scratch("pool_load");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);

    let mut pool = KernelPool::new();
    pool.load(&pck).unwrap();

    let radii = pool.doubles("BODY399_RADII").unwrap();
    assert_eq!(radii, &[6378.14, 6378.14, 6356.75]);
    assert_abs_diff_eq!(pool.doubles("BODY301_PM").unwrap()[1], 13.1763581);
    // The multi-line angle list flattens to ten values.
    assert_eq!(
        pool.descriptor("BODY3_NUT_PREC_ANGLES"),
        Some((10, ValueKind::Numeric))
    );
    // Commentary outside \begindata never loads.
    assert!(!pool.exists("KPL"));
    assert!(!pool.exists("Test"));
}

#[test]
fn enumerates_by_template() {
    let dir = common::scratch("pool_names");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);

    let mut pool = KernelPool::new();
    pool.load(&pck).unwrap();

    let moon = pool.names("BODY301_*");
    assert!(moon.contains(&"BODY301_POLE_RA".to_string()));
    assert!(moon.iter().all(|name| name.starts_with("BODY301_")));
    assert_eq!(pool.names("BODY%99_RADII"), vec!["BODY399_RADII".to_string()]);
}

#[test]
fn file_load_notifies_watchers() {
    let dir = common::scratch("pool_watch");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);

    let mut pool = KernelPool::new();
    pool.watch("IAU", &["BODY399_POLE_RA"]);
    assert!(pool.check_update("IAU"));

    pool.load(&pck).unwrap();
    assert!(pool.check_update("IAU"));
    assert!(!pool.check_update("IAU"));
}

#[test]
fn write_and_reload_preserves_values() {
    let dir = common::scratch("pool_roundtrip");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);

    let mut pool = KernelPool::new();
    pool.load(&pck).unwrap();
    let out = dir.join("dump.tpc");
    pool.write(&out).unwrap();

    let mut reloaded = KernelPool::new();
    reloaded.load(&out).unwrap();
    for name in pool.names("*") {
        assert_eq!(
            pool.descriptor(&name),
            reloaded.descriptor(&name),
            "variable {name} changed shape across write/reload"
        );
    }
    assert_eq!(
        pool.doubles("BODY3_NUT_PREC_ANGLES").unwrap(),
        reloaded.doubles("BODY3_NUT_PREC_ANGLES").unwrap()
    );
}

#[test]
fn missing_file_reported() {
    let mut pool = KernelPool::new();
    assert!(matches!(
        pool.load("/no/such/kernel.tpc"),
        Err(PoolError::KernelRead { .. })
    ));
}
