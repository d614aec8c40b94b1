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

use common::Track;
use koios::daf::BinaryFormat;
use koios::kernels::{identify, KernelError, KernelKind, KernelManager};
use koios::linalg::Vector6;

fn moon_track() -> Track {
    Track {
        body: 301,
        center: 3,
        frame: 1,
        base: Vector6::new(1000.0, 2000.0, 3000.0, 1.0, -1.0, 0.5),
        offset: 0.0,
    }
}

#[test]
fn identify_recognizes_the_families() {
    let dir = common::scratch("kernels_identify");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);
    assert_eq!(identify(&pck).unwrap(), ("KPL".into(), "PCK".into()));

    let spk = dir.join("test.bsp");
    common::write_spk(&spk, BinaryFormat::LtlIeee, &[moon_track()], 0.0, 1000.0, 100.0);
    assert_eq!(identify(&spk).unwrap(), ("DAF".into(), "SPK".into()));

    let junk = dir.join("junk.txt");
    std::fs::write(&junk, "not a kernel at all").unwrap();
    assert_eq!(identify(&junk).unwrap(), ("?".into(), "?".into()));

    assert!(matches!(
        identify(dir.join("absent.bsp")),
        Err(KernelError::Unreadable { .. })
    ));
}

#[test]
fn furnish_tracks_text_and_binary_kernels() {
    let dir = common::scratch("kernels_furnish");
    let pck = dir.join("test.tpc");
    common::write_test_pck(&pck);
    let spk = dir.join("test.bsp");
    common::write_spk(&spk, BinaryFormat::LtlIeee, &[moon_track()], 0.0, 1000.0, 100.0);

    let mut manager = KernelManager::new();
    manager.furnish(&pck).unwrap();
    manager.furnish(&spk).unwrap();

    assert_eq!(manager.total("ALL"), 2);
    assert_eq!(manager.total("SPK"), 1);
    assert_eq!(manager.total("TEXT"), 1);
    assert_eq!(manager.total("SPK TEXT"), 2);
    assert_eq!(manager.total("META"), 0);

    let entry = manager.data(0, "SPK").unwrap();
    assert_eq!(entry.kind, KernelKind::Spk);
    assert!(entry.source.is_none());
    let handle = entry.handle.unwrap();
    assert_eq!(manager.spk(handle).unwrap().segments.len(), 1);

    let info = manager.info(&pck.display().to_string()).unwrap();
    assert_eq!(info.kind, KernelKind::Text);

    // The text kernel fed the pool.
    assert!(manager.pool().exists("BODY399_RADII"));
}

#[test]
fn meta_kernels_expand_with_path_symbols() {
    let dir = common::scratch("kernels_meta");
    common::write_test_pck(&dir.join("planets.tpc"));
    common::write_spk(
        &dir.join("moon.bsp"),
        BinaryFormat::LtlIeee,
        &[moon_track()],
        0.0,
        1000.0,
        100.0,
    );
    let meta = dir.join("setup.tm");
    common::write_meta_kernel(&meta, &dir, &["planets.tpc", "moon.bsp"]);

    let mut manager = KernelManager::new();
    manager.furnish(&meta).unwrap();

    assert_eq!(manager.total("ALL"), 3);
    assert_eq!(manager.total("META"), 1);
    assert_eq!(manager.total("SPK"), 1);

    // Children record the meta-kernel that furnished them.
    let child = manager.data(0, "TEXT").unwrap();
    assert_eq!(child.source.as_deref(), Some(meta.display().to_string().as_str()));

    // The bookkeeping variables are gone once expansion is done.
    assert!(!manager.pool().exists("KERNELS_TO_LOAD"));
    assert!(!manager.pool().exists("PATH_SYMBOLS"));
    assert!(!manager.pool().exists("PATH_VALUES"));
    // But the furnished constants are in.
    assert!(manager.pool().exists("BODY301_POLE_RA"));
}

#[test]
fn unloading_a_meta_kernel_unloads_its_children() {
    let dir = common::scratch("kernels_meta_unload");
    common::write_test_pck(&dir.join("planets.tpc"));
    common::write_spk(
        &dir.join("moon.bsp"),
        BinaryFormat::LtlIeee,
        &[moon_track()],
        0.0,
        1000.0,
        100.0,
    );
    let meta = dir.join("setup.tm");
    common::write_meta_kernel(&meta, &dir, &["planets.tpc", "moon.bsp"]);

    let mut manager = KernelManager::new();
    manager.furnish(&meta).unwrap();
    assert!(manager.unload(&meta.display().to_string()));

    assert_eq!(manager.total("ALL"), 0);
    assert!(!manager.pool().exists("BODY301_POLE_RA"));
    // Unloading something never furnished is a no-op.
    assert!(!manager.unload("never-loaded.tpc"));
}

#[test]
fn unloading_one_text_kernel_rebuilds_the_rest() {
    let dir = common::scratch("kernels_text_unload");
    let pck = dir.join("planets.tpc");
    common::write_test_pck(&pck);
    let ids = dir.join("ids.tf");
    common::write_ids_kernel(&ids);

    let mut manager = KernelManager::new();
    manager.furnish(&pck).unwrap();
    manager.furnish(&ids).unwrap();
    assert!(manager.pool().exists("BODY399_RADII"));
    assert!(manager.pool().exists("NAIF_BODY_CODE"));

    assert!(manager.unload(&pck.display().to_string()));
    // The surviving kernel's variables are rebuilt, the unloaded one's
    // are gone.
    assert!(!manager.pool().exists("BODY399_RADII"));
    assert!(manager.pool().exists("NAIF_BODY_CODE"));
    assert_eq!(manager.total("TEXT"), 1);
}

#[test]
fn meta_kernel_diagnostics() {
    let dir = common::scratch("kernels_meta_errors");

    // No KERNELS_TO_LOAD at all.
    let empty = dir.join("empty.tm");
    std::fs::write(&empty, "KPL/MK\n\n\\begindata\nUNRELATED = 1\n\\begintext\n").unwrap();
    let mut manager = KernelManager::new();
    assert!(matches!(
        manager.furnish(&empty),
        Err(KernelError::MetaMissingList { .. })
    ));

    // Mismatched path symbol arrays.
    let bad_paths = dir.join("badpaths.tm");
    std::fs::write(
        &bad_paths,
        "KPL/MK\n\n\\begindata\n\
         PATH_VALUES = ( '/a', '/b' )\n\
         PATH_SYMBOLS = ( 'A' )\n\
         KERNELS_TO_LOAD = ( '$A/x.tpc' )\n\\begintext\n",
    )
    .unwrap();
    let mut manager = KernelManager::new();
    assert!(matches!(
        manager.furnish(&bad_paths),
        Err(KernelError::PathMismatch { symbols: 1, values: 2 })
    ));

    // A symbol with no definition.
    let unresolved = dir.join("unresolved.tm");
    std::fs::write(
        &unresolved,
        "KPL/MK\n\n\\begindata\nKERNELS_TO_LOAD = ( '$NOPE/x.tpc' )\n\\begintext\n",
    )
    .unwrap();
    let mut manager = KernelManager::new();
    assert!(matches!(
        manager.furnish(&unresolved),
        Err(KernelError::UnresolvedSymbol { .. })
    ));

    // A meta-kernel listing another meta-kernel.
    let inner = dir.join("inner.tm");
    common::write_meta_kernel(&inner, &dir, &[]);
    let outer = dir.join("outer.tm");
    common::write_meta_kernel(&outer, &dir, &["inner.tm"]);
    let mut manager = KernelManager::new();
    assert!(matches!(
        manager.furnish(&outer),
        Err(KernelError::NestedMeta { .. })
    ));
}
