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

/*! # koios

Koios reads, pools, and compares SPICE kernels: text kernels feed a typed
variable pool, binary SPK ephemerides are opened through a DAF reader with
byte-order auto-detection, and the `ephdiff` tool samples and compares the
trajectories two SPK files describe.
*/

/// Body name / NAIF ID catalog, with runtime masking through the kernel pool.
pub mod bodies;

/// The DAF binary architecture: file records, format detection, summaries.
pub mod daf;

/// The state comparison engine and the `ephdiff` command line surface.
pub mod diff;

mod errors;
pub use self::errors::KoiosError;

/// Reference frame name / ID catalog.
pub mod frames;

/// Tracks every kernel furnished to a program, including meta-kernels.
pub mod kernels;

/// Body orientation from planetary-constants pool variables.
pub mod orientation;

/// The kernel variable pool and the text-kernel grammar that feeds it.
pub mod pool;

/// SPK segment descriptors, coverage, evaluation, and writers.
pub mod spk;

/// Double-precision coverage windows.
pub mod windows;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::kernels::KernelManager;
pub use self::pool::KernelPool;
pub use self::spk::SpkFile;
