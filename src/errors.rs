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

use snafu::Snafu;

use crate::bodies::BodyError;
use crate::daf::DafError;
use crate::diff::DiffError;
use crate::kernels::KernelError;
use crate::orientation::OrientationError;
use crate::pool::PoolError;
use crate::spk::SpkError;
use crate::windows::WindowError;

/// One error type callers can hold when they mix the crate's subsystems.
#[derive(Debug, Snafu)]
pub enum KoiosError {
    #[snafu(display("{source}"))]
    Pool { source: PoolError },
    #[snafu(display("{source}"))]
    Bodies { source: BodyError },
    #[snafu(display("{source}"))]
    Daf { source: DafError },
    #[snafu(display("{source}"))]
    Spk { source: SpkError },
    #[snafu(display("{source}"))]
    Kernels { source: KernelError },
    #[snafu(display("{source}"))]
    Orientation { source: OrientationError },
    #[snafu(display("{source}"))]
    Windows { source: WindowError },
    #[snafu(display("{source}"))]
    Diff { source: DiffError },
}

macro_rules! wrap {
    ($variant:ident, $source:ty) => {
        impl From<$source> for KoiosError {
            fn from(source: $source) -> Self {
                KoiosError::$variant { source }
            }
        }
    };
}

wrap!(Pool, PoolError);
wrap!(Bodies, BodyError);
wrap!(Daf, DafError);
wrap!(Spk, SpkError);
wrap!(Kernels, KernelError);
wrap!(Orientation, OrientationError);
wrap!(Windows, WindowError);
wrap!(Diff, DiffError);
