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

//! Computes differences between the geometric states obtained from two
//! SPK files and displays them or statistics about them.

extern crate koios;
extern crate pretty_env_logger;

use std::env::{set_var, var};

use koios::diff::args::{resolve, usage, version_banner, Resolved};
use koios::diff::{self, DiffError, DiffSetup, ReportKind};
use koios::kernels::KernelManager;

const LOG_VAR: &str = "KOIOS_LOG";

fn main() {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "WARN");
    }
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut manager = KernelManager::new();
    match resolve(&args, &mut manager) {
        Ok(Resolved::Help) => {
            print!("{}", version_banner());
            print!("{}", usage());
        }
        Ok(Resolved::Run(setup)) => match run(&setup) {
            Ok(report) => print!("{report}"),
            Err(error) => {
                eprintln!("{error}");
                std::process::exit(1);
            }
        },
        Err(error) => {
            eprintln!("{}", error.condition());
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn run(setup: &DiffSetup) -> Result<String, DiffError> {
    let table = diff::evaluate(setup)?;
    let mut out = String::new();
    if matches!(setup.report, ReportKind::Basic | ReportKind::Stats) {
        out.push_str(&diff::banner(setup));
    }
    out.push_str(&diff::render(&table, setup.report, setup.time_format.as_deref())?);
    Ok(out)
}
