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

//! Body name / NAIF ID translation.
//!
//! Three layers of assignments, each masking the one below:
//!
//! 1. the built-in generated table ([`builtin`]),
//! 2. names registered at runtime through [`BodyCatalog::define`],
//! 3. `NAIF_BODY_NAME` / `NAIF_BODY_CODE` pairs in the kernel pool.
//!
//! Within a layer the definition made last wins. Name matching is
//! case-insensitive with leading/trailing blanks removed and internal
//! whitespace runs compressed, but the catalog answers with the spelling
//! of the winning definition.

use snafu::Snafu;

use crate::pool::{KernelPool, PoolError};

mod builtin;
pub use builtin::NPERM;

#[derive(Debug, Snafu)]
pub enum BodyError {
    #[snafu(display(
        "NAIF_BODY_NAME defines {names} names but NAIF_BODY_CODE {codes} codes"
    ))]
    MismatchedAssignments { names: usize, codes: usize },
    #[snafu(display("body names must not be blank"))]
    BlankName,
    #[snafu(display("kernel pool lookup failed: {source}"))]
    PoolLookup { source: PoolError },
}

/// Normalizes a body name for comparison: trimmed, uppercased, internal
/// whitespace runs compressed to a single blank.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// The body translation catalog.
#[derive(Debug, Default)]
pub struct BodyCatalog {
    // Runtime definitions in the order made; later entries mask earlier ones.
    defined: Vec<(String, i32)>,
}

impl BodyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a name at runtime (BODDEF analogue). Kernel pool
    /// assignments still mask it.
    pub fn define(&mut self, name: &str, id: i32) -> Result<(), BodyError> {
        if normalize(name).is_empty() {
            return Err(BodyError::BlankName);
        }
        self.defined.push((name.to_string(), id));
        Ok(())
    }

    /// Translates a body name to its ID (BODN2C analogue).
    pub fn name_to_id(&self, pool: &KernelPool, name: &str) -> Result<Option<i32>, BodyError> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        for (candidate, id) in self.pool_assignments(pool)?.iter().rev() {
            if normalize(candidate) == wanted {
                return Ok(Some(*id));
            }
        }
        for (candidate, id) in self.defined.iter().rev() {
            if normalize(candidate) == wanted {
                return Ok(Some(*id));
            }
        }
        for (id, candidate) in builtin::BUILTIN.iter().rev() {
            if normalize(candidate) == wanted {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    /// Translates an ID to the name of its winning definition (BODC2N
    /// analogue).
    pub fn id_to_name(&self, pool: &KernelPool, id: i32) -> Result<Option<String>, BodyError> {
        for (candidate, cid) in self.pool_assignments(pool)?.iter().rev() {
            if *cid == id {
                return Ok(Some(candidate.clone()));
            }
        }
        for (candidate, cid) in self.defined.iter().rev() {
            if *cid == id {
                return Ok(Some(candidate.clone()));
            }
        }
        for (cid, candidate) in builtin::BUILTIN.iter().rev() {
            if *cid == id {
                return Ok(Some(candidate.to_string()));
            }
        }
        Ok(None)
    }

    /// Translates a string holding either an integer ID or a body name
    /// (BODS2C analogue). Integer text is taken as the ID itself whether or
    /// not anything is known about that body.
    pub fn string_to_id(&self, pool: &KernelPool, text: &str) -> Result<Option<i32>, BodyError> {
        if let Ok(id) = text.trim().parse::<i32>() {
            return Ok(Some(id));
        }
        self.name_to_id(pool, text)
    }

    /// The `NAIF_BODY_NAME` / `NAIF_BODY_CODE` pairs currently in the pool,
    /// in assignment order.
    fn pool_assignments(&self, pool: &KernelPool) -> Result<Vec<(String, i32)>, BodyError> {
        if !pool.exists("NAIF_BODY_NAME") && !pool.exists("NAIF_BODY_CODE") {
            return Ok(Vec::new());
        }
        let names = pool
            .strings("NAIF_BODY_NAME")
            .map_err(|source| BodyError::PoolLookup { source })?;
        let codes = pool
            .integers("NAIF_BODY_CODE")
            .map_err(|source| BodyError::PoolLookup { source })?;
        if names.len() != codes.len() {
            return Err(BodyError::MismatchedAssignments {
                names: names.len(),
                codes: codes.len(),
            });
        }
        Ok(names
            .iter()
            .zip(codes.iter())
            .map(|(name, &code)| (name.clone(), code as i32))
            .collect())
    }
}
