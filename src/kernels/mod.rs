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

//! The kernel manager: one place that furnishes, enumerates, and unloads
//! kernels, owning the pool and the body catalog they feed.
//!
//! Text kernels load into the pool. A meta-kernel (`KPL/MK`) loads into
//! the pool too, then every file its `KERNELS_TO_LOAD` lists is furnished
//! in order, with `$symbol` path substitution from `PATH_SYMBOLS` /
//! `PATH_VALUES`; the three list variables are removed from the pool
//! afterwards. Binary SPKs are opened and handed a handle.

use snafu::Snafu;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::bodies::{BodyCatalog, BodyError};
use crate::pool::{KernelPool, PoolError};
use crate::spk::{SpkError, SpkFile};

#[derive(Debug, Snafu)]
pub enum KernelError {
    #[snafu(display("could not read '{path}': {source}"))]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("'{path}' is not a recognized kernel (id word '{idword}')"))]
    Unrecognized { path: String, idword: String },
    #[snafu(display("{source}"))]
    Pool { source: PoolError },
    #[snafu(display("{source}"))]
    Spk { source: SpkError },
    #[snafu(display("meta-kernel '{path}' has no KERNELS_TO_LOAD assignment"))]
    MetaMissingList { path: String },
    #[snafu(display("meta-kernel '{path}' lists another meta-kernel '{nested}'"))]
    NestedMeta { path: String, nested: String },
    #[snafu(display(
        "PATH_SYMBOLS defines {symbols} symbols but PATH_VALUES {values} values"
    ))]
    PathMismatch { symbols: usize, values: usize },
    #[snafu(display("no PATH_SYMBOLS entry matches '{entry}'"))]
    UnresolvedSymbol { entry: String },
    #[snafu(display("kernels of type {file_type} cannot be furnished"))]
    UnsupportedKernel { file_type: String },
}

impl From<PoolError> for KernelError {
    fn from(source: PoolError) -> Self {
        KernelError::Pool { source }
    }
}

impl From<SpkError> for KernelError {
    fn from(source: SpkError) -> Self {
        KernelError::Spk { source }
    }
}

/// What a kernel file is, from its id word (GETFAT analogue): the
/// architecture (`DAF`, `DAS`, `KPL`, or `?`) and the type (`SPK`, `PCK`,
/// `MK`, ..., or `?`).
pub fn identify<P: AsRef<Path>>(path: P) -> Result<(String, String), KernelError> {
    let display = path.as_ref().display().to_string();
    let mut file = File::open(&path).map_err(|source| KernelError::Unreadable {
        path: display.clone(),
        source,
    })?;
    let mut head = [0u8; 8];
    let got = file.read(&mut head).map_err(|source| KernelError::Unreadable {
        path: display,
        source,
    })?;
    let idword: String = head[..got].iter().map(|&b| b as char).collect();
    let idword = idword.trim_end().to_string();
    if idword == "NAIF/DAF" {
        // Pre-type-tag DAFs are almost always SPKs.
        return Ok(("DAF".to_string(), "SPK".to_string()));
    }
    match idword.split_once('/') {
        Some((arch @ ("DAF" | "DAS" | "KPL"), file_type)) if !file_type.trim().is_empty() => {
            Ok((arch.to_string(), file_type.trim().to_string()))
        }
        _ => Ok(("?".to_string(), "?".to_string())),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KernelKind {
    Spk,
    Text,
    Meta,
}

impl KernelKind {
    fn label(&self) -> &'static str {
        match self {
            KernelKind::Spk => "SPK",
            KernelKind::Text => "TEXT",
            KernelKind::Meta => "META",
        }
    }
}

/// One furnished kernel (the KDATA/KINFO record).
#[derive(Debug)]
pub struct LoadedKernel {
    pub path: String,
    pub kind: KernelKind,
    /// The meta-kernel that furnished this file, if any.
    pub source: Option<String>,
    /// Handle for binary kernels.
    pub handle: Option<usize>,
}

#[derive(Debug, Default)]
pub struct KernelManager {
    pool: KernelPool,
    catalog: BodyCatalog,
    loaded: Vec<LoadedKernel>,
    spks: Vec<(usize, SpkFile)>,
    next_handle: usize,
}

impl KernelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self) -> &KernelPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut KernelPool {
        &mut self.pool
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut BodyCatalog {
        &mut self.catalog
    }

    /// Translates a body name or raw ID string (BODS2C through the pool).
    pub fn body_id(&self, text: &str) -> Result<Option<i32>, BodyError> {
        self.catalog.string_to_id(&self.pool, text)
    }

    pub fn body_name(&self, id: i32) -> Result<Option<String>, BodyError> {
        self.catalog.id_to_name(&self.pool, id)
    }

    pub fn spk(&self, handle: usize) -> Option<&SpkFile> {
        self.spks
            .iter()
            .find(|(candidate, _)| *candidate == handle)
            .map(|(_, spk)| spk)
    }

    /// Furnishes a kernel of any kind (FURNSH analogue).
    pub fn furnish<P: AsRef<Path>>(&mut self, path: P) -> Result<(), KernelError> {
        self.furnish_from(path.as_ref(), None)
    }

    fn furnish_from(&mut self, path: &Path, source: Option<String>) -> Result<(), KernelError> {
        let display = path.display().to_string();
        let (arch, file_type) = identify(path)?;
        match (arch.as_str(), file_type.as_str()) {
            ("KPL", "MK") => {
                if let Some(meta) = &source {
                    return Err(KernelError::NestedMeta {
                        path: meta.clone(),
                        nested: display,
                    });
                }
                self.furnish_meta(&display)
            }
            ("KPL", _) => {
                self.pool.load(path)?;
                info!("furnished text kernel {display}");
                self.loaded.push(LoadedKernel {
                    path: display,
                    kind: KernelKind::Text,
                    source,
                    handle: None,
                });
                Ok(())
            }
            ("DAF", "SPK") => {
                let spk = SpkFile::open(path)?;
                let handle = self.next_handle;
                self.next_handle += 1;
                info!("furnished SPK {display} ({} segments)", spk.segments.len());
                self.spks.push((handle, spk));
                self.loaded.push(LoadedKernel {
                    path: display,
                    kind: KernelKind::Spk,
                    source,
                    handle: Some(handle),
                });
                Ok(())
            }
            ("?", _) => Err(KernelError::Unrecognized {
                path: display,
                idword: arch,
            }),
            _ => Err(KernelError::UnsupportedKernel { file_type }),
        }
    }

    fn furnish_meta(&mut self, display: &str) -> Result<(), KernelError> {
        self.pool.load(display)?;
        if !self.pool.exists("KERNELS_TO_LOAD") {
            return Err(KernelError::MetaMissingList {
                path: display.to_string(),
            });
        }
        let to_load: Vec<String> = self.pool.strings("KERNELS_TO_LOAD")?.to_vec();
        let substitutions = self.path_substitutions()?;
        // The list variables are bookkeeping, not pool data.
        for var in ["KERNELS_TO_LOAD", "PATH_SYMBOLS", "PATH_VALUES"] {
            self.pool.delete(var);
        }
        info!("furnishing meta-kernel {display} ({} kernels)", to_load.len());
        self.loaded.push(LoadedKernel {
            path: display.to_string(),
            kind: KernelKind::Meta,
            source: None,
            handle: None,
        });
        for entry in to_load {
            let resolved = resolve_entry(&entry, &substitutions)?;
            self.furnish_from(Path::new(&resolved), Some(display.to_string()))?;
        }
        Ok(())
    }

    fn path_substitutions(&self) -> Result<Vec<(String, String)>, KernelError> {
        if !self.pool.exists("PATH_SYMBOLS") && !self.pool.exists("PATH_VALUES") {
            return Ok(Vec::new());
        }
        let symbols = self.pool.strings("PATH_SYMBOLS")?.to_vec();
        let values = self.pool.strings("PATH_VALUES")?.to_vec();
        if symbols.len() != values.len() {
            return Err(KernelError::PathMismatch {
                symbols: symbols.len(),
                values: values.len(),
            });
        }
        let mut pairs: Vec<(String, String)> = symbols.into_iter().zip(values).collect();
        // Longest symbol first so $AB never matches through $A.
        pairs.sort_by_key(|(symbol, _)| std::cmp::Reverse(symbol.len()));
        Ok(pairs)
    }

    /// Count of loaded kernels matching the kind filter (KTOTAL analogue).
    /// The filter is a comma/space-separated union of `ALL`, `SPK`,
    /// `TEXT`, and `META`, case-insensitive.
    pub fn total(&self, kinds: &str) -> usize {
        self.matching(kinds).count()
    }

    /// The nth loaded kernel matching the filter (KDATA analogue).
    pub fn data(&self, which: usize, kinds: &str) -> Option<&LoadedKernel> {
        self.matching(kinds).nth(which)
    }

    /// The record for a loaded path (KINFO analogue); the last entry wins
    /// if the same file was furnished twice.
    pub fn info(&self, path: &str) -> Option<&LoadedKernel> {
        self.loaded.iter().rev().find(|entry| entry.path == path)
    }

    fn matching<'a>(&'a self, kinds: &str) -> impl Iterator<Item = &'a LoadedKernel> {
        let wanted: Vec<String> = kinds
            .split([' ', ','])
            .filter(|token| !token.is_empty())
            .map(str::to_uppercase)
            .collect();
        self.loaded.iter().filter(move |entry| {
            wanted
                .iter()
                .any(|kind| kind == "ALL" || kind == entry.kind.label())
        })
    }

    /// Unloads the last furnished instance of `path` (UNLOAD analogue).
    /// Unloading a meta-kernel unloads everything it furnished; unloading
    /// any text kernel clears and rebuilds the pool from the remaining
    /// ones. Returns false when the path was never furnished.
    pub fn unload(&mut self, path: &str) -> bool {
        let at = match self.loaded.iter().rposition(|entry| entry.path == path) {
            Some(at) => at,
            None => return false,
        };
        let entry = self.loaded.remove(at);
        let mut rebuild = entry.kind != KernelKind::Spk;
        if let Some(handle) = entry.handle {
            self.spks.retain(|(candidate, _)| *candidate != handle);
        }
        if entry.kind == KernelKind::Meta {
            let children: Vec<usize> = self
                .loaded
                .iter()
                .enumerate()
                .filter(|(_, child)| child.source.as_deref() == Some(path))
                .map(|(i, _)| i)
                .collect();
            for i in children.into_iter().rev() {
                let child = self.loaded.remove(i);
                if let Some(handle) = child.handle {
                    self.spks.retain(|(candidate, _)| *candidate != handle);
                }
                rebuild = rebuild || child.kind == KernelKind::Text;
            }
        }
        if rebuild {
            self.rebuild_pool();
        }
        info!("unloaded {path}");
        true
    }

    /// Reloads every remaining text kernel into a cleared pool, restoring
    /// the state their load order implies.
    fn rebuild_pool(&mut self) {
        self.pool.clear();
        for entry in &self.loaded {
            if entry.kind == KernelKind::Text {
                if let Err(error) = self.pool.load(&entry.path) {
                    // The file loaded once already; a failure here means it
                    // changed or vanished underneath us.
                    warn!("could not reload {} during pool rebuild: {error}", entry.path);
                }
            }
        }
    }
}

fn resolve_entry(entry: &str, pairs: &[(String, String)]) -> Result<String, KernelError> {
    let mut out = entry.to_string();
    while let Some(at) = out.find('$') {
        let tail = &out[at + 1..];
        let matched = pairs
            .iter()
            .find(|(symbol, _)| tail.starts_with(symbol.as_str()));
        match matched {
            Some((symbol, value)) => {
                out.replace_range(at..at + 1 + symbol.len(), value);
            }
            None => {
                return Err(KernelError::UnresolvedSymbol {
                    entry: entry.to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_entry_substitutes_longest_symbol_first() {
        let pairs = vec![
            ("AB".to_string(), "/long".to_string()),
            ("A".to_string(), "/short".to_string()),
        ];
        // Caller sorts; mimic that here.
        let mut pairs = pairs;
        pairs.sort_by_key(|(s, _)| std::cmp::Reverse(s.len()));
        assert_eq!(resolve_entry("$AB/x.bsp", &pairs).unwrap(), "/long/x.bsp");
        assert_eq!(resolve_entry("$A/x.bsp", &pairs).unwrap(), "/short/x.bsp");
        assert_eq!(resolve_entry("plain.bsp", &pairs).unwrap(), "plain.bsp");
        assert!(matches!(
            resolve_entry("$NOPE/x.bsp", &pairs),
            Err(KernelError::UnresolvedSymbol { .. })
        ));
    }
}
