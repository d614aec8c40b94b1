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

//! The kernel variable pool.
//!
//! Text kernels assign named variables holding either double-precision
//! vectors or string vectors. The pool stores them, answers typed queries,
//! and lets agents watch a set of variables for updates.

use snafu::Snafu;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

mod parser;
pub use parser::{parse_epoch_token, Assignment};

/// Longest allowed variable name.
pub const MAX_NAME_LEN: usize = 32;

#[derive(Debug, Snafu)]
pub enum PoolError {
    #[snafu(display("no variable named {name} in the kernel pool"))]
    NotFound { name: String },
    #[snafu(display("kernel pool variable {name} holds {found} values, not {expected}"))]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[snafu(display("'{name}' is not a valid kernel pool variable name: {reason}"))]
    BadName { name: String, reason: String },
    #[snafu(display("start index {start} is outside variable {name} ({count} values)"))]
    BadStart {
        name: String,
        start: usize,
        count: usize,
    },
    #[snafu(display("text kernel line {line}: {reason}"))]
    Parse { line: usize, reason: String },
    #[snafu(display("could not read text kernel '{path}': {source}"))]
    KernelRead {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("could not write kernel pool to '{path}': {source}"))]
    KernelWrite {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Numeric,
    Text,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::Text => write!(f, "string"),
        }
    }
}

/// The value of one pool variable. Numeric variables hold doubles; integer
/// queries truncate toward zero on the way out.
#[derive(Clone, Debug, PartialEq)]
pub enum PoolValue {
    Doubles(Vec<f64>),
    Strings(Vec<String>),
}

impl PoolValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PoolValue::Doubles(_) => ValueKind::Numeric,
            PoolValue::Strings(_) => ValueKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PoolValue::Doubles(d) => d.len(),
            PoolValue::Strings(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Watcher {
    variables: Vec<String>,
    updated: bool,
}

/// The pool itself. One per program in the original; owned by a
/// [`crate::kernels::KernelManager`] here, or free-standing in tests.
#[derive(Debug, Default)]
pub struct KernelPool {
    vars: HashMap<String, PoolValue>,
    watchers: HashMap<String, Watcher>,
}

impl KernelPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every variable. Watchers stay registered and are notified.
    pub fn clear(&mut self) {
        let names: Vec<String> = self.vars.keys().cloned().collect();
        self.vars.clear();
        for name in names {
            self.notify(&name);
        }
    }

    /// Loads a text kernel file.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PoolError> {
        let display = path.as_ref().display().to_string();
        let file = File::open(&path).map_err(|source| PoolError::KernelRead {
            path: display.clone(),
            source,
        })?;
        let lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|source| PoolError::KernelRead {
                path: display.clone(),
                source,
            })?;
        debug!("loading text kernel {display} ({} lines)", lines.len());
        self.load_lines(&lines)
    }

    /// Loads assignments from an in-memory line buffer (LMPOOL analogue).
    pub fn load_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<(), PoolError> {
        for assignment in parser::parse_lines(lines)? {
            self.apply(assignment)?;
        }
        Ok(())
    }

    fn apply(&mut self, assignment: Assignment) -> Result<(), PoolError> {
        let Assignment { name, append, value } = assignment;
        check_name(&name)?;
        if append {
            match (self.vars.get_mut(&name), value) {
                (Some(PoolValue::Doubles(have)), PoolValue::Doubles(mut more)) => {
                    have.append(&mut more)
                }
                (Some(PoolValue::Strings(have)), PoolValue::Strings(mut more)) => {
                    have.append(&mut more)
                }
                (Some(existing), value) => {
                    return Err(PoolError::TypeMismatch {
                        name,
                        expected: existing.kind(),
                        found: value.kind(),
                    })
                }
                // Appending to an absent variable creates it.
                (None, value) => {
                    self.vars.insert(name.clone(), value);
                }
            }
        } else {
            self.vars.insert(name.clone(), value);
        }
        self.notify(&name);
        Ok(())
    }

    /// Direct numeric assignment (PDPOOL analogue).
    pub fn put_doubles(&mut self, name: &str, values: &[f64]) -> Result<(), PoolError> {
        check_name(name)?;
        self.vars
            .insert(name.to_string(), PoolValue::Doubles(values.to_vec()));
        self.notify(name);
        Ok(())
    }

    /// Direct integer assignment; stored as doubles (PIPOOL analogue).
    pub fn put_integers(&mut self, name: &str, values: &[i64]) -> Result<(), PoolError> {
        let doubles: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        self.put_doubles(name, &doubles)
    }

    /// Direct string assignment (PCPOOL analogue).
    pub fn put_strings(&mut self, name: &str, values: &[&str]) -> Result<(), PoolError> {
        check_name(name)?;
        self.vars.insert(
            name.to_string(),
            PoolValue::Strings(values.iter().map(|s| s.to_string()).collect()),
        );
        self.notify(name);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Value count and kind for a variable (DTPOOL analogue).
    pub fn descriptor(&self, name: &str) -> Option<(usize, ValueKind)> {
        self.vars.get(name).map(|v| (v.len(), v.kind()))
    }

    /// All values of a numeric variable.
    pub fn doubles(&self, name: &str) -> Result<&[f64], PoolError> {
        match self.vars.get(name) {
            Some(PoolValue::Doubles(d)) => Ok(d),
            Some(other) => Err(PoolError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Numeric,
                found: other.kind(),
            }),
            None => Err(PoolError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Up to `room` values of a numeric variable starting at index `start`
    /// (GDPOOL analogue; `start` is zero-based here).
    pub fn doubles_from(&self, name: &str, start: usize, room: usize) -> Result<&[f64], PoolError> {
        let all = self.doubles(name)?;
        if start >= all.len() {
            return Err(PoolError::BadStart {
                name: name.to_string(),
                start,
                count: all.len(),
            });
        }
        Ok(&all[start..all.len().min(start + room)])
    }

    /// Numeric variable truncated toward zero (GIPOOL analogue).
    pub fn integers(&self, name: &str) -> Result<Vec<i64>, PoolError> {
        Ok(self.doubles(name)?.iter().map(|&v| v.trunc() as i64).collect())
    }

    /// All values of a string variable.
    pub fn strings(&self, name: &str) -> Result<&[String], PoolError> {
        match self.vars.get(name) {
            Some(PoolValue::Strings(s)) => Ok(s),
            Some(other) => Err(PoolError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Text,
                found: other.kind(),
            }),
            None => Err(PoolError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Convenience for `BODYnnn_*` constants.
    pub fn body_doubles(&self, body: i32, item: &str) -> Result<&[f64], PoolError> {
        self.doubles(&format!("BODY{body}_{item}"))
    }

    /// Removes a variable; removing an absent one is a no-op (DVPOOL).
    pub fn delete(&mut self, name: &str) {
        if self.vars.remove(name).is_some() {
            self.notify(name);
        }
    }

    /// Names matching a template, where `*` matches any substring and `%`
    /// any single character (GNPOOL analogue). Sorted for stable output.
    pub fn names(&self, template: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .vars
            .keys()
            .filter(|name| template_match(template, name))
            .cloned()
            .collect();
        out.sort();
        out
    }

    /// Registers `agent` as watching `variables` (SWPOOL analogue). A fresh
    /// watch always reports one update so the agent initializes itself.
    pub fn watch(&mut self, agent: &str, variables: &[&str]) {
        let watcher = Watcher {
            variables: variables.iter().map(|v| v.to_string()).collect(),
            updated: true,
        };
        self.watchers.insert(agent.to_string(), watcher);
    }

    /// True when any variable watched by `agent` changed since the last
    /// check (CVPOOL analogue). Clears the flag.
    pub fn check_update(&mut self, agent: &str) -> bool {
        match self.watchers.get_mut(agent) {
            Some(watcher) => std::mem::take(&mut watcher.updated),
            None => false,
        }
    }

    fn notify(&mut self, name: &str) {
        for watcher in self.watchers.values_mut() {
            if watcher.variables.iter().any(|v| v == name) {
                watcher.updated = true;
            }
        }
    }

    /// Writes every variable back out as a loadable text kernel (WRPOOL
    /// analogue).
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), PoolError> {
        let display = path.as_ref().display().to_string();
        let mut file = File::create(&path).map_err(|source| PoolError::KernelWrite {
            path: display.clone(),
            source,
        })?;
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        let mut body = String::from("\\begindata\n\n");
        for name in names {
            let values = match &self.vars[name] {
                PoolValue::Doubles(d) => d
                    .iter()
                    .map(|v| format!("{v:.17E}"))
                    .collect::<Vec<_>>()
                    .join(",\n    "),
                PoolValue::Strings(s) => s
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "''")))
                    .collect::<Vec<_>>()
                    .join(",\n    "),
            };
            body.push_str(&format!("{name} = ( {values} )\n\n"));
        }
        body.push_str("\\begintext\n");
        file.write_all(body.as_bytes())
            .map_err(|source| PoolError::KernelWrite {
                path: display,
                source,
            })
    }
}

fn check_name(name: &str) -> Result<(), PoolError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(PoolError::BadName {
            name: name.to_string(),
            reason: format!("must be 1 to {MAX_NAME_LEN} characters"),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(PoolError::BadName {
            name: name.to_string(),
            reason: "must not contain blanks".to_string(),
        });
    }
    Ok(())
}

/// `*` matches any run of characters, `%` exactly one.
fn template_match(template: &str, name: &str) -> bool {
    let tmpl: Vec<char> = template.chars().collect();
    let text: Vec<char> = name.chars().collect();
    fn matches(tmpl: &[char], text: &[char]) -> bool {
        match tmpl.split_first() {
            None => text.is_empty(),
            Some(('*', rest)) => {
                (0..=text.len()).any(|skip| matches(rest, &text[skip..]))
            }
            Some(('%', rest)) => !text.is_empty() && matches(rest, &text[1..]),
            Some((&c, rest)) => text.first() == Some(&c) && matches(rest, &text[1..]),
        }
    }
    matches(&tmpl, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get_typed() {
        let mut pool = KernelPool::new();
        pool.put_doubles("BODY399_RADII", &[6378.14, 6378.14, 6356.75])
            .unwrap();
        pool.put_strings("MISSION", &["CASSINI"]).unwrap();
        pool.put_integers("SCLK01_N_FIELDS", &[2]).unwrap();

        assert_eq!(pool.doubles("BODY399_RADII").unwrap().len(), 3);
        assert_eq!(pool.integers("SCLK01_N_FIELDS").unwrap(), vec![2]);
        assert_eq!(pool.strings("MISSION").unwrap(), ["CASSINI".to_string()]);
        assert_eq!(
            pool.descriptor("BODY399_RADII"),
            Some((3, ValueKind::Numeric))
        );
        assert!(pool.exists("MISSION"));
        assert!(!pool.exists("ABSENT"));
    }

    #[test]
    fn type_mismatch_reported() {
        let mut pool = KernelPool::new();
        pool.put_strings("NAMES", &["A"]).unwrap();
        assert!(matches!(
            pool.doubles("NAMES"),
            Err(PoolError::TypeMismatch { .. })
        ));
        assert!(matches!(
            pool.strings("ABSENT"),
            Err(PoolError::NotFound { .. })
        ));
    }

    #[test]
    fn windowed_get() {
        let mut pool = KernelPool::new();
        pool.put_doubles("X", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(pool.doubles_from("X", 1, 2).unwrap(), &[2.0, 3.0]);
        assert_eq!(pool.doubles_from("X", 3, 10).unwrap(), &[4.0, 5.0]);
        assert!(matches!(
            pool.doubles_from("X", 5, 1),
            Err(PoolError::BadStart { .. })
        ));
    }

    #[test]
    fn integers_truncate_toward_zero() {
        let mut pool = KernelPool::new();
        pool.put_doubles("X", &[1.9, -1.9, 0.2]).unwrap();
        assert_eq!(pool.integers("X").unwrap(), vec![1, -1, 0]);
    }

    #[test]
    fn append_through_buffer_load() {
        let mut pool = KernelPool::new();
        pool.load_lines(&["\\begindata", "NAIF_BODY_CODE = 1002"])
            .unwrap();
        pool.load_lines(&["\\begindata", "NAIF_BODY_CODE += 1003"])
            .unwrap();
        assert_eq!(pool.doubles("NAIF_BODY_CODE").unwrap(), &[1002.0, 1003.0]);
        // Append to an absent variable behaves like assignment.
        pool.load_lines(&["\\begindata", "FRESH += 7"]).unwrap();
        assert_eq!(pool.doubles("FRESH").unwrap(), &[7.0]);
    }

    #[test]
    fn delete_and_clear() {
        let mut pool = KernelPool::new();
        pool.put_doubles("X", &[1.0]).unwrap();
        pool.delete("X");
        pool.delete("X"); // no-op
        assert!(!pool.exists("X"));
        pool.put_doubles("Y", &[1.0]).unwrap();
        pool.clear();
        assert!(!pool.exists("Y"));
    }

    #[test]
    fn name_enumeration_with_template() {
        let mut pool = KernelPool::new();
        for name in ["BODY399_RADII", "BODY399_GM", "BODY301_GM", "FRAME_A"] {
            pool.put_doubles(name, &[0.0]).unwrap();
        }
        assert_eq!(
            pool.names("BODY399_*"),
            vec!["BODY399_GM".to_string(), "BODY399_RADII".to_string()]
        );
        assert_eq!(pool.names("BODY3%9_GM").len(), 2);
        assert_eq!(pool.names("*"), pool.names("*%*"));
        assert!(pool.names("NOPE*").is_empty());
    }

    #[test]
    fn bad_names_rejected() {
        let mut pool = KernelPool::new();
        assert!(matches!(
            pool.put_doubles("HAS SPACE", &[1.0]),
            Err(PoolError::BadName { .. })
        ));
        let long = "X".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            pool.put_doubles(&long, &[1.0]),
            Err(PoolError::BadName { .. })
        ));
    }

    #[test]
    fn watchers_track_updates() {
        let mut pool = KernelPool::new();
        pool.watch("AGENT", &["TARGET", "OTHER"]);
        // A fresh watch reports an update once.
        assert!(pool.check_update("AGENT"));
        assert!(!pool.check_update("AGENT"));

        pool.put_doubles("UNRELATED", &[1.0]).unwrap();
        assert!(!pool.check_update("AGENT"));

        pool.put_doubles("TARGET", &[1.0]).unwrap();
        assert!(pool.check_update("AGENT"));
        assert!(!pool.check_update("AGENT"));

        pool.delete("TARGET");
        assert!(pool.check_update("AGENT"));

        pool.put_doubles("OTHER", &[1.0]).unwrap();
        pool.clear();
        assert!(pool.check_update("AGENT"));

        // Unknown agents never report updates.
        assert!(!pool.check_update("NOBODY"));
    }

    #[test]
    fn write_round_trips() {
        let mut pool = KernelPool::new();
        pool.put_doubles("BODY301_GM", &[4902.800066]).unwrap();
        pool.put_strings("NAIF_BODY_NAME", &["GRAIL-A", "O'KEEFE"])
            .unwrap();
        let path = std::env::temp_dir().join("koios_pool_roundtrip.tpc");
        pool.write(&path).unwrap();

        let mut reloaded = KernelPool::new();
        reloaded.load(&path).unwrap();
        assert_eq!(
            reloaded.doubles("BODY301_GM").unwrap(),
            pool.doubles("BODY301_GM").unwrap()
        );
        assert_eq!(
            reloaded.strings("NAIF_BODY_NAME").unwrap(),
            pool.strings("NAIF_BODY_NAME").unwrap()
        );
        std::fs::remove_file(path).ok();
    }
}
