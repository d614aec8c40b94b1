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

//! The text-kernel grammar: `\begindata` / `\begintext` sections holding
//! `NAME = value` and `NAME += value` assignments, where a value is a scalar
//! or a parenthesized list of numbers, `@` calendar dates, and quoted
//! strings. Anything outside a data section is commentary.

use hifitime::Epoch;
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use super::{PoolError, PoolValue};

const BEGIN_DATA: &str = "\\begindata";
const BEGIN_TEXT: &str = "\\begintext";

/// One parsed assignment, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub append: bool,
    pub value: PoolValue,
}

lazy_static! {
    static ref ASSIGN: Regex =
        Regex::new(r"^\s*([^\s=+]+)\s*(\+?=)\s*(.*)$").unwrap();
}

/// Parses the lines of a text kernel into assignments.
pub fn parse_lines<I, S>(lines: I) -> Result<Vec<Assignment>, PoolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assignments = Vec::new();
    let mut in_data = false;
    let mut pending: Option<(String, bool, Vec<Token>, usize)> = None;

    for (idx, raw) in lines.into_iter().enumerate() {
        let lineno = idx + 1;
        let line = raw.as_ref().trim_end();
        let trimmed = line.trim();

        if trimmed == BEGIN_DATA {
            in_data = true;
            continue;
        }
        if trimmed == BEGIN_TEXT {
            if pending.is_some() {
                return Err(PoolError::Parse {
                    line: lineno,
                    reason: "data section ended inside a parenthesized value".into(),
                });
            }
            in_data = false;
            continue;
        }
        if !in_data || trimmed.is_empty() {
            continue;
        }

        if let Some((name, append, mut tokens, start_line)) = pending.take() {
            let (mut more, open) = tokenize(trimmed, lineno, true)?;
            tokens.append(&mut more);
            if open {
                pending = Some((name, append, tokens, start_line));
            } else {
                assignments.push(finish(name, append, tokens, start_line)?);
            }
            continue;
        }

        let caps = ASSIGN.captures(trimmed).ok_or_else(|| PoolError::Parse {
            line: lineno,
            reason: format!("expected an assignment, found '{trimmed}'"),
        })?;
        let name = caps[1].to_string();
        let append = &caps[2] == "+=";
        let rest = caps[3].trim();
        if rest.is_empty() {
            return Err(PoolError::Parse {
                line: lineno,
                reason: format!("no value after '=' for variable {name}"),
            });
        }
        let (tokens, open) = tokenize(rest, lineno, false)?;
        if open {
            pending = Some((name, append, tokens, lineno));
        } else {
            assignments.push(finish(name, append, tokens, lineno)?);
        }
    }

    if let Some((name, _, _, start_line)) = pending {
        return Err(PoolError::Parse {
            line: start_line,
            reason: format!("unclosed value list for variable {name}"),
        });
    }
    Ok(assignments)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
}

/// Splits one line of value text into tokens. `open` carries the
/// parenthesized-list state across lines; the returned flag is the state at
/// the end of this line.
fn tokenize(text: &str, lineno: usize, mut open: bool) -> Result<(Vec<Token>, bool), PoolError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '(' => {
                if open || pos != 0 {
                    return Err(PoolError::Parse {
                        line: lineno,
                        reason: "'(' may only open a value".into(),
                    });
                }
                open = true;
            }
            ')' => {
                if !open {
                    return Err(PoolError::Parse {
                        line: lineno,
                        reason: "unmatched ')'".into(),
                    });
                }
                open = false;
            }
            ',' | ' ' | '\t' => {}
            '\'' => {
                // Quoted string; '' is an embedded quote. Strings may not
                // span lines.
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, sc)) = chars.next() {
                    if sc == '\'' {
                        if let Some((_, '\'')) = chars.peek() {
                            chars.next();
                            value.push('\'');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        value.push(sc);
                    }
                }
                if !closed {
                    return Err(PoolError::Parse {
                        line: lineno,
                        reason: "unterminated quoted string".into(),
                    });
                }
                tokens.push(Token::Text(value));
            }
            _ => {
                let mut word = String::from(ch);
                while let Some(&(_, next_ch)) = chars.peek() {
                    if matches!(next_ch, ',' | ' ' | '\t' | ')' | '(') {
                        break;
                    }
                    word.push(next_ch);
                    chars.next();
                }
                tokens.push(numeric_token(&word, lineno)?);
            }
        }
    }
    Ok((tokens, open))
}

fn numeric_token(word: &str, lineno: usize) -> Result<Token, PoolError> {
    if let Some(date) = word.strip_prefix('@') {
        return Ok(Token::Number(parse_epoch_token(date).map_err(|reason| {
            PoolError::Parse { line: lineno, reason }
        })?));
    }
    // Fortran D exponents
    let normalized = word.replace(['D', 'd'], "E");
    f64::from_str(&normalized)
        .map(Token::Number)
        .map_err(|_| PoolError::Parse {
            line: lineno,
            reason: format!("'{word}' is neither a number, a date, nor a quoted string"),
        })
}

fn finish(
    name: String,
    append: bool,
    tokens: Vec<Token>,
    lineno: usize,
) -> Result<Assignment, PoolError> {
    if tokens.is_empty() {
        return Err(PoolError::Parse {
            line: lineno,
            reason: format!("empty value list for variable {name}"),
        });
    }
    let numeric = matches!(tokens[0], Token::Number(_));
    let mut doubles = Vec::new();
    let mut strings = Vec::new();
    for token in tokens {
        match (numeric, token) {
            (true, Token::Number(x)) => doubles.push(x),
            (false, Token::Text(s)) => strings.push(s),
            _ => {
                return Err(PoolError::Parse {
                    line: lineno,
                    reason: format!("variable {name} mixes numeric and string values"),
                })
            }
        }
    }
    let value = if numeric {
        PoolValue::Doubles(doubles)
    } else {
        PoolValue::Strings(strings)
    };
    Ok(Assignment { name, append, value })
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Parses a text-kernel `@` date (sans the `@`) into TDB seconds past J2000.
///
/// Accepts `YYYY-MON-DD` with an optional `-HH:MM:SS[.f]` or
/// `THH:MM:SS[.f]` tail, month given by name or number. Dates in text
/// kernels are TDB by definition.
pub fn parse_epoch_token(date: &str) -> Result<f64, String> {
    let upper = date.trim().to_uppercase();
    let mut iso = upper.clone();
    for (num, mon) in MONTHS.iter().enumerate() {
        if let Some(at) = iso.find(mon) {
            iso.replace_range(at..at + 3, &format!("{:02}", num + 1));
            break;
        }
    }
    // Normalize the date/time separator to 'T': 1972-01-01-12:00:00
    if let Some(at) = iso.match_indices('-').nth(2).map(|(i, _)| i) {
        iso.replace_range(at..=at, "T");
    }
    let padded = pad_date(&iso);
    Epoch::from_str(&format!("{padded} TDB"))
        .map(|e| e.to_et_seconds())
        .map_err(|e| format!("cannot parse date '@{date}': {e}"))
}

/// hifitime wants two-digit months and days; text kernels allow `1972-1-1`.
fn pad_date(iso: &str) -> String {
    let (date, time) = match iso.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (iso, None),
    };
    let mut parts: Vec<String> = date.split('-').map(String::from).collect();
    for part in parts.iter_mut().skip(1) {
        if part.len() == 1 {
            *part = format!("0{part}");
        }
    }
    let mut out = parts.join("-");
    match time {
        Some(t) => {
            out.push('T');
            out.push_str(t);
        }
        None => out.push_str("T00:00:00"),
    }
    out
}
