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

use std::fmt;

use snafu::Snafu;

#[derive(Debug, PartialEq, Snafu)]
pub enum WindowError {
    #[snafu(display("interval start {start} is past its end {end}"))]
    BadEndpoints { start: f64, end: f64 },
}

/// A coverage window: an ordered set of disjoint `[start, end]` intervals of
/// TDB seconds past J2000.
///
/// Inserting an interval that overlaps or abuts an existing one merges the
/// two, so the intervals stay strictly increasing and disjoint after every
/// operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Window {
    intervals: Vec<(f64, f64)>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a window from unordered, possibly overlapping intervals.
    pub fn from_intervals(intervals: &[(f64, f64)]) -> Result<Self, WindowError> {
        let mut wnd = Self::new();
        for &(start, end) in intervals {
            wnd.insert(start, end)?;
        }
        Ok(wnd)
    }

    /// Number of disjoint intervals in this window.
    pub fn card(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sum of the interval lengths.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(|(a, b)| b - a).sum()
    }

    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.intervals.first().copied()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.intervals.last().copied()
    }

    /// Start of the earliest interval and end of the latest one.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.first(), self.last()) {
            (Some((start, _)), Some((_, end))) => Some((start, end)),
            _ => None,
        }
    }

    /// Inserts `[start, end]`, merging any interval it overlaps or abuts.
    pub fn insert(&mut self, start: f64, end: f64) -> Result<(), WindowError> {
        if start > end {
            return Err(WindowError::BadEndpoints { start, end });
        }
        let mut merged = (start, end);
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut placed = false;
        for &(a, b) in &self.intervals {
            if b < merged.0 {
                out.push((a, b));
            } else if a > merged.1 {
                if !placed {
                    out.push(merged);
                    placed = true;
                }
                out.push((a, b));
            } else {
                merged = (merged.0.min(a), merged.1.max(b));
            }
        }
        if !placed {
            out.push(merged);
        }
        self.intervals = out;
        Ok(())
    }

    /// True when `t` falls inside one of the intervals.
    pub fn contains(&self, t: f64) -> bool {
        self.intervals.iter().any(|&(a, b)| a <= t && t <= b)
    }

    /// True when the whole of `[start, end]` is covered by a single interval.
    pub fn includes(&self, start: f64, end: f64) -> bool {
        self.intervals.iter().any(|&(a, b)| a <= start && end <= b)
    }

    /// Union with another window.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for &(a, b) in &other.intervals {
            // endpoints come from valid windows, insert cannot fail
            out.insert(a, b).unwrap();
        }
        out
    }

    /// Intersection with another window.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let (a1, b1) = self.intervals[i];
            let (a2, b2) = other.intervals[j];
            let lo = a1.max(a2);
            let hi = b1.min(b2);
            if lo <= hi {
                out.push((lo, hi));
            }
            if b1 < b2 {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { intervals: out }
    }

    /// Shrinks every interval by `left` at its start and `right` at its end,
    /// dropping intervals that vanish. Negative amounts grow the intervals.
    pub fn contract(&self, left: f64, right: f64) -> Self {
        let mut out = Self::new();
        for &(a, b) in &self.intervals {
            let (na, nb) = (a + left, b - right);
            if na <= nb {
                out.insert(na, nb).unwrap();
            }
        }
        out
    }

    /// Grows every interval by `left` at its start and `right` at its end.
    pub fn expand(&self, left: f64, right: f64) -> Self {
        self.contract(-left, -right)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (num, (a, b)) in self.intervals.iter().enumerate() {
            if num > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{a}, {b}]")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_merges_overlaps_and_abutments() {
        let mut wnd = Window::new();
        wnd.insert(10.0, 20.0).unwrap();
        wnd.insert(30.0, 40.0).unwrap();
        assert_eq!(wnd.card(), 2);
        // Overlap with the first interval
        wnd.insert(15.0, 25.0).unwrap();
        assert_eq!(wnd.intervals(), &[(10.0, 25.0), (30.0, 40.0)]);
        // Abutment joins the two
        wnd.insert(25.0, 30.0).unwrap();
        assert_eq!(wnd.intervals(), &[(10.0, 40.0)]);
        assert_eq!(wnd.measure(), 30.0);
    }

    #[test]
    fn insert_keeps_order() {
        let mut wnd = Window::new();
        wnd.insert(50.0, 60.0).unwrap();
        wnd.insert(1.0, 2.0).unwrap();
        wnd.insert(10.0, 12.0).unwrap();
        assert_eq!(wnd.intervals(), &[(1.0, 2.0), (10.0, 12.0), (50.0, 60.0)]);
    }

    #[test]
    fn reversed_endpoints_rejected() {
        let mut wnd = Window::new();
        assert_eq!(
            wnd.insert(2.0, 1.0),
            Err(WindowError::BadEndpoints { start: 2.0, end: 1.0 })
        );
    }

    #[test]
    fn intersection() {
        let a = Window::from_intervals(&[(1.0, 5.0), (8.0, 12.0), (20.0, 22.0)]).unwrap();
        let b = Window::from_intervals(&[(3.0, 9.0), (11.0, 21.0)]).unwrap();
        let c = a.intersect(&b);
        assert_eq!(c.intervals(), &[(3.0, 5.0), (8.0, 9.0), (11.0, 12.0), (20.0, 21.0)]);
        // Intersection with an empty window is empty
        assert!(a.intersect(&Window::new()).is_empty());
    }

    #[test]
    fn union() {
        let a = Window::from_intervals(&[(1.0, 3.0)]).unwrap();
        let b = Window::from_intervals(&[(2.0, 4.0), (10.0, 11.0)]).unwrap();
        let c = a.union(&b);
        assert_eq!(c.intervals(), &[(1.0, 4.0), (10.0, 11.0)]);
    }

    #[test]
    fn contract_and_expand() {
        let a = Window::from_intervals(&[(0.0, 10.0), (20.0, 21.0)]).unwrap();
        let shrunk = a.contract(1.0, 1.0);
        // The second interval vanishes
        assert_eq!(shrunk.intervals(), &[(1.0, 9.0)]);
        let grown = shrunk.expand(1.0, 1.0);
        assert_eq!(grown.intervals(), &[(0.0, 10.0)]);
    }

    #[test]
    fn membership() {
        let a = Window::from_intervals(&[(1.0, 5.0), (8.0, 12.0)]).unwrap();
        assert!(a.contains(1.0));
        assert!(a.contains(12.0));
        assert!(!a.contains(6.0));
        assert!(a.includes(9.0, 11.0));
        assert!(!a.includes(4.0, 9.0));
        assert_eq!(a.bounds(), Some((1.0, 12.0)));
    }
}
