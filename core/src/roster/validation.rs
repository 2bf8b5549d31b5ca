//! Invariant checking and roster comparison: `detect_violation` and
//! `distance`. Split from `construction` because repair and detection
//! serve different callers (detection is read-only and used by tests
//! and the `debug_validate_invariants` logging hook; repair mutates).

use crate::models::{PartialRoster, Roster};

use super::RosterModel;

impl RosterModel {
    /// Returns true if any hard invariant is violated, checked in a
    /// fixed order and short-circuiting on the first hit: cell range,
    /// slot disjointness, rest-after-duty, underlined-day preservation,
    /// bold-day forced change.
    pub fn detect_violation(&self, r: &Roster) -> bool {
        let d = self.d;
        let n = self.n;

        // Every cell must reference a valid physician index.
        if r.iter().any(|&v| v >= n) {
            return true;
        }

        // primary[t] != secondary[t] for all t.
        for t in 0..d {
            if r[t] == r[d + t] {
                return true;
            }
        }

        // Rest-after-duty: yesterday's primary can't reappear today.
        if self.enable_off_after_garde {
            for t in 1..d {
                if r[t - 1] == r[t] || r[t - 1] == r[d + t] {
                    return true;
                }
            }
        }

        if let Some(initial) = &self.initial {
            // Underlined days must match the initial roster.
            for &day in &self.underlined_days.primary {
                if Some(r[day]) != initial[day] {
                    return true;
                }
            }
            for &day in &self.underlined_days.secondary {
                if Some(r[d + day]) != initial[d + day] {
                    return true;
                }
            }

            // Bold days must differ from the initial roster.
            for &day in &self.bold_days.primary {
                if initial[day] == Some(r[day]) {
                    return true;
                }
            }
            for &day in &self.bold_days.secondary {
                if initial[d + day] == Some(r[d + day]) {
                    return true;
                }
            }
        }

        false
    }

    /// Hamming distance between `r` and `r_ref` over all `2*D` positions,
    /// ignoring positions where `r_ref` is `None` (the source's `-1`
    /// convention for "not part of the reference").
    pub fn distance(r: &Roster, r_ref: &PartialRoster) -> usize {
        r.iter()
            .zip(r_ref.iter())
            .filter(|(&cell, &reference)| match reference {
                Some(v) => cell != v,
                None => false,
            })
            .count()
    }
}
