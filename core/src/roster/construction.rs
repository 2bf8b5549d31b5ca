use std::collections::HashSet;

use rand::Rng;

use crate::error::RosterError;
use crate::models::{Roster, Slot};

use super::RosterModel;

fn pick_excluding(
    n: usize,
    exclude: &HashSet<usize>,
    rng: &mut impl Rng,
) -> Option<usize> {
    let candidates: Vec<usize> = (0..n).filter(|i| !exclude.contains(i)).collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}

impl RosterModel {
    /// Samples `2*D` independent uniform physicians, then repairs the
    /// result so it satisfies every hard scheduling invariant.
    pub fn random_roster(&self, rng: &mut impl Rng) -> Result<Roster, RosterError> {
        let mut r: Roster = (0..2 * self.d)
            .map(|_| rng.random_range(0..self.n))
            .collect();
        self.repair(&mut r, rng)?;
        Ok(r)
    }

    /// Repairs `r` in place so it satisfies every hard invariant, in the
    /// fixed order: bold days, underlined days, rest-after-duty, slot
    /// disjointness.
    pub fn repair(&self, r: &mut Roster, rng: &mut impl Rng) -> Result<(), RosterError> {
        let d = self.d;
        let n = self.n;

        // 1. Bold days: force a change away from the initial value.
        if let Some(initial) = &self.initial {
            for &day in &self.bold_days.primary {
                if let Some(initial_val) = initial[day] {
                    if r[day] == initial_val {
                        let mut exclude = HashSet::new();
                        exclude.insert(initial_val);
                        r[day] = pick_excluding(n, &exclude, rng).ok_or(
                            RosterError::InfeasibleRepair {
                                day,
                                slot: Slot::Primary,
                            },
                        )?;
                    }
                }
            }
            for &day in &self.bold_days.secondary {
                if let Some(initial_val) = initial[d + day] {
                    if r[d + day] == initial_val {
                        let mut exclude = HashSet::new();
                        exclude.insert(initial_val);
                        r[d + day] = pick_excluding(n, &exclude, rng).ok_or(
                            RosterError::InfeasibleRepair {
                                day,
                                slot: Slot::Secondary,
                            },
                        )?;
                    }
                }
            }

            // 2. Underlined days: force identity with the initial value.
            for &day in &self.underlined_days.primary {
                if let Some(initial_val) = initial[day] {
                    r[day] = initial_val;
                }
            }
            for &day in &self.underlined_days.secondary {
                if let Some(initial_val) = initial[d + day] {
                    r[d + day] = initial_val;
                }
            }
        }

        // 3. Rest after duty: primary[t-1] must not reappear on day t.
        if self.enable_off_after_garde {
            for t in 1..d {
                self.repair_rest_violation(r, t, Slot::Primary, rng)?;
                self.repair_rest_violation(r, t, Slot::Secondary, rng)?;
            }
        }

        // 4. Slot disjointness: primary[t] != secondary[t].
        for t in 0..d {
            if r[t] == r[d + t] {
                let mut exclude = HashSet::new();
                exclude.insert(r[t]);
                if t > 0 {
                    exclude.insert(r[t - 1]);
                }
                if self.underlined_days.secondary.contains(&t) {
                    if let Some(initial) = &self.initial {
                        if let Some(v) = initial[d + t] {
                            exclude.insert(v);
                        }
                    }
                }
                r[d + t] = pick_excluding(n, &exclude, rng).ok_or(RosterError::InfeasibleRepair {
                    day: t,
                    slot: Slot::Secondary,
                })?;
            }
        }

        Ok(())
    }

    /// Resolves a single rest-after-duty violation at day `t` for the
    /// given later slot, if one exists. Mirrors the source's GG/GA
    /// handling: when the later cell is underlined, the earlier cell is
    /// resampled instead; when both are underlined, the conflict is left
    /// in place (fail open: preserving an underlined day wins over
    /// rest-after-duty in that region).
    fn repair_rest_violation(
        &self,
        r: &mut Roster,
        t: usize,
        later_slot: Slot,
        rng: &mut impl Rng,
    ) -> Result<(), RosterError> {
        let d = self.d;
        let n = self.n;
        let later_idx = match later_slot {
            Slot::Primary => t,
            Slot::Secondary => d + t,
        };

        if r[t - 1] != r[later_idx] {
            return Ok(());
        }

        let later_underlined = match later_slot {
            Slot::Primary => self.underlined_days.primary.contains(&t),
            Slot::Secondary => self.underlined_days.secondary.contains(&t),
        };

        if later_underlined {
            let earlier_underlined = self.underlined_days.primary.contains(&(t - 1));
            if earlier_underlined {
                return Ok(());
            }
            let mut exclude = HashSet::new();
            exclude.insert(r[later_idx]);
            if t >= 2 {
                exclude.insert(r[t - 2]);
            }
            r[t - 1] = pick_excluding(n, &exclude, rng).ok_or(RosterError::InfeasibleRepair {
                day: t - 1,
                slot: Slot::Primary,
            })?;
            return Ok(());
        }

        let mut exclude = HashSet::new();
        exclude.insert(r[t - 1]);
        // Excludes tomorrow's primary even when `later_slot` is
        // Secondary: the source applies this exclusion identically in
        // its GG and GA branches, so an astreinte today can't be
        // followed by a garde tomorrow either.
        if t + 1 < d {
            exclude.insert(r[t + 1]);
        }
        let later_bold = match later_slot {
            Slot::Primary => self.bold_days.primary.contains(&t),
            Slot::Secondary => self.bold_days.secondary.contains(&t),
        };
        if later_bold {
            if let Some(initial) = &self.initial {
                if let Some(v) = initial[later_idx] {
                    exclude.insert(v);
                }
            }
        }
        let next_underlined = match later_slot {
            Slot::Primary => t + 1 < d && self.underlined_days.primary.contains(&(t + 1)),
            Slot::Secondary => t + 1 < d && self.underlined_days.secondary.contains(&(t + 1)),
        };
        if next_underlined {
            if let Some(initial) = &self.initial {
                let next_idx = match later_slot {
                    Slot::Primary => t + 1,
                    Slot::Secondary => d + t + 1,
                };
                if let Some(v) = initial[next_idx] {
                    exclude.insert(v);
                }
            }
        }

        r[later_idx] = pick_excluding(n, &exclude, rng).ok_or(RosterError::InfeasibleRepair {
            day: t,
            slot: later_slot,
        })?;
        Ok(())
    }
}
