//! Tabu Search: FIFO-memory local search refinement of an ACO-seeded
//! roster.
//!
//! Grounded on `examples/original_source/algo_tabou.py`
//! (`planning_voisin`/`recherche_tabou`) for the exact neighbor
//! generation, tabu/aspiration criterion, and stagnation-based
//! termination; logging follows the same `LoggingOptions`-gated style
//! used in `aco`.

use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use crate::error::RosterError;
use crate::models::{LoggingOptions, PartialRoster, Roster, RosterTunables, Slot};
use crate::roster::RosterModel;

/// Canonical byte representation of a roster, used as the tabu memory's
/// key. A roster is a flat `Vec<usize>`; on 64-bit targets this is the
/// same little-endian byte layout the source's `ndarray.tobytes()`
/// produces for an integer array, which is all the tabu list needs
/// (equality, not portability across machines).
fn canonical_bytes(r: &Roster) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(r.len() * std::mem::size_of::<usize>());
    for &cell in r {
        bytes.extend_from_slice(&cell.to_le_bytes());
    }
    bytes
}

/// Tabu Search local-search refinement over a single team's `RosterModel`.
pub struct TabuSearch<'a> {
    model: &'a RosterModel,
    tunables: RosterTunables,
}

impl<'a> TabuSearch<'a> {
    pub fn new(model: &'a RosterModel, tunables: RosterTunables) -> Self {
        TabuSearch { model, tunables }
    }

    /// Runs the search starting from `seed` (or a fresh random roster if
    /// `None`), optionally bounded to stay within `max_dist` of
    /// `initial`. Returns the best roster and cost ever observed.
    pub fn run(
        &self,
        seed: Option<Roster>,
        initial: Option<&PartialRoster>,
        max_dist: Option<usize>,
        logging: &LoggingOptions,
        rng: &mut impl Rng,
    ) -> Result<(Roster, f64), RosterError> {
        let mut tabu: VecDeque<Vec<u8>> = VecDeque::with_capacity(self.tunables.len_tabou);

        let mut current = match seed {
            Some(r) => r,
            None => self.model.random_roster(rng)?,
        };
        let mut current_cost = self.model.cost(&current, &self.tunables);

        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut stagnation = 0usize;

        for iteration in 0..self.tunables.num_iters_ts {
            let max_attempts = self.tunables.tentative_mult * self.tunables.num_voisins;
            let mut attempts = 0usize;
            let mut accepted = 0usize;

            let mut best_neighbor: Option<(Roster, f64)> = None;

            while attempts < max_attempts && accepted < self.tunables.num_voisins {
                let mut neighbor = self.neighbor(&current, rng);
                self.model.repair(&mut neighbor, rng)?;
                if logging.debug_validate_invariants && self.model.detect_violation(&neighbor) {
                    log::warn!(
                        "tabu iteration {iteration}: repaired neighbor still violates an invariant"
                    );
                }
                attempts += 1;

                if let (Some(init), Some(bound)) = (initial, max_dist) {
                    if RosterModel::distance(&neighbor, init) > bound {
                        continue;
                    }
                }

                accepted += 1;
                let neighbor_cost = self.model.cost(&neighbor, &self.tunables);

                let is_tabu = tabu.contains(&canonical_bytes(&neighbor));
                let aspirated = neighbor_cost < best_cost;
                if !is_tabu || aspirated {
                    let improves_candidate = best_neighbor
                        .as_ref()
                        .map(|(_, c)| neighbor_cost < *c)
                        .unwrap_or(true);
                    if improves_candidate {
                        best_neighbor = Some((neighbor, neighbor_cost));
                    }
                }
            }

            let Some((chosen, chosen_cost)) = best_neighbor else {
                stagnation += 1;
                if stagnation >= self.tunables.max_stagnation {
                    if logging.log_stop_condition {
                        debug!("tabu search stopped at iteration {iteration}: stagnation (no admissible neighbor)");
                    }
                    break;
                }
                continue;
            };

            if tabu.len() >= self.tunables.len_tabou {
                tabu.pop_front();
            }
            tabu.push_back(canonical_bytes(&current));

            current = chosen;
            current_cost = chosen_cost;

            if current_cost < best_cost {
                best = current.clone();
                best_cost = current_cost;
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            if let Some(freq) = logging.log_frequency {
                if freq > 0 && iteration % freq as usize == 0 {
                    debug!(
                        "tabu iteration {iteration}/{}: best cost so far {best_cost:.2}",
                        self.tunables.num_iters_ts
                    );
                }
            }

            if stagnation >= self.tunables.max_stagnation {
                if logging.log_stop_condition {
                    debug!("tabu search stopped at iteration {iteration}: max stagnation reached");
                }
                break;
            }
        }

        Ok((best, best_cost))
    }

    /// Picks a slot/day uniformly, then a new physician uniformly
    /// (excluding the current value on bold days), mirroring
    /// `planning_voisin`.
    fn neighbor(&self, r: &Roster, rng: &mut impl Rng) -> Roster {
        let d = self.model.d;
        let n = self.model.n;
        let mut neighbor = r.clone();

        let slot = if rng.random_bool(0.5) {
            Slot::Primary
        } else {
            Slot::Secondary
        };
        let day = rng.random_range(0..d);
        let index = match slot {
            Slot::Primary => day,
            Slot::Secondary => d + day,
        };

        let bold_here = match slot {
            Slot::Primary => self.model.bold_days.primary.contains(&day),
            Slot::Secondary => self.model.bold_days.secondary.contains(&day),
        };

        let new_value = if bold_here {
            let current_value = neighbor[index];
            loop {
                let candidate = rng.random_range(0..n);
                if candidate != current_value || n == 1 {
                    break candidate;
                }
            }
        } else {
            rng.random_range(0..n)
        };

        neighbor[index] = new_value;
        neighbor
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::models::LoggingOptions;
    use crate::roster::test_support::test_model;

    use super::*;

    #[test]
    fn tabu_search_never_returns_a_worse_cost_than_the_seed() {
        let model = test_model(4, 8);
        let tunables = RosterTunables {
            num_iters_ts: 40,
            num_voisins: 5,
            max_stagnation: 20,
            len_tabou: 10,
            ..RosterTunables::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let seed = model.random_roster(&mut rng).unwrap();
        let seed_cost = model.cost(&seed, &tunables);

        let ts = TabuSearch::new(&model, tunables.clone());
        let (best, best_cost) = ts
            .run(Some(seed), None, None, &LoggingOptions::default(), &mut rng)
            .unwrap();

        assert!(best_cost <= seed_cost + 1e-9);
        assert_eq!(model.cost(&best, &tunables), best_cost);
    }

    #[test]
    fn tabu_search_respects_a_distance_bound() {
        let model = test_model(5, 10);
        let tunables = RosterTunables {
            num_iters_ts: 30,
            num_voisins: 5,
            max_stagnation: 30,
            len_tabou: 15,
            ..RosterTunables::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let seed = model.random_roster(&mut rng).unwrap();
        let initial: PartialRoster = seed.iter().map(|&v| Some(v)).collect();

        let ts = TabuSearch::new(&model, tunables);
        let (best, _) = ts
            .run(
                Some(seed.clone()),
                Some(&initial),
                Some(3),
                &LoggingOptions::default(),
                &mut rng,
            )
            .unwrap();

        assert!(RosterModel::distance(&best, &initial) <= 3);
    }

    #[test]
    fn tabu_search_terminates_on_stagnation_within_iteration_budget() {
        let model = test_model(2, 1);
        let tunables = RosterTunables {
            num_iters_ts: 500,
            num_voisins: 2,
            max_stagnation: 3,
            len_tabou: 5,
            ..RosterTunables::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ts = TabuSearch::new(&model, tunables);
        let result = ts.run(None, None, None, &LoggingOptions::default(), &mut rng);
        assert!(result.is_ok());
    }
}
