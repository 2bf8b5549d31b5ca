//! Ant Colony Optimization: population-based roster construction guided
//! by a pheromone tensor and a static heuristic tensor.
//!
//! Grounded on `examples/original_source/algo_ant_colony.py`
//! (`recherche_ant_colony`/`construct_solution`) for the exact weight
//! formula, fallback-to-uniform condition, and pheromone doubling on an
//! initial solution; logging follows a `LoggingOptions`-gated
//! `log::debug!` style in place of the original's `tqdm` progress bar.

use log::debug;
use rand::Rng;

use crate::models::{LoggingOptions, PartialRoster, Roster, RosterTunables, Slot};
use crate::roster::RosterModel;

/// A dense rank-3 tensor of shape `(N, D, 2)`, stored as a flat `Vec<f64>`
/// with computed offsets — no graph structure is needed for a tensor
/// this regular.
#[derive(Debug, Clone)]
struct Tensor {
    d: usize,
    data: Vec<f64>,
}

impl Tensor {
    fn filled(n: usize, d: usize, value: f64) -> Self {
        Tensor {
            d,
            data: vec![value; n * d * 2],
        }
    }

    fn index(&self, i: usize, t: usize, s: Slot) -> usize {
        let s = match s {
            Slot::Primary => 0,
            Slot::Secondary => 1,
        };
        (i * self.d + t) * 2 + s
    }

    fn get(&self, i: usize, t: usize, s: Slot) -> f64 {
        self.data[self.index(i, t, s)]
    }

    fn set(&mut self, i: usize, t: usize, s: Slot, value: f64) {
        let idx = self.index(i, t, s);
        self.data[idx] = value;
    }

    fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

/// Ant Colony Optimization search over a single team's `RosterModel`.
pub struct AntColony<'a> {
    model: &'a RosterModel,
    tunables: RosterTunables,
    pheromone: Tensor,
    heuristic: Tensor,
}

impl<'a> AntColony<'a> {
    /// Builds the initial pheromone tensor (all `1.0`, doubled along any
    /// non-empty cells of `initial`) and the static heuristic tensor
    /// derived from preferences, dampened on bold days to discourage
    /// re-selecting the currently assigned physician.
    pub fn new(
        model: &'a RosterModel,
        tunables: RosterTunables,
        initial: Option<&PartialRoster>,
    ) -> Self {
        let n = model.n;
        let d = model.d;
        let mut pheromone = Tensor::filled(n, d, 1.0);

        if let Some(initial) = initial {
            for t in 0..d {
                if let Some(i) = initial[t] {
                    let v = pheromone.get(i, t, Slot::Primary);
                    pheromone.set(i, t, Slot::Primary, v * 2.0);
                }
                if let Some(i) = initial[d + t] {
                    let v = pheromone.get(i, t, Slot::Secondary);
                    pheromone.set(i, t, Slot::Secondary, v * 2.0);
                }
            }
        }

        let mut heuristic = Tensor::filled(n, d, 1.0);
        for i in 0..n {
            for t in 0..d {
                let pref = model.preferences[i][t] as f64;
                let value = if pref >= 0.0 {
                    (pref + 1.0).max(1.0)
                } else {
                    tunables.epsilon
                };
                heuristic.set(i, t, Slot::Primary, value);
            }
        }

        if let Some(initial) = initial {
            for &day in &model.bold_days.primary {
                if let Some(i) = initial[day] {
                    let v = heuristic.get(i, day, Slot::Primary);
                    heuristic.set(i, day, Slot::Primary, v * tunables.epsilon);
                }
            }
            for &day in &model.bold_days.secondary {
                if let Some(i) = initial[d + day] {
                    let v = heuristic.get(i, day, Slot::Secondary);
                    heuristic.set(i, day, Slot::Secondary, v * tunables.epsilon);
                }
            }
        }

        AntColony {
            model,
            tunables,
            pheromone,
            heuristic,
        }
    }

    /// Runs `num_iters_ac` iterations of `num_ants` ants each, returning
    /// the best roster observed across every iteration and its score.
    pub fn run(
        &mut self,
        initial: Option<&PartialRoster>,
        logging: &LoggingOptions,
        rng: &mut impl Rng,
    ) -> Result<(Roster, f64), crate::error::RosterError> {
        let mut best_roster: Option<Roster> = None;
        let mut best_score = f64::INFINITY;

        for iteration in 0..self.tunables.num_iters_ac {
            let mut ants: Vec<(Roster, f64)> = Vec::with_capacity(self.tunables.num_ants);

            for _ in 0..self.tunables.num_ants {
                let mut r = self.construct_ant(initial, rng);
                self.model.repair(&mut r, rng)?;
                if logging.debug_validate_invariants && self.model.detect_violation(&r) {
                    log::warn!("aco iteration {iteration}: repaired ant still violates an invariant");
                }
                let score = self.model.cost(&r, &self.tunables);
                ants.push((r, score));
            }

            let (iter_best_roster, iter_best_score) = ants
                .iter()
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .cloned()
                .expect("num_ants must be > 0");

            if iter_best_score < best_score {
                best_score = iter_best_score;
                best_roster = Some(iter_best_roster.clone());
            }

            self.update_pheromone(&iter_best_roster, iter_best_score);

            if let Some(freq) = logging.log_frequency {
                if freq > 0 && iteration % freq as usize == 0 {
                    debug!(
                        "aco iteration {iteration}/{}: best score so far {best_score:.2}",
                        self.tunables.num_iters_ac
                    );
                }
            }
        }

        Ok((best_roster.expect("at least one iteration runs"), best_score))
    }

    fn update_pheromone(&mut self, best: &Roster, best_score: f64) {
        self.pheromone.scale(1.0 - self.tunables.rho);
        let delta = 1.0 / best_score;
        let d = self.model.d;
        for t in 0..d {
            let i_primary = best[t];
            let v = self.pheromone.get(i_primary, t, Slot::Primary);
            self.pheromone.set(i_primary, t, Slot::Primary, v + delta);

            let i_secondary = best[d + t];
            let v = self.pheromone.get(i_secondary, t, Slot::Secondary);
            self.pheromone
                .set(i_secondary, t, Slot::Secondary, v + delta);
        }
    }

    /// Constructs one ant's roster by categorical sampling at every cell
    /// not already fixed by the initial roster outside its bold set.
    fn construct_ant(&self, initial: Option<&PartialRoster>, rng: &mut impl Rng) -> Roster {
        let d = self.model.d;
        let mut r = vec![0usize; 2 * d];

        if let Some(initial) = initial {
            for t in 0..d {
                if let Some(v) = initial[t] {
                    r[t] = v;
                }
                if let Some(v) = initial[d + t] {
                    r[d + t] = v;
                }
            }
        }

        for t in 0..d {
            let primary_fixed = initial
                .and_then(|init| init[t])
                .filter(|_| !self.model.bold_days.primary.contains(&t))
                .is_some();
            if !primary_fixed {
                r[t] = self.sample_cell(t, Slot::Primary, &r, initial, rng);
            }

            let secondary_fixed = initial
                .and_then(|init| init[d + t])
                .filter(|_| !self.model.bold_days.secondary.contains(&t))
                .is_some();
            if !secondary_fixed {
                r[d + t] = self.sample_cell(t, Slot::Secondary, &r, initial, rng);
            }
        }

        r
    }

    fn sample_cell(
        &self,
        t: usize,
        slot: Slot,
        r: &Roster,
        initial: Option<&PartialRoster>,
        rng: &mut impl Rng,
    ) -> usize {
        let n = self.model.n;
        let d = self.model.d;
        let eps = self.tunables.epsilon;

        let mut excluded = vec![false; n];
        if self.model.enable_off_after_garde && t > 0 {
            excluded[r[t - 1]] = true;
        }
        if slot == Slot::Secondary {
            excluded[r[t]] = true;
        }
        let bold_here = match slot {
            Slot::Primary => self.model.bold_days.primary.contains(&t),
            Slot::Secondary => self.model.bold_days.secondary.contains(&t),
        };
        if bold_here {
            let initial_idx = match slot {
                Slot::Primary => t,
                Slot::Secondary => d + t,
            };
            if let Some(init) = initial.and_then(|init| init[initial_idx]) {
                excluded[init] = true;
            }
        }

        let eligible: Vec<usize> = (0..n).filter(|&i| !excluded[i]).collect();
        if eligible.is_empty() {
            // Every candidate excluded: fall back to the full range so
            // repair (which runs next) can resolve the conflict instead
            // of panicking on an empty categorical draw.
            return rng.random_range(0..n);
        }

        let mut weights: Vec<f64> = eligible
            .iter()
            .map(|&i| {
                let tau = self.pheromone.get(i, t, slot).max(eps);
                let eta = self.heuristic.get(i, t, slot).max(eps);
                let w = tau.powf(self.tunables.alpha) * eta.powf(self.tunables.beta);
                if w.is_nan() {
                    eps
                } else {
                    w
                }
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            weights = vec![1.0; eligible.len()];
        }
        let total: f64 = weights.iter().sum();

        let mut draw = rng.random_range(0.0..total);
        for (idx, &w) in weights.iter().enumerate() {
            if draw < w {
                return eligible[idx];
            }
            draw -= w;
        }
        *eligible.last().unwrap()
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
    fn aco_returns_a_roster_satisfying_hard_invariants() {
        let model = test_model(4, 6);
        let mut tunables = RosterTunables::default();
        tunables.num_ants = 4;
        tunables.num_iters_ac = 5;
        let mut aco = AntColony::new(&model, tunables, None);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (roster, _score) = aco.run(None, &LoggingOptions::default(), &mut rng).unwrap();
        assert!(!model.detect_violation(&roster));
    }

    #[test]
    fn aco_improves_or_matches_a_random_start() {
        let mut model = test_model(3, 5);
        model.preferences[0][0] = 10;
        let mut tunables = RosterTunables::default();
        tunables.num_ants = 6;
        tunables.num_iters_ac = 20;
        let mut aco = AntColony::new(&model, tunables.clone(), None);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let (roster, score) = aco.run(None, &LoggingOptions::default(), &mut rng).unwrap();
        assert!(score <= model.cost(&roster, &tunables) + 1e-9);
    }
}
