//! CostFunction: the scalar objective minimized by ACO and Tabu Search.
//!
//! Five additive terms — primary preference, secondary aversion,
//! attribute coverage, spacing, quota imbalance — computed against a
//! `RosterModel` and a concrete `Roster`. Grounded on
//! `definition.py::calcule_critere`/`calcule_soft_critere`/
//! `penalite_attributs` for the exact formulas; the breakdown struct and
//! `format_breakdown` follows the style of a `State::format_score_breakdown`
//! diagnostic renderer.

use crate::models::{CostBreakdown, RosterTunables};

use super::RosterModel;
use crate::models::Roster;

impl RosterModel {
    /// The scalar cost of `r`: sum of the five terms in `cost_breakdown`.
    pub fn cost(&self, r: &Roster, tunables: &RosterTunables) -> f64 {
        self.cost_breakdown(r, tunables).total()
    }

    /// Computes each of the five cost terms separately, for diagnostics
    /// and for `format_breakdown`. `total()` on the result equals `cost`.
    pub fn cost_breakdown(&self, r: &Roster, tunables: &RosterTunables) -> CostBreakdown {
        let d = self.d;

        let mut primary_preference = 0.0;
        for day in 0..d {
            if self.underlined_days.primary.contains(&day) {
                continue;
            }
            let physician = r[day];
            let p = self.preferences[physician][day] as f64;
            if p < 0.0 {
                primary_preference += tunables.w_neg * p * p;
            } else if p == 0.0 {
                primary_preference += tunables.w_null;
            } else {
                primary_preference -= tunables.w_pos * p * p;
            }
        }

        let mut secondary_aversion = 0.0;
        for day in 0..d {
            if self.underlined_days.secondary.contains(&day) {
                continue;
            }
            let physician = r[d + day];
            let p = self.preferences[physician][day] as f64;
            if p < tunables.t_neg as f64 {
                secondary_aversion += tunables.w_neg * p * p;
            }
        }

        let mut attribute_coverage = 0.0;
        for day in 0..d {
            let primary = r[day];
            let secondary = r[d + day];
            for carriers in self.attributes.values() {
                if !carriers[primary] && !carriers[secondary] {
                    attribute_coverage += tunables.w_attr;
                }
            }
        }

        let spacing = self.spacing_penalty(r, tunables);
        let quota_imbalance = self.quota_penalty(r, tunables);

        CostBreakdown {
            primary_preference,
            secondary_aversion,
            attribute_coverage,
            spacing,
            quota_imbalance,
        }
    }

    fn spacing_penalty(&self, r: &Roster, tunables: &RosterTunables) -> f64 {
        let d = self.d;
        let mut penalty = 0.0;
        for physician in 0..self.n {
            let days: Vec<usize> = (0..d).filter(|&t| r[t] == physician).collect();
            for pair in days.windows(2) {
                let gap = (pair[1] - pair[0]) as f64;
                if gap < tunables.g_min as f64 {
                    penalty += tunables.w_small_gap;
                }
                penalty += tunables.w_gap / gap;
            }
        }
        penalty
    }

    fn quota_penalty(&self, r: &Roster, tunables: &RosterTunables) -> f64 {
        let d = self.d;
        let mut primary_counts = vec![0usize; self.n];
        let mut secondary_counts = vec![0usize; self.n];
        for day in 0..d {
            primary_counts[r[day]] += 1;
            secondary_counts[r[d + day]] += 1;
        }

        let mut sum_sq = 0.0;
        for i in 0..self.n {
            let dp = self.quotas.target_primary[i] - primary_counts[i] as f64;
            sum_sq += dp * dp;
            let ds = self.quotas.target_secondary[i] - secondary_counts[i] as f64;
            sum_sq += ds * ds;
        }
        tunables.w_quota * sum_sq
    }

    /// Realized primary/secondary counts per physician and the mean gap
    /// between a physician's consecutive primary days (`None` when a
    /// physician holds fewer than two primary days). Not part of the
    /// hard contract; exposed for diagnostics and tests since the cost
    /// function already computes the same aggregates internally.
    pub fn info(&self, r: &Roster) -> crate::models::RosterInfo {
        let d = self.d;
        let mut primary_counts = vec![0usize; self.n];
        let mut secondary_counts = vec![0usize; self.n];
        for day in 0..d {
            primary_counts[r[day]] += 1;
            secondary_counts[r[d + day]] += 1;
        }

        let mut mean_primary_gap = Vec::with_capacity(self.n);
        for physician in 0..self.n {
            let days: Vec<usize> = (0..d).filter(|&t| r[t] == physician).collect();
            if days.len() > 1 {
                let gaps: Vec<f64> = days.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
                mean_primary_gap.push(Some(gaps.iter().sum::<f64>() / gaps.len() as f64));
            } else {
                mean_primary_gap.push(None);
            }
        }

        crate::models::RosterInfo {
            primary_counts,
            secondary_counts,
            mean_primary_gap,
        }
    }

    /// Renders the five cost terms as a human-readable breakdown,
    /// gated behind `LoggingOptions::log_final_score_breakdown`.
    pub fn format_breakdown(&self, r: &Roster, tunables: &RosterTunables) -> String {
        let b = self.cost_breakdown(r, tunables);
        format!(
            "=== ROSTER SCORE BREAKDOWN ===\n\
             Total Cost: {:.2}\n\
             \u{20}\u{20}Primary preference: {:.2}\n\
             \u{20}\u{20}Secondary aversion: {:.2}\n\
             \u{20}\u{20}Attribute coverage: {:.2}\n\
             \u{20}\u{20}Spacing: {:.2}\n\
             \u{20}\u{20}Quota imbalance: {:.2}",
            b.total(),
            b.primary_preference,
            b.secondary_aversion,
            b.attribute_coverage,
            b.spacing,
            b.quota_imbalance,
        )
    }
}
