use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A complete roster: a flat vector of length `2*D`. Positions `[0, D)` hold
/// the primary-slot ("garde") assignee for each day; positions `[D, 2*D)`
/// hold the secondary-slot ("astreinte") assignee. Every cell is a valid
/// physician index — an output roster never contains an unassigned cell.
pub type Roster = Vec<usize>;

/// Like [`Roster`] but cells may be unfilled, used for caller-supplied
/// initial rosters. `None` corresponds to the source's `-1` sentinel.
pub type PartialRoster = Vec<Option<usize>>;

/// Which half of a roster cell a day's assignment lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Primary,
    Secondary,
}

/// Days whose cell must differ from the initial roster once repaired.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoldDays {
    pub primary: HashSet<usize>,
    pub secondary: HashSet<usize>,
}

/// Days whose cell must be preserved identical to the initial roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnderlinedDays {
    pub primary: HashSet<usize>,
    pub secondary: HashSet<usize>,
}

/// Per-physician target assignment counts. Each vector sums to `D` when
/// fully satisfiable; the cost function scores deviation from these
/// targets rather than enforcing them as a hard constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotas {
    pub target_primary: Vec<f64>,
    pub target_secondary: Vec<f64>,
}

impl Quotas {
    /// Derives quotas from positive-preference counts weighted by
    /// `1/reductions[i]`, normalized so each vector sums to `d`. Falls
    /// back to a uniform `d/n` target per physician when nobody has any
    /// positive preference at all — the source leaves this branch
    /// ambiguous (see DESIGN.md open questions).
    pub fn derive(preferences: &[Vec<i64>], reductions: &[f64], n: usize, d: usize) -> Quotas {
        let weighted_positive_counts: Vec<f64> = (0..n)
            .map(|i| {
                let positive_count = preferences[i].iter().filter(|&&p| p > 0).count() as f64;
                positive_count / reductions[i]
            })
            .collect();

        let total: f64 = weighted_positive_counts.iter().sum();

        let shares: Vec<f64> = if total > 0.0 {
            weighted_positive_counts
                .iter()
                .map(|w| w / total)
                .collect()
        } else {
            vec![1.0 / n as f64; n]
        };

        let target_primary: Vec<f64> = shares.iter().map(|s| s * d as f64).collect();
        let target_secondary = target_primary.clone();

        Quotas {
            target_primary,
            target_secondary,
        }
    }
}

/// Everything `RosterModel::new` needs to build a team's model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterInput {
    pub num_physicians: usize,
    pub num_days: usize,
    pub preferences: Vec<Vec<i64>>,
    #[serde(default = "default_reductions")]
    pub reductions: Vec<f64>,
    #[serde(default)]
    pub attributes: HashMap<String, Vec<bool>>,
    pub quotas: Option<Quotas>,
    pub initial: Option<PartialRoster>,
    #[serde(default)]
    pub bold_days: BoldDays,
    #[serde(default)]
    pub underlined_days: UnderlinedDays,
}

fn default_reductions() -> Vec<f64> {
    Vec::new()
}

/// Tunable constants recognized by the engine. Field names and defaults
/// mirror the external-interfaces table: weights for each cost term, the
/// ACO/TS algorithm parameters, and the numerical floor used in place of
/// zero during categorical sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterTunables {
    pub w_neg: f64,
    pub w_null: f64,
    pub w_pos: f64,
    pub w_attr: f64,
    pub w_gap: f64,
    pub w_small_gap: f64,
    pub g_min: usize,
    pub w_quota: f64,
    pub t_neg: i64,
    pub p_hard: i64,

    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub num_ants: usize,
    pub num_iters_ac: usize,

    pub num_iters_ts: usize,
    pub num_voisins: usize,
    pub max_stagnation: usize,
    pub len_tabou: usize,
    pub tentative_mult: usize,
    pub max_dist_base: usize,

    pub enable_off_after_garde: bool,
    pub epsilon: f64,
}

impl Default for RosterTunables {
    fn default() -> Self {
        RosterTunables {
            w_neg: 10.0,
            w_null: 5.0,
            w_pos: 1.0,
            w_attr: 50.0,
            w_gap: 10.0,
            w_small_gap: 20.0,
            g_min: 3,
            w_quota: 1.0,
            t_neg: -5,
            p_hard: -100,

            alpha: 0.1,
            beta: 2.0,
            rho: 0.1,
            num_ants: 10,
            num_iters_ac: 100,

            num_iters_ts: 300,
            num_voisins: 20,
            max_stagnation: 50,
            len_tabou: 200,
            tentative_mult: 3,
            max_dist_base: 10,

            enable_off_after_garde: true,
            epsilon: 1e-3,
        }
    }
}

/// Logging switches, gating the `log` calls scattered through the engine.
/// Mirrors the shape of a solver options struct: every flag defaults to
/// off so library consumers who never configure logging see no output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub log_frequency: Option<u64>,
    pub log_initial_state: bool,
    pub log_final_score_breakdown: bool,
    pub log_stop_condition: bool,
    pub debug_validate_invariants: bool,
}

/// The five terms that make up a roster's cost, broken out for
/// diagnostics. `total()` must equal `scoring::cost(..)` for the same
/// roster — see the consistency check in `RosterModel::cost_breakdown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub primary_preference: f64,
    pub secondary_aversion: f64,
    pub attribute_coverage: f64,
    pub spacing: f64,
    pub quota_imbalance: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.primary_preference
            + self.secondary_aversion
            + self.attribute_coverage
            + self.spacing
            + self.quota_imbalance
    }
}

/// Diagnostic statistics about a realized roster. Not part of the hard
/// contract; cheap to expose since the cost function already computes
/// the same aggregates internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterInfo {
    pub primary_counts: Vec<usize>,
    pub secondary_counts: Vec<usize>,
    pub mean_primary_gap: Vec<Option<f64>>,
}

/// Result of a single team solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub roster: Roster,
    pub score: f64,
}
