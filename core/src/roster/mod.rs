//! The roster data model: layout, hard-constraint repair, and the
//! diagnostics built on top of it. See `construction`, `scoring`, and
//! `validation` for the operations; this module only owns the struct and
//! its constructor.

mod construction;
mod scoring;
mod validation;
#[cfg(test)]
pub(crate) mod test_support;

use std::collections::HashMap;

use log::debug;

use crate::error::RosterError;
use crate::models::{BoldDays, PartialRoster, Quotas, RosterInput, UnderlinedDays};

/// A single team's scheduling problem: physician count, day count,
/// preferences, attribute coverage requirements, quotas, and any
/// editability constraints against an initial roster.
///
/// Constructed once per team-solve from immutable team data and dropped
/// afterwards; rosters produced from it are plain values with no
/// aliasing back into the model.
#[derive(Debug, Clone)]
pub struct RosterModel {
    pub n: usize,
    pub d: usize,
    pub preferences: Vec<Vec<i64>>,
    pub reductions: Vec<f64>,
    pub attributes: HashMap<String, Vec<bool>>,
    pub quotas: Quotas,
    pub initial: Option<PartialRoster>,
    pub bold_days: BoldDays,
    pub underlined_days: UnderlinedDays,
    pub enable_off_after_garde: bool,
}

impl RosterModel {
    /// Validates and builds a model from caller-supplied input. Rejects
    /// shapes that would otherwise panic deep inside repair or scoring:
    /// too few physicians, a zero-length horizon, mismatched preference
    /// or attribute dimensions, and initial rosters of the wrong length.
    pub fn new(input: RosterInput, enable_off_after_garde: bool) -> Result<Self, RosterError> {
        let n = input.num_physicians;
        let d = input.num_days;

        if n < 2 {
            return Err(RosterError::InvalidProblem(format!(
                "need at least 2 physicians, got {n}"
            )));
        }
        if d == 0 {
            return Err(RosterError::InvalidProblem(
                "need at least 1 day".to_string(),
            ));
        }
        if input.preferences.len() != n {
            return Err(RosterError::InvalidProblem(format!(
                "preferences has {} rows, expected {n}",
                input.preferences.len()
            )));
        }
        for (i, row) in input.preferences.iter().enumerate() {
            if row.len() != d {
                return Err(RosterError::InvalidProblem(format!(
                    "preferences row {i} has {} columns, expected {d}",
                    row.len()
                )));
            }
        }
        for (name, flags) in &input.attributes {
            if flags.len() != n {
                return Err(RosterError::InvalidProblem(format!(
                    "attribute '{name}' has {} entries, expected {n}",
                    flags.len()
                )));
            }
        }
        if let Some(initial) = &input.initial {
            if initial.len() != 2 * d {
                return Err(RosterError::InvalidProblem(format!(
                    "initial roster has {} cells, expected {}",
                    initial.len(),
                    2 * d
                )));
            }
            for (cell, v) in initial.iter().enumerate() {
                if let Some(v) = v {
                    if *v >= n {
                        return Err(RosterError::InvalidProblem(format!(
                            "initial roster cell {cell} references physician {v}, expected < {n}"
                        )));
                    }
                }
            }
        }

        let reductions = if input.reductions.is_empty() {
            vec![1.0; n]
        } else if input.reductions.len() != n {
            return Err(RosterError::InvalidProblem(format!(
                "reductions has {} entries, expected {n}",
                input.reductions.len()
            )));
        } else {
            if let Some((i, bad)) = input
                .reductions
                .iter()
                .enumerate()
                .find(|(_, &r)| !(r > 0.0))
            {
                return Err(RosterError::InvalidProblem(format!(
                    "reductions[{i}] must be > 0, got {bad}"
                )));
            }
            input.reductions
        };

        let quotas = match input.quotas {
            Some(q) => {
                if q.target_primary.len() != n || q.target_secondary.len() != n {
                    return Err(RosterError::InvalidProblem(
                        "quota vectors must have length n".to_string(),
                    ));
                }
                const QUOTA_SUM_EPS: f64 = 1e-6;
                let primary_sum: f64 = q.target_primary.iter().sum();
                let secondary_sum: f64 = q.target_secondary.iter().sum();
                if (primary_sum - d as f64).abs() > QUOTA_SUM_EPS {
                    return Err(RosterError::InvalidProblem(format!(
                        "target_primary must sum to d={d}, got {primary_sum}"
                    )));
                }
                if (secondary_sum - d as f64).abs() > QUOTA_SUM_EPS {
                    return Err(RosterError::InvalidProblem(format!(
                        "target_secondary must sum to d={d}, got {secondary_sum}"
                    )));
                }
                q
            }
            None => Quotas::derive(&input.preferences, &reductions, n, d),
        };

        debug!(
            "roster model built: n={n} d={d} attributes={}",
            input.attributes.len()
        );

        Ok(RosterModel {
            n,
            d,
            preferences: input.preferences,
            reductions,
            attributes: input.attributes,
            quotas,
            initial: input.initial,
            bold_days: input.bold_days,
            underlined_days: input.underlined_days,
            enable_off_after_garde,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::test_input;

    #[test]
    fn rejects_too_few_physicians() {
        let err = RosterModel::new(test_input(1, 3), true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn rejects_zero_days() {
        let err = RosterModel::new(test_input(3, 0), true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn derives_uniform_quotas_with_no_positive_preferences() {
        let model = RosterModel::new(test_input(4, 8), true).unwrap();
        for q in &model.quotas.target_primary {
            assert!((q - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_mismatched_preference_row_length() {
        let mut input = test_input(3, 4);
        input.preferences[1] = vec![0; 3];
        let err = RosterModel::new(input, true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn rejects_initial_roster_cell_out_of_range() {
        let mut input = test_input(3, 2);
        input.initial = Some(vec![Some(5), None, None, None]);
        let err = RosterModel::new(input, true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn rejects_non_positive_reduction() {
        let mut input = test_input(3, 2);
        input.reductions = vec![1.0, 0.0, 1.0];
        let err = RosterModel::new(input, true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn rejects_quota_vectors_that_do_not_sum_to_d() {
        let mut input = test_input(2, 10);
        input.quotas = Some(Quotas {
            target_primary: vec![1.0, 1.0],
            target_secondary: vec![5.0, 5.0],
        });
        let err = RosterModel::new(input, true).unwrap_err();
        assert!(matches!(err, RosterError::InvalidProblem(_)));
    }

    #[test]
    fn accepts_quota_vectors_that_sum_to_d() {
        let mut input = test_input(2, 10);
        input.quotas = Some(Quotas {
            target_primary: vec![7.0, 3.0],
            target_secondary: vec![5.0, 5.0],
        });
        assert!(RosterModel::new(input, true).is_ok());
    }
}
