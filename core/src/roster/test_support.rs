use std::collections::HashMap;

use crate::models::{BoldDays, RosterInput, UnderlinedDays};
use crate::roster::RosterModel;

/// A minimal all-neutral-preferences problem of the given size, used
/// across `roster`'s test modules as a baseline to mutate from.
pub(crate) fn test_input(n: usize, d: usize) -> RosterInput {
    RosterInput {
        num_physicians: n,
        num_days: d,
        preferences: vec![vec![0; d]; n],
        reductions: Vec::new(),
        attributes: HashMap::new(),
        quotas: None,
        initial: None,
        bold_days: BoldDays::default(),
        underlined_days: UnderlinedDays::default(),
    }
}

pub(crate) fn test_model(n: usize, d: usize) -> RosterModel {
    RosterModel::new(test_input(n, d), true).unwrap()
}
