use thiserror::Error;

use crate::models::Slot;

/// Errors that can escape the roster engine.
///
/// Soft violations (numeric degeneracy during ACO sampling, an underlined
/// cell left in violation of the rest-after-duty invariant) are recovered
/// locally and never reach this type — see the repair and ACO construction
/// routines for how each is handled in place.
#[derive(Debug, Error)]
pub enum RosterError {
    /// `repair` could not find any candidate physician for a given cell.
    /// The caller is expected to re-invoke with a different seed.
    #[error("no candidate physician available for day {day} ({slot:?})")]
    InfeasibleRepair { day: usize, slot: Slot },

    /// The problem shape handed to `RosterModel::new` is malformed: a
    /// dimension mismatch, an empty team, or similar.
    #[error("invalid problem definition: {0}")]
    InvalidProblem(String),

    /// A local↔global physician index translation table referenced an
    /// index outside its declared bound.
    #[error("physician index {index} out of bounds (expected < {bound})")]
    UnknownPhysician { index: usize, bound: usize },
}
