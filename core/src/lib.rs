//! # Roster-Core: Duty Roster Optimization Engine
//!
//! A two-stage metaheuristic (Ant Colony Optimization followed by Tabu
//! Search) for building duty rosters over a planning horizon of `D`
//! days, with a primary ("garde") and secondary ("astreinte") on-call
//! slot per day. Given per-physician preferences, quotas, coverage
//! attributes, and an optional partially pre-filled roster, the engine
//! produces a complete roster satisfying the hard scheduling invariants
//! while minimizing a weighted preference/coverage/quota/spacing cost.
//!
//! `multi_team::solve_multi` extends this to several teams solved
//! sequentially, with cross-team preference masking to keep a physician
//! who belongs to more than one team from being double-booked.
//!
//! ## Quick example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use roster_core::models::{RosterInput, RosterTunables, LoggingOptions};
//! use roster_core::multi_team::solve_mono;
//! use std::collections::HashMap;
//!
//! let input = RosterInput {
//!     num_physicians: 3,
//!     num_days: 10,
//!     preferences: vec![vec![0; 10]; 3],
//!     reductions: Vec::new(),
//!     attributes: HashMap::new(),
//!     quotas: None,
//!     initial: None,
//!     bold_days: Default::default(),
//!     underlined_days: Default::default(),
//! };
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = solve_mono(
//!     input,
//!     true,
//!     RosterTunables::default(),
//!     LoggingOptions::default(),
//!     false,
//!     &mut rng,
//! ).unwrap();
//! println!("score: {}", outcome.score);
//! ```

pub mod aco;
pub mod error;
pub mod models;
pub mod multi_team;
pub mod roster;
pub mod tabu;

pub use error::RosterError;
pub use models::{RosterInput, RosterTunables, SolveOutcome};
pub use multi_team::{solve_mono, solve_multi, MultiTeamInput, TeamSpec};
pub use roster::RosterModel;
