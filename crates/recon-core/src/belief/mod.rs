//! Hypothesis tracking over the hidden part of the position.
//!
//! - `tracker`: the owned hypothesis set and its four mutating observations.
//! - `plan`: sense and move speculation computed ahead of the true observation.
//! - `policy`: truncation and expansion budgets used to bound set growth.

mod plan;
mod policy;
mod tracker;

pub use plan::{MovePlan, SensePartition, SensePlan};
pub use policy::{ExpansionBudget, ExpansionReport, TruncationStrategy, UnknownStrategy};
pub use tracker::HypothesisTracker;
