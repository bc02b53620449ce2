// Salary estimation: coefficient table, user selection, additive scorer.
// Everything here is synchronous and side-effect free apart from table loading.

pub mod coefficients;
pub mod handlers;
pub mod scoring;
pub mod selection;
