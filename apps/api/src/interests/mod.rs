// Mutual interest: one row per side of a (job, profile) pairing. A pairing
// is mutual once both the candidate and the church rows exist; matching
// resolves pairs with exactly two expressions and returns the church-side
// row as the canonical representation.

pub mod handlers;
pub mod matching;
pub mod models;
