// Bearer-token authentication: JWT access/refresh pair, Argon2id password
// hashing, and the group-based permission checks used across handlers.

pub mod claims;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod permissions;
