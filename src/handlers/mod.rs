// 3-tier handler architecture:
// Public (no auth) -> Protected (JWT auth) -> Admin (JWT auth + admin role)
pub mod admin;
pub mod protected;
pub mod public;
