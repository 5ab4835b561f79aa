pub mod assets;
pub mod auth;
pub mod clients;
pub mod requests;
pub mod session;
