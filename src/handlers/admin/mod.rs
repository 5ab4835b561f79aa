pub mod assets;
pub mod clients;
pub mod notes;
pub mod requests;
