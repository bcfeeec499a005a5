//! Local storage

pub mod session;
pub mod settings;
