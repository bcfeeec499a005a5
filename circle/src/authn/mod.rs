//! Authentication module

pub mod session;
pub mod session_mngr;
