//! HTTP access to the Circle API

pub mod accessories;
pub mod activities;
pub mod client;
