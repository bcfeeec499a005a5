//! Circle API wire models
//!
//! Request and response bodies exchanged with the Circle camera service,
//! plus the on-disk session cache payload.

pub mod models;
