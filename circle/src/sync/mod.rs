//! Activity listing across pages

pub mod paginator;
