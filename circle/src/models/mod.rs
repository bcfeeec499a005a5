//! Domain models

pub mod activity;

pub use activity::Activity;
pub use circle_api::models::Accessory;
