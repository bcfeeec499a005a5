//! Circle client library
//!
//! Session handling, accessory lookups and range-based activity listing for
//! the Logitech Circle camera service.

pub mod app;
pub mod authn;
pub mod cli;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod sync;
pub mod utils;

pub use authn::session::Session;
pub use authn::session_mngr::{Credentials, SessionManager};
pub use errors::{CircleError, Result};
pub use http::client::HttpClient;
pub use sync::paginator::ActivityPaginator;
