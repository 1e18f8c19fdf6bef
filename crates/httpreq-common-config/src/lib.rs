//! Configuration types for httpreq.
//!
//! Settings come from `.httpreq/config.yaml` (see [`ConfigLoader`]) and from
//! `HTTPREQ_*` environment variables (see [`Environment`] and [`vars`]).

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
