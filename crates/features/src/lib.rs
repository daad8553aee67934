//! Lifecycle management for renderable map features.
//!
//! A feature is fetched and decoded off the main thread, uploaded to the GPU
//! as a staged cascade of buffer builds, kept positioned relative to the
//! moving camera origin, tinted/filtered through user callbacks, faded in on
//! arrival, and torn down deterministically.

pub mod cascade;
pub mod context;
pub mod feature;
pub mod options;
pub mod registry;
pub mod set;
pub mod tint;
pub mod transform;
pub mod visibility;

pub use cascade::*;
pub use context::*;
pub use feature::*;
pub use options::*;
pub use registry::*;
pub use set::*;
pub use tint::*;
pub use transform::*;
pub use visibility::*;
