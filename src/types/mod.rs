//! Core types for Howdah.

pub mod reply;
pub mod usage;

pub use reply::*;
pub use usage::*;
