/*! Filtering utilities

Filters operate on lines or whole documents, and implement [Filter].

Filters hold no mutable state, so a single instance can be shared by every worker.
! */
mod corruption;
mod filter;

pub use corruption::{is_corrupted, is_noise_control, Corruption};
pub use filter::Filter;
