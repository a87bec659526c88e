/*! Content processing

Turns shards into documents ([file]), or only inspects them ([check]).
!*/
pub mod check;
pub mod file;

pub use file::{FileProcessor, ProcessedFile};
