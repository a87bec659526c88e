/*!
# IO utilities

Shard reading, corpus writing and diagnostic token logging.
!*/
pub mod reader;
mod tokenlog;
pub mod writer;

pub use tokenlog::{TokenLevel, TokenLog};
