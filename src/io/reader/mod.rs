/*! Reading facilities

[Shard] iterates over the raw lines of a (gzipped) shard.
!*/
mod shard;
pub use shard::{list_shards, Shard, MAX_LINE_SIZE};
