/*!
# Corpus writing

[CorpusWriter] is the single consumer of cleaned documents. It owns the output stream,
and keeps [RunStats] counters up to date as documents get written.
!*/
mod corpus;
pub use corpus::{CorpusWriter, RunStats, Stats};
