pub mod cleaner;
pub mod config;
pub mod error;
pub mod filtering;
pub mod io;
pub mod lemmatizer;
pub mod pipelines;
pub mod processing;
