//! Pipeline trait.
use crate::error::Error;

/// Implemented by each pipeline, generic over what a complete run yields
/// (run statistics, a report...).
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
