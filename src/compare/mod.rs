//! @ai:module:intent Compare technique outputs against reference images with cached error logs
//! @ai:module:layer application
//! @ai:module:public_api Comparator, ExternalComparator, ResultComparer, CompareOptions, CompareOutcome

pub mod comparator;
pub mod engine;
pub mod paths;
pub mod staleness;

pub use comparator::{Comparator, ExternalComparator, ERRORS_FILE, ERROR_MAPS};
pub use engine::{CompareOptions, CompareOutcome, ResultComparer, Skip, SkipReason};
pub use paths::{CandidatePath, ResultPathParser};
pub use staleness::{cache_is_valid, is_fresh};
