//! @ai:module:intent Decide whether a cached error log still matches its images
//! @ai:module:layer domain
//! @ai:module:public_api is_fresh, cache_is_valid
//! @ai:module:stateless true

use crate::loader::results::{modified, ResultFiles};
use std::path::Path;
use std::time::SystemTime;

/// @ai:intent A log is fresh iff it exists and is strictly newer than both images
/// @ai:effects pure
pub fn is_fresh(
    log: Option<SystemTime>,
    image: Option<SystemTime>,
    reference: Option<SystemTime>,
) -> bool {
    match log {
        Some(log) => image.map_or(false, |t| log > t) && reference.map_or(false, |t| log > t),
        None => false,
    }
}

/// @ai:intent Whether the error log of a run can be reused without running the comparator
/// @ai:effects fs:read
pub fn cache_is_valid(files: &ResultFiles, reference: &Path) -> bool {
    is_fresh(
        modified(&files.errors_log()),
        modified(&files.image()),
        modified(reference),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_missing_log_is_stale() {
        assert!(!is_fresh(None, at(1), at(1)));
    }

    #[test]
    fn test_log_must_be_strictly_newer() {
        assert!(is_fresh(at(10), at(5), at(5)));
        assert!(!is_fresh(at(10), at(10), at(5)));
        assert!(!is_fresh(at(10), at(5), at(11)));
        assert!(!is_fresh(at(10), at(12), at(1)));
    }

    #[test]
    fn test_unreadable_image_times_are_stale() {
        assert!(!is_fresh(at(10), None, at(5)));
        assert!(!is_fresh(at(10), at(5), None));
    }
}
