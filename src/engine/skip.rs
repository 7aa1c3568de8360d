//! Idempotence rule: decide per candidate whether conversion is necessary.

use std::path::Path;
use std::time::{Duration, SystemTime};

/// Decision for one candidate file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Convert,
    Skip,
}

/// True when the target is at least as new as the source, within `window`.
/// The window absorbs clock skew between filesystems (e.g. network mounts)
/// and sub-second granularity differences; zero compares exactly.
pub fn is_up_to_date(source_mtime: SystemTime, target_mtime: SystemTime, window: Duration) -> bool {
    match target_mtime.checked_add(window) {
        Some(adjusted) => adjusted >= source_mtime,
        None => true,
    }
}

/// Compare source and target modification times:
/// - target missing -> Convert
/// - target at least as new as source (within `window`) -> Skip
/// - source newer -> Convert (regenerate)
///
/// A second run over an unchanged input set therefore skips everything.
/// When either mtime cannot be read, we convert and let the backend surface
/// the real error.
pub fn skip_decision(source: &Path, target: &Path, window: Duration) -> Decision {
    let Ok(target_meta) = std::fs::metadata(target) else {
        return Decision::Convert;
    };
    let (Ok(source_mtime), Ok(target_mtime)) = (
        std::fs::metadata(source).and_then(|m| m.modified()),
        target_meta.modified(),
    ) else {
        return Decision::Convert;
    };
    if is_up_to_date(source_mtime, target_mtime, window) {
        Decision::Skip
    } else {
        Decision::Convert
    }
}
