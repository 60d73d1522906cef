//! Installation currency check.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::manifest::ManifestMeta;

/// What the host application knows about the installed copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalInstall {
    /// When the installation was last updated.
    pub last_update: NaiveDateTime,
    /// Version number of the installed copy.
    pub version: f64,
}

/// Whether the installation satisfies the published release.
///
/// Stale when the local update time predates the release time OR the
/// local version is below the release version. Either trigger alone is
/// enough; a newer local version does not excuse an older timestamp.
pub fn is_current(local: &LocalInstall, meta: &ManifestMeta) -> bool {
    let stale_by_time = local.last_update < meta.update_time;
    let stale_by_version = local.version < meta.update_version;
    !(stale_by_time || stale_by_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::test_support::meta;
    use chrono::Duration;

    fn local(offset_hours: i64, version: f64) -> LocalInstall {
        LocalInstall {
            last_update: meta(true, false).update_time + Duration::hours(offset_hours),
            version,
        }
    }

    #[test]
    fn same_time_and_version_is_current() {
        assert!(is_current(&local(0, 1.2), &meta(true, false)));
    }

    #[test]
    fn newer_time_and_version_is_current() {
        assert!(is_current(&local(5, 2.0), &meta(true, false)));
    }

    #[test]
    fn older_time_is_stale_even_with_newer_version() {
        assert!(!is_current(&local(-1, 9.0), &meta(true, false)));
    }

    #[test]
    fn older_version_is_stale_even_with_newer_time() {
        assert!(!is_current(&local(24, 1.1), &meta(true, false)));
    }
}
