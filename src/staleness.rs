//! Timestamp-based staleness checks for incremental builds.
//!
//! A destination is rebuilt when its source is strictly newer, when the
//! destination does not exist, or when the build runs with `force`.
//!
//! A *missing source* is never stale. Asset trees are walked from the source
//! side so this only happens for covers and for files removed mid-build; both
//! are skipped without error.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Returns `true` if `dst` must be rebuilt from `src`.
pub fn is_stale(src: &Path, dst: &Path, force: bool) -> bool {
    if force {
        return true;
    }
    let Some(src_modified) = modified(src) else {
        // Absent: skip. Present but without a readable mtime: rebuild.
        return src.exists();
    };
    match modified(dst) {
        Some(dst_modified) => src_modified > dst_modified,
        None => true,
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::set_mtime;
    use std::time::Duration;
    use tempfile::TempDir;

    fn pair(tmp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        let src = tmp.path().join("robot.svg");
        let dst = tmp.path().join("robot.png");
        fs::write(&src, "<svg/>").unwrap();
        fs::write(&dst, "png").unwrap();
        (src, dst)
    }

    #[test]
    fn newer_destination_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let (src, dst) = pair(&tmp);
        let now = SystemTime::now();
        set_mtime(&src, now - Duration::from_secs(60));
        set_mtime(&dst, now);

        assert!(!is_stale(&src, &dst, false));
    }

    #[test]
    fn newer_source_is_stale() {
        let tmp = TempDir::new().unwrap();
        let (src, dst) = pair(&tmp);
        let now = SystemTime::now();
        set_mtime(&src, now);
        set_mtime(&dst, now - Duration::from_secs(60));

        assert!(is_stale(&src, &dst, false));
    }

    #[test]
    fn equal_timestamps_are_fresh() {
        let tmp = TempDir::new().unwrap();
        let (src, dst) = pair(&tmp);
        let t = SystemTime::now() - Duration::from_secs(5);
        set_mtime(&src, t);
        set_mtime(&dst, t);

        assert!(!is_stale(&src, &dst, false));
    }

    #[test]
    fn force_overrides_timestamps() {
        let tmp = TempDir::new().unwrap();
        let (src, dst) = pair(&tmp);
        let now = SystemTime::now();
        set_mtime(&src, now - Duration::from_secs(60));
        set_mtime(&dst, now);

        assert!(is_stale(&src, &dst, true));
    }

    #[test]
    fn missing_destination_is_stale() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("cat.png");
        fs::write(&src, "x").unwrap();

        assert!(is_stale(&src, &tmp.path().join("out/cat.png"), false));
    }

    #[test]
    fn missing_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("cat.png");

        assert!(!is_stale(&tmp.path().join("gone.png"), &dst, false));
    }

    #[test]
    fn missing_source_with_force_is_stale() {
        let tmp = TempDir::new().unwrap();
        assert!(is_stale(
            &tmp.path().join("gone.png"),
            &tmp.path().join("cat.png"),
            true
        ));
    }
}
