//! Unit tests for the snapshot monitor
//!
//! Covers the poll state machine, snapshot naming and a full capture
//! cycle with an in-process differ.

use crate::error::{ProbeError, ProbeResult};
use crate::monitor::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, SystemTime};

    /// Records every comparison request, optionally failing them
    #[derive(Default)]
    struct RecordingDiffer {
        calls: Vec<(PathBuf, PathBuf)>,
        fail: bool,
    }

    impl SnapshotDiffer for RecordingDiffer {
        fn diff(&mut self, previous: &Path, current: &Path) -> ProbeResult<()> {
            self.calls.push((previous.to_path_buf(), current.to_path_buf()));
            if self.fail {
                Err(ProbeError::Subprocess("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn stamp(secs: u64, size: u64) -> FileStamp {
        FileStamp {
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            size,
        }
    }

    fn options(target: PathBuf, output_dir: PathBuf, diff: bool) -> MonitorOptions {
        MonitorOptions {
            target,
            interval: Duration::from_millis(10),
            output_dir: Some(output_dir),
            diff,
        }
    }

    #[test]
    fn test_idle_stays_idle_while_missing() {
        let mut state = PollState::idle();
        assert_eq!(state.observe(None), PollOutcome::Missing);
        assert!(!state.is_watching());
    }

    #[test]
    fn test_first_stat_records_baseline() {
        let mut state = PollState::idle();
        assert_eq!(state.observe(Some(stamp(10, 100))), PollOutcome::Baseline);
        assert_eq!(state.last(), Some(&stamp(10, 100)));
    }

    #[test]
    fn test_change_detection() {
        let mut state = PollState::watching(stamp(10, 100));
        assert_eq!(state.observe(Some(stamp(10, 100))), PollOutcome::Unchanged);
        assert_eq!(state.observe(Some(stamp(11, 100))), PollOutcome::Changed, "Newer mtime is a change");
        assert_eq!(state.observe(Some(stamp(11, 120))), PollOutcome::Changed, "Size change is a change");
        assert_eq!(state.last(), Some(&stamp(11, 120)));
    }

    #[test]
    fn test_older_mtime_same_size_is_unchanged() {
        let mut state = PollState::watching(stamp(10, 100));
        assert_eq!(state.observe(Some(stamp(5, 100))), PollOutcome::Unchanged);
        assert_eq!(state.last(), Some(&stamp(10, 100)), "Stamp only moves on change");
    }

    #[test]
    fn test_watching_survives_missing_file() {
        let mut state = PollState::watching(stamp(10, 100));
        assert_eq!(state.observe(None), PollOutcome::Missing);
        assert!(state.is_watching());
    }

    #[test]
    fn test_snapshot_naming() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.cs");
        fs::write(&source, b"abc").unwrap();

        let mut store = SnapshotStore::open(dir.path().join("snaps")).unwrap();
        assert!(store.is_empty());
        assert!(store.latest().is_none());

        let first = store.capture(&source).unwrap();
        let second = store.capture(&source).unwrap();
        let third = store.capture(&source).unwrap();

        assert_eq!(first.file_name().unwrap(), INITIAL_SNAPSHOT);
        assert_eq!(second.file_name().unwrap(), "cs_snapshot_1.bin");
        assert_eq!(third.file_name().unwrap(), "cs_snapshot_2.bin");
        assert_eq!(store.len(), 3);
        assert_eq!(store.latest(), Some(third.as_path()));
        assert_eq!(fs::read(&third).unwrap(), b"abc");
    }

    #[test]
    fn test_capture_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path()).unwrap();
        let result = store.capture(&dir.path().join("absent.cs"));
        assert!(matches!(result, Err(ProbeError::Io { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_start_requires_target() {
        let dir = tempfile::tempdir().unwrap();
        let result = Monitor::start(
            options(dir.path().join("absent.cs"), dir.path().join("out"), true),
            RecordingDiffer::default(),
        );
        assert!(matches!(result, Err(ProbeError::MissingFile(_))));
    }

    #[test]
    fn test_capture_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.cs");
        let out = dir.path().join("out");
        fs::write(&target, b"version one").unwrap();

        let mut monitor =
            Monitor::start(options(target.clone(), out.clone(), true), RecordingDiffer::default())
                .unwrap();
        assert!(out.join(INITIAL_SNAPSHOT).is_file());
        assert!(monitor.state().is_watching());

        assert_eq!(monitor.tick().unwrap(), PollOutcome::Unchanged);

        fs::write(&target, b"version two, longer").unwrap();
        assert_eq!(monitor.tick().unwrap(), PollOutcome::Changed);

        let snapshot = out.join("cs_snapshot_1.bin");
        assert_eq!(fs::read(&snapshot).unwrap(), b"version two, longer");
        assert_eq!(
            monitor.differ().calls,
            vec![(out.join(INITIAL_SNAPSHOT), snapshot)]
        );
    }

    #[test]
    fn test_no_diff_skips_differ() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.cs");
        fs::write(&target, b"a").unwrap();

        let mut monitor = Monitor::start(
            options(target.clone(), dir.path().join("out"), false),
            RecordingDiffer::default(),
        )
        .unwrap();
        fs::write(&target, b"ab").unwrap();
        assert_eq!(monitor.tick().unwrap(), PollOutcome::Changed);
        assert!(monitor.differ().calls.is_empty());
        assert_eq!(monitor.store().len(), 2);
    }

    #[test]
    fn test_differ_failure_does_not_stop_polling() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.cs");
        fs::write(&target, b"a").unwrap();

        let differ = RecordingDiffer {
            fail: true,
            ..RecordingDiffer::default()
        };
        let mut monitor =
            Monitor::start(options(target.clone(), dir.path().join("out"), true), differ).unwrap();

        fs::write(&target, b"ab").unwrap();
        assert_eq!(monitor.tick().unwrap(), PollOutcome::Changed);
        fs::write(&target, b"abc").unwrap();
        assert_eq!(monitor.tick().unwrap(), PollOutcome::Changed);
        assert_eq!(monitor.differ().calls.len(), 2);
    }

    #[test]
    fn test_run_stops_on_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.cs");
        fs::write(&target, b"a").unwrap();

        let mut monitor = Monitor::start(
            options(target, dir.path().join("out"), true),
            RecordingDiffer::default(),
        )
        .unwrap();
        let shutdown = AtomicBool::new(true);
        assert!(monitor.run(&shutdown).is_ok());
        assert_eq!(monitor.store().len(), 1);
    }

    #[test]
    fn test_sleep_unless_elapses() {
        let flag = AtomicBool::new(false);
        assert!(!sleep_unless(&flag, Duration::from_millis(5)));
    }

    #[test]
    fn test_sleep_unless_unbounded_deadline() {
        let flag = AtomicBool::new(true);
        assert!(sleep_unless(&flag, Duration::MAX));
    }

    #[test]
    fn test_process_differ_command_args() {
        let plain = ProcessDiffer::new("csprobe", 8);
        let args: Vec<_> = plain
            .command(Path::new("a.bin"), Path::new("b.bin"))
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["diff", "a.bin", "b.bin", "--context", "8"]);

        let configured =
            ProcessDiffer::new("csprobe", 8).with_config(Some(PathBuf::from("limits.json")));
        let args: Vec<_> = configured
            .command(Path::new("a.bin"), Path::new("b.bin"))
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["diff", "a.bin", "b.bin", "--context", "8", "--config", "limits.json"]
        );
    }

    #[test]
    fn test_temporary_store_prefix() {
        let store = SnapshotStore::temporary().unwrap();
        let name = store.dir().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(TEMP_DIR_PREFIX));
        assert!(store.dir().is_dir());
        fs::remove_dir_all(store.dir()).unwrap();
    }
}
