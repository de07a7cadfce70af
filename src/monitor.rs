//! Snapshot monitor
//!
//! Polls the controller assignment file, copies every changed version into a
//! snapshot directory and runs the diff tool between consecutive snapshots.
//!
//! # Polling model
//!
//! The monitor stats the file once per interval. There is no change
//! notification: a change is a modification time later than the last one
//! recorded, or a different size. A missing file is not an error while
//! polling; the next tick simply tries again.
//!
//! ```text
//!   Idle ──stat ok──▶ Watching(mtime, size) ──changed──▶ capture + diff
//!    ▲  │                 │        ▲                          │
//!    └──┘ stat fails      └────────┴──────────────────────────┘
//! ```
//!
//! Interrupts (SIGINT, SIGTERM) only raise a flag. The loop notices it
//! between sleep slices and leaves through [`Monitor::finish`], which
//! reports where the snapshots were written.

use crate::error::{ProbeError, ProbeResult};
use crate::input::require_file;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

/// Location of the assignment file relative to the home directory
pub const CS_FILE_RELATIVE_PATH: &str = "Library/Preferences/com.apple.logic.pro.cs";

/// Name of the first snapshot
pub const INITIAL_SNAPSHOT: &str = "cs_initial.bin";

/// Prefix of temporary snapshot directories
pub const TEMP_DIR_PREFIX: &str = "logic_cs_monitor_";

/// Longest uninterrupted sleep while waiting for the next tick
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Default location of the Logic Pro controller assignment file
pub fn default_target() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CS_FILE_RELATIVE_PATH))
}

/// Modification time and size of a file at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub size: u64,
}

impl FileStamp {
    /// Stat `path`; `None` when the file cannot be inspected
    pub fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        let modified = metadata.modified().ok()?;
        Some(Self {
            modified,
            size: metadata.len(),
        })
    }

    /// True when `current` is newer or has a different size
    pub fn is_changed_by(&self, current: &FileStamp) -> bool {
        current.modified > self.modified || current.size != self.size
    }
}

/// What a single poll observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The file could not be stat'ed
    Missing,
    /// First successful stat; recorded without capturing
    Baseline,
    Unchanged,
    Changed,
}

/// Polling state threaded through the monitor loop
///
/// `last == None` is the idle state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    last: Option<FileStamp>,
}

impl PollState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn watching(stamp: FileStamp) -> Self {
        Self { last: Some(stamp) }
    }

    pub fn is_watching(&self) -> bool {
        self.last.is_some()
    }

    pub fn last(&self) -> Option<&FileStamp> {
        self.last.as_ref()
    }

    /// Feed one stat result into the state machine
    ///
    /// The recorded stamp only moves on a baseline or a change.
    pub fn observe(&mut self, current: Option<FileStamp>) -> PollOutcome {
        let Some(current) = current else {
            return PollOutcome::Missing;
        };

        match self.last {
            None => {
                self.last = Some(current);
                PollOutcome::Baseline
            }
            Some(last) if last.is_changed_by(&current) => {
                self.last = Some(current);
                PollOutcome::Changed
            }
            Some(_) => PollOutcome::Unchanged,
        }
    }
}

/// Directory of sequentially numbered snapshots
#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    counter: usize,
    latest: Option<PathBuf>,
}

impl SnapshotStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> ProbeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ProbeError::io(&dir, e))?;
        Ok(Self {
            dir,
            counter: 0,
            latest: None,
        })
    }

    /// Create a fresh directory under the system temp location
    ///
    /// The directory is not removed when the store is dropped.
    pub fn temporary() -> ProbeResult<Self> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .map_err(|e| ProbeError::io(std::env::temp_dir(), e))?;
        Self::open(temp.keep())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Most recently captured snapshot
    pub fn latest(&self) -> Option<&Path> {
        self.latest.as_deref()
    }

    /// Number of snapshots captured so far
    pub fn len(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Path the next capture will be written to
    pub fn next_path(&self) -> PathBuf {
        if self.counter == 0 {
            self.dir.join(INITIAL_SNAPSHOT)
        } else {
            self.dir.join(format!("cs_snapshot_{}.bin", self.counter))
        }
    }

    /// Copy `source` verbatim into the next snapshot slot
    pub fn capture(&mut self, source: &Path) -> ProbeResult<PathBuf> {
        let path = self.next_path();
        fs::copy(source, &path).map_err(|e| ProbeError::io(source, e))?;
        log::debug!("captured {} -> {}", source.display(), path.display());
        self.counter += 1;
        self.latest = Some(path.clone());
        Ok(path)
    }
}

/// Compares two consecutive snapshots
pub trait SnapshotDiffer {
    fn diff(&mut self, previous: &Path, current: &Path) -> ProbeResult<()>;
}

/// Runs `<program> diff <previous> <current> --context N` as a child process
///
/// When a configuration file is set it is passed on with `--config`, so the
/// child reports with the same limits as the parent.
#[derive(Debug, Clone)]
pub struct ProcessDiffer {
    program: PathBuf,
    context_bytes: usize,
    config: Option<PathBuf>,
}

impl ProcessDiffer {
    pub fn new(program: impl Into<PathBuf>, context_bytes: usize) -> Self {
        Self {
            program: program.into(),
            context_bytes,
            config: None,
        }
    }

    /// Use the running executable as the diff tool
    pub fn current_exe(context_bytes: usize) -> ProbeResult<Self> {
        let program = std::env::current_exe()
            .map_err(|e| ProbeError::Subprocess(format!("cannot locate diff tool: {}", e)))?;
        Ok(Self::new(program, context_bytes))
    }

    /// Forward `config` to every diff invocation
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// The child command for one comparison
    pub fn command(&self, previous: &Path, current: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("diff")
            .arg(previous)
            .arg(current)
            .arg("--context")
            .arg(self.context_bytes.to_string());
        if let Some(config) = &self.config {
            command.arg("--config").arg(config);
        }
        command
    }
}

impl SnapshotDiffer for ProcessDiffer {
    fn diff(&mut self, previous: &Path, current: &Path) -> ProbeResult<()> {
        let status = self.command(previous, current).status().map_err(|e| {
            ProbeError::Subprocess(format!("{}: {}", self.program.display(), e))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ProbeError::Subprocess(format!(
                "diff exited with {}",
                status
            )))
        }
    }
}

/// Monitor settings
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOptions {
    /// File to watch
    pub target: PathBuf,
    /// Time between stat checks
    pub interval: Duration,
    /// Snapshot directory; a temporary one is created when `None`
    pub output_dir: Option<PathBuf>,
    /// Run the differ after each capture
    pub diff: bool,
}

/// The polling loop and its state
pub struct Monitor<D: SnapshotDiffer> {
    options: MonitorOptions,
    state: PollState,
    store: SnapshotStore,
    differ: D,
    temporary: bool,
}

impl<D: SnapshotDiffer> Monitor<D> {
    /// Check the target, prepare the snapshot directory and take the
    /// initial snapshot
    pub fn start(options: MonitorOptions, differ: D) -> ProbeResult<Self> {
        require_file(&options.target)?;

        let temporary = options.output_dir.is_none();
        let mut store = match &options.output_dir {
            Some(dir) => SnapshotStore::open(dir)?,
            None => SnapshotStore::temporary()?,
        };

        let stamp = FileStamp::read(&options.target);
        let initial = store.capture(&options.target)?;
        println!("Initial snapshot saved to: {}", initial.display());
        log::info!(
            "watching {} every {:?}",
            options.target.display(),
            options.interval
        );

        let state = match stamp {
            Some(stamp) => PollState::watching(stamp),
            None => PollState::idle(),
        };

        Ok(Self {
            options,
            state,
            store,
            differ,
            temporary,
        })
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn differ(&self) -> &D {
        &self.differ
    }

    /// Poll once; capture and diff when the file changed
    ///
    /// Copy failures are returned. Diff failures are logged and swallowed.
    pub fn tick(&mut self) -> ProbeResult<PollOutcome> {
        let outcome = self.state.observe(FileStamp::read(&self.options.target));
        if outcome != PollOutcome::Changed {
            return Ok(outcome);
        }

        println!(
            "\n[{}] Detected changes to controller assignment file!",
            chrono::Local::now().format("%H:%M:%S")
        );

        let previous = self.store.latest().map(Path::to_path_buf);
        let snapshot = self.store.capture(&self.options.target)?;
        println!("Snapshot saved to: {}", snapshot.display());

        if self.options.diff {
            if let Some(previous) = previous {
                println!("\nChanges detected:");
                if let Err(e) = self.differ.diff(&previous, &snapshot) {
                    log::error!("{}", e);
                }
            }
        }

        Ok(outcome)
    }

    /// Poll until `shutdown` is raised, then report snapshot locations
    pub fn run(&mut self, shutdown: &AtomicBool) -> ProbeResult<()> {
        let result = self.poll_until(shutdown);
        self.finish();
        result
    }

    fn poll_until(&mut self, shutdown: &AtomicBool) -> ProbeResult<()> {
        loop {
            if sleep_unless(shutdown, self.options.interval) {
                return Ok(());
            }
            self.tick()?;
        }
    }

    /// Print the closing report
    pub fn finish(&self) {
        println!("\nMonitoring stopped.");
        if self.temporary {
            println!("\nTemporary snapshots are in: {}", self.store.dir().display());
            println!("These will be deleted when you delete the directory.");
        } else {
            println!("\nSnapshots are in: {}", self.store.dir().display());
        }
    }
}

/// Sleep for `duration` in short slices; returns true if `flag` was raised
///
/// A deadline past the clock's range never arrives, so only the flag ends
/// the wait.
pub(crate) fn sleep_unless(flag: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if flag.load(Ordering::Acquire) {
            return true;
        }
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                SLEEP_SLICE.min(deadline - now)
            }
            None => SLEEP_SLICE,
        };
        thread::sleep(slice);
    }
}

/// Register SIGINT and SIGTERM to raise the returned flag
pub fn install_interrupt_flag() -> ProbeResult<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))
            .map_err(|e| ProbeError::io("<signal handler>", e))?;
    }
    Ok(flag)
}
