//! Content watcher for dev mode.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌─────────────────────────────────┐
//! │ notify   │───▶│ Batch    │───▶│ dispatch() one event at a time  │
//! │ events   │    │ (300ms)  │    │                                 │
//! └──────────┘    └──────────┘    │  static dir ─► images ─► index  │
//!                                 └─────────────────────────────────┘
//! ```
//!
//! The watcher is created before the initial build, so edits made while the
//! site loads wait in the channel instead of being lost.

use crate::{
    content::{FileEvent, LoadSettings, SiteIndex, UpdateOutcome, Updater},
    images::{ImageResolver, ImageSettings, handle_image_event},
    log,
    logger::WatchStatus,
    output::OutputWriter,
    static_dir::StaticDir,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// `/site/content/places/turku.en.poi.md` → `places/turku.en.poi.md`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Batching
// =============================================================================

/// First thing seen for a path within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Created,
    Modified,
    Removed,
}

/// Collects rapid notify events and turns them into [`FileEvent`]s once quiet.
struct Batch {
    pending: FxHashMap<PathBuf, Seen>,
    last_event: Option<Instant>,
}

impl Batch {
    fn new() -> Self {
        Self {
            pending: FxHashMap::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        let seen = match event.kind {
            EventKind::Create(_) => Seen::Created,
            EventKind::Modify(_) => Seen::Modified,
            EventKind::Remove(_) => Seen::Removed,
            _ => return,
        };
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.entry(path).or_insert(seen);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }

    /// Drain the batch, resolving each path against the filesystem as it is now.
    fn take(&mut self) -> Vec<FileEvent> {
        self.last_event = None;
        let mut events: Vec<_> = self
            .pending
            .drain()
            .filter_map(|(path, seen)| to_file_event(path, seen))
            .collect();
        events.sort_by(|a, b| a.path().cmp(b.path()));
        events
    }
}

fn to_file_event(path: PathBuf, seen: Seen) -> Option<FileEvent> {
    if path.is_dir() {
        return None;
    }
    match (path.exists(), seen) {
        (true, Seen::Created) => Some(FileEvent::Added(path)),
        (true, _) => Some(FileEvent::Changed(path)),
        (false, Seen::Created) => None,
        (false, _) => Some(FileEvent::Removed(path)),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// What handled an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Static,
    Image,
    Content(UpdateOutcome),
}

/// Everything a watched event can touch.
pub struct Dispatcher<'a, I, W> {
    pub site: &'a SiteIndex,
    pub load: &'a LoadSettings,
    pub images: &'a ImageSettings,
    pub resolver: &'a I,
    pub static_dir: &'a StaticDir,
    pub writer: &'a W,
}

impl<I: ImageResolver, W: OutputWriter> Dispatcher<'_, I, W> {
    /// Static dir first, then images, then content. The first handler that
    /// claims the path wins.
    pub fn dispatch(&self, event: &FileEvent) -> Result<Handled> {
        if self.static_dir.handle(event)? {
            return Ok(Handled::Static);
        }
        if handle_image_event(event, self.images)? {
            return Ok(Handled::Image);
        }
        Updater::new(self.site, self.load, self.resolver, self.writer)
            .handle(event)
            .map(Handled::Content)
    }

    fn report(&self, event: &FileEvent, status: &mut WatchStatus) {
        let rel = rel_path(event.path(), &self.load.content_root);
        match self.dispatch(event) {
            Ok(Handled::Static) => status.success(&format!("static {rel}")),
            Ok(Handled::Image) => status.success(&format!("image {rel}")),
            Ok(Handled::Content(UpdateOutcome::Updated(report))) => {
                let draft = if report.draft { " (draft)" } else { "" };
                status.success(&format!("{} {rel}{draft}", report.kind));
            }
            Ok(Handled::Content(UpdateOutcome::Unchanged)) => status.unchanged(&rel),
            Ok(Handled::Content(UpdateOutcome::Stale)) => {
                status.warning(&format!("{rel} removed, restart to rebuild"));
            }
            Ok(Handled::Content(UpdateOutcome::Ignored)) => {}
            Err(err) => {
                log!("error"; "{rel}: keeping the previous version");
                status.error(&format!("{rel} failed"), &format!("{err:#}"));
            }
        }
    }
}

// =============================================================================
// Watcher
// =============================================================================

/// A running notify watcher and its event channel.
pub struct ContentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl ContentWatcher {
    /// Start watching `root` recursively. Events queue until [`Self::run`].
    pub fn start(root: &Path) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        log!("watch"; "{}", root.display());

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Handle events until the channel closes. Events are processed
    /// strictly one after another.
    pub fn run<I: ImageResolver, W: OutputWriter>(self, dispatcher: &Dispatcher<'_, I, W>) {
        let mut batch = Batch::new();
        let mut status = WatchStatus::new();

        loop {
            match self.rx.recv_timeout(batch.timeout()) {
                Ok(Ok(event)) => batch.add(event),
                Ok(Err(e)) => log!("watch"; "error: {e}"),
                Err(RecvTimeoutError::Timeout) if batch.ready() => {
                    for event in batch.take() {
                        dispatcher.report(&event, &mut status);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
