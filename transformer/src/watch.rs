//! Development loop: re-run the transform whenever a watched file changes.
//!
//! Stands in for the host's file watcher when the transformer is driven from
//! the command line. Polling keeps behavior identical across platforms and
//! editors that replace files instead of writing in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

/// How long to keep collecting events after the first one before rebuilding.
const BATCH_WINDOW: Duration = Duration::from_millis(100);

/// Paths from `events` that are in `watched` and actually changed.
pub fn changed_paths(events: &[Event], watched: &BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    events
        .iter()
        .filter(|event| {
            matches!(
                event.kind,
                EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            )
        })
        .flat_map(|event| event.paths.iter())
        .filter(|path| watched.contains(*path))
        .cloned()
        .collect()
}

/// Paths to start and stop watching when moving from `old` to `new`.
pub fn diff_watch_sets(
    old: &BTreeSet<PathBuf>,
    new: &BTreeSet<PathBuf>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let added = new.difference(old).cloned().collect();
    let removed = old.difference(new).cloned().collect();
    (added, removed)
}

/// Watch `initial` and call `rebuild` with the changed paths after every batch
/// of changes. `rebuild` returns the next watch set; on error the previous set
/// is kept so a broken edit can be fixed without restarting.
///
/// Runs until the watcher's channel closes.
pub fn run_watch_loop<F>(
    initial: BTreeSet<PathBuf>,
    poll_interval: Duration,
    mut rebuild: F,
) -> Result<()>
where
    F: FnMut(&BTreeSet<PathBuf>) -> Result<BTreeSet<PathBuf>>,
{
    let (tx, rx) = mpsc::channel::<Event>();
    let mut watcher = PollWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(err) => warn!(error = %err, "watch error"),
        },
        notify::Config::default().with_poll_interval(poll_interval),
    )
    .context("create file watcher")?;

    let mut watched = BTreeSet::new();
    update_watches(&mut watcher, &mut watched, initial);
    info!(files = watched.len(), "watching for changes");

    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        while let Ok(event) = rx.recv_timeout(BATCH_WINDOW) {
            batch.push(event);
        }
        let changed = changed_paths(&batch, &watched);
        if changed.is_empty() {
            continue;
        }
        info!(changed = changed.len(), "change detected, rebuilding");
        let next = next_watch_set(&watched, &changed, &mut rebuild);
        update_watches(&mut watcher, &mut watched, next);
    }
    Ok(())
}

/// Run `rebuild` for `changed` and return the watch set to use afterwards.
/// A failed rebuild is logged and leaves `watched` in effect.
pub fn next_watch_set<F>(
    watched: &BTreeSet<PathBuf>,
    changed: &BTreeSet<PathBuf>,
    rebuild: &mut F,
) -> BTreeSet<PathBuf>
where
    F: FnMut(&BTreeSet<PathBuf>) -> Result<BTreeSet<PathBuf>>,
{
    match rebuild(changed) {
        Ok(next) => next,
        Err(err) => {
            error!("{err:#}");
            watched.clone()
        }
    }
}

fn update_watches<W: Watcher>(
    watcher: &mut W,
    watched: &mut BTreeSet<PathBuf>,
    next: BTreeSet<PathBuf>,
) {
    let (added, removed) = diff_watch_sets(watched, &next);
    for path in &removed {
        if let Err(err) = watcher.unwatch(path) {
            debug!(path = %path.display(), error = %err, "unwatch failed");
        }
    }
    for path in &added {
        watch_path(watcher, path);
    }
    *watched = next;
}

fn watch_path<W: Watcher>(watcher: &mut W, path: &Path) {
    match watcher.watch(path, RecursiveMode::NonRecursive) {
        Ok(()) => debug!(path = %path.display(), "watching"),
        Err(err) => warn!(path = %path.display(), error = %err, "unable to watch file"),
    }
}
