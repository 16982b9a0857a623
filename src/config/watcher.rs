//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by renaming a temp file over the original keep triggering
//! reloads. Only reloads that change what the running server applies
//! (listener, upstream, timeouts) are forwarded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ShimConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    filter: ReloadFilter,
    update_tx: mpsc::UnboundedSender<ShimConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the config already in use.
    ///
    /// Returns the watcher and a receiver for validated, changed configs.
    pub fn new(path: &Path, current: ShimConfig) -> (Self, mpsc::UnboundedReceiver<ShimConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            filter: ReloadFilter::new(current),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut filter,
            update_tx,
        } = self;
        let file_name: Option<OsString> = path.file_name().map(ToOwned::to_owned);
        let watch_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let config_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                if !event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == file_name.as_deref())
                {
                    return;
                }

                match load_config(&config_path) {
                    Ok(loaded) => match filter.accept(loaded) {
                        Some(changed) => {
                            tracing::info!(path = ?config_path, "Config file changed, reloading");
                            let _ = update_tx.send(changed);
                        }
                        None => tracing::debug!(path = ?config_path, "Config rewritten without effective changes"),
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Remembers the last forwarded config and drops reloads that match it.
struct ReloadFilter {
    current: ShimConfig,
}

impl ReloadFilter {
    fn new(current: ShimConfig) -> Self {
        Self { current }
    }

    fn accept(&mut self, loaded: ShimConfig) -> Option<ShimConfig> {
        if same_runtime_settings(&self.current, &loaded) {
            return None;
        }
        self.current = loaded.clone();
        Some(loaded)
    }
}

// Observability settings are read once at startup.
fn same_runtime_settings(a: &ShimConfig, b: &ShimConfig) -> bool {
    a.listener == b.listener && a.upstream == b.upstream && a.timeouts == b.timeouts
}
