//! Configuration file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// A watcher that monitors the configuration file for changes.
///
/// Only configurations that load and validate are sent downstream; a broken
/// edit leaves the running configuration in place.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// A sender feeding the same update stream, for reloads triggered
    /// outside the file watcher (e.g. SIGHUP).
    pub fn sender(&self) -> mpsc::UnboundedSender<AppConfig> {
        self.update_tx.clone()
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Config file change detected, reloading");
                        reload_into(&path, &tx);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and push it to `tx` if it is valid.
pub fn reload_into(path: &Path, tx: &mpsc::UnboundedSender<AppConfig>) {
    match load_config(path) {
        Ok(new_config) => {
            let _ = tx.send(new_config);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reload_sends_only_valid_configs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let (watcher, mut rx) = ConfigWatcher::new(file.path());
        let tx = watcher.sender();

        writeln!(file, "[forward]\ntimeout_ms = 0").unwrap();
        reload_into(file.path(), &tx);
        assert!(rx.try_recv().is_err());

        file.as_file().set_len(0).unwrap();
        let mut handle = file.reopen().unwrap();
        writeln!(handle, "[forward]\ntimeout_ms = 750").unwrap();
        reload_into(file.path(), &tx);
        assert_eq!(rx.try_recv().unwrap().forward.timeout_ms, 750);
    }
}
