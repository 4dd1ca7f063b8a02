//! Hot reload of the YAML config
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by writing a temp file and renaming it over the original replace the
//! inode, and a file-level watch goes silent after the first such save.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Quiet period after the first event of a burst before reading the file
const SETTLE: Duration = Duration::from_millis(100);

/// Delivers freshly loaded configs whenever the file changes
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Start watching an existing config file
    ///
    /// Only configs that load and validate are delivered; a broken edit is
    /// logged and the previous config stays in effect.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (tx, rx) = mpsc::channel(10);

        // The notify callback runs on its own thread
        let runtime = tokio::runtime::Handle::current();
        let pending = Arc::new(AtomicBool::new(false));
        let target = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Config watch error: {}", e);
                    return;
                }
            };
            if !touches_config(&event, &target) {
                return;
            }
            // One reload per burst of events
            if pending.swap(true, Ordering::AcqRel) {
                return;
            }
            debug!("Config change detected: {:?}", event.kind);

            let path = target.clone();
            let tx = tx.clone();
            let pending = Arc::clone(&pending);
            runtime.spawn(async move {
                tokio::time::sleep(SETTLE).await;
                pending.store(false, Ordering::Release);
                if let Some(config) = reload(&path).await {
                    if tx.send(config).await.is_err() {
                        debug!("Config receiver dropped");
                    }
                }
            });
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        info!("Watching {} for changes", path.display());

        Ok(Self {
            path,
            _watcher: watcher,
            rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next validated config, or `None` once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}

/// Whether a directory event concerns the watched file
fn touches_config(event: &Event, path: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}

/// Load and validate; failures are logged and yield `None`
async fn reload(path: &Path) -> Option<AppConfig> {
    match AppConfig::load(&path.to_string_lossy()).await {
        Ok(config) => {
            info!("Configuration reloaded from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Keeping previous config, reload failed: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_only_changes_to_the_config_file_count() {
        let config = Path::new("/etc/airpointer/airpointer.yaml");

        assert!(touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/airpointer/airpointer.yaml"),
            config
        ));
        // Atomic save lands as a create of the same name
        assert!(touches_config(
            &event(EventKind::Create(CreateKind::File), "/etc/airpointer/airpointer.yaml"),
            config
        ));
        assert!(!touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/airpointer/other.yaml"),
            config
        ));
        assert!(!touches_config(
            &event(EventKind::Remove(RemoveKind::File), "/etc/airpointer/airpointer.yaml"),
            config
        ));
    }

    #[tokio::test]
    async fn test_reload_rejects_invalid_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("airpointer.yaml");

        fs::write(&path, "pointer:\n  smoothing_alpha: 0.0\n")?;
        assert!(reload(&path).await.is_none());

        fs::write(&path, "pointer: [not, a, map]\n")?;
        assert!(reload(&path).await.is_none());

        fs::write(&path, "pointer:\n  smoothing_alpha: 0.5\n")?;
        let config = reload(&path).await.expect("valid config");
        assert_eq!(config.pointer.smoothing_alpha, 0.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_config_watcher_reload() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("airpointer.yaml");
        fs::write(&config_path, "pointer:\n  smoothing_alpha: 0.3\n")?;

        let mut watcher = ConfigWatcher::new(&config_path)?;
        assert_eq!(watcher.path(), config_path.as_path());

        tokio::time::sleep(Duration::from_millis(100)).await;
        // Write-then-rename, as most editors save
        let staged = temp_dir.path().join("airpointer.yaml.tmp");
        fs::write(&staged, "pointer:\n  smoothing_alpha: 0.6\n")?;
        fs::rename(&staged, &config_path)?;

        let delivered = tokio::time::timeout(Duration::from_secs(2), watcher.next_config()).await;

        // Some platforms coalesce or drop events; only check content when delivered
        if let Ok(Some(config)) = delivered {
            assert_eq!(config.pointer.smoothing_alpha, 0.6);
        }
        Ok(())
    }
}
