// Live HTML session
//
// Keeps one auto-refreshing HTML report on disk while the folder is being
// edited. The page is rewritten only when the tree fingerprint changes, and
// every file the session wrote is removed when it ends.

use crate::analysis::{AnalysisResult, Analyzer, FileNode, NodeKind};
use crate::config::LiveConfig;
use crate::error::{Error, Result};
use crate::output::html::{HtmlGenerator, RenderMode};
use chrono::Local;
use sha2::{Digest, Sha256};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// How a live session ended
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LiveOutcome {
    /// Number of times the page was rewritten after the initial write
    pub regenerations: usize,
}

/// An auto-refreshing HTML report bound to one folder
pub struct LiveReport {
    analyzer: Analyzer,
    root: PathBuf,
    path: PathBuf,
    generator: HtmlGenerator,
    interval: Duration,
    fingerprint: Option<String>,
    written: bool,
}

impl LiveReport {
    /// Prepare a session; nothing is written until [`LiveReport::start`]
    pub fn new(analyzer: Analyzer, root: impl Into<PathBuf>, config: &LiveConfig) -> Result<Self> {
        let refresh_secs = config.refresh_secs.max(1);
        let path = config.directory.join(format!(
            "architecture_analysis_live_{}.html",
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        Ok(Self {
            analyzer,
            root: root.into(),
            path,
            generator: HtmlGenerator::new()?.with_mode(RenderMode::Live { refresh_secs }),
            interval: Duration::from_secs(refresh_secs),
            fingerprint: None,
            written: false,
        })
    }

    /// Override the polling interval; the page's refresh tag is unchanged
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the first page from an existing result
    pub fn start(&mut self, result: &AnalysisResult) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
        }
        self.write_page(result)?;
        self.fingerprint = Some(self.current_fingerprint()?);
        info!(path = %self.path.display(), "live report started");
        Ok(())
    }

    /// Regenerate the page if the folder changed since the last write
    pub fn refresh(&mut self) -> Result<bool> {
        let fingerprint = self.current_fingerprint()?;
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return Ok(false);
        }

        debug!(root = %self.root.display(), "change detected, regenerating live report");
        let result = self.analyzer.analyze(&self.root)?;
        self.write_page(&result)?;
        self.fingerprint = Some(fingerprint);
        Ok(true)
    }

    /// Poll for changes until `shutdown` resolves or a regeneration fails.
    ///
    /// The page is removed on every exit path.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<LiveOutcome>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        tokio::pin!(shutdown);

        let mut outcome = LiveOutcome::default();
        let result = loop {
            tokio::select! {
                _ = &mut shutdown => break Ok(outcome),
                _ = ticker.tick() => match self.refresh() {
                    Ok(true) => outcome.regenerations += 1,
                    Ok(false) => {}
                    Err(e) => break Err(e),
                },
            }
        };

        self.cleanup();
        result
    }

    /// Remove the page if this session wrote it
    pub fn cleanup(&mut self) {
        if !self.written {
            return;
        }
        self.written = false;
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "live report removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "cannot remove live report: {}", e),
        }
    }

    fn write_page(&mut self, result: &AnalysisResult) -> Result<()> {
        let html = self.generator.render(result)?;
        fs::write(&self.path, html).map_err(|e| Error::write(&self.path, e))?;
        self.written = true;
        Ok(())
    }

    fn current_fingerprint(&self) -> Result<String> {
        let outcome = self.analyzer.walk(&self.root)?;
        Ok(fingerprint(&outcome.root))
    }
}

impl Drop for LiveReport {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Hash of the tree shape plus each markdown file's size and modification time.
///
/// Other files are left out, so a live page written inside the scanned
/// folder does not register as a change.
pub fn fingerprint(root: &FileNode) -> String {
    let mut hasher = Sha256::new();
    hash_node(&mut hasher, root);
    format!("{:x}", hasher.finalize())
}

fn hash_node(hasher: &mut Sha256, node: &FileNode) {
    match node.kind {
        NodeKind::Other => return,
        NodeKind::Directory => hasher.update(b"d"),
        NodeKind::Markdown => hasher.update(b"m"),
    }
    hasher.update(node.relative_path.as_bytes());
    hasher.update([0u8]);

    if node.kind == NodeKind::Markdown {
        if let Ok(meta) = fs::metadata(&node.path) {
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            hasher.update(meta.len().to_le_bytes());
            hasher.update(modified.to_le_bytes());
        }
    }

    for child in &node.children {
        hash_node(hasher, child);
    }
}
