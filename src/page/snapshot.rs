use super::PageHandle;
use crate::error::{PageError, Result};
use crate::utils::read_html_snapshots;
use crate::{log_debug, log_info};
use async_trait::async_trait;
use std::path::Path;

/// Replays captured timeline snapshots as if they were a scrolling page.
///
/// Snapshot `n` is what the page renders after the `n`-th scroll; before any
/// scroll the first snapshot is shown. Past the last snapshot the page stops
/// growing.
pub struct SnapshotPage {
    frames: Vec<String>,
    cursor: Option<usize>,
    open: bool,
}

impl SnapshotPage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(PageError::HandleUnavailable(format!(
                "snapshot directory {:?} does not exist",
                dir
            ))
            .into());
        }

        let frames: Vec<String> = read_html_snapshots(dir)?
            .into_iter()
            .map(|(_, content)| content)
            .collect();

        if frames.is_empty() {
            return Err(PageError::HandleUnavailable(format!(
                "no *.html snapshots found in {:?}",
                dir
            ))
            .into());
        }

        log_info!("[page] Opened {} snapshots from {:?}", frames.len(), dir);
        Ok(Self::from_frames(frames))
    }

    pub fn from_frames(frames: Vec<String>) -> Self {
        Self {
            frames,
            cursor: None,
            open: true,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(PageError::HandleUnavailable("snapshot page is closed".to_string()).into())
        }
    }
}

#[async_trait]
impl PageHandle for SnapshotPage {
    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.ensure_open()?;
        let next = match self.cursor {
            None => 0,
            Some(current) => (current + 1).min(self.frames.len().saturating_sub(1)),
        };
        self.cursor = Some(next);
        log_debug!("[page] Showing snapshot {}/{}", next + 1, self.frames.len());
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String> {
        self.ensure_open()?;
        self.frames
            .get(self.cursor.unwrap_or(0))
            .cloned()
            .ok_or_else(|| PageError::HandleUnavailable("no snapshot loaded".to_string()).into())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn scrolling_advances_and_then_holds() {
        let mut page = SnapshotPage::from_frames(vec!["a".into(), "b".into()]);
        assert_eq!(page.rendered_html().await.unwrap(), "a");

        page.scroll_to_bottom().await.unwrap();
        assert_eq!(page.rendered_html().await.unwrap(), "a");

        page.scroll_to_bottom().await.unwrap();
        assert_eq!(page.rendered_html().await.unwrap(), "b");

        page.scroll_to_bottom().await.unwrap();
        assert_eq!(page.rendered_html().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn closed_page_is_unavailable() {
        let mut page = SnapshotPage::from_frames(vec!["a".into()]);
        page.close().await.unwrap();

        let err = page.scroll_to_bottom().await.unwrap_err();
        assert!(err.is_handle_unavailable());
        assert!(page.rendered_html().await.unwrap_err().is_handle_unavailable());
    }

    #[test]
    fn opens_directory_in_page_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("timeline-2.html"), "second").unwrap();
        fs::write(dir.path().join("timeline-1.html"), "first").unwrap();

        let page = SnapshotPage::open(dir.path()).unwrap();
        assert_eq!(page.frames, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotPage::open(dir.path()).err().unwrap();
        assert!(err.is_handle_unavailable());

        let err = SnapshotPage::open(dir.path().join("missing")).err().unwrap();
        assert!(err.is_handle_unavailable());
    }
}
