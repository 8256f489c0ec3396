mod snapshot;

pub use snapshot::SnapshotPage;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A live, already-navigated page. The scan owns the handle for the length
/// of one run and releases it with [`PageHandle::close`].
///
/// Implementations report every failure as `PageError::HandleUnavailable`;
/// the scan treats that as fatal.
#[async_trait]
pub trait PageHandle: Send {
    /// Move the viewport to the maximum scroll extent.
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Serialized form of the document as currently rendered.
    async fn rendered_html(&mut self) -> Result<String>;

    /// Wait for lazily loaded content to render.
    async fn suspend(&mut self, duration: Duration) -> Result<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn close(&mut self) -> Result<()>;
}
