use super::cancel::Canceller;
use crate::error::{PageError, Result};
use crate::page::PageHandle;
use async_trait::async_trait;
use std::time::Duration;

/// Page double that shows `frames[n - 1]` after the `n`-th scroll and records
/// how it was driven. Suspends return immediately.
pub struct ScriptedPage {
    frames: Vec<String>,
    pub scrolls: usize,
    pub suspends: Vec<Duration>,
    pub closed: bool,
    fail_on_scroll: Option<usize>,
    fail_on_render: Option<usize>,
    cancel_on_suspend: Option<(usize, Canceller)>,
}

impl ScriptedPage {
    pub fn new<S: Into<String>>(frames: Vec<S>) -> Self {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            scrolls: 0,
            suspends: Vec::new(),
            closed: false,
            fail_on_scroll: None,
            fail_on_render: None,
            cancel_on_suspend: None,
        }
    }

    /// Report the handle as gone on the given (1-based) scroll.
    pub fn fail_on_scroll(mut self, scroll: usize) -> Self {
        self.fail_on_scroll = Some(scroll);
        self
    }

    /// Report the handle as gone when queried after the given (1-based)
    /// scroll.
    pub fn fail_on_render(mut self, scroll: usize) -> Self {
        self.fail_on_render = Some(scroll);
        self
    }

    /// Fire `canceller` while settling after the given (1-based) scroll.
    pub fn cancel_on_suspend(mut self, scroll: usize, canceller: Canceller) -> Self {
        self.cancel_on_suspend = Some((scroll, canceller));
        self
    }
}

#[async_trait]
impl PageHandle for ScriptedPage {
    async fn scroll_to_bottom(&mut self) -> Result<()> {
        if self.closed || self.fail_on_scroll == Some(self.scrolls + 1) {
            return Err(PageError::HandleUnavailable("target closed".to_string()).into());
        }
        self.scrolls += 1;
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String> {
        if self.closed || self.fail_on_render == Some(self.scrolls) {
            return Err(PageError::HandleUnavailable("target closed".to_string()).into());
        }
        let index = self.scrolls.saturating_sub(1).min(self.frames.len().saturating_sub(1));
        Ok(self.frames.get(index).cloned().unwrap_or_default())
    }

    async fn suspend(&mut self, duration: Duration) -> Result<()> {
        self.suspends.push(duration);
        if let Some((scroll, canceller)) = &self.cancel_on_suspend {
            if *scroll == self.scrolls {
                canceller.cancel();
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
