use super::cancel::CancelSignal;
use crate::config::ScrollConfig;
use crate::error::Result;
use crate::page::PageHandle;
use crate::log_info;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every configured pass ran.
    Completed,
    /// A pass produced no new identities.
    Converged,
    /// The caller asked the run to stop.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollOutcome {
    pub stop_reason: StopReason,
    pub passes_completed: u32,
}

/// Drives the page through scroll passes, handing each settled document to
/// a callback.
#[derive(Debug, Clone)]
pub struct ScrollDriver {
    passes: u32,
    settle_delay: Duration,
    stop_when_exhausted: bool,
}

impl ScrollDriver {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            passes: config.passes,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            stop_when_exhausted: config.stop_when_exhausted,
        }
    }

    /// Run up to `passes` scroll/settle/extract cycles. `on_settle` receives
    /// the pass number and the rendered document and returns how many new
    /// identities it found.
    ///
    /// Cancellation is honoured before each pass and at the settle point; a
    /// cancelled pass is not extracted. Page failures end the run with an
    /// error.
    pub async fn run<P, F>(
        &self,
        page: &mut P,
        cancel: &CancelSignal,
        mut on_settle: F,
    ) -> Result<ScrollOutcome>
    where
        P: PageHandle + ?Sized,
        F: FnMut(u32, &str) -> usize,
    {
        let mut passes_completed = 0;

        for pass in 1..=self.passes {
            if cancel.is_cancelled() {
                return Ok(self.stopped(StopReason::Cancelled, passes_completed));
            }

            page.scroll_to_bottom().await?;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(self.stopped(StopReason::Cancelled, passes_completed));
                }
                settled = page.suspend(self.settle_delay) => settled?,
            }

            if cancel.is_cancelled() {
                return Ok(self.stopped(StopReason::Cancelled, passes_completed));
            }

            let html = page.rendered_html().await?;
            let new_identities = on_settle(pass, &html);
            passes_completed = pass;

            if self.stop_when_exhausted && new_identities == 0 {
                return Ok(self.stopped(StopReason::Converged, passes_completed));
            }
        }

        Ok(self.stopped(StopReason::Completed, passes_completed))
    }

    fn stopped(&self, stop_reason: StopReason, passes_completed: u32) -> ScrollOutcome {
        log_info!(
            "[scroll] Stopped after {}/{} passes ({:?})",
            passes_completed,
            self.passes,
            stop_reason
        );
        ScrollOutcome {
            stop_reason,
            passes_completed,
        }
    }
}
