//! Request pacing. The Trello API enforces per-key rate limits, so creates
//! are spaced out with small fixed delays. The delay source is a trait so
//! tests run without wall-clock sleeps.

use std::time::Duration;

use async_trait::async_trait;

/// Delay after each created list.
pub const LIST_CREATE_DELAY: Duration = Duration::from_millis(150);
/// Delay after each created label.
pub const LABEL_CREATE_DELAY: Duration = Duration::from_millis(120);
/// Delay after every [`CARD_BATCH_SIZE`]th created card.
pub const CARD_BATCH_DELAY: Duration = Duration::from_millis(150);
/// Number of consecutive card creations between pacing delays.
pub const CARD_BATCH_SIZE: usize = 5;

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pace(&self, delay: Duration);
}

/// Production pacer: actually sleeps.
pub struct WallClockPacer;

#[async_trait]
impl Pacer for WallClockPacer {
    async fn pace(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Test pacer: returns immediately.
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pace(&self, _delay: Duration) {}
}
