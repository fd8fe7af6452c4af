//! Shared fixtures for task service tests.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for assertion clarity"
)]

use crate::dispatch::{EventSubscriber, SubscriberError};
use crate::task::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Subscriber that records every committed event it observes.
#[derive(Default)]
pub struct CollectingSubscriber {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingSubscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .expect("subscriber mutex poisoned")
            .clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(TaskEvent::kind).collect()
    }
}

#[async_trait]
impl EventSubscriber for CollectingSubscriber {
    fn name(&self) -> &'static str {
        "collecting"
    }

    async fn on_event(&self, event: &TaskEvent) -> Result<(), SubscriberError> {
        self.events
            .lock()
            .expect("subscriber mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// Polls `probe` until it returns true or the deadline passes.
///
/// Dispatch and audit writes happen on background tasks, so assertions on
/// their effects poll instead of racing the spawn.
pub async fn wait_until<F>(probe: F)
where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if probe() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(probe(), "condition not reached within deadline");
}

/// Yields to the runtime long enough for any stray background dispatch to
/// land, then returns. Used before asserting that nothing happened.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}
