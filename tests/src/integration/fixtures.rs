//! Test services and helpers shared by the integration flows.

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use shared_bus::{MessageBus, Subscription};

#[cfg(test)]
use shared_types::{BusMessage, ReplyEnvelope, Task, TaskOutcome};

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use tb_01_service_runtime::TaskService;

#[cfg(test)]
use tokio::sync::Notify;

/// Counts the tasks it processed, optionally taking `delay` per task.
#[cfg(test)]
pub struct CountingService {
    pub processed: AtomicUsize,
    pub started: Notify,
    pub delay: Duration,
}

#[cfg(test)]
impl CountingService {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            processed: AtomicUsize::new(0),
            started: Notify::new(),
            delay,
        })
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl TaskService for CountingService {
    fn name(&self) -> &str {
        "CountingService"
    }

    async fn process_task(&self, task: &Task) -> anyhow::Result<TaskOutcome> {
        self.started.notify_one();
        tokio::time::sleep(self.delay).await;
        let count = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        let mut outcome = TaskOutcome::success_with("count", count);
        outcome.fields.insert("task_id".into(), task.id.clone().into());
        Ok(outcome)
    }
}

/// Bare responder on `channel` that ignores the first `swallow` requests and
/// echoes the payload of the rest back as a success.
#[cfg(test)]
pub async fn swallowing_responder(
    bus: &MessageBus,
    channel: &str,
    swallow: usize,
) -> (Arc<AtomicUsize>, tokio::task::JoinHandle<()>) {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut tasks = bus.subscribe(channel).await.unwrap();
    let bus = bus.clone();
    let counter = seen.clone();

    let handle = tokio::spawn(async move {
        while let Ok(Some(message)) = tasks.recv().await {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < swallow {
                continue;
            }
            let task = Task::from_message(message).unwrap();
            let Some(route) = task.reply_route().unwrap() else {
                continue;
            };
            let reply = ReplyEnvelope::new(route.correlation_id, TaskOutcome::success(task.payload));
            bus.publish(&route.channel, &reply).await.unwrap();
        }
    });
    (seen, handle)
}

/// Collect every message arriving on `subscription` within `window`.
#[cfg(test)]
pub async fn drain(subscription: &mut Subscription, window: Duration) -> Vec<BusMessage> {
    let mut messages = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Ok(Some(message))) = tokio::time::timeout_at(deadline, subscription.recv()).await {
        messages.push(message);
    }
    messages
}

/// Poll `condition` until it holds or two seconds pass.
#[cfg(test)]
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
