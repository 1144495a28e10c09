//! # Retry Flows
//!
//! The retry executor wrapped around complete request/reply exchanges. Each
//! attempt is a fresh request with its own correlation id and deadline.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::swallowing_responder;
    use async_trait::async_trait;
    use node_runtime::{NodeConfig, RuntimeContext};
    use serde_json::json;
    use shared_bus::MessageBus;
    use shared_types::{Task, TaskOutcome, TaskPayload};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tb_01_service_runtime::{ServiceRuntime, TaskService};
    use tb_02_request_reply::RequestError;
    use tb_03_retry_executor::RetryPolicy;

    /// Fails the first `failures` tasks with a business error.
    struct Flaky {
        calls: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl TaskService for Flaky {
        fn name(&self) -> &str {
            "FlakyService"
        }

        async fn process_task(&self, _task: &Task) -> anyhow::Result<TaskOutcome> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Ok(TaskOutcome::failure(format!("attempt {n} failed")))
            } else {
                Ok(TaskOutcome::success_with("attempt", n))
            }
        }
    }

    fn context(bus: MessageBus, max_retries: u32) -> RuntimeContext {
        let config = NodeConfig {
            request_timeout: Duration::from_millis(100),
            retry: RetryPolicy::new(max_retries, Duration::from_millis(10)).unwrap(),
            ..NodeConfig::default()
        };
        RuntimeContext::with_bus(bus, config)
    }

    #[tokio::test]
    async fn test_retry_recovers_from_timeouts() {
        let bus = MessageBus::in_memory();
        let (seen, _responder) = swallowing_responder(&bus, "quiet_tasks", 2).await;
        let context = context(bus, 3);
        let client = context.request_client("agent_replies", "casual");
        let timeout = context.config().request_timeout;

        let fields = context
            .retry_executor("quiet_round_trip")
            .with_retry_when(
                || client.send("quiet_tasks", "echo", TaskPayload::new(), timeout),
                RequestError::is_retriable,
            )
            .await
            .unwrap();

        assert!(fields.is_empty());
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(client.pending().pending_count(), 0);
        assert_eq!(client.pending().stats().total_timeouts.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let bus = MessageBus::in_memory();
        let (seen, _responder) = swallowing_responder(&bus, "quiet_tasks", usize::MAX).await;
        let context = context(bus, 2);
        let client = context.request_client("agent_replies", "casual");
        let timeout = context.config().request_timeout;

        let result = context
            .retry_executor("quiet_round_trip")
            .with_retry(|| client.send("quiet_tasks", "echo", TaskPayload::new(), timeout))
            .await;

        assert!(matches!(result, Err(RequestError::Timeout { .. })));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(client.pending().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_failures_retried_when_asked() {
        let bus = MessageBus::in_memory();
        let service = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
            failures: 2,
        });
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "flaky_tasks");
        runtime.start().await.unwrap();
        let context = context(bus, 3);
        let client = context.request_client("agent_replies", "casual");
        let timeout = context.config().request_timeout;

        let fields = context
            .retry_executor("flaky_round_trip")
            .with_retry(|| client.send("flaky_tasks", "work", TaskPayload::new(), timeout))
            .await
            .unwrap();

        assert_eq!(fields.get("attempt"), Some(&json!(3)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_remote_failures_not_retriable() {
        let bus = MessageBus::in_memory();
        let service = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
            failures: 2,
        });
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "flaky_tasks");
        runtime.start().await.unwrap();
        let context = context(bus, 3);
        let client = context.request_client("agent_replies", "casual");
        let timeout = context.config().request_timeout;

        let result = context
            .retry_executor("flaky_round_trip")
            .with_retry_when(
                || client.send("flaky_tasks", "work", TaskPayload::new(), timeout),
                RequestError::is_retriable,
            )
            .await;

        assert_eq!(result, Err(RequestError::Remote("attempt 1 failed".into())));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        runtime.stop().await;
    }
}
