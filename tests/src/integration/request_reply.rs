//! # Request/Reply Flows
//!
//! ```text
//! RequestReplyClient ──Task──→ echo_tasks ──→ ServiceRuntime(EchoService)
//!         ▲                                            │
//!         └───────── ReplyEnvelope on private channel ─┘
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{drain, eventually, swallowing_responder, CountingService};
    use node_runtime::{echo_service, NodeConfig, RuntimeContext};
    use serde_json::json;
    use shared_bus::MessageBus;
    use shared_types::{ReplyEnvelope, Task, TaskOutcome, TaskPayload};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tb_01_service_runtime::ServiceRuntime;
    use tb_02_request_reply::{RequestError, RequestReplyClient};

    fn payload(value: serde_json::Value) -> TaskPayload {
        value.as_object().cloned().unwrap()
    }

    async fn echo_node() -> (RuntimeContext, ServiceRuntime) {
        let context = RuntimeContext::connect(NodeConfig::default()).await.unwrap();
        let runtime = context.service_runtime(Arc::new(echo_service().unwrap()), "echo_tasks");
        runtime.start().await.unwrap();
        (context, runtime)
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let (context, runtime) = echo_node().await;
        let client = context.request_client("agent_replies", "casual");

        let fields = client
            .send("echo_tasks", "echo", payload(json!({"message": "ping"})), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(fields.get("response"), Some(&json!("ping")));
        assert_eq!(client.pending().pending_count(), 0);

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_unsupported_type_is_remote_error() {
        let (context, runtime) = echo_node().await;
        let client = context.request_client("agent_replies", "casual");

        let result = client
            .send("echo_tasks", "shout", TaskPayload::new(), Duration::from_secs(2))
            .await;

        assert_eq!(
            result,
            Err(RequestError::Remote(
                "Unsupported task type for EchoService: shout".into()
            ))
        );
        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_fire_and_forget_is_processed_without_reply() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::ZERO);
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "count_tasks");
        runtime.start().await.unwrap();

        let published_before = bus.stats().published;
        bus.publish("count_tasks", &Task::fire_and_forget("count", TaskPayload::new()))
            .await
            .unwrap();

        assert!(eventually(|| service.processed() == 1).await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Only the task itself was published; no reply followed it.
        assert_eq!(bus.stats().published, published_before + 1);

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_exactly_one_reply_per_request() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::ZERO);
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "count_tasks");
        runtime.start().await.unwrap();

        let mut replies = bus.subscribe("probe_replies").await.unwrap();
        let task = Task::request("count", TaskPayload::new(), "probe_replies");
        let correlation_id = task.correlation_id.clone().unwrap();
        bus.publish("count_tasks", &task).await.unwrap();

        let messages = drain(&mut replies, Duration::from_millis(200)).await;
        assert_eq!(messages.len(), 1);
        let envelope = ReplyEnvelope::from_message(messages[0].clone()).unwrap();
        assert_eq!(envelope.correlation_id, correlation_id);
        assert!(envelope.data.success);

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_timeout_leaves_no_residue_and_late_reply_is_ignored() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::from_millis(200));
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "slow_tasks");
        runtime.start().await.unwrap();
        let client = RequestReplyClient::for_owner(bus, "agent_replies", "casual");

        let result = client
            .send("slow_tasks", "count", TaskPayload::new(), Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(RequestError::Timeout { .. })));
        assert_eq!(client.pending().pending_count(), 0);

        // The service still finishes and replies; nobody is waiting.
        let stats = client.pending().stats();
        assert!(eventually(|| stats.total_unmatched.load(Ordering::Relaxed) == 1).await);
        assert_eq!(service.processed(), 1);

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_unmatched_reply_does_not_disturb_pending_request() {
        let bus = MessageBus::in_memory();
        let (seen, _responder) = swallowing_responder(&bus, "quiet_tasks", 1).await;
        let client = Arc::new(RequestReplyClient::for_owner(bus.clone(), "agent_replies", "casual"));

        let waiting = {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .send_with_correlation_id(
                        "quiet_tasks",
                        "echo",
                        TaskPayload::new(),
                        Duration::from_millis(300),
                        "c-1".into(),
                    )
                    .await
            })
        };
        assert!(eventually(|| seen.load(Ordering::SeqCst) == 1).await);

        let stray = ReplyEnvelope::new("c-unknown", TaskOutcome::success_with("x", 1));
        bus.publish(client.reply_channel().as_str(), &stray).await.unwrap();
        let stats = client.pending().stats();
        assert!(eventually(|| stats.total_unmatched.load(Ordering::Relaxed) == 1).await);
        assert!(client.pending().is_pending("c-1"));

        let result = waiting.await.unwrap();
        assert!(matches!(result, Err(RequestError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_correlated() {
        let bus = MessageBus::in_memory();
        let (_seen, _responder) = swallowing_responder(&bus, "mirror_tasks", 0).await;
        let client = Arc::new(RequestReplyClient::for_owner(bus, "agent_replies", "casual"));

        let calls: Vec<_> = (0..10)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let fields = client
                        .send(
                            "mirror_tasks",
                            "mirror",
                            payload(json!({"n": i})),
                            Duration::from_secs(2),
                        )
                        .await
                        .unwrap();
                    (i, fields)
                })
            })
            .collect();

        for call in calls {
            let (i, fields) = call.await.unwrap();
            assert_eq!(fields.get("n"), Some(&json!(i)));
        }
        assert_eq!(client.pending().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_two_clients_do_not_see_each_others_replies() {
        let (context, runtime) = echo_node().await;
        let a = context.request_client("agent_replies", "a");
        let b = context.request_client("agent_replies", "b");

        let (ra, rb) = tokio::join!(
            a.send("echo_tasks", "echo", payload(json!({"message": "from a"})), Duration::from_secs(2)),
            b.send("echo_tasks", "echo", payload(json!({"message": "from b"})), Duration::from_secs(2)),
        );

        assert_eq!(ra.unwrap().get("response"), Some(&json!("from a")));
        assert_eq!(rb.unwrap().get("response"), Some(&json!("from b")));
        assert_eq!(a.pending().stats().total_unmatched.load(Ordering::Relaxed), 0);
        assert_eq!(b.pending().stats().total_unmatched.load(Ordering::Relaxed), 0);

        runtime.stop().await;
    }
}
