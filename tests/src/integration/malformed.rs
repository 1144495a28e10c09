//! # Malformed Message Flows
//!
//! Bad input on a task channel never stops the service. Messages that cannot
//! be identified are dropped; messages with a usable reply route get a
//! failure reply.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{drain, eventually, CountingService};
    use serde_json::json;
    use shared_bus::MessageBus;
    use shared_types::{ReplyEnvelope, Task, TaskPayload};
    use std::time::Duration;
    use tb_01_service_runtime::ServiceRuntime;

    async fn setup() -> (MessageBus, std::sync::Arc<CountingService>, ServiceRuntime) {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::ZERO);
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "count_tasks");
        runtime.start().await.unwrap();
        (bus, service, runtime)
    }

    #[tokio::test]
    async fn test_missing_mandatory_fields_dropped_without_reply() {
        let (bus, service, runtime) = setup().await;
        let mut replies = bus.subscribe("probe_replies").await.unwrap();

        let no_type = json!({
            "id": "t-1",
            "payload": {},
            "correlation_id": "c-1",
            "reply_to_channel": "probe_replies",
        });
        bus.publish("count_tasks", &no_type).await.unwrap();

        assert!(drain(&mut replies, Duration::from_millis(100)).await.is_empty());
        assert_eq!(service.processed(), 0);
        assert!(runtime.is_running());

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_bad_payload_with_route_gets_failure_reply() {
        let (bus, service, runtime) = setup().await;
        let mut replies = bus.subscribe("probe_replies").await.unwrap();

        let bad_payload = json!({
            "id": "t-1",
            "type": "count",
            "payload": "not an object",
            "correlation_id": "c-1",
            "reply_to_channel": "probe_replies",
        });
        bus.publish("count_tasks", &bad_payload).await.unwrap();

        let messages = drain(&mut replies, Duration::from_millis(200)).await;
        assert_eq!(messages.len(), 1);
        let envelope = ReplyEnvelope::from_message(messages[0].clone()).unwrap();
        assert_eq!(envelope.correlation_id, "c-1");
        assert!(!envelope.data.success);
        assert!(envelope
            .data
            .error
            .unwrap()
            .starts_with("CountingService failed to process task:"));
        assert_eq!(service.processed(), 0);

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_non_object_messages_skipped() {
        let (bus, service, runtime) = setup().await;

        bus.publish("count_tasks", &json!("just a string")).await.unwrap();
        bus.publish("count_tasks", &json!([1, 2, 3])).await.unwrap();
        bus.publish("count_tasks", &Task::fire_and_forget("count", TaskPayload::new()))
            .await
            .unwrap();

        assert!(eventually(|| service.processed() == 1).await);
        assert!(runtime.is_running());

        runtime.stop().await;
    }

    #[tokio::test]
    async fn test_half_route_processed_without_reply() {
        let (bus, service, runtime) = setup().await;
        let mut replies = bus.subscribe("probe_replies").await.unwrap();

        let mut task = Task::fire_and_forget("count", TaskPayload::new());
        task.reply_to_channel = Some("probe_replies".into());
        bus.publish("count_tasks", &task).await.unwrap();

        assert!(eventually(|| service.processed() == 1).await);
        assert!(drain(&mut replies, Duration::from_millis(100)).await.is_empty());

        runtime.stop().await;
    }
}
