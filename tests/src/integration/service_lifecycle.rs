//! # Service Lifecycle Flows
//!
//! Start, stop and status of a service runtime while tasks are moving.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{drain, eventually, CountingService};
    use shared_bus::MessageBus;
    use shared_types::{ReplyEnvelope, ServiceState, Task, TaskPayload};
    use std::time::Duration;
    use tb_01_service_runtime::{RuntimeError, ServiceRuntime};

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let bus = MessageBus::in_memory();
        let runtime = ServiceRuntime::new(CountingService::new(Duration::ZERO), bus.clone(), "count_tasks");

        runtime.start().await.unwrap();
        assert!(runtime.is_running());
        assert_eq!(bus.subscriber_count("count_tasks"), 1);

        runtime.stop().await;
        runtime.stop().await;

        assert_eq!(runtime.state(), ServiceState::Stopped);
        assert_eq!(bus.subscriber_count("count_tasks"), 0);
        assert!(!runtime.status().running);
    }

    #[tokio::test]
    async fn test_start_twice_is_a_no_op() {
        let bus = MessageBus::in_memory();
        let runtime = ServiceRuntime::new(CountingService::new(Duration::ZERO), bus.clone(), "count_tasks");

        runtime.start().await.unwrap();
        runtime.start().await.unwrap();
        assert_eq!(bus.subscriber_count("count_tasks"), 1);

        runtime.stop().await;
        assert!(matches!(
            runtime.start().await,
            Err(RuntimeError::Terminated { .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_task() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::from_millis(150));
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "slow_tasks");
        runtime.start().await.unwrap();

        let mut replies = bus.subscribe("probe_replies").await.unwrap();
        let task = Task::request("count", TaskPayload::new(), "probe_replies");
        bus.publish("slow_tasks", &task).await.unwrap();
        service.started.notified().await;

        runtime.stop().await;

        // The task finished and replied before stop returned.
        assert_eq!(service.processed(), 1);
        let messages = drain(&mut replies, Duration::from_millis(100)).await;
        assert_eq!(messages.len(), 1);
        let envelope = ReplyEnvelope::from_message(messages[0].clone()).unwrap();
        assert_eq!(Some(envelope.correlation_id), task.correlation_id);
    }

    #[tokio::test]
    async fn test_no_tasks_processed_after_stop() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::ZERO);
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "count_tasks");
        runtime.start().await.unwrap();

        bus.publish("count_tasks", &Task::fire_and_forget("count", TaskPayload::new()))
            .await
            .unwrap();
        assert!(eventually(|| service.processed() == 1).await);

        runtime.stop().await;
        let receivers = bus
            .publish("count_tasks", &Task::fire_and_forget("count", TaskPayload::new()))
            .await
            .unwrap();

        assert_eq!(receivers, 0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(service.processed(), 1);
    }

    #[tokio::test]
    async fn test_tasks_processed_in_arrival_order() {
        let bus = MessageBus::in_memory();
        let service = CountingService::new(Duration::from_millis(5));
        let runtime = ServiceRuntime::new(service.clone(), bus.clone(), "count_tasks");
        runtime.start().await.unwrap();

        let mut replies = bus.subscribe("probe_replies").await.unwrap();
        let tasks: Vec<Task> = (0..5)
            .map(|_| Task::request("count", TaskPayload::new(), "probe_replies"))
            .collect();
        for task in &tasks {
            bus.publish("count_tasks", task).await.unwrap();
        }

        let messages = drain(&mut replies, Duration::from_millis(300)).await;
        assert_eq!(messages.len(), 5);
        for (i, (message, task)) in messages.into_iter().zip(&tasks).enumerate() {
            let envelope = ReplyEnvelope::from_message(message).unwrap();
            assert_eq!(Some(&envelope.correlation_id), task.correlation_id.as_ref());
            assert_eq!(envelope.data.fields["count"], serde_json::json!(i + 1));
        }

        runtime.stop().await;
    }
}
