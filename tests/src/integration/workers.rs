//! # Worker Flows
//!
//! Inference and browser workers hosted on one bus, driven through their
//! typed clients the way an agent would.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use node_runtime::{NodeConfig, RuntimeContext, ServiceRegistry};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tb_02_request_reply::RequestError;
    use tb_04_inference::{InferenceClient, InferenceProvider, InferenceService};
    use tb_05_browser_automation::{BrowserClient, BrowserControlService, BrowserDriver};

    struct Summarizer;

    #[async_trait]
    impl InferenceProvider for Summarizer {
        fn describe(&self) -> String {
            "summarizer".into()
        }

        async fn respond(&self, prompt: &str) -> anyhow::Result<String> {
            Ok(format!("summary({})", prompt.len()))
        }
    }

    /// In-memory browser over a fixed set of pages.
    struct PageBrowser {
        history: Arc<Mutex<Vec<String>>>,
    }

    impl BrowserDriver for PageBrowser {
        fn go_to(&mut self, url: &str) -> anyhow::Result<bool> {
            if url.contains("unreachable") {
                return Ok(false);
            }
            self.history.lock().push(url.to_string());
            Ok(true)
        }

        fn get_text(&mut self) -> anyhow::Result<Option<String>> {
            Ok(self.history.lock().last().map(|url| format!("Welcome to {url}")))
        }

        fn click_element(&mut self, _selector: &str) -> anyhow::Result<bool> {
            Ok(true)
        }

        fn fill_form(&mut self, input_list: &[String]) -> anyhow::Result<bool> {
            Ok(!input_list.is_empty())
        }

        fn get_navigable(&mut self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["https://example.com/docs".into()])
        }

        fn screenshot(&mut self, _filename: &str) -> anyhow::Result<bool> {
            Ok(true)
        }

        fn screenshot_path(&self) -> String {
            ".screenshots/updated_screen.png".into()
        }

        fn get_current_url(&mut self) -> anyhow::Result<String> {
            self.history
                .lock()
                .last()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no page loaded"))
        }

        fn go_back(&mut self) -> anyhow::Result<()> {
            self.history.lock().pop();
            Ok(())
        }

        fn get_form_inputs(&mut self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["[search](q)".into()])
        }
    }

    struct Node {
        context: RuntimeContext,
        registry: ServiceRegistry,
    }

    async fn node() -> Node {
        let context = RuntimeContext::connect(NodeConfig {
            request_timeout: Duration::from_secs(2),
            ..NodeConfig::default()
        })
        .await
        .unwrap();

        let registry = ServiceRegistry::new();
        let inference = InferenceService::new(Some(Arc::new(Summarizer)));
        registry
            .register(context.service_runtime(Arc::new(inference), &context.config().llm_task_channel))
            .unwrap();
        let browser = BrowserControlService::new(Some(Box::new(PageBrowser {
            history: Arc::default(),
        })));
        registry
            .register(context.service_runtime(Arc::new(browser), &context.config().browser_task_channel))
            .unwrap();
        registry.start_all().await.unwrap();

        Node { context, registry }
    }

    #[tokio::test]
    async fn test_inference_round_trip() {
        let node = node().await;
        let client = InferenceClient::new(Arc::new(
            node.context.request_client("agent_replies", "research"),
        ));

        let result = client.analyze("twelve chars").await.unwrap();
        assert_eq!(result, "summary(12)");

        let missing = client.analyze("").await;
        assert_eq!(
            missing,
            Err(RequestError::Remote(
                "No content provided for analysis in task payload".into()
            ))
        );

        node.registry.stop_all().await;
    }

    #[tokio::test]
    async fn test_browser_session() {
        let node = node().await;
        let client = BrowserClient::new(Arc::new(
            node.context.request_client("agent_replies", "browser"),
        ));

        let data = client.navigate("https://example.com").await.unwrap();
        assert_eq!(data.get("status"), Some(&json!("Navigation successful")));

        let data = client.get_text().await.unwrap();
        assert_eq!(
            data.get("text_content"),
            Some(&json!("Welcome to https://example.com"))
        );

        let data = client.get_navigable_links().await.unwrap();
        assert_eq!(data.get("links"), Some(&json!(["https://example.com/docs"])));

        let data = client.fill_form(vec!["q(rust)".into()]).await.unwrap();
        assert_eq!(data.get("form_filled"), Some(&json!(true)));

        let data = client.screenshot(None).await.unwrap();
        assert_eq!(
            data.get("screenshot_path"),
            Some(&json!(".screenshots/updated_screen.png"))
        );

        client.go_back().await.unwrap();
        let result = client.get_current_url().await;
        assert_eq!(
            result,
            Err(RequestError::Remote(
                "Error in browser_get_current_url: no page loaded".into()
            ))
        );

        node.registry.stop_all().await;
    }

    #[tokio::test]
    async fn test_failed_navigation_reported() {
        let node = node().await;
        let client = BrowserClient::new(Arc::new(
            node.context.request_client("agent_replies", "browser"),
        ));

        let result = client.navigate("https://unreachable.example").await;
        assert_eq!(
            result,
            Err(RequestError::Remote(
                "Task browser_navigate failed in service browser_tasks".into()
            ))
        );

        node.registry.stop_all().await;
    }

    #[tokio::test]
    async fn test_workers_share_one_bus() {
        let node = node().await;
        let requests = Arc::new(node.context.request_client("agent_replies", "planner"));
        let inference = InferenceClient::new(requests.clone());
        let browser = BrowserClient::new(requests.clone());

        let (text, page) = tokio::join!(inference.analyze("plan"), browser.navigate("https://example.com"));
        assert_eq!(text.unwrap(), "summary(4)");
        assert!(page.is_ok());
        assert_eq!(requests.pending().pending_count(), 0);

        assert!(node.registry.is_healthy());
        node.registry.stop_all().await;
        assert!(!node.registry.is_healthy());
    }
}
