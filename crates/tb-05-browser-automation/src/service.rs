//! Browser control service: executes `browser_*` tasks on a [`BrowserDriver`].
//!
//! Driver calls run on tokio's blocking pool behind a mutex, so one browser
//! action runs at a time and the async executor is never stalled.

use crate::domain::commands::{
    BrowserCommand, BROWSER_CLICK_ELEMENT, BROWSER_FILL_FORM, BROWSER_NAVIGATE,
};
use crate::ports::outbound::BrowserDriver;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use shared_types::{CommandError, Task, TaskCommand, TaskOutcome};
use std::sync::Arc;
use tb_01_service_runtime::TaskService;
use tracing::{error, info, warn};

pub const DEFAULT_SERVICE_NAME: &str = "BrowserControlService";

type SharedDriver = Arc<Mutex<Box<dyn BrowserDriver>>>;

pub struct BrowserControlService {
    name: String,
    driver: Option<SharedDriver>,
}

impl BrowserControlService {
    pub fn new(driver: Option<Box<dyn BrowserDriver>>) -> Self {
        Self::with_name(DEFAULT_SERVICE_NAME, driver)
    }

    pub fn with_name(name: impl Into<String>, driver: Option<Box<dyn BrowserDriver>>) -> Self {
        let name = name.into();
        if driver.is_some() {
            info!(service = %name, "Browser instance configured");
        } else {
            warn!(service = %name, "Browser instance not configured; browser tasks will fail");
        }
        Self {
            name,
            driver: driver.map(|d| Arc::new(Mutex::new(d))),
        }
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Run `call` on a blocking thread with exclusive access to the driver.
    async fn on_driver<T, F>(driver: &SharedDriver, call: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn BrowserDriver) -> anyhow::Result<T> + Send + 'static,
    {
        let driver = driver.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = driver.lock();
            call(&mut **guard)
        })
        .await?
    }

    async fn execute(driver: &SharedDriver, command: BrowserCommand) -> anyhow::Result<TaskOutcome> {
        let outcome = match command {
            BrowserCommand::Navigate { url } => {
                let ok = Self::on_driver(driver, move |d| d.go_to(&url)).await?;
                let status = if ok { "Navigation successful" } else { "Navigation failed" };
                with_data(ok, json!({ "status": status }))
            }
            BrowserCommand::GetText => match Self::on_driver(driver, |d| d.get_text()).await? {
                Some(text) => with_data(true, json!({ "text_content": text })),
                None => TaskOutcome::failure("Failed to get text content"),
            },
            BrowserCommand::ClickElement { selector } => {
                let ok = Self::on_driver(driver, move |d| d.click_element(&selector)).await?;
                with_data(ok, json!({ "clicked": ok }))
            }
            BrowserCommand::FillForm { input_list } => {
                let ok = Self::on_driver(driver, move |d| d.fill_form(&input_list)).await?;
                with_data(ok, json!({ "form_filled": ok }))
            }
            BrowserCommand::GetNavigableLinks => {
                let links = Self::on_driver(driver, |d| d.get_navigable()).await?;
                with_data(true, json!({ "links": links }))
            }
            BrowserCommand::Screenshot { path } => {
                let filename = BrowserCommand::screenshot_file(path.as_deref()).to_string();
                let saved = Self::on_driver(driver, move |d| {
                    Ok(if d.screenshot(&filename)? {
                        Some(d.screenshot_path())
                    } else {
                        None
                    })
                })
                .await?;
                match saved {
                    Some(path) => with_data(true, json!({ "screenshot_path": path })),
                    None => TaskOutcome::failure("Failed to take screenshot"),
                }
            }
            BrowserCommand::GetCurrentUrl => {
                let url = Self::on_driver(driver, |d| d.get_current_url()).await?;
                with_data(true, json!({ "url": url }))
            }
            BrowserCommand::GoBack => {
                Self::on_driver(driver, |d| d.go_back()).await?;
                with_data(true, json!({ "status": "Navigated back" }))
            }
            BrowserCommand::GetFormInputs => {
                let inputs = Self::on_driver(driver, |d| d.get_form_inputs()).await?;
                with_data(true, json!({ "inputs": inputs }))
            }
        };
        Ok(outcome)
    }
}

/// `{success, data}` outcome. A driver-reported `false` is a failure without
/// a reason.
fn with_data(success: bool, data: Value) -> TaskOutcome {
    let mut fields = Map::new();
    fields.insert("data".into(), data);
    TaskOutcome {
        success,
        error: None,
        fields,
    }
}

fn invalid_payload_message(task_type: &str) -> String {
    match task_type {
        BROWSER_NAVIGATE => "URL not provided for navigate".to_string(),
        BROWSER_CLICK_ELEMENT => "Selector (XPath) not provided for click_element".to_string(),
        BROWSER_FILL_FORM => "input_list (list of strings) not provided or invalid for fill_form".to_string(),
        other => format!("Invalid payload for {other}"),
    }
}

#[async_trait]
impl TaskService for BrowserControlService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process_task(&self, task: &Task) -> anyhow::Result<TaskOutcome> {
        info!(
            service = %self.name,
            task_id = %task.id,
            correlation_id = ?task.correlation_id,
            task_type = %task.task_type,
            "Processing browser task"
        );

        let Some(driver) = &self.driver else {
            error!(service = %self.name, task_id = %task.id, "Browser instance not available");
            return Ok(TaskOutcome::failure(
                "Browser instance not configured for this service.",
            ));
        };

        let command = match BrowserCommand::from_task(task) {
            Ok(command) => command,
            Err(CommandError::UnsupportedTaskType(task_type)) => {
                warn!(service = %self.name, task_id = %task.id, task_type = %task_type, "Unsupported browser task type");
                return Ok(TaskOutcome::failure(format!(
                    "Unsupported browser task type: {task_type}"
                )));
            }
            Err(e) => {
                warn!(service = %self.name, task_id = %task.id, error = %e, "Invalid browser task payload");
                return Ok(TaskOutcome::failure(invalid_payload_message(&task.task_type)));
            }
        };

        match Self::execute(driver, command).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(
                    service = %self.name,
                    task_id = %task.id,
                    correlation_id = ?task.correlation_id,
                    task_type = %task.task_type,
                    error = %e,
                    "Error processing browser task"
                );
                Ok(TaskOutcome::failure(format!("Error in {}: {e}", task.task_type)))
            }
        }
    }
}
