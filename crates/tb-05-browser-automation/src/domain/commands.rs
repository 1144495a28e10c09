//! Browser task types and payloads.
//!
//! | Task type | Payload | Reply `data` |
//! |-----------|---------|--------------|
//! | `browser_navigate` | `{url}` | `{status}` |
//! | `browser_get_text` | `{}` | `{text_content}` |
//! | `browser_click_element` | `{selector}` (XPath) | `{clicked}` |
//! | `browser_fill_form` | `{input_list: ["name(value)", ..]}` | `{form_filled}` |
//! | `browser_get_navigable_links` | `{}` | `{links}` |
//! | `browser_screenshot` | `{path?}` | `{screenshot_path}` |
//! | `browser_get_current_url` | `{}` | `{url}` |
//! | `browser_go_back` | `{}` | `{status}` |
//! | `browser_get_form_inputs` | `{}` | `{inputs}` |

use serde_json::Value;
use shared_types::commands::{optional_str, required_str};
use shared_types::{CommandError, TaskCommand, TaskPayload};

pub const BROWSER_NAVIGATE: &str = "browser_navigate";
pub const BROWSER_GET_TEXT: &str = "browser_get_text";
pub const BROWSER_CLICK_ELEMENT: &str = "browser_click_element";
pub const BROWSER_FILL_FORM: &str = "browser_fill_form";
pub const BROWSER_GET_NAVIGABLE_LINKS: &str = "browser_get_navigable_links";
pub const BROWSER_SCREENSHOT: &str = "browser_screenshot";
pub const BROWSER_GET_CURRENT_URL: &str = "browser_get_current_url";
pub const BROWSER_GO_BACK: &str = "browser_go_back";
pub const BROWSER_GET_FORM_INPUTS: &str = "browser_get_form_inputs";

/// Every task type the worker accepts.
pub const BROWSER_TASK_TYPES: [&str; 9] = [
    BROWSER_NAVIGATE,
    BROWSER_GET_TEXT,
    BROWSER_CLICK_ELEMENT,
    BROWSER_FILL_FORM,
    BROWSER_GET_NAVIGABLE_LINKS,
    BROWSER_SCREENSHOT,
    BROWSER_GET_CURRENT_URL,
    BROWSER_GO_BACK,
    BROWSER_GET_FORM_INPUTS,
];

/// Screenshot file used when the task names none.
pub const DEFAULT_SCREENSHOT_FILE: &str = "updated_screen.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    Navigate { url: String },
    GetText,
    /// `selector` is an XPath expression.
    ClickElement { selector: String },
    /// Entries are `name(value)`.
    FillForm { input_list: Vec<String> },
    GetNavigableLinks,
    Screenshot { path: Option<String> },
    GetCurrentUrl,
    GoBack,
    GetFormInputs,
}

impl BrowserCommand {
    /// Screenshot file name, falling back to [`DEFAULT_SCREENSHOT_FILE`].
    pub fn screenshot_file(path: Option<&str>) -> &str {
        path.unwrap_or(DEFAULT_SCREENSHOT_FILE)
    }
}

impl TaskCommand for BrowserCommand {
    fn task_type(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => BROWSER_NAVIGATE,
            Self::GetText => BROWSER_GET_TEXT,
            Self::ClickElement { .. } => BROWSER_CLICK_ELEMENT,
            Self::FillForm { .. } => BROWSER_FILL_FORM,
            Self::GetNavigableLinks => BROWSER_GET_NAVIGABLE_LINKS,
            Self::Screenshot { .. } => BROWSER_SCREENSHOT,
            Self::GetCurrentUrl => BROWSER_GET_CURRENT_URL,
            Self::GoBack => BROWSER_GO_BACK,
            Self::GetFormInputs => BROWSER_GET_FORM_INPUTS,
        }
    }

    fn to_payload(&self) -> TaskPayload {
        let mut payload = TaskPayload::new();
        match self {
            Self::Navigate { url } => {
                payload.insert("url".into(), url.clone().into());
            }
            Self::ClickElement { selector } => {
                payload.insert("selector".into(), selector.clone().into());
            }
            Self::FillForm { input_list } => {
                payload.insert("input_list".into(), input_list.clone().into());
            }
            Self::Screenshot { path: Some(path) } => {
                payload.insert("path".into(), path.clone().into());
            }
            _ => {}
        }
        payload
    }

    fn parse(task_type: &str, payload: &TaskPayload) -> Result<Self, CommandError> {
        Ok(match task_type {
            BROWSER_NAVIGATE => Self::Navigate {
                url: required_str(payload, task_type, "url")?,
            },
            BROWSER_GET_TEXT => Self::GetText,
            BROWSER_CLICK_ELEMENT => Self::ClickElement {
                selector: required_str(payload, task_type, "selector")?,
            },
            BROWSER_FILL_FORM => Self::FillForm {
                input_list: string_list(payload, task_type, "input_list")?,
            },
            BROWSER_GET_NAVIGABLE_LINKS => Self::GetNavigableLinks,
            BROWSER_SCREENSHOT => Self::Screenshot {
                path: optional_str(payload, task_type, "path")?,
            },
            BROWSER_GET_CURRENT_URL => Self::GetCurrentUrl,
            BROWSER_GO_BACK => Self::GoBack,
            BROWSER_GET_FORM_INPUTS => Self::GetFormInputs,
            other => return Err(CommandError::UnsupportedTaskType(other.to_string())),
        })
    }
}

/// A required, non-empty list of strings.
fn string_list(
    payload: &TaskPayload,
    task_type: &str,
    field: &'static str,
) -> Result<Vec<String>, CommandError> {
    let items = match payload.get(field) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        None | Some(Value::Null) | Some(Value::Array(_)) => {
            return Err(CommandError::MissingField {
                task_type: task_type.to_string(),
                field,
            })
        }
        Some(other) => {
            return Err(CommandError::InvalidField {
                task_type: task_type.to_string(),
                field,
                reason: format!("expected list of strings, got {other}"),
            })
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(CommandError::InvalidField {
                task_type: task_type.to_string(),
                field,
                reason: format!("expected string entry, got {other}"),
            }),
        })
        .collect()
}
