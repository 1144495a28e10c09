//! # Channel Names
//!
//! Task channels are shared, well-known names. Reply channels are private to
//! one requester instance and generated at startup.

use std::fmt;
use uuid::Uuid;

/// Default task channel of the inference worker.
pub const LLM_TASKS: &str = "llm_tasks";

/// Default task channel of the browser automation worker.
pub const BROWSER_TASKS: &str = "browser_tasks";

/// Default task channel of the echo worker.
pub const ECHO_TASKS: &str = "echo_tasks";

/// Private reply channel of a requester instance.
///
/// Format: `<role>:<instance>:<uuid>`. The random suffix keeps two replicas of
/// the same requester from reading each other's replies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyChannel(String);

impl ReplyChannel {
    /// Generate a fresh reply channel name for `role` / `instance`.
    pub fn generate(role: &str, instance: &str) -> Self {
        Self(format!(
            "{}:{}:{}",
            sanitize(role),
            sanitize(instance),
            Uuid::new_v4()
        ))
    }

    /// Use an existing channel name verbatim.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReplyChannel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_whitespace() || c == ':' { '_' } else { c })
        .collect()
}
