// Task hierarchy construction and display projection
pub mod hierarchy;

pub use hierarchy::{build_hierarchy, to_display_forest, DisplayNode, TaskNode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export async trait for convenience
pub use async_trait::async_trait;

/// Status of a task, a closed set with an explicit default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    NeedsAction,
    Completed,
}

impl TaskStatus {
    /// Bare enum value string as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NeedsAction => "needsAction",
            TaskStatus::Completed => "completed",
        }
    }
}

/// A single task record as returned by the Google Tasks API
///
/// `parent` is omitted for top-level tasks. Timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier, unique within a list
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Parent task identifier; omitted if this is a top-level task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Position among sibling tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Due date of the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    /// Completion date of the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    /// Last modification time of the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Task {
    /// Minimal record with only an id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            parent: None,
            position: None,
            notes: None,
            status: None,
            due: None,
            completed: None,
            deleted: None,
            updated: None,
        }
    }
}

/// Task fields accepted when creating or updating a task
///
/// Optional fields are excluded from the request body so the API keeps
/// its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Existing task id; when set the task is updated, otherwise created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
}

/// A task list (metadata only, no items)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// Response of a tasks listing call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksResponse {
    /// Collection of items; the API omits the field when empty
    #[serde(default)]
    pub items: Vec<Task>,
}

/// Response of a task lists listing call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListsResponse {
    #[serde(default)]
    pub items: Vec<TaskList>,
}

/// Errors produced by the SDK and by service implementations
#[derive(Debug, Error)]
pub enum GtasksError {
    /// A record lacked a field the display projection requires
    #[error("task record missing required field `{field}`: {record}")]
    MissingField {
        field: &'static str,
        /// Serialized content of the offending record
        record: String,
    },

    /// The API answered with a non-success status
    #[error("Google Tasks API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl GtasksError {
    pub fn transport(message: impl Into<String>) -> Self {
        GtasksError::Transport(message.into())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, GtasksError>;

/// Handle to a Google Tasks backend
///
/// Implementations own authentication and transport; callers receive
/// already-deserialized records. The handle is constructed explicitly and
/// passed down rather than living in process-wide state.
#[async_trait]
pub trait TasksService: Send + Sync {
    /// List task lists, capped at `max_results`
    async fn list_task_lists(&self, max_results: u32) -> Result<TaskListsResponse>;

    /// Fetch metadata for a single task list
    async fn get_task_list(&self, task_list_id: &str) -> Result<TaskList>;

    /// List the tasks in a list
    async fn list_tasks(
        &self,
        task_list_id: &str,
        show_completed: bool,
        show_deleted: bool,
    ) -> Result<TasksResponse>;

    /// Create the task, or update it when `input.id` is set
    async fn upsert_task(&self, task_list_id: &str, input: &TaskInput) -> Result<Task>;
}

// ============================================================================
// Console Logging Macros
// ============================================================================

/// Logs an informational message.
///
/// # Example
/// ```
/// use gtasks_sdk::log_info;
/// log_info!("Loaded 3 task lists");
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a debug message (intended to be used conditionally).
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a tool invocation made by the assistant.
///
/// # Example
/// ```
/// use gtasks_sdk::log_tool_call;
/// log_tool_call!("get_tasks", "{\"task_list_ids\":[\"inbox\"]}");
/// ```
#[macro_export]
macro_rules! log_tool_call {
    ($name:expr, $input:expr) => {
        println!("\x1b[36m  → Calling tool {}: {}\x1b[0m", $name, $input);
    };
}

/// Logs that a file has been saved.
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
