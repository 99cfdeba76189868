//! Agent tools over the Tasks service
//!
//! Each tool pairs a JSON-schema parameter description with an async
//! handler. Handlers never fail the conversation: every problem comes back
//! as an error [`ToolResult`] the model can react to.

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gtasks_sdk::{
    build_hierarchy, to_display_forest, DisplayNode, GtasksError, TaskInput, TasksService,
};

/// Default cap when the model does not name specific task lists
const MAX_TASK_LISTS: u32 = 5;

/// Outcome of a tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;
type ToolHandler = Box<dyn Fn(serde_json::Value) -> ToolFuture + Send + Sync>;

/// A single callable tool exposed to the model
pub struct AgentTool {
    name: String,
    description: String,
    parameters: serde_json::Value,
    handler: ToolHandler,
}

impl AgentTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        handler: impl Fn(serde_json::Value) -> ToolFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function-calling specification for the chat request
    pub fn spec(&self) -> serde_json::Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    pub async fn invoke(&self, params: serde_json::Value) -> ToolResult {
        (self.handler)(params).await
    }
}

/// The set of tools the assistant can dispatch to
pub struct ToolRegistry {
    tools: Vec<AgentTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn tool(mut self, tool: AgentTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Function specifications for every registered tool
    pub fn specs(&self) -> Vec<serde_json::Value> {
        self.tools.iter().map(AgentTool::spec).collect()
    }

    /// Invoke the named tool; an unknown name is an error result
    pub async fn dispatch(&self, name: &str, params: serde_json::Value) -> ToolResult {
        match self.tools.iter().find(|tool| tool.name == name) {
            Some(tool) => tool.invoke(params).await,
            None => ToolResult::error(format!("Unknown tool: {name}")),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the tasks toolset with all tools
pub fn create_tasks_toolset(service: Arc<dyn TasksService>) -> ToolRegistry {
    ToolRegistry::new()
        .tool(get_task_lists_tool(service.clone()))
        .tool(get_tasks_tool(service.clone()))
        .tool(upsert_task_tool(service))
}

/// Tool: get_task_lists
fn get_task_lists_tool(service: Arc<dyn TasksService>) -> AgentTool {
    AgentTool::new(
        "get_task_lists",
        "Get all task lists.",
        json!({"type": "object", "properties": {}}),
        move |_params| {
            let service = service.clone();
            Box::pin(async move {
                match service.list_task_lists(MAX_TASK_LISTS).await {
                    Ok(response) => match serde_json::to_string_pretty(&response.items) {
                        Ok(json) => ToolResult::text(json),
                        Err(e) => ToolResult::error(format!("Serialization error: {e}")),
                    },
                    Err(e) => ToolResult::error(format!("Failed to list task lists: {e}")),
                }
            })
        },
    )
}

/// Per-list view handed back to the model
#[derive(Debug, Serialize)]
struct TaskListView {
    id: String,
    title: String,
    items: Vec<DisplayNode>,
}

/// Tool: get_tasks
fn get_tasks_tool(service: Arc<dyn TasksService>) -> AgentTool {
    AgentTool::new(
        "get_tasks",
        "Get tasks in a list or all tasks in lists with given ids. \
         Without ids, the first 5 task lists are used.",
        json!({
            "type": "object",
            "properties": {
                "task_list_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Task list IDs to retrieve. Optional."
                }
            }
        }),
        move |params| {
            let service = service.clone();
            Box::pin(async move {
                let requested: Vec<String> = match params.get("task_list_ids") {
                    Some(value) if !value.is_null() => {
                        match serde_json::from_value(value.clone()) {
                            Ok(ids) => ids,
                            Err(_) => {
                                return ToolResult::error(
                                    "task_list_ids must be an array of strings",
                                )
                            }
                        }
                    }
                    _ => Vec::new(),
                };

                match collect_task_lists(service, requested).await {
                    Ok(views) if views.is_empty() => ToolResult::text("No task lists found."),
                    Ok(views) => match serde_yaml::to_string(&views) {
                        Ok(yaml) => ToolResult::text(yaml),
                        Err(e) => ToolResult::error(format!("Serialization error: {e}")),
                    },
                    Err(e) => ToolResult::error(format!("Failed to get tasks: {e}")),
                }
            })
        },
    )
}

/// Resolve the list ids, then fetch and project every list concurrently
async fn collect_task_lists(
    service: Arc<dyn TasksService>,
    requested: Vec<String>,
) -> Result<Vec<TaskListView>, GtasksError> {
    let ids = if requested.is_empty() {
        service
            .list_task_lists(MAX_TASK_LISTS)
            .await?
            .items
            .into_iter()
            .map(|list| list.id)
            .collect()
    } else {
        requested
    };

    try_join_all(ids.into_iter().map(|id| {
        let service = service.clone();
        async move {
            let list = service.get_task_list(&id).await?;
            let tasks = service.list_tasks(&id, false, false).await?;
            let forest = build_hierarchy(&tasks.items);
            Ok(TaskListView {
                id: list.id,
                title: list.title,
                items: to_display_forest(&forest)?,
            })
        }
    }))
    .await
}

/// Tool: upsert_task
fn upsert_task_tool(service: Arc<dyn TasksService>) -> AgentTool {
    AgentTool::new(
        "upsert_task",
        "Create or update a task in a specified task list. \
         Provide the task's id to update it, omit the id to create it.",
        json!({
            "type": "object",
            "properties": {
                "task_list_id": {
                    "type": "string",
                    "description": "Task list ID to create or update the task in"
                },
                "task": {
                    "type": "object",
                    "description": "Task object to create or update",
                    "properties": {
                        "id": {"type": "string", "description": "Task identifier; omit for a new task"},
                        "title": {"type": "string", "description": "Title of the task"},
                        "notes": {"type": "string", "description": "Notes describing the task"},
                        "status": {"type": "string", "enum": ["needsAction", "completed"]},
                        "parent": {"type": "string", "description": "Parent task identifier for subtasks"},
                        "due": {"type": "string", "description": "Due date as an RFC 3339 timestamp"}
                    },
                    "required": ["title"]
                }
            },
            "required": ["task_list_id", "task"]
        }),
        move |params| {
            let service = service.clone();
            Box::pin(async move {
                let task_list_id = match params.get("task_list_id").and_then(|v| v.as_str()) {
                    Some(id) => id.to_string(),
                    None => return ToolResult::error("Missing task_list_id"),
                };

                let input: TaskInput = match params
                    .get("task")
                    .cloned()
                    .ok_or_else(|| "Missing task".to_string())
                    .and_then(|value| {
                        serde_json::from_value(value).map_err(|e| format!("Invalid task: {e}"))
                    }) {
                    Ok(input) => input,
                    Err(message) => return ToolResult::error(message),
                };

                match service.upsert_task(&task_list_id, &input).await {
                    Ok(task) => match serde_json::to_string_pretty(&task) {
                        Ok(json) => ToolResult::text(json),
                        Err(e) => ToolResult::error(format!("Serialization error: {e}")),
                    },
                    Err(e) => ToolResult::error(format!("Failed to upsert task: {e}")),
                }
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtasks_sdk::{
        async_trait, Result, Task, TaskList, TaskListsResponse, TaskStatus, TasksResponse,
    };

    struct StubService;

    #[async_trait]
    impl TasksService for StubService {
        async fn list_task_lists(&self, _max_results: u32) -> Result<TaskListsResponse> {
            Ok(TaskListsResponse {
                items: vec![TaskList {
                    id: "inbox".to_string(),
                    title: "Inbox".to_string(),
                    updated: None,
                }],
            })
        }

        async fn get_task_list(&self, task_list_id: &str) -> Result<TaskList> {
            Ok(TaskList {
                id: task_list_id.to_string(),
                title: "Inbox".to_string(),
                updated: None,
            })
        }

        async fn list_tasks(
            &self,
            _task_list_id: &str,
            _show_completed: bool,
            _show_deleted: bool,
        ) -> Result<TasksResponse> {
            Ok(TasksResponse {
                items: vec![
                    Task {
                        title: Some("Buy milk".to_string()),
                        ..Task::new("A")
                    },
                    Task {
                        title: Some("Buy bread".to_string()),
                        parent: Some("A".to_string()),
                        ..Task::new("B")
                    },
                    Task {
                        title: Some("Lost".to_string()),
                        parent: Some("Z".to_string()),
                        ..Task::new("C")
                    },
                ],
            })
        }

        async fn upsert_task(&self, _task_list_id: &str, input: &TaskInput) -> Result<Task> {
            Ok(Task {
                id: input.id.clone().unwrap_or_else(|| "new-id".to_string()),
                title: Some(input.title.clone()),
                status: Some(input.status),
                ..Task::new("")
            })
        }
    }

    fn toolset() -> ToolRegistry {
        create_tasks_toolset(Arc::new(StubService))
    }

    #[tokio::test]
    async fn test_get_task_lists() {
        let result = toolset().dispatch("get_task_lists", json!({})).await;
        assert!(!result.is_error);
        assert!(result.content.contains("Inbox"));
    }

    #[tokio::test]
    async fn test_get_tasks_renders_nested_yaml() {
        let result = toolset()
            .dispatch("get_tasks", json!({"task_list_ids": ["inbox"]}))
            .await;
        assert!(!result.is_error, "{}", result.content);

        // Child B is nested under A, orphan C is absent.
        assert!(result.content.contains("Buy milk"));
        assert!(result.content.contains("children"));
        assert!(result.content.contains("Buy bread"));
        assert!(!result.content.contains("Lost"));
    }

    #[tokio::test]
    async fn test_get_tasks_defaults_to_discovered_lists() {
        let result = toolset().dispatch("get_tasks", json!({})).await;
        assert!(!result.is_error);
        assert!(result.content.contains("Inbox"));
    }

    #[tokio::test]
    async fn test_get_tasks_rejects_bad_ids() {
        let result = toolset()
            .dispatch("get_tasks", json!({"task_list_ids": "inbox"}))
            .await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_upsert_task_creates() {
        let result = toolset()
            .dispatch(
                "upsert_task",
                json!({"task_list_id": "inbox", "task": {"title": "Water plants"}}),
            )
            .await;
        assert!(!result.is_error, "{}", result.content);
        assert!(result.content.contains("Water plants"));
        assert!(result.content.contains("needsAction"));
    }

    #[tokio::test]
    async fn test_upsert_task_requires_list_id() {
        let result = toolset()
            .dispatch("upsert_task", json!({"task": {"title": "x"}}))
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("task_list_id"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = toolset().dispatch("nope", json!({})).await;
        assert!(result.is_error);
        assert!(result.content.contains("nope"));
    }

    #[test]
    fn test_specs_expose_all_tools() {
        let specs = toolset().specs();
        let names: Vec<&str> = specs
            .iter()
            .map(|spec| spec["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["get_task_lists", "get_tasks", "upsert_task"]);
    }

    #[test]
    fn test_stub_status_defaults() {
        // Guards the closed-set default used by upsert.
        assert_eq!(TaskStatus::default().as_str(), "needsAction");
    }
}
