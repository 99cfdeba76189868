//! Task hierarchy construction and display projection
//!
//! The Tasks API returns each list as a flat sequence where subtasks carry a
//! `parent` reference. [`build_hierarchy`] folds that sequence into a forest
//! of top-level tasks with their children attached, and [`to_display_forest`]
//! projects the forest into the trimmed, serializable shape handed back to
//! the assistant.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{GtasksError, Result, Task};

/// A task record with its resolved child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub task: Task,
    /// Children in the order they appeared in the flat input
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    fn leaf(task: Task) -> Self {
        Self {
            task,
            children: Vec::new(),
        }
    }
}

/// Serializable projection of a [`TaskNode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub id: String,
    pub title: String,
    /// Empty string when the record has no notes
    pub notes: String,
    /// Bare status value, or the literal `"unknown"` when absent
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

/// Build a forest of top-level tasks from a flat record sequence.
///
/// Records without a parent become roots, in input order. Records with a
/// parent are attached to that root, in input order. A record whose parent
/// is not itself a top-level task (the parent id is unknown, or the parent
/// is a nested task) is dropped from the output entirely, matching the
/// API's single level of indentation.
///
/// Resolves exactly one level of nesting and never fails.
pub fn build_hierarchy(tasks: &[Task]) -> Vec<TaskNode> {
    let mut root_order: Vec<&str> = Vec::new();
    let mut roots: HashMap<&str, TaskNode> = HashMap::new();

    for task in tasks {
        if task.parent.as_deref().map_or(true, str::is_empty) {
            root_order.push(&task.id);
            roots.insert(&task.id, TaskNode::leaf(task.clone()));
        }
    }

    for task in tasks {
        let Some(parent_id) = task.parent.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        if let Some(parent) = roots.get_mut(parent_id) {
            parent.children.push(TaskNode::leaf(task.clone()));
        }
        // Parent is not a top-level task: the record is orphaned and omitted.
    }

    root_order
        .into_iter()
        .filter_map(|id| roots.remove(id))
        .collect()
}

/// Project a forest into display nodes, depth first, preserving child order.
///
/// Fails on the first record missing `id` or `title`; the error carries the
/// offending record's serialized content so the caller can see which task
/// was malformed. No partial output is produced.
pub fn to_display_forest(forest: &[TaskNode]) -> Result<Vec<DisplayNode>> {
    forest.iter().map(project_node).collect()
}

fn project_node(node: &TaskNode) -> Result<DisplayNode> {
    let task = &node.task;
    if task.id.is_empty() {
        return Err(missing_field("id", task));
    }
    let title = task
        .title
        .clone()
        .ok_or_else(|| missing_field("title", task))?;

    Ok(DisplayNode {
        id: task.id.clone(),
        title,
        notes: task.notes.clone().unwrap_or_default(),
        status: task
            .status
            .map(|status| status.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        children: to_display_forest(&node.children)?,
    })
}

fn missing_field(field: &'static str, task: &Task) -> GtasksError {
    GtasksError::MissingField {
        field,
        record: serde_json::to_string(task).unwrap_or_else(|_| format!("{task:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskStatus;

    fn task(id: &str, title: &str, parent: Option<&str>) -> Task {
        Task {
            title: Some(title.to_string()),
            parent: parent.map(str::to_string),
            ..Task::new(id)
        }
    }

    fn node_count(forest: &[TaskNode]) -> usize {
        forest
            .iter()
            .map(|node| 1 + node_count(&node.children))
            .sum()
    }

    #[test]
    fn test_flat_input_preserves_order() {
        let tasks = vec![
            task("C", "Third", None),
            task("A", "First", None),
            task("B", "Second", None),
        ];

        let forest = build_hierarchy(&tasks);
        let ids: Vec<&str> = forest.iter().map(|n| n.task.id.as_str()).collect();
        assert_eq!(ids, ["C", "A", "B"]);
        assert!(forest.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_child_attaches_to_root_parent() {
        let tasks = vec![
            task("A", "Buy milk", None),
            task("B", "Buy bread", Some("A")),
        ];

        let forest = build_hierarchy(&tasks);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].task.id, "A");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].task.id, "B");
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn test_children_keep_input_order() {
        let tasks = vec![
            task("A", "Parent", None),
            task("C", "Second child", Some("A")),
            task("B", "First child", Some("A")),
        ];

        let forest = build_hierarchy(&tasks);
        let child_ids: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|n| n.task.id.as_str())
            .collect();
        assert_eq!(child_ids, ["C", "B"]);
    }

    #[test]
    fn test_unknown_parent_drops_child() {
        let tasks = vec![
            task("A", "Buy milk", None),
            task("B", "Ghost child", Some("Z")),
        ];

        let forest = build_hierarchy(&tasks);
        assert_eq!(node_count(&forest), 1);
        assert_eq!(forest[0].task.id, "A");
    }

    #[test]
    fn test_nested_parent_drops_grandchild() {
        // C's parent B is itself a child, not a root, so C is omitted
        // rather than attached at depth two.
        let tasks = vec![
            task("A", "Root", None),
            task("B", "Child", Some("A")),
            task("C", "Grandchild", Some("B")),
        ];

        let forest = build_hierarchy(&tasks);
        assert_eq!(node_count(&forest), 2);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].task.id, "B");
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn test_empty_parent_string_counts_as_root() {
        let mut record = task("A", "Buy milk", None);
        record.parent = Some(String::new());

        let forest = build_hierarchy(&[record]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].task.id, "A");
    }

    #[test]
    fn test_node_count_matches_non_orphaned_input() {
        let tasks = vec![
            task("A", "Root one", None),
            task("B", "Child of A", Some("A")),
            task("C", "Root two", None),
            task("D", "Orphan", Some("missing")),
            task("E", "Child of C", Some("C")),
        ];

        let forest = build_hierarchy(&tasks);
        assert_eq!(node_count(&forest), 4);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_hierarchy(&[]).is_empty());
    }

    #[test]
    fn test_display_projection_defaults() {
        let tasks = vec![
            task("A", "Buy milk", None),
            task("B", "Buy bread", Some("A")),
        ];

        let display = to_display_forest(&build_hierarchy(&tasks)).unwrap();
        assert_eq!(
            display,
            vec![DisplayNode {
                id: "A".to_string(),
                title: "Buy milk".to_string(),
                notes: String::new(),
                status: "unknown".to_string(),
                children: vec![DisplayNode {
                    id: "B".to_string(),
                    title: "Buy bread".to_string(),
                    notes: String::new(),
                    status: "unknown".to_string(),
                    children: Vec::new(),
                }],
            }]
        );
    }

    #[test]
    fn test_display_projection_carries_fields() {
        let mut record = task("A", "Buy milk", None);
        record.notes = Some("2 liters".to_string());
        record.status = Some(TaskStatus::Completed);

        let display = to_display_forest(&build_hierarchy(&[record])).unwrap();
        assert_eq!(display[0].notes, "2 liters");
        assert_eq!(display[0].status, "completed");
    }

    #[test]
    fn test_empty_children_omitted_from_serialization() {
        let tasks = vec![
            task("A", "Buy milk", None),
            task("B", "Buy bread", Some("A")),
        ];

        let display = to_display_forest(&build_hierarchy(&tasks)).unwrap();
        let yaml = serde_yaml::to_string(&display).unwrap();
        // Parent serializes its children, the leaf child does not.
        assert_eq!(yaml.matches("children:").count(), 1);

        let json = serde_json::to_value(&display).unwrap();
        let child = &json[0]["children"][0];
        assert!(child.get("children").is_none());
    }

    #[test]
    fn test_missing_title_fails_projection_only() {
        let tasks = vec![Task::new("A")];

        // Building the hierarchy tolerates the missing title.
        let forest = build_hierarchy(&tasks);
        assert_eq!(forest.len(), 1);

        // Projection fails and names the offending record.
        let error = to_display_forest(&forest).unwrap_err();
        match &error {
            GtasksError::MissingField { field, record } => {
                assert_eq!(*field, "title");
                assert!(record.contains("\"A\""));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_title_in_child_fails_whole_call() {
        let tasks = vec![task("A", "Root", None), {
            let mut child = Task::new("B");
            child.parent = Some("A".to_string());
            child
        }];

        let forest = build_hierarchy(&tasks);
        assert!(to_display_forest(&forest).is_err());
    }

    #[test]
    fn test_deterministic_over_reruns() {
        let tasks = vec![
            task("A", "Root", None),
            task("B", "Child", Some("A")),
            task("C", "Orphan", Some("nope")),
        ];

        let first = to_display_forest(&build_hierarchy(&tasks)).unwrap();
        let second = to_display_forest(&build_hierarchy(&tasks)).unwrap();
        assert_eq!(first, second);
    }
}
