//! Conversation history persistence
//!
//! One conversation thread is stored as pretty-printed JSON in the
//! platform data directory so a later run can pick up where it left off.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::llm::ChatMessage;

/// A persisted conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub thread_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    /// New empty thread with a fresh id
    pub fn new() -> Self {
        Self {
            thread_id: Uuid::new_v4(),
            messages: Vec::new(),
        }
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the path to the history file
pub fn history_file_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "gtasks-agent", "gtasks-agent") {
        proj_dirs.data_dir().join("history.json")
    } else {
        PathBuf::from(".gtasks-agent-history.json")
    }
}

/// Load the saved conversation from disk, or start a fresh one
pub fn load_history() -> ConversationHistory {
    let path = history_file_path();
    if let Ok(json) = std::fs::read_to_string(&path) {
        if let Ok(history) = serde_json::from_str(&json) {
            return history;
        }
    }
    ConversationHistory::new()
}

/// Save the conversation to disk
pub fn save_history(history: &ConversationHistory) -> Result<PathBuf> {
    let path = history_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(history).context("failed to serialize history")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
