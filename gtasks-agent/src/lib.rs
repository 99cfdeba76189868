// Google Tasks REST client module
pub mod api;

// Assistant tool-calling loop module
pub mod assistant;

// Configuration module
pub mod config;

// Conversation history persistence module
pub mod history;

// Chat model client module
pub mod llm;

// Agent tools module
pub mod tools;
