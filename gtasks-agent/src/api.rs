//! Thin REST client for the Google Tasks API
//!
//! Implements [`TasksService`] over reqwest. Authentication is a bearer
//! access token supplied through configuration; acquiring and refreshing
//! that token is the caller's concern.

use gtasks_sdk::{
    async_trait, GtasksError, Result, Task, TaskInput, TaskList, TaskListsResponse, TasksResponse,
    TasksService,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;

/// reqwest-backed [`TasksService`] implementation
pub struct GoogleTasksClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleTasksClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.tasks_base_url, &config.tasks_access_token)
    }

    /// Client against an explicit base URL (overridable for testing)
    pub fn with_base_url(base_url: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| GtasksError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GtasksError::Auth(format!(
                    "access token rejected (status {}): {}",
                    status.as_u16(),
                    message
                )),
                _ => GtasksError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GtasksError::transport(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl TasksService for GoogleTasksClient {
    async fn list_task_lists(&self, max_results: u32) -> Result<TaskListsResponse> {
        let request = self
            .request(Method::GET, "/users/@me/lists")
            .query(&[("maxResults", max_results)]);
        self.execute(request).await
    }

    async fn get_task_list(&self, task_list_id: &str) -> Result<TaskList> {
        let request = self.request(Method::GET, &format!("/users/@me/lists/{task_list_id}"));
        self.execute(request).await
    }

    async fn list_tasks(
        &self,
        task_list_id: &str,
        show_completed: bool,
        show_deleted: bool,
    ) -> Result<TasksResponse> {
        let request = self
            .request(Method::GET, &format!("/lists/{task_list_id}/tasks"))
            .query(&[
                ("showCompleted", show_completed),
                ("showDeleted", show_deleted),
            ]);
        self.execute(request).await
    }

    async fn upsert_task(&self, task_list_id: &str, input: &TaskInput) -> Result<Task> {
        let request = match &input.id {
            Some(task_id) => self.request(
                Method::PATCH,
                &format!("/lists/{task_list_id}/tasks/{task_id}"),
            ),
            None => self.request(Method::POST, &format!("/lists/{task_list_id}/tasks")),
        };
        self.execute(request.json(input)).await
    }
}
