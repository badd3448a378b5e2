//! HTTP API adapter

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use notetree_domain::{
    Category, CategoryDetail, CategoryWithChildren, CreateCategoryRequest, CreateTodoRequest,
    DomainError, Todo, TodoQuery, UpdateCategoryRequest, UpdateTodoRequest,
};

use super::Storage;
use crate::config::RestConfig;
use crate::error::{ClientError, ClientResult};

/// Client for the notetree HTTP API
pub struct RestStorage {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeQuery<'a> {
    category_id: &'a str,
}

impl RestStorage {
    pub fn new(config: &RestConfig) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            DomainError::validation(format!("Invalid API URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::validation(format!(
                "Invalid API URL '{}'",
                config.base_url
            ))
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.endpoint(segments))
    }

    /// Send the request and turn non-2xx answers into errors
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request = request
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build request: {}", e)))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "api request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "api request failed");
            transport_error(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        debug!(%method, %url, status = status.as_u16(), error = %err, "api error");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Like `json`, but a 404 is an absent record rather than an error
    async fn json_optional<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<Option<T>> {
        match self.json(request).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn no_content(&self, request: RequestBuilder) -> ClientResult<()> {
        self.send(request).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Transient(format!("request timed out: {}", err))
    } else if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else if err.is_builder() {
        DomainError::Internal(err.to_string()).into()
    } else {
        ClientError::Transient(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    if let Some(ErrorEnvelope {
        error: ErrorBody {
            message,
            code: Some(code),
        },
    }) = parsed
    {
        return DomainError::from_code(&code, message).into();
    }

    let message = parsed
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(message).into(),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ClientError::Transient(message)
        }
        s if s.is_client_error() => DomainError::Validation(message).into(),
        _ => DomainError::Internal(message).into(),
    }
}

#[async_trait]
impl Storage for RestStorage {
    async fn category_tree(&self) -> ClientResult<Vec<CategoryWithChildren>> {
        self.json(self.request(Method::GET, &["categories", "tree"])).await
    }

    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.json(self.request(Method::GET, &["categories", "flat"])).await
    }

    async fn get_category(&self, id: &str) -> ClientResult<Option<CategoryDetail>> {
        self.json_optional(self.request(Method::GET, &["categories", id])).await
    }

    async fn create_category(&self, req: &CreateCategoryRequest) -> ClientResult<Category> {
        self.json(self.request(Method::POST, &["categories"]).json(req)).await
    }

    async fn update_category(&self, id: &str, req: &UpdateCategoryRequest) -> ClientResult<Category> {
        self.json(self.request(Method::PUT, &["categories", id]).json(req)).await
    }

    async fn delete_category(&self, id: &str) -> ClientResult<()> {
        self.no_content(self.request(Method::DELETE, &["categories", id])).await
    }

    async fn list_todos(&self, query: &TodoQuery) -> ClientResult<Vec<Todo>> {
        self.json(self.request(Method::GET, &["todos"]).query(query)).await
    }

    async fn get_todo(&self, id: &str) -> ClientResult<Option<Todo>> {
        self.json_optional(self.request(Method::GET, &["todos", id])).await
    }

    async fn create_todo(&self, req: &CreateTodoRequest) -> ClientResult<Todo> {
        self.json(self.request(Method::POST, &["todos"]).json(req)).await
    }

    async fn update_todo(&self, id: &str, req: &UpdateTodoRequest) -> ClientResult<Todo> {
        self.json(self.request(Method::PUT, &["todos", id]).json(req)).await
    }

    async fn delete_todo(&self, id: &str) -> ClientResult<()> {
        self.no_content(self.request(Method::DELETE, &["todos", id])).await
    }

    async fn delete_all_todos(&self, category_id: Option<&str>) -> ClientResult<()> {
        let mut request = self.request(Method::DELETE, &["todos"]);
        if let Some(category_id) = category_id {
            request = request.query(&ScopeQuery { category_id });
        }
        self.no_content(request).await
    }
}
