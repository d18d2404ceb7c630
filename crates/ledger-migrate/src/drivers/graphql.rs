//! GraphQL over HTTP driver.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::EndpointConfig;
use crate::core::{MutationExecutor, Operation, Page, QueryExecutor};
use crate::error::{MigrateError, Result};

/// Client for one GraphQL endpoint.
///
/// No request timeout is set; a hung call blocks the step that issued it.
#[derive(Clone)]
pub struct GraphqlClient {
    http: Client,
    endpoint: String,
    auth_header: String,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResult {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    next_token: Option<String>,
}

impl GraphqlClient {
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.endpoint.clone(),
            auth_header: config.auth_header.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `op` and return `data[root_field]`.
    async fn execute(&self, op: &Operation, variables: Value) -> Result<Value> {
        let body = json!({
            "query": op.document,
            "operationName": op.name,
            "variables": variables,
        });

        let mut request = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(token) = &self.auth_token {
            request = request.header(self.auth_header.as_str(), token.as_str());
        }

        debug!("POST {} {}", self.endpoint, op.name);
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MigrateError::remote(
                op.root_field,
                format!("HTTP {}: {}", status, text.trim()),
            ));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| MigrateError::decode(op.root_field, format!("invalid response: {}", e)))?;
        root_field(op, parsed)
    }
}

fn root_field(op: &Operation, response: GraphqlResponse) -> Result<Value> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|e| match &e.error_type {
                Some(kind) => format!("{} ({})", e.message, kind),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MigrateError::remote(op.root_field, message));
    }

    match response.data.and_then(|mut d| d.get_mut(op.root_field).map(Value::take)) {
        Some(Value::Null) | None => Err(MigrateError::decode(
            op.root_field,
            format!("response has no {} field", op.root_field),
        )),
        Some(value) => Ok(value),
    }
}

fn into_page(op: &Operation, value: Value) -> Result<Page> {
    let list: ListResult = serde_json::from_value(value)
        .map_err(|e| MigrateError::decode(op.root_field, format!("invalid list result: {}", e)))?;
    Ok(Page {
        items: list.items,
        next_token: list.next_token,
    })
}

#[async_trait]
impl QueryExecutor for GraphqlClient {
    async fn query(&self, op: &Operation, variables: Value) -> Result<Page> {
        let value = self.execute(op, variables).await?;
        into_page(op, value)
    }
}

#[async_trait]
impl MutationExecutor for GraphqlClient {
    async fn mutate(&self, op: &Operation, variables: Value) -> Result<Value> {
        self.execute(op, variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::source::LIST_OWNERS;
    use crate::core::operation::target::CREATE_PROFILE;

    fn response(value: Value) -> GraphqlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_list_result_becomes_page() {
        let value = root_field(
            &LIST_OWNERS,
            response(json!({
                "data": {"listOwners": {"items": [{"id": "o1"}], "nextToken": "abc"}}
            })),
        )
        .unwrap();
        let page = into_page(&LIST_OWNERS, value).unwrap();
        assert_eq!(page.items, vec![json!({"id": "o1"})]);
        assert_eq!(page.next_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_null_token_ends_pages() {
        let value = json!({"items": [], "nextToken": null});
        let page = into_page(&LIST_OWNERS, value).unwrap();
        assert!(!page.has_more());
    }

    #[test]
    fn test_errors_array_is_remote_error() {
        let err = root_field(
            &CREATE_PROFILE,
            response(json!({
                "data": {"createProfile": null},
                "errors": [{"message": "Not Authorized", "errorType": "Unauthorized"}]
            })),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Remote operation createProfile failed: Not Authorized (Unauthorized)"
        );
    }

    #[test]
    fn test_missing_root_field_is_decode_error() {
        let err = root_field(&CREATE_PROFILE, response(json!({"data": {}}))).unwrap_err();
        assert!(matches!(err, MigrateError::Decode { .. }));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let mut config = EndpointConfig::new("https://target.example.com/graphql");
        config.auth_token = Some("secret".to_string());
        let client = GraphqlClient::new(&config);
        assert_eq!(client.endpoint(), "https://target.example.com/graphql");
    }
}
