use super::error::{ExecutionError, HttpQueryError};
use super::extract::{QueryParams, QueryPayload};
use super::options::ServerOptions;
use crate::metrics::EXECUTION_TIME;
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::{Method, StatusCode};
use async_graphql::dynamic::Schema;
use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextExecute};
use async_graphql::parser::parse_query;
use async_graphql::parser::types::OperationType;
use async_graphql::{BatchRequest, Request, Response};
use futures_util::future::join_all;
use log::debug;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Runs a GraphQL query arriving over HTTP and returns the JSON-encoded
// response. Request-level failures come back as `ExecutionError::Http` with
// the status and headers the client should see.
pub async fn run_http_query(
    method: &Method,
    options: &ServerOptions,
    query: QueryPayload,
) -> Result<String, ExecutionError> {
    if *method != Method::GET && *method != Method::POST {
        return Err(HttpQueryError::from_text(
            StatusCode::METHOD_NOT_ALLOWED,
            "GraphQL only supports GET and POST requests.",
        )
        .with_header(header::ALLOW, HeaderValue::from_static("GET, POST"))
        .into());
    }

    let batch = into_batch(query)?;

    if *method == Method::GET && batch.iter().any(is_mutation) {
        return Err(HttpQueryError::from_text(
            StatusCode::METHOD_NOT_ALLOWED,
            "Can only perform a mutation operation from a POST request.",
        )
        .with_header(header::ALLOW, HeaderValue::from_static("POST"))
        .into());
    }

    let schema = options
        .executable()
        .map_err(|e| ExecutionError::Schema(e.to_string()))?;

    match batch {
        BatchRequest::Single(request) => {
            let started = ExecutionStarted::default();
            let response = execute(&schema, request.data(started.clone())).await;
            // Rejected before execution (parse, validation or limits): the
            // request itself is at fault
            if response.is_err() && !started.get() {
                return Err(HttpQueryError::new(
                    StatusCode::BAD_REQUEST,
                    serde_json::to_string(&response)?,
                )
                .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .into());
            }
            Ok(serde_json::to_string(&response)?)
        }
        BatchRequest::Batch(requests) => {
            debug!("Executing batch of {} GraphQL operations", requests.len());
            let responses = join_all(requests.into_iter().map(|r| execute(&schema, r))).await;
            Ok(serde_json::to_string(&responses)?)
        }
    }
}

async fn execute(schema: &Schema, request: Request) -> Response {
    let timer = EXECUTION_TIME.start_timer();
    let response = schema.execute(request).await;
    timer.observe_duration();
    response
}

// Set once the engine starts executing a request, i.e. after parsing and
// validation succeeded
#[derive(Debug, Clone, Default)]
struct ExecutionStarted(Arc<AtomicBool>);

impl ExecutionStarted {
    fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// Schema extension that flags the request's `ExecutionStarted` marker
pub(super) struct ExecutionTracker;

impl ExtensionFactory for ExecutionTracker {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ExecutionTracker)
    }
}

#[async_graphql::async_trait::async_trait]
impl Extension for ExecutionTracker {
    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        if let Some(started) = ctx.data_opt::<ExecutionStarted>() {
            started.0.store(true, Ordering::SeqCst);
        }
        next.run(ctx, operation_name).await
    }
}

fn into_batch(query: QueryPayload) -> Result<BatchRequest, HttpQueryError> {
    match query {
        QueryPayload::Params(params) => Ok(BatchRequest::Single(from_params(params)?)),
        QueryPayload::Body(Value::Array(operations)) => {
            if operations.is_empty() {
                return Err(HttpQueryError::bad_request("No operations found in request."));
            }
            let requests = operations
                .into_iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BatchRequest::Batch(requests))
        }
        QueryPayload::Body(operation) => Ok(BatchRequest::Single(from_json(operation)?)),
        QueryPayload::Upload(batch) => {
            for request in batch.iter() {
                require_query(&request.query)?;
            }
            Ok(batch)
        }
    }
}

fn from_params(params: QueryParams) -> Result<Request, HttpQueryError> {
    let mut fields = Map::new();
    let members = [
        ("query", params.query),
        ("operationName", params.operation_name),
        ("variables", params.variables),
        ("extensions", params.extensions),
    ];
    for (key, value) in members {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value));
        }
    }
    from_json(Value::Object(fields))
}

// Builds an engine request from one JSON operation. `variables` and
// `extensions` may arrive JSON-encoded as strings.
fn from_json(operation: Value) -> Result<Request, HttpQueryError> {
    let Value::Object(mut fields) = operation else {
        return Err(HttpQueryError::bad_request("GraphQL operations must be JSON objects."));
    };

    match fields.get("query") {
        Some(Value::String(query)) => require_query(query)?,
        _ => return Err(HttpQueryError::bad_request("Must provide query string.")),
    }

    for (key, label) in [("variables", "Variables"), ("extensions", "Extensions")] {
        let decoded = match fields.get(key) {
            Some(Value::String(raw)) => Some(
                serde_json::from_str::<Value>(raw)
                    .map_err(|_| HttpQueryError::bad_request(&format!("{} are invalid JSON.", label)))?,
            ),
            _ => None,
        };
        if let Some(decoded) = decoded {
            fields.insert(key.to_string(), decoded);
        }
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| HttpQueryError::bad_request(&format!("Invalid GraphQL request: {}", e)))
}

fn require_query(query: &str) -> Result<(), HttpQueryError> {
    if query.trim().is_empty() {
        return Err(HttpQueryError::bad_request("Must provide query string."));
    }
    Ok(())
}

// Whether the operation the request selects is a mutation. Unparseable
// queries are left for the engine to report.
fn is_mutation(request: &Request) -> bool {
    let Ok(document) = parse_query(&request.query) else {
        return false;
    };
    let wanted = request.operation_name.as_deref();
    document.operations.iter().any(|(name, operation)| {
        let selected = match wanted {
            Some(wanted) => name.map(|n| n.as_str()) == Some(wanted),
            None => true,
        };
        selected && operation.node.ty == OperationType::Mutation
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_decode_json_encoded_variables() {
        let request = from_params(QueryParams {
            query: Some("query($n: Int) { n(v: $n) }".to_string()),
            variables: Some(r#"{"n": 3}"#.to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(request.variables.into_value().into_json().unwrap(), json!({ "n": 3 }));
    }

    #[test]
    fn invalid_variables_are_a_bad_request() {
        let err = from_json(json!({ "query": "{ a }", "variables": "{not json" })).unwrap_err();
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(err.errors(), vec![json!({ "message": "Variables are invalid JSON." })]);
    }

    #[test]
    fn missing_query_is_a_bad_request() {
        let err = from_params(QueryParams::default()).unwrap_err();
        assert_eq!(err.errors(), vec![json!({ "message": "Must provide query string." })]);
    }

    #[test]
    fn mutation_detection_follows_operation_name() {
        let query = "query Read { a } mutation Write { b }";
        let read = Request::new(query).operation_name("Read");
        let write = Request::new(query).operation_name("Write");

        assert!(!is_mutation(&read));
        assert!(is_mutation(&write));
        assert!(is_mutation(&Request::new("mutation { b }")));
        assert!(!is_mutation(&Request::new("{ a }")));
    }
}
