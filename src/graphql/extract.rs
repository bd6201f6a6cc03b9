use super::document::Document;
use super::error::HttpQueryError;
use super::http::RequestLike;
use actix_web::http::{Method, StatusCode};
use actix_web::web;
use async_graphql::http::{receive_batch_body, MultipartOptions};
use async_graphql::{BatchRequest, ParseRequestError};
use futures_util::io::Cursor;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

// Query parameters of a GET request, taken as-is. `variables` and
// `extensions` stay JSON-encoded until execution.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    pub variables: Option<String>,
    pub extensions: Option<String>,
}

// Query as found on the wire, one per request
#[derive(Debug)]
pub enum QueryPayload {
    Params(QueryParams),
    // JSON object (or array of objects) whose `query` fields are source text
    Body(Value),
    // Operations decoded by the multipart parser, uploaded files included
    Upload(BatchRequest),
}

// Picks the query payload from the request's transport framing
pub async fn extract_query<R: RequestLike>(
    request: &R,
    multipart: MultipartOptions,
) -> Result<QueryPayload, HttpQueryError> {
    if let Some(content_type) = request.header("content-type").filter(|ct| is_multipart(ct)) {
        debug!("Extracting GraphQL operations from multipart upload");
        let body = Cursor::new(request.body().to_vec());
        let batch = receive_batch_body(Some(content_type), body, multipart)
            .await
            .map_err(multipart_error)?;
        return Ok(QueryPayload::Upload(batch));
    }

    if *request.method() == Method::POST {
        let body: Value = serde_json::from_slice(request.body())
            .map_err(|_| HttpQueryError::bad_request("POST body sent invalid JSON."))?;
        return normalize_body(body).map(QueryPayload::Body);
    }

    let params = web::Query::<QueryParams>::from_query(request.query_string())
        .map_err(|e| HttpQueryError::bad_request(&format!("Invalid query parameters: {}", e)))?;
    Ok(QueryPayload::Params(params.into_inner()))
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
}

fn multipart_error(err: ParseRequestError) -> HttpQueryError {
    match err {
        ParseRequestError::PayloadTooLarge => {
            HttpQueryError::from_text(StatusCode::PAYLOAD_TOO_LARGE, "Upload payload too large.")
        }
        err => HttpQueryError::bad_request(&format!("Invalid multipart request: {}", err)),
    }
}

// Makes sure every operation in the body carries its query as source text
fn normalize_body(body: Value) -> Result<Value, HttpQueryError> {
    match body {
        Value::Array(operations) => operations
            .into_iter()
            .map(normalize_operation)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        operation @ Value::Object(_) => normalize_operation(operation),
        _ => Err(HttpQueryError::bad_request(
            "POST body must be a JSON object or an array of objects.",
        )),
    }
}

// String queries pass through unchanged; a parsed document is printed back
// to source. Other members of the operation are kept.
fn normalize_operation(operation: Value) -> Result<Value, HttpQueryError> {
    let Value::Object(mut fields) = operation else {
        return Ok(operation);
    };
    let source = match fields.get("query") {
        None | Some(Value::String(_)) | Some(Value::Null) => return Ok(Value::Object(fields)),
        Some(document) => Document::deserialize(document)
            .map_err(|e| HttpQueryError::bad_request(&format!("Invalid query document: {}", e)))?
            .print(),
    };
    fields.insert("query".to_string(), Value::String(source));
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_queries_pass_through_unchanged() {
        let body = json!({ "query": "{ hello }", "variables": { "a": 1 } });
        assert_eq!(normalize_body(body.clone()).unwrap(), body);
    }

    #[test]
    fn documents_are_printed_and_siblings_kept() {
        let body = json!({
            "query": {
                "kind": "Document",
                "definitions": [{
                    "kind": "OperationDefinition",
                    "operation": "query",
                    "selectionSet": { "kind": "SelectionSet", "selections": [
                        { "kind": "Field", "name": { "kind": "Name", "value": "hello" } }
                    ] }
                }]
            },
            "operationName": null,
            "variables": { "a": 1 }
        });

        let normalized = normalize_body(body).unwrap();
        assert_eq!(normalized["query"], json!("{\n  hello\n}"));
        assert_eq!(normalized["variables"], json!({ "a": 1 }));
    }

    #[test]
    fn batches_are_normalized_per_operation() {
        let normalized = normalize_body(json!([{ "query": "{ a }" }, { "query": "{ b }" }])).unwrap();
        assert_eq!(normalized, json!([{ "query": "{ a }" }, { "query": "{ b }" }]));
    }

    #[test]
    fn scalar_bodies_are_rejected() {
        let err = normalize_body(json!("{ hello }")).unwrap_err();
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn multipart_detection_ignores_case_and_parameters() {
        assert!(is_multipart("Multipart/Form-Data; boundary=abc"));
        assert!(!is_multipart("application/json"));
    }
}
