use super::error::{AdapterError, ExecutionError, HttpQueryError};
use super::explorer::{resolve_explorer_page, ExplorerOptions};
use super::extract::extract_query;
use super::http::{RequestLike, ResponseLike};
use super::options::ServerOptions;
use super::runner::run_http_query;
use crate::metrics::{EXPLORER_RENDERS, QUERY_ERRORS, REQUESTS};
use actix_web::http::header::{self, HeaderValue};
use log::{debug, error, warn};
use serde_json::{json, Map, Value};

// Bridges HTTP requests and responses to the GraphQL engine. Stateless: one
// instance is shared by every handler and request data travels in arguments
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphQLServer;

impl GraphQLServer {
    pub fn new() -> Self {
        GraphQLServer
    }

    // Executes the GraphQL query carried by `request` and writes the result
    // to `response`.
    //
    // Query errors reported by the engine are written as `{"errors": [...]}`
    // with the status they carry. Missing options and failures the engine
    // cannot map to HTTP are returned as errors.
    pub async fn graphql<R, W>(
        &self,
        options: Option<&ServerOptions>,
        request: &R,
        response: W,
    ) -> Result<W::Output, AdapterError>
    where
        R: RequestLike,
        W: ResponseLike,
    {
        let options = options.ok_or(AdapterError::MissingOptions("GraphQL server"))?;
        let options = options.with_upload_support();
        let method = request.method();
        REQUESTS.with_label_values(&[method.as_str()]).inc();
        debug!("Handling {} GraphQL request", method);

        let result = match extract_query(request, options.multipart).await {
            Ok(query) => run_http_query(method, &options, query).await,
            Err(err) => Err(ExecutionError::Http(err)),
        };

        match result {
            Ok(body) => write_result(&options, body, response),
            Err(ExecutionError::Http(err)) => Ok(write_query_error(&options, err, response)),
            Err(err) => {
                error!("GraphQL execution failed: {}", err);
                Err(err.into())
            }
        }
    }

    // Renders the GraphiQL explorer for the URL `request` was made to.
    //
    // A page that cannot be rendered is answered with the error text as
    // body; the status is left as is.
    pub async fn graphiql<R, W>(
        &self,
        options: Option<&ExplorerOptions>,
        request: &R,
        mut response: W,
    ) -> Result<W::Output, AdapterError>
    where
        R: RequestLike,
        W: ResponseLike,
    {
        let options = options.ok_or(AdapterError::MissingOptions("GraphiQL"))?;
        let url = request.original_url();

        match resolve_explorer_page(&url, options) {
            Ok(page) => {
                EXPLORER_RENDERS.inc();
                response.header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                Ok(response.send(page))
            }
            Err(err) => {
                warn!("Failed to render GraphiQL for {}: {}", url, err);
                Ok(response.send(err.to_string()))
            }
        }
    }
}

// Writes an engine response. Bodies without errors go out verbatim.
fn write_result<W: ResponseLike>(
    options: &ServerOptions,
    body: String,
    response: W,
) -> Result<W::Output, AdapterError> {
    let mut envelope = match serde_json::from_str::<Value>(&body)? {
        Value::Object(envelope) if envelope.contains_key("errors") => envelope,
        _ => return Ok(response.json(body)),
    };

    let errors = match envelope.remove("errors") {
        Some(Value::Array(errors)) => errors,
        Some(other) => vec![other],
        None => Vec::new(),
    };
    let mut body = Map::new();
    body.insert("errors".to_string(), Value::Array(options.format_errors(errors)));
    body.insert(
        "data".to_string(),
        envelope.remove("data").unwrap_or(Value::Null),
    );
    if let Some(extensions) = envelope.remove("extensions") {
        body.insert("extensions".to_string(), extensions);
    }
    Ok(response.json(Value::Object(body).to_string()))
}

fn write_query_error<W: ResponseLike>(
    options: &ServerOptions,
    err: HttpQueryError,
    mut response: W,
) -> W::Output {
    warn!("GraphQL query rejected with status {}", err.status_code);
    QUERY_ERRORS
        .with_label_values(&[err.status_code.as_str()])
        .inc();

    for (name, value) in err.headers.iter() {
        response.header(name.clone(), value.clone());
    }
    response.status(err.status_code);

    let body = json!({ "errors": options.format_errors(err.errors()) });
    response.json(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::http::ActixResponse;
    use crate::graphql::options::SchemaDefinition;
    use actix_web::body::to_bytes;

    fn options() -> ServerOptions {
        ServerOptions::new(SchemaDefinition::new("Query", |builder| builder))
            .on_error(|errors| errors.into_iter().map(|_| json!({ "message": "hidden" })).collect())
    }

    async fn written(body: &str) -> Value {
        let response = write_result(&options(), body.to_string(), ActixResponse::new()).unwrap();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn error_envelope_keeps_extensions() {
        let body = written(
            r#"{"data":{"a":null},"errors":[{"message":"boom"}],"extensions":{"cost":3}}"#,
        )
        .await;
        assert_eq!(
            body,
            json!({
                "errors": [{ "message": "hidden" }],
                "data": { "a": null },
                "extensions": { "cost": 3 }
            })
        );
    }

    #[actix_web::test]
    async fn error_envelope_without_extensions() {
        let body = written(r#"{"data":null,"errors":[{"message":"boom"}]}"#).await;
        assert_eq!(body, json!({ "errors": [{ "message": "hidden" }], "data": null }));
    }
}
