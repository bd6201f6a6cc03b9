use super::error::AdapterError;
use super::http::{ActixRequest, ActixResponse};
use super::AppState;
use crate::config::Config;
use crate::metrics;
use actix_web::{web, HttpRequest, HttpResponse};

// Handles GraphQL queries over GET, POST and multipart uploads
pub async fn graphql(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AdapterError> {
    let request = ActixRequest::new(&req, body);
    state
        .server
        .graphql(Some(state.options.as_ref()), &request, ActixResponse::new())
        .await
}

// Serves the GraphiQL explorer page
pub async fn graphiql(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AdapterError> {
    let request = ActixRequest::new(&req, web::Bytes::new());
    state
        .server
        .graphiql(Some(state.explorer.as_ref()), &request, ActixResponse::new())
        .await
}

// Mounts the query endpoint for every method (unsupported ones are answered
// with 405 by the adapter), the explorer, and the metrics endpoint
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::PayloadConfig::new(config.max_body_size))
        .route(&config.graphql_path, web::route().to(graphql))
        .route("/metrics", web::get().to(metrics::metrics));

    if config.enable_graphiql {
        cfg.route(&config.graphiql_path, web::get().to(graphiql));
    }
}
