use actix_web::HttpResponse;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
};

// Prometheus metrics for the GraphQL endpoints
lazy_static::lazy_static! {
    // Requests reaching the query endpoint, by HTTP method
    pub static ref REQUESTS: CounterVec = register_counter_vec!(
        "graphbridge_requests_total",
        "GraphQL requests received",
        &["method"]
    ).unwrap();

    // Requests answered with a query error, by HTTP status
    pub static ref QUERY_ERRORS: CounterVec = register_counter_vec!(
        "graphbridge_query_errors_total",
        "GraphQL requests rejected with a query error",
        &["status"]
    ).unwrap();

    // Time spent inside the execution engine per operation
    pub static ref EXECUTION_TIME: Histogram = register_histogram!(
        "graphbridge_execution_seconds",
        "GraphQL operation execution time in seconds"
    ).unwrap();

    // Explorer pages served
    pub static ref EXPLORER_RENDERS: Counter = register_counter!(
        "graphbridge_explorer_renders_total",
        "GraphiQL explorer pages rendered"
    ).unwrap();
}

// Handles GET /metrics requests to expose Prometheus metrics
pub async fn metrics() -> HttpResponse {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    // Encoding failures yield an empty scrape rather than an error
    let encoded = encoder.encode_to_string(&metric_families).unwrap_or_default();
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(encoded)
}
