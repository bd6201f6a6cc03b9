use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};

// Read side of an HTTP exchange, as much of it as the GraphQL adapter needs
pub trait RequestLike {
    fn method(&self) -> &Method;

    // Header value, if present and valid UTF-8
    fn header(&self, name: &str) -> Option<&str>;

    // Raw URL query string without the leading '?'
    fn query_string(&self) -> &str;

    fn body(&self) -> &[u8];

    // Path and query string exactly as the client requested them
    fn original_url(&self) -> String;
}

// Write side of an HTTP exchange. `send` and `json` consume the sink, so a
// handler can produce exactly one response.
pub trait ResponseLike: Sized {
    type Output;

    fn header(&mut self, name: HeaderName, value: HeaderValue);

    fn status(&mut self, status: StatusCode);

    fn send(self, body: String) -> Self::Output;

    fn json(mut self, body: String) -> Self::Output {
        self.header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send(body)
    }
}

// Actix request with its body already buffered
pub struct ActixRequest<'a> {
    req: &'a HttpRequest,
    body: Bytes,
}

impl<'a> ActixRequest<'a> {
    pub fn new(req: &'a HttpRequest, body: Bytes) -> Self {
        ActixRequest { req, body }
    }
}

impl RequestLike for ActixRequest<'_> {
    fn method(&self) -> &Method {
        self.req.method()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.req.headers().get(name).and_then(|value| value.to_str().ok())
    }

    fn query_string(&self) -> &str {
        self.req.query_string()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn original_url(&self) -> String {
        self.req.uri().to_string()
    }
}

// Response sink backed by an actix response builder, 200 unless told otherwise
pub struct ActixResponse {
    builder: HttpResponseBuilder,
}

impl ActixResponse {
    pub fn new() -> Self {
        ActixResponse {
            builder: HttpResponse::Ok(),
        }
    }
}

impl Default for ActixResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseLike for ActixResponse {
    type Output = HttpResponse;

    fn header(&mut self, name: HeaderName, value: HeaderValue) {
        self.builder.insert_header((name, value));
    }

    fn status(&mut self, status: StatusCode) {
        self.builder.status(status);
    }

    fn send(mut self, body: String) -> HttpResponse {
        self.builder.body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn actix_request_exposes_transport_details() {
        let req = TestRequest::post()
            .uri("/graphql?query=%7Bhello%7D")
            .insert_header(("content-type", "application/json"))
            .to_http_request();
        let request = ActixRequest::new(&req, Bytes::from_static(b"{}"));

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.query_string(), "query=%7Bhello%7D");
        assert_eq!(request.body(), b"{}");
        assert_eq!(request.original_url(), "/graphql?query=%7Bhello%7D");
    }

    #[test]
    fn actix_response_applies_status_and_headers() {
        let mut response = ActixResponse::new();
        response.status(StatusCode::METHOD_NOT_ALLOWED);
        response.header(header::ALLOW, HeaderValue::from_static("GET, POST"));
        let response = response.json("{}".to_string());

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, POST");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
