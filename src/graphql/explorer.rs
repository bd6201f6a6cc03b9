use actix_web::http::Uri;
use async_graphql::http::GraphiQLSource;
use thiserror::Error;

// Settings for the GraphiQL explorer page
#[derive(Debug, Clone, Default)]
pub struct ExplorerOptions {
    // Endpoint the page sends queries to; the page's own URL when unset
    pub endpoint_url: Option<String>,
    pub subscriptions_endpoint: Option<String>,
    pub title: Option<String>,
    // Extra headers the embedded client sends with every query
    pub headers: Vec<(String, String)>,
}

impl ExplorerOptions {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("invalid explorer URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

// Renders the explorer page for a request made to `original_url`
pub fn resolve_explorer_page(
    original_url: &str,
    options: &ExplorerOptions,
) -> Result<String, ExplorerError> {
    let uri = original_url
        .parse::<Uri>()
        .map_err(|e| ExplorerError::InvalidUrl {
            url: original_url.to_string(),
            reason: e.to_string(),
        })?;
    let endpoint = match &options.endpoint_url {
        Some(endpoint) => endpoint.clone(),
        None => uri.to_string(),
    };

    let mut source = GraphiQLSource::build().endpoint(&endpoint);
    if let Some(subscriptions) = options.subscriptions_endpoint.as_deref() {
        source = source.subscription_endpoint(subscriptions);
    }
    if let Some(title) = options.title.as_deref() {
        source = source.title(title);
    }
    for (name, value) in &options.headers {
        source = source.header(name, value);
    }
    Ok(source.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_points_at_request_url_by_default() {
        let html = resolve_explorer_page("/graphql", &ExplorerOptions::default()).unwrap();
        assert!(html.contains("/graphql"));
    }

    #[test]
    fn endpoint_override_wins() {
        let options = ExplorerOptions::default().endpoint("/api/graphql").title("Bridge");
        let html = resolve_explorer_page("/graphiql", &options).unwrap();
        assert!(html.contains("/api/graphql"));
        assert!(html.contains("Bridge"));
    }

    #[test]
    fn unparseable_url_is_an_error() {
        let err = resolve_explorer_page("not a url", &ExplorerOptions::default()).unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
