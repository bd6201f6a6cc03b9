// GraphQL-over-HTTP adapter and the application state shared by its routes
pub mod document;
pub mod error;
pub mod explorer;
pub mod extract;
pub mod http;
pub mod options;
pub mod routes;
pub mod runner;
pub mod schema;
pub mod server;

// Re-export key types for external use
pub use error::{AdapterError, ExecutionError, HttpQueryError};
pub use explorer::ExplorerOptions;
pub use http::{ActixRequest, ActixResponse, RequestLike, ResponseLike};
pub use options::{ExecutionSettings, SchemaDefinition, ServerOptions};
pub use routes::{graphiql, graphql};
pub use server::GraphQLServer;

use super::config::Config;
use async_graphql::http::MultipartOptions;
use std::sync::Arc;

// Application state shared by the GraphQL route handlers
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<GraphQLServer>, // Shared, stateless adapter
    pub options: Arc<ServerOptions>, // Schema and execution options for the query endpoint
    pub explorer: Arc<ExplorerOptions>, // GraphiQL page settings
}

impl AppState {
    // Builds the state for the given adapter from configuration and schema
    pub fn new(server: Arc<GraphQLServer>, schema: SchemaDefinition, config: &Config) -> Self {
        let mut multipart = MultipartOptions::default();
        if let Some(size) = config.max_file_size {
            multipart = multipart.max_file_size(size);
        }
        if let Some(count) = config.max_num_files {
            multipart = multipart.max_num_files(count);
        }

        let options = ServerOptions::new(schema)
            .settings(ExecutionSettings {
                depth_limit: config.depth_limit,
                complexity_limit: config.complexity_limit,
                introspection: config.introspection,
            })
            .uploads(config.enable_uploads)
            .multipart(multipart);

        // The explorer lives on its own path, so point it at the query endpoint
        let mut explorer = ExplorerOptions::default().endpoint(config.graphql_path.clone());
        if let Some(title) = &config.graphiql_title {
            explorer = explorer.title(title.clone());
        }

        AppState {
            server,
            options: Arc::new(options),
            explorer: Arc::new(explorer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::schema::demo_schema;

    #[test]
    fn upload_limits_reach_multipart_options() {
        let config = Config::from_lookup(|key| match key {
            "MAX_FILE_SIZE" => Some("2048".to_string()),
            "MAX_NUM_FILES" => Some("3".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(Arc::new(GraphQLServer::new()), demo_schema(), &config);

        assert_eq!(state.options.multipart.max_file_size, Some(2048));
        assert_eq!(state.options.multipart.max_num_files, Some(3));
        assert!(state.options.uploads);
    }

    #[test]
    fn upload_limits_default_to_unbounded() {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(Arc::new(GraphQLServer::new()), demo_schema(), &config);

        assert_eq!(state.options.multipart.max_file_size, None);
        assert_eq!(state.options.multipart.max_num_files, None);
    }
}
