pub mod config;
pub mod graphql;
pub mod metrics;
pub mod provider;

pub use config::Config;
pub use graphql::{AppState, GraphQLServer, ServerOptions};
pub use provider::{Container, GraphQLServerProvider, ServiceProvider};
