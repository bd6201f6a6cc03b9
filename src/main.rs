use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use graphbridge::graphql::routes;
use graphbridge::graphql::schema::demo_schema;
use graphbridge::provider::SERVER_ALIAS;
use graphbridge::{AppState, Config, Container, GraphQLServer, GraphQLServerProvider, ServiceProvider};
use log::{error, info};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load variables from .env when present, then initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    // Register the adapter and resolve the shared instance once
    let container = Container::new();
    GraphQLServerProvider.register(&container);
    let server = container
        .resolve::<GraphQLServer>(SERVER_ALIAS)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let state = AppState::new(server, demo_schema(), &config);

    info!(
        "GraphQL endpoint at http://{}{}",
        config.bind_addr, config.graphql_path
    );
    if config.enable_graphiql {
        info!(
            "GraphiQL explorer at http://{}{}",
            config.bind_addr, config.graphiql_path
        );
    }

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Compress::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(bind_addr)?
    .run()
    .await
}
