use std::env;
use std::str::FromStr;

type ConfigError = Box<dyn std::error::Error + Send + Sync + 'static>;

// Configuration for the GraphQL HTTP server
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String, // Address for the HTTP server
    pub graphql_path: String, // Path of the query endpoint
    pub graphiql_path: String, // Path of the GraphiQL explorer
    pub enable_graphiql: bool, // Whether the explorer is mounted
    pub graphiql_title: Option<String>, // Explorer page title
    pub enable_uploads: bool, // Upload scalar and multipart requests
    pub max_body_size: usize, // Request body limit in bytes
    pub max_file_size: Option<usize>, // Per-file upload limit in bytes
    pub max_num_files: Option<usize>, // Maximum number of uploaded files
    pub depth_limit: Option<usize>, // Maximum query depth
    pub complexity_limit: Option<usize>, // Maximum query complexity
    pub introspection: bool, // Whether schema introspection is allowed
}

impl Config {
    // Loads configuration from environment variables, with defaults for optional fields
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            // Optional: bind address (defaults to 0.0.0.0:8080)
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            // Optional: query endpoint path (defaults to /graphql)
            graphql_path: lookup("GRAPHQL_PATH").unwrap_or_else(|| "/graphql".to_string()),
            // Optional: explorer path (defaults to /graphiql)
            graphiql_path: lookup("GRAPHIQL_PATH").unwrap_or_else(|| "/graphiql".to_string()),
            enable_graphiql: flag(&lookup, "ENABLE_GRAPHIQL", true)?,
            graphiql_title: lookup("GRAPHIQL_TITLE").filter(|t| !t.is_empty()),
            enable_uploads: flag(&lookup, "ENABLE_UPLOADS", true)?,
            // Optional: body limit (defaults to 10 MiB)
            max_body_size: number(&lookup, "MAX_BODY_SIZE")?.unwrap_or(10 * 1024 * 1024),
            max_file_size: number(&lookup, "MAX_FILE_SIZE")?,
            max_num_files: number(&lookup, "MAX_NUM_FILES")?,
            depth_limit: number(&lookup, "DEPTH_LIMIT")?,
            complexity_limit: number(&lookup, "COMPLEXITY_LIMIT")?,
            introspection: flag(&lookup, "ENABLE_INTROSPECTION", true)?,
        };

        // Validate endpoint paths
        for path in [&config.graphql_path, &config.graphiql_path] {
            if !path.starts_with('/') {
                return Err(format!("endpoint path `{}` must start with '/'", path).into());
            }
        }
        if config.enable_graphiql && config.graphql_path == config.graphiql_path {
            return Err("GRAPHQL_PATH and GRAPHIQL_PATH must differ".into());
        }

        Ok(config)
    }
}

// Parses an optional numeric variable
fn number<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{} must be a number, got `{}`", key, raw).into()),
        None => Ok(None),
    }
}

// Parses a boolean variable: true/false, 1/0, yes/no
fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(format!("{} must be a boolean, got `{}`", key, raw).into()),
        },
    }
}
