use async_graphql::dynamic::{Schema, SchemaBuilder, SchemaError};
use super::runner::ExecutionTracker;
use async_graphql::http::MultipartOptions;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// Registers the caller's type definitions (and their resolvers) on a schema builder
pub type TypeRegistrar = Arc<dyn Fn(SchemaBuilder) -> SchemaBuilder + Send + Sync>;

// Rewrites the list of GraphQL errors before it is sent to the client
pub type ErrorFormatter = Arc<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

// Type definitions plus resolvers, kept unbuilt so that it can be augmented
#[derive(Clone)]
pub struct SchemaDefinition {
    query: String,
    mutation: Option<String>,
    type_defs: TypeRegistrar,
    upload_scalar: bool,
}

impl SchemaDefinition {
    pub fn new<F>(query: impl Into<String>, type_defs: F) -> Self
    where
        F: Fn(SchemaBuilder) -> SchemaBuilder + Send + Sync + 'static,
    {
        SchemaDefinition {
            query: query.into(),
            mutation: None,
            type_defs: Arc::new(type_defs),
            upload_scalar: false,
        }
    }

    // Names the mutation root type
    pub fn mutation(mut self, name: impl Into<String>) -> Self {
        self.mutation = Some(name.into());
        self
    }

    pub fn has_upload_scalar(&self) -> bool {
        self.upload_scalar
    }

    // Copy of this definition that also declares the `Upload` scalar, resolved
    // by the engine's built-in upload handling
    pub fn with_upload_scalar(&self) -> Self {
        SchemaDefinition {
            upload_scalar: true,
            ..self.clone()
        }
    }

    fn builder(&self) -> SchemaBuilder {
        let builder = Schema::build(&self.query, self.mutation.as_deref(), None);
        let builder = (self.type_defs)(builder);
        if self.upload_scalar {
            builder.enable_uploading()
        } else {
            builder
        }
    }
}

impl fmt::Debug for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("query", &self.query)
            .field("mutation", &self.mutation)
            .field("upload_scalar", &self.upload_scalar)
            .finish_non_exhaustive()
    }
}

// Engine settings applied when the executable schema is built
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub depth_limit: Option<usize>,
    pub complexity_limit: Option<usize>,
    pub introspection: bool,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        ExecutionSettings {
            depth_limit: None,
            complexity_limit: None,
            introspection: true,
        }
    }
}

// Everything the query endpoint needs to run a request
#[derive(Clone)]
pub struct ServerOptions {
    pub schema: SchemaDefinition,
    pub settings: ExecutionSettings,
    pub uploads: bool,
    pub multipart: MultipartOptions,
    pub on_error: Option<ErrorFormatter>,
}

impl ServerOptions {
    pub fn new(schema: SchemaDefinition) -> Self {
        ServerOptions {
            schema,
            settings: ExecutionSettings::default(),
            uploads: false,
            multipart: MultipartOptions::default(),
            on_error: None,
        }
    }

    pub fn settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn uploads(mut self, enabled: bool) -> Self {
        self.uploads = enabled;
        self
    }

    pub fn multipart(mut self, multipart: MultipartOptions) -> Self {
        self.multipart = multipart;
        self
    }

    pub fn on_error<F>(mut self, formatter: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(formatter));
        self
    }

    // Options to execute with. With uploads enabled the returned copy carries a
    // schema augmented with the `Upload` scalar; `self` is left untouched.
    pub fn with_upload_support(&self) -> ServerOptions {
        let mut options = self.clone();
        if options.uploads && !options.schema.has_upload_scalar() {
            options.schema = options.schema.with_upload_scalar();
        }
        options
    }

    // Builds the executable schema for a single execution
    pub fn executable(&self) -> Result<Schema, SchemaError> {
        let mut builder = self.schema.builder().extension(ExecutionTracker);
        if let Some(depth) = self.settings.depth_limit {
            builder = builder.limit_depth(depth);
        }
        if let Some(complexity) = self.settings.complexity_limit {
            builder = builder.limit_complexity(complexity);
        }
        if !self.settings.introspection {
            builder = builder.disable_introspection();
        }
        builder.finish()
    }

    // Applies the configured error formatter, if any
    pub fn format_errors(&self, errors: Vec<Value>) -> Vec<Value> {
        match &self.on_error {
            Some(formatter) => formatter(errors),
            None => errors,
        }
    }
}

impl fmt::Debug for ServerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerOptions")
            .field("schema", &self.schema)
            .field("settings", &self.settings)
            .field("uploads", &self.uploads)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
