use super::options::SchemaDefinition;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, TypeRef};
use async_graphql::Value;

// File received through the `Upload` scalar
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
}

// Schema served by the bundled binary: greetings plus a single-file upload.
// The upload mutation needs the `Upload` scalar, so uploads must be enabled.
pub fn demo_schema() -> SchemaDefinition {
    SchemaDefinition::new("Query", |builder| {
        let query = Object::new("Query")
            .field(Field::new("hello", TypeRef::named_nn(TypeRef::STRING), |_| {
                FieldFuture::new(async { Ok(Some(Value::from("world"))) })
            }))
            .field(
                Field::new("greet", TypeRef::named_nn(TypeRef::STRING), |ctx| {
                    FieldFuture::new(async move {
                        let name = ctx.args.try_get("name")?.string()?;
                        Ok(Some(Value::from(format!("Hello, {}!", name))))
                    })
                })
                .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING))),
            );

        let file = Object::new("File")
            .field(Field::new("filename", TypeRef::named_nn(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let file = ctx.parent_value.try_downcast_ref::<UploadedFile>()?;
                    Ok(Some(Value::from(file.filename.clone())))
                })
            }))
            .field(Field::new("mimetype", TypeRef::named(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let file = ctx.parent_value.try_downcast_ref::<UploadedFile>()?;
                    Ok(file.content_type.clone().map(Value::from))
                })
            }))
            .field(Field::new("size", TypeRef::named_nn(TypeRef::INT), |ctx| {
                FieldFuture::new(async move {
                    let file = ctx.parent_value.try_downcast_ref::<UploadedFile>()?;
                    Ok(Some(Value::from(file.size)))
                })
            }));

        let mutation = Object::new("Mutation").field(
            Field::new("singleUpload", TypeRef::named_nn("File"), |ctx| {
                FieldFuture::new(async move {
                    let upload = ctx.args.try_get("file")?.upload()?;
                    let value = upload.value(ctx.ctx)?;
                    let size = value.size()?;
                    Ok(Some(FieldValue::owned_any(UploadedFile {
                        filename: value.filename,
                        content_type: value.content_type,
                        size,
                    })))
                })
            })
            .argument(InputValue::new("file", TypeRef::named_nn(TypeRef::UPLOAD))),
        );

        builder.register(query).register(file).register(mutation)
    })
    .mutation("Mutation")
}
