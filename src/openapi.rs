//! OpenAPI 3 document loading.
//!
//! Converts a YAML or JSON OpenAPI 3.0 document into the route model.
//! Only local `#/components/...` references are followed.

use crate::model::{Api, Examples, Response, Route};
use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use openapiv3::{
    Components, Example, MediaType, OpenAPI, Operation, PathItem, ReferenceOr, RequestBody,
    Schema, SchemaKind, StatusCode, Type,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::path::Path;

const MAX_REF_DEPTH: usize = 16;
const MAX_EXAMPLE_DEPTH: usize = 8;

/// Read and convert the specification at `path`
pub fn load(path: &Path) -> Result<Api> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read specification {}", path.display()))?;

    parse(&text).with_context(|| format!("Failed to load specification {}", path.display()))
}

/// Convert an OpenAPI document held in memory
pub fn parse(text: &str) -> Result<Api> {
    let doc: OpenAPI =
        serde_yaml::from_str(text).context("Document is not a valid OpenAPI 3 specification")?;

    let refs = Refs {
        components: doc.components.as_ref(),
    };

    let mut routes = Vec::new();
    for (path, item) in &doc.paths.paths {
        let item = match item {
            ReferenceOr::Item(item) => item,
            ReferenceOr::Reference { reference } => {
                bail!("Path item references are not supported ({}: {})", path, reference)
            }
        };

        for (method, operation) in operations(item) {
            let route = build_route(&refs, path, method, operation)
                .with_context(|| format!("Invalid operation {} {}", method, path))?;
            routes.push(route);
        }
    }

    Ok(Api::new(routes)?)
}

fn operations(item: &PathItem) -> impl Iterator<Item = (&'static str, &Operation)> {
    [
        ("GET", &item.get),
        ("PUT", &item.put),
        ("POST", &item.post),
        ("DELETE", &item.delete),
        ("OPTIONS", &item.options),
        ("HEAD", &item.head),
        ("PATCH", &item.patch),
        ("TRACE", &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
}

fn build_route(refs: &Refs<'_>, path: &str, method: &str, operation: &Operation) -> Result<Route> {
    let required = match &operation.request_body {
        Some(body) => required_fields(refs, refs.request_body(body)?)?,
        None => BTreeSet::new(),
    };

    let mut responses = Vec::new();
    for (code, response) in &operation.responses.responses {
        let StatusCode::Code(code) = code else {
            tracing::debug!(path, method, range = ?code, "Skipping status code range");
            continue;
        };

        let response = refs.response(response)?;
        responses.push(
            Response::new(*code)
                .with_required(required.iter().cloned())
                .with_examples(examples(refs, &response.content)?),
        );
    }

    // a lone `default` response stands in as 200
    if responses.is_empty() {
        if let Some(default) = &operation.responses.default {
            let response = refs.response(default)?;
            responses.push(
                Response::new(200)
                    .with_required(required.iter().cloned())
                    .with_examples(examples(refs, &response.content)?),
            );
        }
    }

    Ok(Route::new(path, method, responses))
}

/// Required top-level fields of the JSON request body schema
fn required_fields(refs: &Refs<'_>, body: &RequestBody) -> Result<BTreeSet<String>> {
    let Some(schema) = json_media(&body.content).and_then(|media| media.schema.as_ref()) else {
        return Ok(BTreeSet::new());
    };

    let mut fields = BTreeSet::new();
    collect_required(refs, refs.schema(schema)?, &mut fields, 0)?;
    Ok(fields)
}

fn collect_required(
    refs: &Refs<'_>,
    schema: &Schema,
    fields: &mut BTreeSet<String>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_REF_DEPTH {
        bail!("allOf nesting is too deep");
    }

    match &schema.schema_kind {
        SchemaKind::Type(Type::Object(object)) => {
            fields.extend(object.required.iter().cloned());
        }
        SchemaKind::AllOf { all_of } => {
            for part in all_of {
                collect_required(refs, refs.schema(part)?, fields, depth + 1)?;
            }
        }
        SchemaKind::Any(any) => {
            fields.extend(any.required.iter().cloned());
        }
        _ => {}
    }

    Ok(())
}

fn examples(refs: &Refs<'_>, content: &IndexMap<String, MediaType>) -> Result<Examples> {
    let Some(media) = json_media(content) else {
        return Ok(Examples::default());
    };

    let mut examples = Examples {
        default: media.example.clone(),
        named: IndexMap::new(),
    };

    for (name, example) in &media.examples {
        if let Some(value) = &refs.example(example)?.value {
            examples.named.insert(name.clone(), value.clone());
        }
    }

    if examples.default.is_none() && examples.named.is_empty() {
        if let Some(schema) = &media.schema {
            examples.default = Some(refs.generate(refs.schema(schema)?, 0));
        }
    }

    Ok(examples)
}

/// `application/json` content, or failing that any `+json` flavor
fn json_media(content: &IndexMap<String, MediaType>) -> Option<&MediaType> {
    content.get("application/json").or_else(|| {
        content
            .iter()
            .find(|(kind, _)| kind.contains("json"))
            .map(|(_, media)| media)
    })
}

/// Resolves local component references of one document
struct Refs<'a> {
    components: Option<&'a Components>,
}

impl<'a> Refs<'a> {
    fn lookup<T>(
        &self,
        reference: &str,
        section: &str,
        pick: impl Fn(&'a Components) -> &'a IndexMap<String, ReferenceOr<T>>,
    ) -> Result<&'a T> {
        let mut current = reference;

        for _ in 0..MAX_REF_DEPTH {
            let name = current
                .strip_prefix("#/components/")
                .and_then(|rest| rest.strip_prefix(section))
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| anyhow!("Unsupported reference '{}'", current))?;

            let entry = self
                .components
                .map(&pick)
                .and_then(|map| map.get(name))
                .ok_or_else(|| anyhow!("Unresolved reference '{}'", current))?;

            match entry {
                ReferenceOr::Item(value) => return Ok(value),
                ReferenceOr::Reference { reference } => current = reference.as_str(),
            }
        }

        bail!("Reference '{}' nests too deeply", reference)
    }

    fn schema(&self, item: &'a ReferenceOr<Schema>) -> Result<&'a Schema> {
        match item {
            ReferenceOr::Item(schema) => Ok(schema),
            ReferenceOr::Reference { reference } => {
                self.lookup(reference, "schemas", |c| &c.schemas)
            }
        }
    }

    fn boxed_schema(&self, item: &'a ReferenceOr<Box<Schema>>) -> Result<&'a Schema> {
        match item {
            ReferenceOr::Item(schema) => Ok(schema.as_ref()),
            ReferenceOr::Reference { reference } => {
                self.lookup(reference, "schemas", |c| &c.schemas)
            }
        }
    }

    fn response(
        &self,
        item: &'a ReferenceOr<openapiv3::Response>,
    ) -> Result<&'a openapiv3::Response> {
        match item {
            ReferenceOr::Item(response) => Ok(response),
            ReferenceOr::Reference { reference } => {
                self.lookup(reference, "responses", |c| &c.responses)
            }
        }
    }

    fn request_body(&self, item: &'a ReferenceOr<RequestBody>) -> Result<&'a RequestBody> {
        match item {
            ReferenceOr::Item(body) => Ok(body),
            ReferenceOr::Reference { reference } => {
                self.lookup(reference, "requestBodies", |c| &c.request_bodies)
            }
        }
    }

    fn example(&self, item: &'a ReferenceOr<Example>) -> Result<&'a Example> {
        match item {
            ReferenceOr::Item(example) => Ok(example),
            ReferenceOr::Reference { reference } => {
                self.lookup(reference, "examples", |c| &c.examples)
            }
        }
    }

    /// Build a placeholder value shaped like `schema`.
    ///
    /// Declared `example`/`default` values win; unresolvable parts become null.
    fn generate(&self, schema: &'a Schema, depth: usize) -> JsonValue {
        if let Some(example) = &schema.schema_data.example {
            return example.clone();
        }
        if let Some(default) = &schema.schema_data.default {
            return default.clone();
        }
        if depth > MAX_EXAMPLE_DEPTH {
            return JsonValue::Null;
        }

        match &schema.schema_kind {
            SchemaKind::Type(Type::Object(object)) => JsonValue::Object(
                object
                    .properties
                    .iter()
                    .map(|(name, property)| (name.clone(), self.generate_boxed(property, depth)))
                    .collect(),
            ),
            SchemaKind::Type(Type::Array(array)) => JsonValue::Array(
                array
                    .items
                    .iter()
                    .map(|item| self.generate_boxed(item, depth))
                    .collect(),
            ),
            SchemaKind::Type(Type::String { .. }) => JsonValue::String(String::new()),
            SchemaKind::Type(Type::Integer { .. }) | SchemaKind::Type(Type::Number { .. }) => {
                JsonValue::from(0)
            }
            SchemaKind::Type(Type::Boolean { .. }) => JsonValue::Bool(false),
            SchemaKind::AllOf { all_of } => {
                let mut merged = serde_json::Map::new();
                for part in all_of {
                    if let Ok(JsonValue::Object(fields)) =
                        self.schema(part).map(|s| self.generate(s, depth + 1))
                    {
                        merged.extend(fields);
                    }
                }
                JsonValue::Object(merged)
            }
            SchemaKind::OneOf { one_of: options } | SchemaKind::AnyOf { any_of: options } => options
                .first()
                .and_then(|first| self.schema(first).ok())
                .map(|s| self.generate(s, depth + 1))
                .unwrap_or(JsonValue::Null),
            _ => JsonValue::Null,
        }
    }

    fn generate_boxed(&self, item: &'a ReferenceOr<Box<Schema>>, depth: usize) -> JsonValue {
        self.boxed_schema(item)
            .map(|schema| self.generate(schema, depth + 1))
            .unwrap_or(JsonValue::Null)
    }
}
