//! `OpenAPI` 3.0 format exporter.
//!
//! Aggregates observed traffic for the most frequent host into one
//! document. Operations are keyed by exact path and method; no path
//! templating is attempted.

use std::collections::{BTreeMap, HashSet};

use netexport_domain::{ExportFormat, ExportOptions, ExportResult, ExportWarning, HttpTransaction};
use serde::Serialize;
use serde_json::Value;

use super::ExportError;
use crate::http::{DecodedBody, MediaKind, decode_body, essence, kind_of};
use crate::serialization::to_json;

/// `OpenAPI` version written to the `openapi` field.
pub const OPENAPI_VERSION: &str = "3.0.0";

const NO_RESPONSE_DESCRIPTION: &str = "No response recorded";

/// `OpenAPI` 3.0 exporter.
pub struct OpenApiExporter;

impl OpenApiExporter {
    /// Export transactions to an `OpenAPI` 3.0 JSON document.
    ///
    /// Transactions on other hosts than the most frequent one are skipped
    /// with a warning, as are methods `OpenAPI` has no slot for.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn export<'a, I>(
        transactions: I,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        let transactions: Vec<&HttpTransaction> = transactions.into_iter().collect();
        let primary = primary_server(&transactions);

        let mut builder = DocumentBuilder::default();
        for transaction in &transactions {
            builder.add(transaction, primary.as_ref());
        }

        let documented = builder.documented;
        let warnings = std::mem::take(&mut builder.warnings);
        let document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: options
                    .api_title
                    .clone()
                    .or_else(|| primary.as_ref().map(|server| server.host.clone()))
                    .unwrap_or_else(|| "API".to_string()),
                version: options.api_version.clone(),
                description: options.api_description.clone(),
            },
            servers: primary
                .map(|server| vec![Server { url: server.url }])
                .unwrap_or_default(),
            paths: builder.paths,
        };

        let content = to_json(&document, options.pretty_print)?;
        let mut result = ExportResult::text(content, ExportFormat::Swagger, documented);
        for warning in warnings {
            result.add_warning(warning);
        }
        Ok(result)
    }
}

/// Scheme, host and port of a request; one `OpenAPI` server.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerKey {
    url: String,
    host: String,
}

impl ServerKey {
    fn of(transaction: &HttpTransaction) -> Option<Self> {
        let url = transaction.parsed_url()?;
        let host = url.host_str()?.to_string();
        let server = match url.port() {
            Some(port) => format!("{}://{host}:{port}", url.scheme()),
            None => format!("{}://{host}", url.scheme()),
        };
        Some(Self { url: server, host })
    }
}

/// Most frequent server; ties go to the server seen first.
fn primary_server(transactions: &[&HttpTransaction]) -> Option<ServerKey> {
    let mut counts: Vec<(ServerKey, usize)> = Vec::new();
    for server in transactions.iter().filter_map(|tx| ServerKey::of(tx)) {
        match counts.iter_mut().find(|(s, _)| *s == server) {
            Some((_, count)) => *count += 1,
            None => counts.push((server, 1)),
        }
    }

    let mut best: Option<(ServerKey, usize)> = None;
    for (server, count) in counts {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((server, count));
        }
    }
    best.map(|(server, _)| server)
}

#[derive(Default)]
struct DocumentBuilder {
    paths: BTreeMap<String, PathItem>,
    used_ids: HashSet<String>,
    warnings: Vec<ExportWarning>,
    documented: usize,
}

impl DocumentBuilder {
    fn add(&mut self, transaction: &HttpTransaction, primary: Option<&ServerKey>) {
        let source = format!("{} {}", transaction.method, transaction.url);

        let Some(server) = ServerKey::of(transaction) else {
            self.warnings
                .push(ExportWarning::new("Could not parse URL").with_source(source));
            return;
        };
        if primary != Some(&server) {
            self.warnings.push(
                ExportWarning::new(format!(
                    "Skipped transaction for non-primary server {}",
                    server.url
                ))
                .with_source(source),
            );
            return;
        }

        let method = transaction.method.to_ascii_lowercase();
        if !PathItem::supports(&method) {
            self.warnings.push(
                ExportWarning::new(format!("Unsupported method: {}", transaction.method))
                    .with_source(source),
            );
            return;
        }

        let mut path = transaction.path();
        if path.is_empty() {
            path.push('/');
        }

        let Some(slot) = self.paths.entry(path.clone()).or_default().slot(&method) else {
            return;
        };

        let operation = slot.get_or_insert_with(|| {
            let id = unique_id(operation_id(&method, &path), &mut self.used_ids);
            Operation::new(id, format!("{} {path}", method.to_ascii_uppercase()))
        });
        operation.record(transaction);
        self.documented += 1;
    }
}

fn operation_id(method: &str, path: &str) -> String {
    let mut id = method.to_string();
    let mut named = false;
    for segment in path.split('/') {
        let cleaned: String = segment.chars().filter(char::is_ascii_alphanumeric).collect();
        if !cleaned.is_empty() {
            id.push_str(&capitalize(&cleaned));
            named = true;
        }
    }
    if !named {
        id.push_str("Root");
    }
    id
}

fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2_u32;
    loop {
        let candidate = format!("{base}{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    c.next().map_or_else(String::new, |f| f.to_uppercase().collect::<String>() + c.as_str())
}

/// Builds a media type entry for an observed body.
fn media_entry(bytes: Option<&[u8]>, content_type: Option<&str>) -> Option<(String, MediaType)> {
    let decoded = decode_body(bytes, content_type);
    let media = match &decoded {
        DecodedBody::Empty => return None,
        DecodedBody::Binary { .. } => MediaType {
            schema: Some(Schema::binary()),
            example: None,
        },
        DecodedBody::Text(text) => MediaType {
            schema: None,
            example: Some(example_value(text, kind_of(content_type))),
        },
    };

    let key = content_type.and_then(essence).unwrap_or_else(|| {
        if decoded.as_text().is_some() {
            "text/plain".to_string()
        } else {
            "application/octet-stream".to_string()
        }
    });
    Some((key, media))
}

fn example_value(text: &str, kind: MediaKind) -> Value {
    if kind == MediaKind::Json
        && let Ok(value) = serde_json::from_str(text)
    {
        return value;
    }
    Value::String(text.to_string())
}

// OpenAPI structs

#[derive(Serialize)]
struct OpenApiDocument {
    openapi: String,
    info: Info,
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
}

#[derive(Serialize)]
struct Info {
    title: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct Server {
    url: String,
}

#[derive(Serialize, Default)]
struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Operation>,
}

impl PathItem {
    const fn supports(method: &str) -> bool {
        matches!(
            method.as_bytes(),
            b"get" | b"put" | b"post" | b"delete" | b"options" | b"head" | b"patch" | b"trace"
        )
    }

    fn slot(&mut self, method: &str) -> Option<&mut Option<Operation>> {
        match method {
            "get" => Some(&mut self.get),
            "put" => Some(&mut self.put),
            "post" => Some(&mut self.post),
            "delete" => Some(&mut self.delete),
            "options" => Some(&mut self.options),
            "head" => Some(&mut self.head),
            "patch" => Some(&mut self.patch),
            "trace" => Some(&mut self.trace),
            _ => None,
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    operation_id: String,
    summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_body: Option<RequestBody>,
    responses: BTreeMap<String, Response>,
}

impl Operation {
    const fn new(operation_id: String, summary: String) -> Self {
        Self {
            operation_id,
            summary,
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
        }
    }

    /// Merges one observation into the operation. First examples win.
    fn record(&mut self, transaction: &HttpTransaction) {
        for (name, value) in transaction.query_pairs() {
            if !self.parameters.iter().any(|p| p.name == name) {
                self.parameters.push(Parameter::query(name, value));
            }
        }

        if self.request_body.is_none() {
            self.request_body = media_entry(
                transaction.request_payload(),
                transaction.request_content_type(),
            )
            .map(|(key, media)| RequestBody {
                content: BTreeMap::from([(key, media)]),
            });
        }

        let (key, description) = match transaction.status_code {
            Some(code) => {
                let reason = transaction.reason_phrase();
                let description = if reason.is_empty() {
                    format!("Response {code}")
                } else {
                    reason.to_string()
                };
                (code.to_string(), description)
            }
            None => ("default".to_string(), NO_RESPONSE_DESCRIPTION.to_string()),
        };

        self.responses.entry(key).or_insert_with(|| Response {
            description,
            content: media_entry(
                transaction.response_payload(),
                transaction.response_content_type(),
            )
            .into_iter()
            .collect(),
        });
    }
}

#[derive(Serialize)]
struct Parameter {
    name: String,
    #[serde(rename = "in")]
    location: String,
    required: bool,
    schema: Schema,
}

impl Parameter {
    fn query(name: String, example: String) -> Self {
        Self {
            name,
            location: "query".to_string(),
            required: false,
            schema: Schema {
                schema_type: "string".to_string(),
                format: None,
                example: Some(example),
            },
        }
    }
}

#[derive(Serialize)]
struct Schema {
    #[serde(rename = "type")]
    schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
}

impl Schema {
    fn binary() -> Self {
        Self {
            schema_type: "string".to_string(),
            format: Some("binary".to_string()),
            example: None,
        }
    }
}

#[derive(Serialize)]
struct RequestBody {
    content: BTreeMap<String, MediaType>,
}

#[derive(Serialize)]
struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<Value>,
}

#[derive(Serialize)]
struct Response {
    description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    content: BTreeMap<String, MediaType>,
}
