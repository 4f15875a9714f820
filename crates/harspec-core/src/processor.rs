//! HAR to OpenAPI conversion.
//!
//! The [`Processor`] owns the run configuration (allowed domains and the
//! header surfacing rules) and converts a loaded capture into an OpenAPI
//! document: it decides which entries belong to the target service,
//! normalizes each accepted exchange into one operation, derives a document
//! title from the observed traffic, and assembles the path map.
//!
//! # Examples
//!
//! ```no_run
//! use harspec_core::har::HarDocument;
//! use harspec_core::processor::Processor;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> harspec_core::error::Result<()> {
//! let cancel = CancellationToken::new();
//! let doc = HarDocument::from_file(&cancel, "capture.har").await?;
//!
//! let mut processor = Processor::new(&["example.com".to_string()]);
//! processor.allow_header("Authorization", "Bearer {{token}}");
//!
//! let (payload, spec) = processor.generate(&cancel, &doc)?;
//! println!("{} paths, {} bytes", spec.paths.len(), payload.len());
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use crate::blocklist::is_blocked;
use crate::error::{Error, Result};
use crate::har::{HarDocument, HarEntry, HarRequest, HarResponse, NameValue};
use crate::openapi::{
    HttpMethod, MediaTypeObject, OpenApiDocument, OpenApiInfo, Operation, Parameter, PathItem,
    RequestBody, ResponseObject, Schema, OPENAPI_VERSION,
};

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Longest raw body excerpt kept as an example, in bytes.
const MAX_EXAMPLE_BYTES: usize = 2048;

/// Marker appended to truncated example bodies.
const TRUNCATION_MARKER: char = '\u{2026}';

/// Controls how a request header should appear in the generated document.
#[derive(Debug, Clone, Default)]
pub struct HeaderRule {
    pub name: String,
    pub replacement: String,
    pub required: bool,
    pub description: String,
}

/// Converts HAR documents into OpenAPI definitions.
///
/// Configuration is fixed at construction (plus any [`Processor::allow_header`]
/// calls made before processing) and never mutated during a run.
#[derive(Debug, Clone)]
pub struct Processor {
    domains: Vec<String>,
    header_rules: HashMap<String, HeaderRule>,
}

impl Processor {
    /// Build a processor for the given allowed domains. Domains are
    /// lowercased, trimmed and deduplicated while preserving caller order.
    pub fn new(domains: &[String]) -> Self {
        let mut cleaned = Vec::with_capacity(domains.len());
        let mut seen = HashSet::with_capacity(domains.len());
        for domain in domains {
            let domain = domain.trim().to_ascii_lowercase();
            if domain.is_empty() || !seen.insert(domain.clone()) {
                continue;
            }
            cleaned.push(domain);
        }
        Self {
            domains: cleaned,
            header_rules: HashMap::new(),
        }
    }

    /// The cleaned allowed-domain list, in caller order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Register a header that should be surfaced in the generated document.
    /// If `replacement` is non-empty it is used as the example value instead
    /// of whatever was captured, to avoid leaking sensitive tokens.
    pub fn allow_header(&mut self, name: &str, replacement: &str) {
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return;
        }

        // Keep the caller's casing for display purposes.
        self.header_rules.insert(
            key,
            HeaderRule {
                name: name.to_string(),
                replacement: replacement.to_string(),
                ..HeaderRule::default()
            },
        );
    }

    /// Produce the OpenAPI document and its serialized JSON payload from a
    /// loaded capture. Cancellation is observed once per entry; on
    /// cancellation no partial document is returned.
    pub fn generate(
        &self,
        cancel: &CancellationToken,
        doc: &HarDocument,
    ) -> Result<(Vec<u8>, OpenApiDocument)> {
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        let mut seen_hosts: HashSet<String> = HashSet::new();

        for entry in &doc.log.entries {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let Some(req_url) = self.accept_entry(entry) else {
                continue;
            };

            if let Some(host) = req_url.host_str() {
                let host = host.trim().to_ascii_lowercase();
                if !host.is_empty() {
                    seen_hosts.insert(host);
                }
            }

            let mut clean_path = req_url.path().to_string();
            if clean_path.is_empty() {
                clean_path = "/".to_string();
            }
            if clean_path.ends_with('/') && clean_path.len() > 1 {
                clean_path = clean_path.trim_end_matches('/').to_string();
            }

            let method = match HttpMethod::from_str(&entry.request.method) {
                Ok(method) => method,
                Err(_) => {
                    log::debug!(
                        "skipping unsupported method {} for {}",
                        entry.request.method,
                        entry.request.url
                    );
                    continue;
                }
            };

            let operation = self.build_operation(entry);
            paths.entry(clean_path).or_default().insert(method, operation);
        }

        let titles = collect_page_titles(doc);
        let info_title = derive_title(&titles, &self.domains, &seen_hosts);

        let spec = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: OpenApiInfo {
                title: info_title,
                version: "0.1.0".to_string(),
                summary: format!("Generated from {} HAR entries", doc.log.entries.len()),
            },
            paths,
        };

        let payload = spec.to_pretty_json()?;
        Ok((payload, spec))
    }

    /// Decide whether an entry belongs to the target service. Returns the
    /// parsed request URL when it does.
    fn accept_entry(&self, entry: &HarEntry) -> Option<Url> {
        let req_url = Url::parse(&entry.request.url).ok()?;

        let host = req_url.host_str()?.trim().to_ascii_lowercase();
        if host.is_empty() {
            return None;
        }

        // The blocklist beats every allow rule, including header origins.
        if is_blocked(&host) {
            return None;
        }

        if self.allow_host(&host) {
            return Some(req_url);
        }

        if self.match_header_domains(&entry.request.headers) {
            return Some(req_url);
        }

        None
    }

    fn allow_host(&self, host: &str) -> bool {
        self.domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
    }

    /// Third-party hosts often front a first-party origin (API gateways,
    /// CDN-hosted endpoints), so an allowed `Origin`/`Referer` also counts.
    fn match_header_domains(&self, headers: &[NameValue]) -> bool {
        headers.iter().any(|header| {
            let name = header.name.trim().to_ascii_lowercase();
            if name != "origin" && name != "referer" {
                return false;
            }

            let host = host_from_url(&header.value);
            !host.is_empty() && !is_blocked(&host) && self.allow_host(&host)
        })
    }

    fn build_operation(&self, entry: &HarEntry) -> Operation {
        let req = &entry.request;
        let res = &entry.response;

        let summary = format!("{} {}", req.method, trim_url(&req.url));
        let desc = format!("Captured response status {} {}", res.status, res.status_text);

        let operation_id = format!(
            "{}_{}",
            req.method.to_ascii_lowercase(),
            sanitize_operation_id(&req.url)
        );

        let status_key = if res.status == 0 {
            "default".to_string()
        } else {
            res.status.to_string()
        };

        let mut responses = BTreeMap::new();
        responses.insert(status_key, self.build_response(res, &desc));

        Operation {
            operation_id,
            summary,
            description: desc,
            responses,
            parameters: self.build_header_parameters(&req.headers),
            request_body: self.build_request_body(req),
        }
    }

    fn build_response(&self, res: &HarResponse, desc: &str) -> ResponseObject {
        let media_type = res.content.mime_type.trim();
        let mut content = BTreeMap::new();

        if !media_type.is_empty() {
            content.insert(
                media_type.to_string(),
                MediaTypeObject {
                    schema: Some(Schema::of_type(infer_type_from_mime(media_type))),
                    example: example_from_body(media_type, &res.content.text),
                },
            );
        }

        ResponseObject {
            description: desc.trim().to_string(),
            content,
        }
    }

    fn build_request_body(&self, req: &HarRequest) -> Option<RequestBody> {
        let post_data = req.post_data.as_ref()?;

        let mut mime = post_data.mime_type.trim().to_string();
        let mut body_text = post_data.text.trim().to_string();

        if mime.is_empty() {
            mime = if !post_data.params.is_empty() {
                "application/x-www-form-urlencoded".to_string()
            } else if looks_like_json(&body_text) {
                "application/json".to_string()
            } else {
                "text/plain".to_string()
            };
        }

        if body_text.is_empty() && !post_data.params.is_empty() {
            body_text = post_data
                .params
                .iter()
                .map(|param| format!("{}={}", param.name, param.value))
                .collect::<Vec<_>>()
                .join("&");
        }

        let example = example_from_body(&mime, &body_text)?;

        let mut content = BTreeMap::new();
        content.insert(
            mime.clone(),
            MediaTypeObject {
                schema: Some(Schema::of_type(infer_type_from_mime(&mime))),
                example: Some(example),
            },
        );

        let required = ["POST", "PUT", "PATCH"]
            .iter()
            .any(|m| req.method.eq_ignore_ascii_case(m));

        Some(RequestBody {
            description: String::new(),
            required,
            content,
        })
    }

    /// Emit a parameter for each captured header covered by a rule. The
    /// rule's replacement value wins over the captured one so secrets like
    /// bearer tokens never land in the generated document.
    fn build_header_parameters(&self, headers: &[NameValue]) -> Vec<Parameter> {
        if headers.is_empty() || self.header_rules.is_empty() {
            return Vec::new();
        }

        let mut params = Vec::new();
        for header in headers {
            let key = header.name.trim().to_ascii_lowercase();
            let Some(rule) = self.header_rules.get(&key) else {
                continue;
            };

            let value = if rule.replacement.is_empty() {
                header.value.trim().to_string()
            } else {
                rule.replacement.clone()
            };

            params.push(Parameter {
                name: rule.name.clone(),
                location: "header".to_string(),
                description: rule.description.clone(),
                required: rule.required,
                schema: Some(Schema::of_type("string")),
                example: (!value.is_empty()).then(|| JsonValue::String(value)),
            });
        }

        params
    }
}

/// Extract a lowercase hostname from a header value. Values that do not
/// parse as a URL (e.g. a bare hostname) fall back to the slash-trimmed raw
/// string.
fn host_from_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    match Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.trim().to_ascii_lowercase())
            .unwrap_or_default(),
        Err(_) => raw.to_ascii_lowercase().trim_matches('/').to_string(),
    }
}

/// Derive the example value for a payload. JSON-looking bodies decode to a
/// structured example; everything else is kept verbatim, truncated to
/// [`MAX_EXAMPLE_BYTES`]. Empty bodies yield no example at all.
fn example_from_body(mime: &str, text: &str) -> Option<JsonValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if mime.to_ascii_lowercase().contains("json") || looks_like_json(trimmed) {
        if let Ok(payload) = serde_json::from_str::<JsonValue>(trimmed) {
            return Some(payload);
        }
    }

    Some(JsonValue::String(truncate_text(trimmed, MAX_EXAMPLE_BYTES)))
}

fn looks_like_json(body: &str) -> bool {
    let body = body.trim();
    let (Some(first), Some(last)) = (body.chars().next(), body.chars().next_back()) else {
        return false;
    };
    (first == '{' && last == '}') || (first == '[' && last == ']')
}

/// Truncate to at most `max` bytes without splitting a multi-byte character,
/// appending a marker when anything was cut.
fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 || value.len() <= max {
        return value.to_string();
    }

    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = value[..end].to_string();
    truncated.push(TRUNCATION_MARKER);
    truncated
}

/// Cleaned path (plus query, if any) used in operation summaries.
fn trim_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    let mut sanitized = clean_url_path(parsed.path());
    if let Some(query) = parsed.query() {
        if !query.is_empty() {
            sanitized.push('?');
            sanitized.push_str(query);
        }
    }
    sanitized
}

/// Lexically normalize a URL path: collapse duplicate slashes and resolve
/// `.` / `..` segments.
fn clean_url_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Build the operation ID suffix from a request URL: keep `[a-z0-9_]`,
/// lowercase letters, turn path punctuation into underscores and drop the
/// rest.
fn sanitize_operation_id(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return "unknown".to_string();
    };

    let id = parsed.path().trim_matches('/');
    if id.is_empty() {
        return "root".to_string();
    }

    id.chars()
        .filter_map(|c| match c {
            '/' | '-' | '{' | '}' => Some('_'),
            'a'..='z' | '0'..='9' | '_' => Some(c),
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

/// Coarse MIME classifier. This is not a schema generator; everything is
/// either an `object` or a `string`.
fn infer_type_from_mime(mime: &str) -> &'static str {
    let lower = mime.to_ascii_lowercase();
    if lower.contains("json") || lower.contains("xml") {
        "object"
    } else {
        "string"
    }
}

/// Distinct non-empty page titles from the capture, sorted.
fn collect_page_titles(doc: &HarDocument) -> Vec<String> {
    let titles: BTreeSet<String> = doc
        .log
        .pages
        .iter()
        .map(|page| page.title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect();
    titles.into_iter().collect()
}

/// Pick the document title: first ordered accepted host, else page titles,
/// else a generic fallback.
fn derive_title(titles: &[String], allowed_domains: &[String], hosts: &HashSet<String>) -> String {
    let ordered = ordered_host_list(allowed_domains, hosts);
    if let Some(first) = ordered.first() {
        return format!("{first} API");
    }

    match titles {
        [] => "Generated API".to_string(),
        [only] => only.clone(),
        [first, ..] => format!("{first} et al."),
    }
}

/// Honor the caller-specified domain order where a domain was itself seen as
/// a host; any further hosts discovered in the capture follow, sorted.
fn ordered_host_list(allowed_domains: &[String], hosts: &HashSet<String>) -> Vec<String> {
    if hosts.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(hosts.len());
    let mut seen = HashSet::with_capacity(hosts.len());

    for domain in allowed_domains {
        let domain = domain.trim().to_ascii_lowercase();
        if !domain.is_empty() && hosts.contains(&domain) && seen.insert(domain.clone()) {
            result.push(domain);
        }
    }

    let mut rest: Vec<String> = hosts
        .iter()
        .filter(|host| !seen.contains(*host))
        .cloned()
        .collect();
    rest.sort();
    result.extend(rest);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::{HarContent, HarLog, HarPage, HarPostData};

    fn entry(method: &str, url: &str) -> HarEntry {
        HarEntry {
            request: HarRequest {
                method: method.to_string(),
                url: url.to_string(),
                ..HarRequest::default()
            },
            response: HarResponse {
                status: 200,
                status_text: "OK".to_string(),
                ..HarResponse::default()
            },
            ..HarEntry::default()
        }
    }

    fn doc_with(entries: Vec<HarEntry>) -> HarDocument {
        HarDocument {
            log: HarLog {
                entries,
                ..HarLog::default()
            },
        }
    }

    fn generate(processor: &Processor, doc: &HarDocument) -> (Vec<u8>, OpenApiDocument) {
        processor
            .generate(&CancellationToken::new(), doc)
            .expect("generation should succeed")
    }

    #[test]
    fn test_tracker_traffic_is_filtered_out() {
        let mut first = entry("GET", "https://api.example.com/users");
        first.response.content = HarContent {
            size: 8,
            mime_type: "application/json".to_string(),
            text: r#"{"id":1}"#.to_string(),
        };
        let second = entry("POST", "https://tracker.ads.google.com/x");

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![first, second]));

        assert_eq!(spec.paths.len(), 1);
        let item = spec.paths.get("/users").expect("path /users");
        let op = item.get(HttpMethod::Get).expect("get operation");
        assert_eq!(op.operation_id, "get_users");
        assert_eq!(op.summary, "GET /users");
        assert_eq!(spec.info.title, "api.example.com API");

        let response = op.responses.get("200").expect("200 response");
        assert_eq!(response.description, "Captured response status 200 OK");
        let media = response.content.get("application/json").expect("media");
        assert_eq!(media.example, Some(serde_json::json!({"id": 1})));
        assert_eq!(media.schema.as_ref().unwrap().schema_type, "object");
    }

    #[test]
    fn test_blocklist_beats_allowed_origin_header() {
        let mut blocked = entry("GET", "https://tracker.ads.google.com/collect");
        blocked
            .request
            .headers
            .push(NameValue::new("Origin", "https://app.example.org"));

        let processor = Processor::new(&["example.org".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![blocked]));
        assert!(spec.paths.is_empty());
    }

    #[test]
    fn test_origin_header_fallback_accepts_foreign_host() {
        let mut fronted = entry("GET", "https://cdn.unknown.net/v1/data");
        fronted
            .request
            .headers
            .push(NameValue::new("Origin", "https://app.example.org"));

        let processor = Processor::new(&["example.org".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![fronted]));
        assert!(spec.paths.contains_key("/v1/data"));
    }

    #[test]
    fn test_bare_hostname_origin_uses_raw_fallback() {
        let mut fronted = entry("GET", "https://cdn.unknown.net/asset");
        fronted
            .request
            .headers
            .push(NameValue::new("Referer", "app.example.org/"));

        let processor = Processor::new(&["example.org".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![fronted]));
        assert!(spec.paths.contains_key("/asset"));
    }

    #[test]
    fn test_last_entry_wins_for_same_path_and_verb() {
        let mut first = entry("GET", "https://api.example.com/users");
        first.response.status = 500;
        first.response.status_text = "Internal Server Error".to_string();
        let second = entry("GET", "https://api.example.com/users");

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![first, second]));

        let op = spec.paths["/users"].get(HttpMethod::Get).unwrap();
        assert!(op.responses.contains_key("200"));
        assert!(!op.responses.contains_key("500"));
    }

    #[test]
    fn test_unsupported_verb_is_dropped_silently() {
        let propfind = entry("PROPFIND", "https://api.example.com/dav");
        let get = entry("GET", "https://api.example.com/files");

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![propfind, get]));

        assert_eq!(spec.paths.len(), 1);
        assert!(spec.paths.contains_key("/files"));
    }

    #[test]
    fn test_unparsable_url_skips_entry_without_failing_run() {
        let bad = entry("GET", "not a url");
        let good = entry("GET", "https://api.example.com/ok");

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![bad, good]));
        assert_eq!(spec.paths.len(), 1);
    }

    #[test]
    fn test_trailing_slash_and_empty_path_normalization() {
        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(
            &processor,
            &doc_with(vec![
                entry("GET", "https://api.example.com/users/"),
                entry("GET", "https://api.example.com"),
            ]),
        );

        assert!(spec.paths.contains_key("/users"));
        assert!(spec.paths.contains_key("/"));
    }

    #[test]
    fn test_query_strings_collapse_onto_one_operation() {
        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(
            &processor,
            &doc_with(vec![
                entry("GET", "https://api.example.com/search?q=a"),
                entry("GET", "https://api.example.com/search?q=b"),
            ]),
        );

        assert_eq!(spec.paths.len(), 1);
        let op = spec.paths["/search"].get(HttpMethod::Get).unwrap();
        // the last capture's query survives only in the summary
        assert_eq!(op.summary, "GET /search?q=b");
    }

    #[test]
    fn test_status_zero_maps_to_default_response() {
        let mut failed = entry("GET", "https://api.example.com/ping");
        failed.response.status = 0;
        failed.response.status_text = String::new();

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![failed]));

        let op = spec.paths["/ping"].get(HttpMethod::Get).unwrap();
        assert!(op.responses.contains_key("default"));
    }

    #[test]
    fn test_form_params_synthesize_urlencoded_body() {
        let mut post = entry("POST", "https://api.example.com/submit");
        post.request.post_data = Some(HarPostData {
            mime_type: String::new(),
            text: String::new(),
            params: vec![NameValue::new("a", "1")],
        });

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![post]));

        let op = spec.paths["/submit"].get(HttpMethod::Post).unwrap();
        let body = op.request_body.as_ref().expect("request body");
        assert!(body.required);
        let media = body
            .content
            .get("application/x-www-form-urlencoded")
            .expect("urlencoded media");
        assert_eq!(media.example, Some(JsonValue::String("a=1".to_string())));
    }

    #[test]
    fn test_request_body_required_only_for_mutating_verbs() {
        let mut del = entry("DELETE", "https://api.example.com/items/1");
        del.request.post_data = Some(HarPostData {
            mime_type: "application/json".to_string(),
            text: r#"{"reason":"cleanup"}"#.to_string(),
            params: Vec::new(),
        });

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![del]));

        let op = spec.paths["/items/1"].get(HttpMethod::Delete).unwrap();
        assert!(!op.request_body.as_ref().unwrap().required);
    }

    #[test]
    fn test_empty_post_data_produces_no_request_body() {
        let mut post = entry("POST", "https://api.example.com/noop");
        post.request.post_data = Some(HarPostData::default());

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc_with(vec![post]));

        let op = spec.paths["/noop"].get(HttpMethod::Post).unwrap();
        assert!(op.request_body.is_none());
    }

    #[test]
    fn test_header_rule_replacement_masks_captured_secret() {
        let mut get = entry("GET", "https://api.example.com/private");
        get.request
            .headers
            .push(NameValue::new("Authorization", "Bearer super-secret"));
        get.request
            .headers
            .push(NameValue::new("X-Request-Id", "abc123"));

        let mut processor = Processor::new(&["example.com".to_string()]);
        processor.allow_header("Authorization", "Bearer {{BearerAdmin}}");

        let (payload, spec) = generate(&processor, &doc_with(vec![get]));

        let op = spec.paths["/private"].get(HttpMethod::Get).unwrap();
        assert_eq!(op.parameters.len(), 1);
        let param = &op.parameters[0];
        assert_eq!(param.name, "Authorization");
        assert_eq!(param.location, "header");
        assert_eq!(
            param.example,
            Some(JsonValue::String("Bearer {{BearerAdmin}}".to_string()))
        );

        let text = String::from_utf8(payload).unwrap();
        assert!(!text.contains("super-secret"));
        assert!(!text.contains("X-Request-Id"));
    }

    #[test]
    fn test_generation_is_deterministic_across_runs() {
        let entries = vec![
            entry("GET", "https://api.example.com/zeta"),
            entry("GET", "https://api.example.com/alpha"),
            entry("POST", "https://api.example.com/alpha"),
        ];
        let doc = doc_with(entries);

        let processor = Processor::new(&["example.com".to_string()]);
        let (first, _) = generate(&processor, &doc);
        let (second, spec) = generate(&processor, &doc);

        assert_eq!(first, second);
        let reparsed: OpenApiDocument = serde_json::from_slice(&first).unwrap();
        assert_eq!(reparsed.paths, spec.paths);
    }

    #[test]
    fn test_cancellation_aborts_processing() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let processor = Processor::new(&["example.com".to_string()]);
        let doc = doc_with(vec![entry("GET", "https://api.example.com/users")]);
        let err = processor.generate(&cancel, &doc).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_example_from_body_decodes_json() {
        let example = example_from_body("application/json", r#"{"id": 1}"#).unwrap();
        assert_eq!(example, serde_json::json!({"id": 1}));

        // JSON-shaped bodies decode even without a JSON MIME type
        let shaped = example_from_body("text/plain", "[1, 2, 3]").unwrap();
        assert_eq!(shaped, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_example_from_body_truncates_long_text() {
        let long = "x".repeat(MAX_EXAMPLE_BYTES + 100);
        let example = example_from_body("text/plain", &long).unwrap();
        let JsonValue::String(text) = example else {
            panic!("expected string example");
        };
        assert!(text.starts_with("xxx"));
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(text.chars().count(), MAX_EXAMPLE_BYTES + 1);
    }

    #[test]
    fn test_example_from_body_empty_yields_none() {
        assert!(example_from_body("application/json", "").is_none());
        assert!(example_from_body("text/plain", "   ").is_none());
    }

    #[test]
    fn test_truncate_text_respects_char_boundaries() {
        // 'é' is two bytes; a naive byte slice at 3 would split it
        let value = "aaéé";
        let truncated = truncate_text(value, 3);
        assert!(truncated.starts_with("aa"));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_sanitize_operation_id() {
        assert_eq!(
            sanitize_operation_id("https://api.example.com/users/{id}/pet-toys"),
            "users__id__pet_toys"
        );
        assert_eq!(sanitize_operation_id("https://api.example.com/"), "root");
        assert_eq!(
            sanitize_operation_id("https://api.example.com/V1/Items.json"),
            "v1_itemsjson"
        );
        assert_eq!(sanitize_operation_id("::not a url::"), "unknown");
    }

    #[test]
    fn test_infer_type_from_mime() {
        assert_eq!(infer_type_from_mime("application/json"), "object");
        assert_eq!(infer_type_from_mime("application/xhtml+XML"), "object");
        assert_eq!(infer_type_from_mime("text/html"), "string");
        assert_eq!(infer_type_from_mime("text/csv"), "string");
        assert_eq!(infer_type_from_mime("image/png"), "string");
    }

    #[test]
    fn test_title_falls_back_to_page_titles() {
        let mut doc = doc_with(Vec::new());
        doc.log.pages = vec![
            HarPage {
                title: "Zeta Console".to_string(),
                ..HarPage::default()
            },
            HarPage {
                title: "Admin Portal".to_string(),
                ..HarPage::default()
            },
        ];

        let processor = Processor::new(&["example.com".to_string()]);
        let (_, spec) = generate(&processor, &doc);
        assert_eq!(spec.info.title, "Admin Portal et al.");

        doc.log.pages.truncate(1);
        let (_, spec) = generate(&processor, &doc);
        assert_eq!(spec.info.title, "Zeta Console");

        doc.log.pages.clear();
        let (_, spec) = generate(&processor, &doc);
        assert_eq!(spec.info.title, "Generated API");
    }

    #[test]
    fn test_title_honors_declared_domain_order() {
        let mut hosts = HashSet::new();
        hosts.insert("b.example".to_string());
        hosts.insert("a.example".to_string());

        // declared order wins over lexicographic order for exact matches
        let domains = vec!["b.example".to_string(), "a.example".to_string()];
        let ordered = ordered_host_list(&domains, &hosts);
        assert_eq!(ordered, vec!["b.example".to_string(), "a.example".to_string()]);

        let title = derive_title(&[], &domains, &hosts);
        assert_eq!(title, "b.example API");
    }

    #[test]
    fn test_domains_are_cleaned_and_deduplicated() {
        let processor = Processor::new(&[
            " Example.COM ".to_string(),
            "example.com".to_string(),
            String::new(),
            "other.org".to_string(),
        ]);
        assert_eq!(processor.domains(), ["example.com", "other.org"]);
    }
}
