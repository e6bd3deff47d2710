//! Span data model.
//!
//! A span is one record within a trace. faultloom only cares about a small
//! slice of what a real trace store hands back: the reference structure
//! needed to rebuild a DAG, and the tags the success-rate analyzer reads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The suffixes Istio appends to a cluster-internal FQDN; either is
/// stripped when recovering a plain service name from `upstream_cluster`.
const CLUSTER_SUFFIXES: [&str; 2] = [".default.svc.cluster.local", ".svc.cluster.local"];

/// The kind of parent reference a span carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// A strict parent/child relationship within the same logical request.
    ChildOf,
    /// A causal but non-blocking relationship (e.g. a fire-and-forget call).
    FollowsFrom,
}

/// A reference from a span to one of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanReference {
    /// The kind of reference.
    pub ref_type: ReferenceType,
    /// The referenced span's id.
    pub span_id: String,
}

impl SpanReference {
    /// Creates a `CHILD_OF` reference to the given span id.
    #[must_use]
    pub fn child_of(span_id: impl Into<String>) -> Self {
        Self {
            ref_type: ReferenceType::ChildOf,
            span_id: span_id.into(),
        }
    }

    /// Creates a `FOLLOWS_FROM` reference to the given span id.
    #[must_use]
    pub fn follows_from(span_id: impl Into<String>) -> Self {
        Self {
            ref_type: ReferenceType::FollowsFrom,
            span_id: span_id.into(),
        }
    }
}

/// A value that can be stored as a span tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// A 64-bit integer value.
    Int(i64),
}

impl AttributeValue {
    /// Returns the value as a string reference, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool, if it is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A span representing a single unit of work within a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The id of the trace this span belongs to.
    pub trace_id: String,
    /// This span's own id.
    pub span_id: String,
    /// References to parent spans, if any.
    #[serde(default)]
    pub references: Vec<SpanReference>,
    /// The service that produced this span.
    pub service: String,
    /// The operation (RPC/method) name.
    pub operation: String,
    /// Start time, nanoseconds since the Unix epoch.
    pub start_time_ns: u64,
    /// Span tags.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, AttributeValue>,
}

impl Span {
    /// Creates a new span with the given trace/span ids.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            references: Vec::new(),
            service: String::new(),
            operation: String::new(),
            start_time_ns: 0,
            attributes: HashMap::new(),
        }
    }

    /// Sets the producing service.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Sets the start time in nanoseconds.
    #[must_use]
    pub const fn with_start_time_ns(mut self, start_time_ns: u64) -> Self {
        self.start_time_ns = start_time_ns;
        self
    }

    /// Adds a parent reference.
    #[must_use]
    pub fn with_reference(mut self, reference: SpanReference) -> Self {
        self.references.push(reference);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns true if this span has no parent references.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.references.is_empty()
    }

    /// Returns the `http.url` tag, if set.
    #[must_use]
    pub fn http_url(&self) -> Option<&str> {
        self.attributes.get("http.url").and_then(AttributeValue::as_str)
    }

    /// Returns the `http.status_code` tag (a decimal string, e.g. `"200"`), if set.
    #[must_use]
    pub fn http_status_code(&self) -> Option<&str> {
        self.attributes
            .get("http.status_code")
            .and_then(AttributeValue::as_str)
    }

    /// Returns true if `http.status_code == "200"`.
    #[must_use]
    pub fn is_200(&self) -> bool {
        self.http_status_code() == Some("200")
    }

    /// Returns the `error` tag, defaulting to `false` when absent.
    #[must_use]
    pub fn has_error_tag(&self) -> bool {
        self.attributes
            .get("error")
            .and_then(AttributeValue::as_bool)
            .unwrap_or(false)
    }

    /// Returns the `grpc.authority` tag's host part, if set.
    #[must_use]
    pub fn grpc_authority_host(&self) -> Option<&str> {
        self.attributes
            .get("grpc.authority")
            .and_then(AttributeValue::as_str)
            .map(|authority| authority.split(':').next().unwrap_or(authority))
    }

    /// Returns the raw `upstream_cluster` tag, if set.
    #[must_use]
    pub fn upstream_cluster(&self) -> Option<&str> {
        self.attributes
            .get("upstream_cluster")
            .and_then(AttributeValue::as_str)
    }

    /// Resolves the downstream service this span called, preferring
    /// `grpc.authority`'s host and falling back to an outbound
    /// `upstream_cluster` entry with its cluster-domain suffix stripped.
    ///
    /// Returns `None` when neither tag yields a usable name, when the
    /// cluster entry is inbound, or when the raw value is `"-"`.
    #[must_use]
    pub fn downstream_service(&self) -> Option<String> {
        if let Some(host) = self.grpc_authority_host() {
            if !host.is_empty() {
                return Some(host.to_string());
            }
        }

        let cluster = self.upstream_cluster()?;
        if cluster.is_empty() || cluster == "-" {
            return None;
        }

        let segments: Vec<&str> = cluster.split('|').collect();
        let (first, last) = (segments.first()?, segments.last()?);
        if *first != "outbound" {
            return None;
        }

        let mut name = (*last).to_string();
        for suffix in CLUSTER_SUFFIXES {
            if let Some(stripped) = name.strip_suffix(suffix) {
                name = stripped.to_string();
                break;
            }
        }
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_builder_roundtrip() {
        let span = Span::new("trace-1", "span-1")
            .with_service("frontend")
            .with_operation("hipstershop.CartService/GetCart")
            .with_attribute("http.status_code", "200");

        assert!(span.is_root());
        assert_eq!(span.service, "frontend");
        assert!(span.is_200());
    }

    #[test]
    fn downstream_prefers_grpc_authority() {
        let span = Span::new("t", "s")
            .with_attribute("grpc.authority", "cartservice:7070")
            .with_attribute("upstream_cluster", "outbound|7070||cartservice.default.svc.cluster.local");

        assert_eq!(span.downstream_service().as_deref(), Some("cartservice"));
    }

    #[test]
    fn downstream_falls_back_to_upstream_cluster() {
        let span = Span::new("t", "s").with_attribute(
            "upstream_cluster",
            "outbound|7070||cartservice.default.svc.cluster.local",
        );

        assert_eq!(span.downstream_service().as_deref(), Some("cartservice"));
    }

    #[test]
    fn downstream_strips_short_cluster_suffix() {
        let span = Span::new("t", "s")
            .with_attribute("upstream_cluster", "outbound|7070||cartservice.svc.cluster.local");

        assert_eq!(span.downstream_service().as_deref(), Some("cartservice"));
    }

    #[test]
    fn downstream_none_for_inbound_cluster() {
        let span = Span::new("t", "s")
            .with_attribute("upstream_cluster", "inbound|7070||cartservice.default.svc.cluster.local");

        assert_eq!(span.downstream_service(), None);
    }

    #[test]
    fn downstream_none_for_dash() {
        let span = Span::new("t", "s").with_attribute("upstream_cluster", "-");
        assert_eq!(span.downstream_service(), None);
    }

    #[test]
    fn error_tag_overrides_status() {
        let span = Span::new("t", "s")
            .with_attribute("http.status_code", "200")
            .with_attribute("error", true);

        assert!(span.is_200());
        assert!(span.has_error_tag());
    }
}
