//! The two-rule virtual-service fault-injection payload.
//!
//! Mirrors the shape an Istio-style `VirtualService` resource takes: one
//! rule that matches a URI prefix and aborts a percentage of requests, and
//! an unconditional fallback route. Rule order is load-bearing — the abort
//! rule MUST be evaluated first — so it is fixed by this type's
//! constructor rather than left to whoever assembles the JSON body.

use serde::Serialize;

/// A route destination (just a host, faultloom only ever routes to one
/// destination per rule).
#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    /// The destination host.
    pub host: String,
}

/// One entry in an HTTP route's `route` list.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDestination {
    /// Where this route sends matching traffic.
    pub destination: Destination,
}

/// A URI prefix match.
#[derive(Debug, Clone, Serialize)]
pub struct UriMatch {
    /// The prefix to match against the request URI.
    pub prefix: String,
}

/// An HTTP match condition.
#[derive(Debug, Clone, Serialize)]
pub struct HttpMatchRequest {
    /// Whether the URI match is case-insensitive.
    pub ignore_uri_case: bool,
    /// The URI prefix to match.
    pub uri: UriMatch,
}

/// An abort fault: respond with `http_status` for `percentage` of matching
/// requests instead of routing them.
#[derive(Debug, Clone, Serialize)]
pub struct Abort {
    /// The HTTP status code to return.
    pub http_status: u16,
    /// The percentage (0-100) of matching requests to abort.
    pub percentage: f64,
}

/// A fault injection directive attached to an HTTP route.
#[derive(Debug, Clone, Serialize)]
pub struct HttpFaultInjection {
    /// The abort behavior.
    pub abort: Abort,
}

/// One rule within a virtual service's HTTP route list.
#[derive(Debug, Clone, Serialize)]
pub struct HttpRoute {
    /// Where to route matching requests.
    pub route: Vec<RouteDestination>,
    /// The match condition. Absent on the unconditional fallback rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#match: Option<Vec<HttpMatchRequest>>,
    /// The fault to inject. Absent on the fallback rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<HttpFaultInjection>,
}

/// A virtual-service fault-injection policy: hosts plus an ordered HTTP
/// route list whose first entry is always the abort rule and whose second
/// is always the unconditional fallback.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualServicePolicy {
    /// The hostnames this policy applies to (always exactly `[service]`).
    pub hosts: Vec<String>,
    /// The ordered route list: abort rule, then fallback route.
    pub http: Vec<HttpRoute>,
}

impl VirtualServicePolicy {
    /// Builds the two-rule payload for `service`, matching requests whose
    /// URI has `uri_prefix` and aborting `percent` of them with HTTP 500.
    #[must_use]
    pub fn new(service: &str, uri_prefix: &str, percent: f64) -> Self {
        let abort_rule = HttpRoute {
            route: vec![RouteDestination {
                destination: Destination {
                    host: service.to_string(),
                },
            }],
            r#match: Some(vec![HttpMatchRequest {
                ignore_uri_case: true,
                uri: UriMatch {
                    prefix: uri_prefix.to_string(),
                },
            }]),
            fault: Some(HttpFaultInjection {
                abort: Abort {
                    http_status: 500,
                    percentage: percent,
                },
            }),
        };

        let fallback_rule = HttpRoute {
            route: vec![RouteDestination {
                destination: Destination {
                    host: service.to_string(),
                },
            }],
            r#match: None,
            fault: None,
        };

        Self {
            hosts: vec![service.to_string()],
            http: vec![abort_rule, fallback_rule],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_rule_precedes_fallback() {
        let policy = VirtualServicePolicy::new("cartservice", "/hipstershop.CartService", 50.0);
        assert_eq!(policy.http.len(), 2);
        assert!(policy.http[0].fault.is_some());
        assert!(policy.http[0].r#match.is_some());
        assert!(policy.http[1].fault.is_none());
        assert!(policy.http[1].r#match.is_none());
    }

    #[test]
    fn serializes_with_abort_rule_first() {
        let policy = VirtualServicePolicy::new("cartservice", "/x", 10.0);
        let json = serde_json::to_string(&policy).unwrap();
        let abort_pos = json.find("\"fault\"").unwrap();
        let hosts_pos = json.find("\"hosts\"").unwrap();
        assert!(hosts_pos < abort_pos);
    }
}
