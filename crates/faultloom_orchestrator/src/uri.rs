//! Operation-name-to-URI rewriting for request-granularity fault targets.

/// Rewrites a dotted operation name `a.b.c.Op` into the URI prefix the mesh
/// matches against for prefix-based fault injection: `/b.c/Op` (the leading
/// segment is dropped; everything between it and the final segment forms
/// the dotted service path; the final segment is the method).
///
/// Returns `None` for a name with fewer than three dot-separated segments —
/// there would be no room to both drop a leading segment and keep a
/// service path distinct from the method — rather than guess at a
/// placeholder URI for a name this rule wasn't meant to describe.
#[must_use]
pub fn rewrite_operation_to_uri(operation: &str) -> Option<String> {
    let segments: Vec<&str> = operation.split('.').collect();
    if segments.len() < 3 {
        return None;
    }
    let rest = &segments[1..];
    let (method, service_path) = rest.split_last().expect("rest has at least two elements");
    Some(format!("/{}/{method}", service_path.join(".")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_leading_segment_and_splits_method() {
        assert_eq!(
            rewrite_operation_to_uri("hipstershop.CartService.GetCart").as_deref(),
            Some("/CartService/GetCart")
        );
    }

    #[test]
    fn keeps_multi_segment_service_path() {
        assert_eq!(
            rewrite_operation_to_uri("a.b.c.Op").as_deref(),
            Some("/b.c/Op")
        );
    }

    #[test]
    fn fewer_than_three_segments_is_malformed() {
        assert_eq!(rewrite_operation_to_uri("pkg/Op"), None);
        assert_eq!(rewrite_operation_to_uri("hipstershop.CartService/GetCart"), None);
        assert_eq!(rewrite_operation_to_uri("Op"), None);
    }
}
