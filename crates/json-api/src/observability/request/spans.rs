//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Collapse identifiers so spans and metric labels stay low-cardinality.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");
    let mut previous: Option<&str> = None;

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else if index == 1 && previous == Some("products") {
            normalised.push_str("{slug}");
        } else {
            normalised.push_str(segment);
        }

        previous = Some(segment);
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_collapsed() {
        let names = request_span_name("GET", "/orders/0198d1f0-0000-7000-8000-000000000000");

        assert_eq!(names.otel_path, "/orders/{uuid}");
        assert_eq!(names.otel_span_name, "GET /orders/{uuid}");
    }

    #[test]
    fn product_slugs_are_collapsed() {
        assert_eq!(
            request_span_name("GET", "/products/blue-mug").otel_path,
            "/products/{slug}"
        );
        assert_eq!(
            request_span_name("PATCH", "/admin/products/0198d1f0-0000-7000-8000-000000000000")
                .otel_path,
            "/admin/products/{uuid}"
        );
    }

    #[test]
    fn static_paths_are_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
        assert_eq!(request_span_name("POST", "/cart/add").otel_path, "/cart/add");
        assert_eq!(request_span_name("GET", "/orders/admin/all").otel_path, "/orders/admin/all");
    }
}
