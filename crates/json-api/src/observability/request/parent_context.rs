//! W3C trace context from incoming headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Remote parent carried by `traceparent`, if it names a valid span.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| {
        // Start from an empty context so a missing header never adopts the current span.
        let context = propagator.extract_with_context(&Context::new(), &Headers(headers));
        let valid = context.span().span_context().is_valid();

        valid.then_some(context)
    })
}
