//! Prometheus metrics: HTTP traffic plus store activity, exposed at `/metrics`.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const PREFIX: &str = "bazaar_json";

const DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Authentication events worth counting.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AuthEvent {
    Signup,
    Login,
    Logout,
}

impl AuthEvent {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }
}

#[derive(Debug)]
struct StoreMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    orders_created_total: IntCounter,
    payments_total: IntCounterVec,
    auth_events_total: IntCounterVec,
}

static METRICS: OnceLock<Option<StoreMetrics>> = OnceLock::new();

fn metrics() -> Option<&'static StoreMetrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

/// Keeps `requests_in_flight` raised for as long as it lives.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    gauge: Option<&'static IntGauge>,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self { gauge }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.gauge {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), status.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

pub(crate) fn record_order_created() {
    if let Some(metrics) = metrics() {
        metrics.orders_created_total.inc();
    }
}

/// Count a confirmed payment by requested outcome and resulting order status.
pub(crate) fn record_payment(outcome: &str, status: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .payments_total
            .with_label_values(&[outcome, status])
            .inc();
    }
}

pub(crate) fn record_auth_event(event: AuthEvent) {
    if let Some(metrics) = metrics() {
        metrics
            .auth_events_total
            .with_label_values(&[event.as_str()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("failed to build metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(format!("{PREFIX}_{name}"), help)
}

fn register<C>(registry: &Registry, name: &str, metric: prometheus::Result<C>) -> Option<C>
where
    C: Collector + Clone + 'static,
{
    let registered = metric.and_then(|metric| {
        registry.register(Box::new(metric.clone()))?;

        Ok(metric)
    });

    match registered {
        Ok(metric) => Some(metric),
        Err(source) => {
            error!("failed to register {name} metric: {source}");

            None
        }
    }
}

fn build_metrics() -> Option<StoreMetrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        "http_requests_total",
        IntCounterVec::new(
            opts(
                "http_requests_total",
                "HTTP requests by method, route, status class and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "http_request_duration_seconds",
        HistogramVec::new(
            HistogramOpts::from(opts(
                "http_request_duration_seconds",
                "HTTP request duration in seconds by method and route.",
            ))
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "http_requests_in_flight",
        IntGauge::with_opts(opts(
            "http_requests_in_flight",
            "HTTP requests currently being served.",
        )),
    )?;

    let orders_created_total = register(
        &registry,
        "orders_created_total",
        IntCounter::with_opts(opts(
            "orders_created_total",
            "Orders created from carts at checkout.",
        )),
    )?;

    let payments_total = register(
        &registry,
        "payments_total",
        IntCounterVec::new(
            opts(
                "payments_total",
                "Payment confirmations by requested outcome and resulting order status.",
            ),
            &["outcome", "status"],
        ),
    )?;

    let auth_events_total = register(
        &registry,
        "auth_events_total",
        IntCounterVec::new(
            opts("auth_events_total", "Successful signups, logins and logouts."),
            &["event"],
        ),
    )?;

    Some(StoreMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        orders_created_total,
        payments_total,
        auth_events_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
