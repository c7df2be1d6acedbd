//! Subscriber setup: env filter, fmt layer, optional OpenTelemetry layer.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::config::{LogFormat, ServerConfig};

use super::ObservabilityError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Crates whose chatter stays at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: [&str; 6] = ["h2", "hyper", "tower", "tonic", "opentelemetry", "sqlx"];

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(config.logging.log_format)];

    if let Some(tracer_provider) = tracer_provider {
        let tracer = tracer_provider.tracer(config.observability.otel_service_name.clone());

        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_ignored| EnvFilter::new(default_directives(&config.logging.log_level)));

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(())
}

fn fmt_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
    }
}

fn default_directives(level: &str) -> String {
    QUIET_TARGETS
        .iter()
        .fold(level.to_string(), |directives, target| {
            format!("{directives},{target}=warn")
        })
}
