//! Logging and OpenTelemetry export
//!
//! Console logs always go through `tracing-subscriber`. Spans and metrics
//! are pushed over OTLP only when `[telemetry.otlp]` is configured.

pub mod metrics;
mod resource;

use anyhow::Context;
use fabula_config::{LogFormat, OtlpConfig, OtlpProtocol, TelemetryConfig};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Flushes and shuts down exporters when dropped
///
/// Hold it until the process exits.
#[derive(Default)]
pub struct TelemetryGuard {
    meter_provider: Option<SdkMeterProvider>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // The subscriber may already be gone, so report straight to stderr
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("tracer provider shutdown failed: {e}");
        }
        if let Some(provider) = self.meter_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("meter provider shutdown failed: {e}");
        }
    }
}

/// Install the global subscriber and, when configured, OTLP exporters
///
/// `log_filter` uses `EnvFilter` syntax; an unparsable filter falls back
/// to `info`.
///
/// # Errors
///
/// Returns an error if an exporter cannot be built or a global subscriber
/// is already installed
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let console = match config.map_or_else(LogFormat::default, |c| c.log_format) {
        LogFormat::Text => tracing_subscriber::fmt::layer().with_target(true).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
    };

    let mut guard = TelemetryGuard::default();

    let otel = match config.and_then(|c| c.otlp.as_ref().map(|otlp| (c, otlp))) {
        Some((telemetry, otlp)) => {
            let resource = resource::service_resource(telemetry);

            let meter_provider = meter_provider(otlp, resource.clone())?;
            global::set_meter_provider(meter_provider.clone());
            guard.meter_provider = Some(meter_provider);

            let tracer_provider = tracer_provider(otlp, resource)?;
            let tracer = tracer_provider.tracer("fabula");
            global::set_tracer_provider(tracer_provider.clone());
            guard.tracer_provider = Some(tracer_provider);

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(otel)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

fn meter_provider(otlp: &OtlpConfig, resource: Resource) -> anyhow::Result<SdkMeterProvider> {
    let builder = MetricExporter::builder();
    let exporter = match otlp.protocol {
        OtlpProtocol::Grpc => builder.with_tonic().with_endpoint(otlp.endpoint.as_str()).build(),
        OtlpProtocol::HttpProto => builder.with_http().with_endpoint(otlp.endpoint.as_str()).build(),
    }
    .context("failed to build OTLP metric exporter")?;

    let interval = fabula_config::parse_duration("telemetry.otlp.export_interval", &otlp.export_interval)?;
    let reader = PeriodicReader::builder(exporter).with_interval(interval).build();

    Ok(SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build())
}

fn tracer_provider(otlp: &OtlpConfig, resource: Resource) -> anyhow::Result<SdkTracerProvider> {
    let builder = SpanExporter::builder();
    let exporter = match otlp.protocol {
        OtlpProtocol::Grpc => builder.with_tonic().with_endpoint(otlp.endpoint.as_str()).build(),
        OtlpProtocol::HttpProto => builder.with_http().with_endpoint(otlp.endpoint.as_str()).build(),
    }
    .context("failed to build OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(sampler(otlp))
        .with_batch_exporter(exporter)
        .build())
}

fn sampler(otlp: &OtlpConfig) -> Sampler {
    let root = match otlp.sampling_ratio {
        ratio if ratio >= 1.0 => Sampler::AlwaysOn,
        ratio if ratio <= 0.0 => Sampler::AlwaysOff,
        ratio => Sampler::TraceIdRatioBased(ratio),
    };

    if otlp.parent_based {
        Sampler::ParentBased(Box::new(root))
    } else {
        root
    }
}
