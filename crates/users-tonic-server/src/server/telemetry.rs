//! # Telemetry
//!
//! Console logging is always on: a `tracing-subscriber` registry filtered by
//! `RUST_LOG` (default `info`) with a pretty fmt layer. OpenTelemetry export
//! is opt-in through cargo features.
//!
//! ## Feature matrix
//!
//! - `otel-tracing`: Exports spans from instrumented handlers.
//! - `otel-metrics`: Exports call counters and stream histograms.
//! - `stdout`: Prints exported spans/metrics to stdout.
//! - `otlp`: Ships them to an OTLP collector over gRPC. The endpoint comes
//!   from `OTEL_EXPORTER_OTLP_ENDPOINT` (default `http://localhost:4317`).
//!
//! Exporters require at least one of `otel-tracing` or `otel-metrics`.
//!
//! ```bash
//! cargo run --bin users-tonic-server --features otel-tracing,otel-metrics,stdout
//! ```
//!
//! The `increment_*`/`record_*` helpers compile to no-ops without
//! `otel-metrics`, so handlers call them unconditionally.

#[cfg(all(
    feature = "otlp",
    not(any(feature = "otel-tracing", feature = "otel-metrics"))
))]
compile_error!(
    "The 'otlp' feature requires at least one of 'otel-tracing' or 'otel-metrics' to be enabled."
);

#[cfg(all(
    feature = "stdout",
    not(any(feature = "otel-tracing", feature = "otel-metrics"))
))]
compile_error!(
    "The 'stdout' feature requires at least one of 'otel-tracing' or 'otel-metrics' to be enabled."
);

use crate::server::service::call::Call;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "otel-metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
#[cfg(feature = "otel-metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "otel-metrics")]
use std::sync::OnceLock;

#[cfg(any(feature = "otel-metrics", feature = "otel-tracing"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "otel-metrics", feature = "otel-tracing"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "otel-metrics", feature = "otel-tracing"))]
use opentelemetry_semantic_conventions as semvcns;

#[cfg(feature = "otel-tracing")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "otel-tracing")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "otel-tracing")]
use opentelemetry_sdk::trace as sdktrace;

const SERVICE_NAME: &str = "users-tonic";

/// Providers that must be flushed and shut down before the process exits.
pub struct TelemetryProviders {
    #[cfg(feature = "otel-tracing")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "otel-metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes pending spans and metrics, then shuts the providers down.
    /// Failures are reported on stderr since logging may already be gone.
    pub fn shutdown(self) {
        #[cfg(feature = "otel-tracing")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {:#?}", err);
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {:#?}", err);
            }
        }

        #[cfg(feature = "otel-metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {:#?}", err);
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {:#?}", err);
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "otel-tracing")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "otel-tracing")]
    let tracer_provider = init_tracer()?;

    #[cfg(feature = "otel-metrics")]
    let meter_provider = init_metrics()?;

    #[cfg(any(feature = "otel-metrics", feature = "otel-tracing"))]
    let scope = InstrumentationScope::builder(SERVICE_NAME)
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    // Human-readable console output, independent of any OpenTelemetry
    // exporter.
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        );

    #[cfg(feature = "otel-tracing")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "otel-metrics")]
    let registry = {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    registry.try_init()?;

    tracing::debug!(service = SERVICE_NAME, "telemetry initialised");

    Ok(TelemetryProviders {
        #[cfg(feature = "otel-tracing")]
        tracer_provider,
        #[cfg(feature = "otel-metrics")]
        meter_provider,
    })
}

#[cfg(any(feature = "otel-metrics", feature = "otel-tracing"))]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "otlp")]
fn otlp_endpoint() -> String {
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string())
}

#[cfg(feature = "otel-metrics")]
fn init_metrics() -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        let exporter = opentelemetry_stdout::MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();
        builder.with_reader(reader)
    };

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;
        use opentelemetry_otlp::WithExportConfig;

        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint())
            .with_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build metrics exporter")?;
        builder.with_periodic_exporter(exporter)
    };

    Ok(builder.build())
}

#[cfg(feature = "otel-tracing")]
fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        let exporter = opentelemetry_stdout::SpanExporter::default();
        builder.with_span_processor(batch_processor(exporter))
    };

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;
        use opentelemetry_otlp::WithExportConfig;

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint())
            .with_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build tracer exporter")?;
        builder.with_span_processor(batch_processor(exporter))
    };

    Ok(builder.build())
}

#[cfg(all(feature = "otel-tracing", any(feature = "stdout", feature = "otlp")))]
fn batch_processor<E>(exporter: E) -> sdktrace::BatchSpanProcessor
where
    E: opentelemetry_sdk::trace::SpanExporter + 'static,
{
    sdktrace::BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            sdktrace::BatchConfigBuilder::default()
                .with_scheduled_delay(std::time::Duration::from_secs(5))
                .with_max_queue_size(2048)
                .build(),
        )
        .build()
}

#[cfg(feature = "otel-metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static STREAMS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static STREAM_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static USERS_CREATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static USERS_STREAMED: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "otel-metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total gRPC calls, by method")
            .build(),
    );

    let _ = STREAMS_INFLIGHT.set(
        meter
            .i64_up_down_counter("streams_inflight")
            .with_description("Concurrent streaming calls")
            .build(),
    );

    let _ = ERRORS.set(
        meter
            .u64_counter("errors")
            .with_description("Calls that ended with an error status, by method")
            .build(),
    );

    let _ = STREAM_DURATION_MS.set(
        meter
            .f64_histogram("stream_duration")
            .with_unit("ms")
            .with_description("End-to-end streaming call duration")
            .build(),
    );

    let _ = USERS_CREATED.set(
        meter
            .u64_counter("users_created")
            .with_description("Users created through unary or batch calls")
            .build(),
    );

    let _ = USERS_STREAMED.set(
        meter
            .u64_counter("users_streamed")
            .with_description("User messages emitted on server/bidi streams")
            .build(),
    );
}

#[cfg(feature = "otel-metrics")]
fn call_attributes(call: Call) -> [KeyValue; 2] {
    [
        KeyValue::new(semvcns::attribute::RPC_METHOD, call.name()),
        KeyValue::new("rpc.shape", call.shape().as_str()),
    ]
}

#[cfg(feature = "otel-metrics")]
pub fn increment_requests(call: Call) {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &call_attributes(call));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_requests(_call: Call) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_errors(call: Call) {
    if let Some(counter) = ERRORS.get() {
        counter.add(1, &call_attributes(call));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_errors(_call: Call) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_streams_inflight() {}

#[cfg(feature = "otel-metrics")]
pub fn decrement_streams_inflight() {
    if let Some(counter) = STREAMS_INFLIGHT.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn decrement_streams_inflight() {}

#[cfg(feature = "otel-metrics")]
pub fn record_stream_duration(call: Call, duration_ms: f64) {
    if let Some(histogram) = STREAM_DURATION_MS.get() {
        histogram.record(duration_ms, &call_attributes(call));
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn record_stream_duration(_call: Call, _duration_ms: f64) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_users_created(count: u64) {
    if let Some(counter) = USERS_CREATED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_users_created(_count: u64) {}

#[cfg(feature = "otel-metrics")]
pub fn increment_users_streamed(count: u64) {
    if let Some(counter) = USERS_STREAMED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_users_streamed(_count: u64) {}
