//! Tracing setup shared by the dashboard binaries.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::{KeyValue, trace::TracerProvider};
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,tower_http=warn";

#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    /// Takes precedence over `RUST_LOG`.
    pub env_filter: Option<String>,
    /// Takes precedence over `OTLP_ENDPOINT`.
    pub otlp_endpoint: Option<String>,
    /// Drop timestamps, for short-lived CLI commands.
    pub compact: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "hr-dashboard",
            env_filter: None,
            otlp_endpoint: None,
            compact: false,
        }
    }
}

impl ObsConfig {
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    fn filter_directives(&self, from_env: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(from_env)
            .filter(|directives| !directives.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

/// Installs the global subscriber: an env-filtered fmt layer plus an OTLP
/// span exporter when an endpoint is configured. Later calls do nothing.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_new(config.filter_directives(std::env::var("RUST_LOG").ok()))?;
    let fmt_layer = if config.compact {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .without_time()
            .compact()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    let otlp_endpoint = config
        .otlp_endpoint
        .clone()
        .or_else(|| std::env::var("OTLP_ENDPOINT").ok());
    let otlp = match otlp_endpoint {
        Some(endpoint) => Some(otlp_layer(&endpoint, config.service_name)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otlp)
        .try_init()?;

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

fn otlp_layer<S>(endpoint: &str, service_name: &'static str) -> Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
{
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();
    let tracer = provider.tracer(service_name);
    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_environment() {
        let config = ObsConfig {
            env_filter: Some("debug".into()),
            ..ObsConfig::default()
        };
        assert_eq!(config.filter_directives(Some("warn".into())), "debug");
    }

    #[test]
    fn environment_filter_used_when_not_configured() {
        let config = ObsConfig::default();
        assert_eq!(config.filter_directives(Some("warn".into())), "warn");
        assert_eq!(config.filter_directives(Some("  ".into())), DEFAULT_FILTER);
        assert_eq!(config.filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn compact_builder_keeps_service_name() {
        let config = ObsConfig::default().compact();
        assert!(config.compact);
        assert_eq!(config.service_name, "hr-dashboard");
    }
}
