//! Prometheus Metrics Registry - Client Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers facade call latency and failures, filter rejections and
//! relayer synchronization.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// Centralized Prometheus metrics for the exchange client.
///
/// All metrics follow the naming convention `dex_client_*`.
pub struct ClientMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Facade call latency histogram (seconds), by operation.
    pub call_latency_seconds: HistogramVec,
    /// Facade calls that returned an error, by operation.
    pub call_errors: IntCounterVec,
    /// Orders dropped by a fillability filter, by filter.
    pub filter_rejections: IntCounterVec,
    /// Orders received from the relayer.
    pub orders_synced: IntCounter,
    /// Orders currently held in client state.
    pub orders_in_state: IntGauge,
    /// Failed relayer sync rounds.
    pub sync_failures: IntCounter,
}

impl ClientMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let call_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dex_client_call_latency_seconds",
                "Exchange facade call latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]),
            &["operation"],
        )?;

        let call_errors = IntCounterVec::new(
            Opts::new("dex_client_call_errors_total", "Facade calls that failed"),
            &["operation"],
        )?;

        let filter_rejections = IntCounterVec::new(
            Opts::new(
                "dex_client_filter_rejections_total",
                "Orders dropped by fillability filters",
            ),
            &["filter"],
        )?;

        let orders_synced = IntCounter::new(
            "dex_client_orders_synced_total",
            "Orders received from the relayer",
        )?;

        let orders_in_state = IntGauge::new(
            "dex_client_orders_in_state",
            "Orders currently held in client state",
        )?;

        let sync_failures = IntCounter::new(
            "dex_client_sync_failures_total",
            "Relayer sync rounds that failed",
        )?;

        registry.register(Box::new(call_latency_seconds.clone()))?;
        registry.register(Box::new(call_errors.clone()))?;
        registry.register(Box::new(filter_rejections.clone()))?;
        registry.register(Box::new(orders_synced.clone()))?;
        registry.register(Box::new(orders_in_state.clone()))?;
        registry.register(Box::new(sync_failures.clone()))?;

        Ok(Self {
            registry,
            call_latency_seconds,
            call_errors,
            filter_rejections,
            orders_synced,
            orders_in_state,
            sync_failures,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Run `fut`, recording its latency and whether it failed.
    pub async fn timed<T, E, Fut>(&self, operation: &'static str, fut: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let result = fut.await;
        let elapsed = started.elapsed();

        self.call_latency_seconds
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());

        match &result {
            Ok(_) => debug!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                "Call completed"
            ),
            Err(e) => {
                self.call_errors.with_label_values(&[operation]).inc();
                debug!(
                    operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Call failed"
                );
            }
        }

        result
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics
                        .render()
                        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
