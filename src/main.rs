//! DEX Exchange Client - Entry Point
//!
//! Initializes configuration, logging and the chain connection, then
//! keeps the client state in sync with the relayer. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Connect the RPC wallet and check the protocol deployment
//! 4. Create ExchangeClient (facade + cache + metrics)
//! 5. Create Store and seed the configured token list
//! 6. Spawn health server (/live + /ready) and metrics server (/metrics)
//! 7. Spawn the relayer OrderSync loop
//! 8. Wait for SIGINT, broadcast shutdown, drain tasks

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use dex_exchange_client::adapters::chain::{ChainContractFactory, RpcWallet};
use dex_exchange_client::adapters::metrics::{ClientMetrics, HealthServer, HealthState};
use dex_exchange_client::adapters::relayer::RelayerClient;
use dex_exchange_client::config::{self, AppConfig};
use dex_exchange_client::domain::{Action, Token};
use dex_exchange_client::ports::wallet::WalletConnection;
use dex_exchange_client::usecases::{ClientOptions, ExchangeClient, OrderSync, Store};

/// Interval between wallet health checks.
const WALLET_CHECK_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.client.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        networks = config.networks.len(),
        "Starting DEX exchange client"
    );

    // ── 3. Connect wallet and validate the deployment ───────
    let wallet = Arc::new(
        RpcWallet::connect(&config.rpc, config.client.account)
            .await
            .context("Failed to connect wallet")?,
    );
    let network_id = wallet.network_id().await?;

    let factory = Arc::new(ChainContractFactory::new(wallet.provider(), &config.networks));
    factory
        .validate_deployment(network_id)
        .await
        .context("Protocol deployment check failed")?;

    // ── 4. Create the exchange client ───────────────────────
    let metrics = Arc::new(ClientMetrics::new().context("Failed to create metrics")?);
    let client = Arc::new(ExchangeClient::with_metrics(
        Arc::clone(&wallet),
        Arc::clone(&factory),
        ClientOptions {
            account: config.client.account,
            validate_market_orders: config.client.validate_market_orders,
            ..ClientOptions::default()
        },
        Arc::clone(&metrics),
    ));

    log_deployment(&client).await;

    // ── 5. Create the store and seed tokens ─────────────────
    let store = Arc::new(Store::default());
    store.dispatch(Action::WalletChanged {
        network_id,
        account: client.account().await.ok(),
    });
    store.dispatch(Action::TokensSet(config.tokens.iter().map(Token::from).collect()));

    // ── 6. Spawn health and metrics servers ─────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());
    health.set_wallet_healthy(true);

    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let health_handle = tokio::spawn({
        let shutdown = shutdown_tx.subscribe();
        async move {
            if let Err(e) = health_server.run(shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }
    });

    let metrics_handle = if config.metrics.enabled {
        let shutdown = shutdown_tx.subscribe();
        let metrics = Arc::clone(&metrics);
        let bind = config.metrics.bind_address.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = metrics.serve(bind, shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    let wallet_handle = tokio::spawn(watch_wallet(
        Arc::clone(&client),
        Arc::clone(&health),
        shutdown_tx.subscribe(),
    ));

    // ── 7. Spawn relayer sync loop ──────────────────────────
    let sync_handle = spawn_order_sync(&config, network_id, store, metrics, health, &shutdown_tx)?;

    info!("All tasks spawned, client is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(10), sync_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), wallet_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), health_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Log the resolved protocol addresses (also warms the address cache).
async fn log_deployment(client: &ExchangeClient<RpcWallet, ChainContractFactory>) {
    match (
        client.exchange_address().await,
        client.ether_token_address().await,
        client.zrx_token_address().await,
    ) {
        (Ok(exchange), Ok(ether_token), Ok(zrx)) => info!(
            exchange = %exchange,
            ether_token = %ether_token,
            zrx = %zrx,
            "Protocol contracts resolved"
        ),
        (exchange, ether_token, zrx) => warn!(
            exchange_ok = exchange.is_ok(),
            ether_token_ok = ether_token.is_ok(),
            zrx_ok = zrx.is_ok(),
            "Could not resolve every protocol address"
        ),
    }
}

/// Build the relayer client and spawn the sync loop.
fn spawn_order_sync(
    config: &AppConfig,
    network_id: u64,
    store: Arc<Store>,
    metrics: Arc<ClientMetrics>,
    health: Arc<HealthState>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Result<tokio::task::JoinHandle<()>> {
    let relayer = Arc::new(
        RelayerClient::new(config.relayer.client_config(network_id))
            .context("Failed to create relayer client")?,
    );

    let sync = OrderSync::new(relayer, store, metrics, config.relayer.poll_interval()).with_health(health);
    let shutdown = shutdown_tx.subscribe();

    Ok(tokio::spawn(async move {
        if let Err(e) = sync.run(shutdown).await {
            error!(error = %e, "Order sync failed");
        }
    }))
}

/// Mirror wallet connectivity into the readiness probe.
async fn watch_wallet(
    client: Arc<ExchangeClient<RpcWallet, ChainContractFactory>>,
    health: Arc<HealthState>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => return,
            _ = tokio::time::sleep(WALLET_CHECK_INTERVAL) => {
                let healthy = client.is_healthy().await;
                if !healthy {
                    warn!("Wallet connection unhealthy");
                }
                health.set_wallet_healthy(healthy);
            }
        }
    }
}
