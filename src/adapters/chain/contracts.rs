//! Exchange Protocol Contracts - alloy-rs Bindings
//!
//! Implements the contract ports on top of the `sol!` interfaces:
//! reads go through `eth_call`, writes are sent from the acting
//! account via the node (`eth_sendTransaction`), optionally preceded
//! by an `eth_call` dry run. Contract addresses come from
//! `config.toml` and can be checked on-chain at startup.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::contract::SolCallBuilder;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::sol_types::SolCall;
use alloy::transports::BoxTransport;
use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::NetworkConfig;
use crate::domain::{OrderHash, SignedOrder};
use crate::error::ClientError;
use crate::ports::contracts::{
    ContractFactory, ContractWrappers, EtherTokenContract, ExchangeContract, ForwarderContract,
    ForwarderFee, TxHash, TxOpts,
};

use super::bindings::{
    decode_erc20_asset_data, order_status_name, split_orders, IEtherToken, IExchange, IForwarder,
    Order, ORDER_STATUS_FILLABLE,
};

/// Provider shared by all bindings. Cheap to clone.
pub type ChainProvider = RootProvider<BoxTransport>;

/// Apply `opts`, dry-run when asked, then send.
async fn submit<P, C>(
    call: SolCallBuilder<BoxTransport, P, C>,
    opts: TxOpts,
    method: &'static str,
) -> Result<TxHash>
where
    P: Provider<BoxTransport> + Clone,
    C: SolCall + Send + Sync + Unpin,
{
    let call = match opts.gas_limit {
        Some(gas) => call.gas(gas),
        None => call,
    };

    if opts.should_validate {
        call.call()
            .await
            .with_context(|| format!("{method} validation failed"))?;
    }

    let pending = call
        .send()
        .await
        .with_context(|| format!("{method} submission failed"))?;

    let tx_hash = *pending.tx_hash();
    info!(method, tx_hash = %tx_hash, "Transaction submitted");
    Ok(tx_hash)
}

/// Binding for the v2 Exchange contract.
pub struct ExchangeBinding {
    address: Address,
    provider: ChainProvider,
}

impl ExchangeBinding {
    pub fn new(address: Address, provider: ChainProvider) -> Self {
        Self { address, provider }
    }

    fn contract(&self) -> IExchange::IExchangeInstance<BoxTransport, ChainProvider> {
        IExchange::new(self.address, self.provider.clone())
    }
}

#[async_trait]
impl ExchangeContract for ExchangeBinding {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self))]
    async fn zrx_token_address(&self) -> Result<Address> {
        let asset_data = self
            .contract()
            .ZRX_ASSET_DATA()
            .call()
            .await
            .context("ZRX_ASSET_DATA call failed")?
            .assetData;
        decode_erc20_asset_data(&asset_data)
    }

    #[instrument(skip(self))]
    async fn filled_taker_amount(&self, order_hash: OrderHash) -> Result<U256> {
        Ok(self
            .contract()
            .filled(order_hash)
            .call()
            .await
            .context("filled call failed")?
            .amount)
    }

    async fn validate_order_fillable(&self, order: &SignedOrder) -> Result<()> {
        let info = self
            .contract()
            .getOrderInfo(Order::from(order))
            .call()
            .await
            .context("getOrderInfo call failed")?
            .orderInfo;

        ensure!(
            info.orderStatus == ORDER_STATUS_FILLABLE,
            "Order {} is {}",
            info.orderHash,
            order_status_name(info.orderStatus)
        );
        Ok(())
    }

    async fn validate_fill_order(
        &self,
        order: &SignedOrder,
        taker_amount: U256,
        taker: Address,
    ) -> Result<()> {
        self.contract()
            .fillOrder(Order::from(order), taker_amount, order.signature.clone())
            .from(taker)
            .call()
            .await
            .context("fillOrder simulation reverted")?;
        Ok(())
    }

    #[instrument(skip(self, order), fields(taker = %taker))]
    async fn fill_order(
        &self,
        order: &SignedOrder,
        taker_amount: U256,
        taker: Address,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let contract = self.contract();
        let call = contract
            .fillOrder(Order::from(order), taker_amount, order.signature.clone())
            .from(taker);
        submit(call, opts, "fillOrder").await
    }

    #[instrument(skip(self, order), fields(taker = %taker))]
    async fn fill_or_kill_order(
        &self,
        order: &SignedOrder,
        taker_amount: U256,
        taker: Address,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let contract = self.contract();
        let call = contract
            .fillOrKillOrder(Order::from(order), taker_amount, order.signature.clone())
            .from(taker);
        submit(call, opts, "fillOrKillOrder").await
    }

    #[instrument(skip(self, orders, taker_amounts), fields(count = orders.len()))]
    async fn batch_fill_orders(
        &self,
        orders: &[SignedOrder],
        taker_amounts: &[U256],
        taker: Address,
        opts: TxOpts,
    ) -> Result<TxHash> {
        if orders.len() != taker_amounts.len() {
            bail!(
                "batchFillOrders needs one amount per order: {} orders, {} amounts",
                orders.len(),
                taker_amounts.len()
            );
        }

        let (abi_orders, signatures) = split_orders(orders);
        let contract = self.contract();
        let call = contract
            .batchFillOrders(abi_orders, taker_amounts.to_vec(), signatures)
            .from(taker);
        submit(call, opts, "batchFillOrders").await
    }

    #[instrument(skip(self, orders), fields(count = orders.len()))]
    async fn market_buy_orders(
        &self,
        orders: &[SignedOrder],
        maker_amount: U256,
        taker: Address,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let (abi_orders, signatures) = split_orders(orders);
        let contract = self.contract();
        let call = contract
            .marketBuyOrders(abi_orders, maker_amount, signatures)
            .from(taker);
        submit(call, opts, "marketBuyOrders").await
    }

    #[instrument(skip(self, orders), fields(count = orders.len()))]
    async fn market_sell_orders(
        &self,
        orders: &[SignedOrder],
        taker_amount: U256,
        taker: Address,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let (abi_orders, signatures) = split_orders(orders);
        let contract = self.contract();
        let call = contract
            .marketSellOrders(abi_orders, taker_amount, signatures)
            .from(taker);
        submit(call, opts, "marketSellOrders").await
    }

    #[instrument(skip(self, order), fields(maker = %maker))]
    async fn cancel_order(&self, order: &SignedOrder, maker: Address, opts: TxOpts) -> Result<TxHash> {
        let contract = self.contract();
        let call = contract.cancelOrder(Order::from(order)).from(maker);
        submit(call, opts, "cancelOrder").await
    }
}

/// Binding for the WETH9 ether token.
pub struct EtherTokenBinding {
    address: Address,
    provider: ChainProvider,
}

impl EtherTokenBinding {
    pub fn new(address: Address, provider: ChainProvider) -> Self {
        Self { address, provider }
    }
}

#[async_trait]
impl EtherTokenContract for EtherTokenBinding {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self))]
    async fn deposit(&self, amount: U256, from: Address, opts: TxOpts) -> Result<TxHash> {
        let contract = IEtherToken::new(self.address, self.provider.clone());
        let call = contract.deposit().from(from).value(amount);
        submit(call, opts, "deposit").await
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, amount: U256, from: Address, opts: TxOpts) -> Result<TxHash> {
        let contract = IEtherToken::new(self.address, self.provider.clone());
        let call = contract.withdraw(amount).from(from);
        submit(call, opts, "withdraw").await
    }
}

/// Binding for the v2 Forwarder.
pub struct ForwarderBinding {
    address: Address,
    provider: ChainProvider,
}

impl ForwarderBinding {
    pub fn new(address: Address, provider: ChainProvider) -> Self {
        Self { address, provider }
    }
}

#[async_trait]
impl ForwarderContract for ForwarderBinding {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, orders, fee), fields(count = orders.len()))]
    async fn market_buy_orders_with_eth(
        &self,
        orders: &[SignedOrder],
        maker_amount: U256,
        taker: Address,
        eth_amount: U256,
        fee: ForwarderFee,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let (abi_orders, signatures) = split_orders(orders);
        let (fee_orders, fee_signatures) = split_orders(&fee.fee_orders);
        let contract = IForwarder::new(self.address, self.provider.clone());
        let call = contract
            .marketBuyOrdersWithEth(
                abi_orders,
                maker_amount,
                signatures,
                fee_orders,
                fee_signatures,
                fee.fee_percentage,
                fee.fee_recipient,
            )
            .from(taker)
            .value(eth_amount);
        submit(call, opts, "marketBuyOrdersWithEth").await
    }

    #[instrument(skip(self, orders, fee), fields(count = orders.len()))]
    async fn market_sell_orders_with_eth(
        &self,
        orders: &[SignedOrder],
        taker: Address,
        eth_amount: U256,
        fee: ForwarderFee,
        opts: TxOpts,
    ) -> Result<TxHash> {
        let (abi_orders, signatures) = split_orders(orders);
        let (fee_orders, fee_signatures) = split_orders(&fee.fee_orders);
        let contract = IForwarder::new(self.address, self.provider.clone());
        let call = contract
            .marketSellOrdersWithEth(
                abi_orders,
                signatures,
                fee_orders,
                fee_signatures,
                fee.fee_percentage,
                fee.fee_recipient,
            )
            .from(taker)
            .value(eth_amount);
        submit(call, opts, "marketSellOrdersWithEth").await
    }
}

/// Builds bindings from the configured per-network deployments.
pub struct ChainContractFactory {
    provider: ChainProvider,
    deployments: HashMap<u64, NetworkConfig>,
}

impl ChainContractFactory {
    pub fn new(provider: ChainProvider, networks: &[NetworkConfig]) -> Self {
        let deployments = networks
            .iter()
            .map(|n| (n.network_id, n.clone()))
            .collect();
        Self {
            provider,
            deployments,
        }
    }

    /// Deployment configured for `network_id`.
    pub fn deployment(&self, network_id: u64) -> Option<&NetworkConfig> {
        self.deployments.get(&network_id)
    }

    /// Check every configured contract on `network_id` has deployed code.
    ///
    /// Catches typos in `config.toml` before the first trade does.
    #[instrument(skip(self))]
    pub async fn validate_deployment(&self, network_id: u64) -> Result<()> {
        let deployment = self
            .deployment(network_id)
            .ok_or(ClientError::UnknownNetwork(network_id))?;

        for (name, addr) in [
            ("Exchange", deployment.exchange),
            ("EtherToken", deployment.ether_token),
            ("Forwarder", deployment.forwarder),
        ] {
            let code = self
                .provider
                .get_code_at(addr)
                .await
                .with_context(|| format!("Failed to query code for {name}"))?;

            if code.is_empty() {
                bail!("Contract {name} at {addr} has no deployed code, check config.toml");
            }

            info!(contract = name, address = %addr, "Validated on-chain");
        }

        Ok(())
    }
}

#[async_trait]
impl ContractFactory for ChainContractFactory {
    async fn connect(&self, network_id: u64) -> Result<ContractWrappers> {
        let deployment = self
            .deployment(network_id)
            .ok_or(ClientError::UnknownNetwork(network_id))?;

        debug!(network_id, exchange = %deployment.exchange, "Building contract bindings");

        Ok(ContractWrappers {
            exchange: Arc::new(ExchangeBinding::new(
                deployment.exchange,
                self.provider.clone(),
            )),
            ether_token: Arc::new(EtherTokenBinding::new(
                deployment.ether_token,
                self.provider.clone(),
            )),
            forwarder: Arc::new(ForwarderBinding::new(
                deployment.forwarder,
                self.provider.clone(),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    /// Nothing listens on port 1, so every RPC is refused.
    fn offline_provider() -> ChainProvider {
        ProviderBuilder::new()
            .on_http("http://127.0.0.1:1".parse().unwrap())
            .boxed()
    }

    fn network(id: u64) -> NetworkConfig {
        NetworkConfig {
            network_id: id,
            name: "test".to_string(),
            exchange: Address::repeat_byte(0x01),
            ether_token: Address::repeat_byte(0x02),
            forwarder: Address::repeat_byte(0x03),
        }
    }

    #[tokio::test]
    async fn test_connect_uses_configured_addresses() {
        let factory = ChainContractFactory::new(offline_provider(), &[network(50)]);
        let wrappers = factory.connect(50).await.unwrap();

        assert_eq!(wrappers.exchange.address(), Address::repeat_byte(0x01));
        assert_eq!(wrappers.ether_token.address(), Address::repeat_byte(0x02));
        assert_eq!(wrappers.forwarder.address(), Address::repeat_byte(0x03));
    }

    #[tokio::test]
    async fn test_connect_unknown_network() {
        let factory = ChainContractFactory::new(offline_provider(), &[network(50)]);
        let err = factory.connect(1).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::UnknownNetwork(1))
        ));
    }

    #[tokio::test]
    async fn test_batch_fill_rejects_mismatched_lengths() {
        let exchange = ExchangeBinding::new(Address::repeat_byte(0x01), offline_provider());
        let orders = vec![crate::domain::order::fixtures::order(1)];

        let err = exchange
            .batch_fill_orders(&orders, &[], Address::ZERO, TxOpts::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("one amount per order"));
    }

    #[tokio::test]
    async fn test_fill_order_dry_runs_before_sending() {
        let exchange = ExchangeBinding::new(Address::repeat_byte(0x01), offline_provider());
        let order = crate::domain::order::fixtures::order(1);

        let err = exchange
            .fill_order(&order, U256::from(5u64), Address::repeat_byte(0xaa), TxOpts::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "fillOrder validation failed");
    }

    #[tokio::test]
    async fn test_unvalidated_calls_go_straight_to_send() {
        let token = EtherTokenBinding::new(Address::repeat_byte(0x02), offline_provider());
        let opts = TxOpts {
            should_validate: false,
            gas_limit: Some(60_000),
        };

        let err = token
            .deposit(U256::from(1u64), Address::repeat_byte(0xaa), opts)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "deposit submission failed");
    }

    #[tokio::test]
    async fn test_forwarder_reads_fail_with_context() {
        let forwarder = ForwarderBinding::new(Address::repeat_byte(0x03), offline_provider());
        let orders = vec![crate::domain::order::fixtures::order(1)];

        let err = forwarder
            .market_sell_orders_with_eth(
                &orders,
                Address::repeat_byte(0xaa),
                U256::from(10u64),
                ForwarderFee::default(),
                TxOpts::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "marketSellOrdersWithEth validation failed");
    }

    #[tokio::test]
    async fn test_order_info_lookup_fails_with_context() {
        let exchange = ExchangeBinding::new(Address::repeat_byte(0x01), offline_provider());
        let order = crate::domain::order::fixtures::order(1);

        let err = exchange.validate_order_fillable(&order).await.unwrap_err();
        assert_eq!(err.to_string(), "getOrderInfo call failed");
    }
}
