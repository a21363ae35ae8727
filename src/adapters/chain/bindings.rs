//! Exchange Protocol ABI Bindings - alloy `sol!` Interfaces
//!
//! Solidity interfaces for the v2 Exchange, the WETH9 ether token and
//! the v2 Forwarder, plus conversion from domain orders into the ABI
//! order struct.

use alloy::primitives::{Address, Bytes, FixedBytes};
use alloy::sol;
use anyhow::{ensure, Result};

use crate::domain::SignedOrder;

sol! {
    /// ABI order struct; the signature travels separately.
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        address makerAddress;
        address takerAddress;
        address feeRecipientAddress;
        address senderAddress;
        uint256 makerAssetAmount;
        uint256 takerAssetAmount;
        uint256 makerFee;
        uint256 takerFee;
        uint256 expirationTimeSeconds;
        uint256 salt;
        bytes makerAssetData;
        bytes takerAssetData;
    }

    #[derive(Debug)]
    struct OrderInfo {
        uint8 orderStatus;
        bytes32 orderHash;
        uint256 orderTakerAssetFilledAmount;
    }

    #[derive(Debug)]
    struct FillResults {
        uint256 makerAssetFilledAmount;
        uint256 takerAssetFilledAmount;
        uint256 makerFeePaid;
        uint256 takerFeePaid;
    }

    #[sol(rpc)]
    interface IExchange {
        function ZRX_ASSET_DATA() external view returns (bytes assetData);
        function filled(bytes32 orderHash) external view returns (uint256 amount);
        function getOrderInfo(Order order) external view returns (OrderInfo orderInfo);

        function fillOrder(Order order, uint256 takerAssetFillAmount, bytes signature)
            external returns (FillResults fillResults);
        function fillOrKillOrder(Order order, uint256 takerAssetFillAmount, bytes signature)
            external returns (FillResults fillResults);
        function batchFillOrders(Order[] orders, uint256[] takerAssetFillAmounts, bytes[] signatures)
            external returns (FillResults totalFillResults);
        function marketBuyOrders(Order[] orders, uint256 makerAssetFillAmount, bytes[] signatures)
            external returns (FillResults totalFillResults);
        function marketSellOrders(Order[] orders, uint256 takerAssetFillAmount, bytes[] signatures)
            external returns (FillResults totalFillResults);
        function cancelOrder(Order order) external;
    }

    #[sol(rpc)]
    interface IEtherToken {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }

    #[sol(rpc)]
    interface IForwarder {
        function marketBuyOrdersWithEth(
            Order[] orders,
            uint256 makerAssetFillAmount,
            bytes[] signatures,
            Order[] feeOrders,
            bytes[] feeSignatures,
            uint256 feePercentage,
            address feeRecipient
        ) external payable returns (FillResults orderFillResults, FillResults feeOrderFillResults);

        function marketSellOrdersWithEth(
            Order[] orders,
            bytes[] signatures,
            Order[] feeOrders,
            bytes[] feeSignatures,
            uint256 feePercentage,
            address feeRecipient
        ) external payable returns (FillResults orderFillResults, FillResults feeOrderFillResults);
    }
}

/// `getOrderInfo` status meaning the order can be filled.
pub const ORDER_STATUS_FILLABLE: u8 = 3;

/// Proxy id prefixed to ERC-20 asset data (`bytes4(keccak256("ERC20Token(address)"))`).
pub const ERC20_PROXY_ID: FixedBytes<4> = FixedBytes([0xf4, 0x72, 0x61, 0xb0]);

/// Human-readable name for an order status code.
pub fn order_status_name(status: u8) -> &'static str {
    match status {
        0 => "INVALID",
        1 => "INVALID_MAKER_ASSET_AMOUNT",
        2 => "INVALID_TAKER_ASSET_AMOUNT",
        3 => "FILLABLE",
        4 => "EXPIRED",
        5 => "FULLY_FILLED",
        6 => "CANCELLED",
        _ => "UNKNOWN",
    }
}

impl From<&SignedOrder> for Order {
    fn from(order: &SignedOrder) -> Self {
        Self {
            makerAddress: order.maker_address,
            takerAddress: order.taker_address,
            feeRecipientAddress: order.fee_recipient_address,
            senderAddress: order.sender_address,
            makerAssetAmount: order.maker_asset_amount,
            takerAssetAmount: order.taker_asset_amount,
            makerFee: order.maker_fee,
            takerFee: order.taker_fee,
            expirationTimeSeconds: order.expiration_time_seconds,
            salt: order.salt,
            makerAssetData: order.maker_asset_data.clone(),
            takerAssetData: order.taker_asset_data.clone(),
        }
    }
}

/// Split signed orders into the parallel ABI order and signature arrays.
pub fn split_orders(orders: &[SignedOrder]) -> (Vec<Order>, Vec<Bytes>) {
    orders
        .iter()
        .map(|o| (Order::from(o), o.signature.clone()))
        .unzip()
}

/// Token address encoded in ERC-20 asset data.
pub fn decode_erc20_asset_data(asset_data: &[u8]) -> Result<Address> {
    ensure!(
        asset_data.len() == 36,
        "ERC-20 asset data must be 36 bytes, got {}",
        asset_data.len()
    );
    ensure!(
        asset_data[..4] == ERC20_PROXY_ID[..],
        "Asset data is not ERC-20 (proxy id 0x{})",
        alloy::hex::encode(&asset_data[..4])
    );
    Ok(Address::from_slice(&asset_data[16..]))
}

/// ERC-20 asset data for `token`.
pub fn encode_erc20_asset_data(token: Address) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(ERC20_PROXY_ID.as_slice());
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(token.as_slice());
    Bytes::from(data)
}
