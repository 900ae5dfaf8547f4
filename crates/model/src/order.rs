//! The 0x v3 order and its signed form.

use {
    crate::{
        DomainSeparator,
        asset::{self, SwappableAsset},
        signature::{self, Signature},
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    anyhow::{Context, Result, ensure},
    hex_literal::hex,
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::fmt::{self, Display, Formatter},
};

/// 2050-01-01T00:00:00Z, far enough in the future for a one-off swap.
pub const DEFAULT_EXPIRATION: u64 = 2_524_604_400;

type OrderHashSol = sol! {
    tuple(
        bytes32, // TYPE_HASH
        address, // makerAddress
        address, // takerAddress
        address, // feeRecipientAddress
        address, // senderAddress
        uint256, // makerAssetAmount
        uint256, // takerAssetAmount
        uint256, // makerFee
        uint256, // takerFee
        uint256, // expirationTimeSeconds
        uint256, // salt
        bytes32, // keccak(makerAssetData)
        bytes32, // keccak(takerAssetData)
        bytes32, // keccak(makerFeeAssetData)
        bytes32, // keccak(takerFeeAssetData)
    )
};

/// The order struct as the exchange hashes and settles it.
#[serde_as]
#[derive(Eq, PartialEq, Clone, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub maker_address: Address,
    /// The zero address lets anyone fill the order.
    pub taker_address: Address,
    pub fee_recipient_address: Address,
    pub sender_address: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub maker_asset_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub taker_asset_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub maker_fee: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub taker_fee: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub expiration_time_seconds: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    pub maker_asset_data: Bytes,
    pub taker_asset_data: Bytes,
    pub maker_fee_asset_data: Bytes,
    pub taker_fee_asset_data: Bytes,
}

/// Parameters of an order that are not given by the assets being swapped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderConfig {
    /// Restrict the order to a single taker.
    pub taker: Option<Address>,
    pub expiration_time_seconds: u64,
    /// A random salt is chosen when unset.
    pub salt: Option<U256>,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            taker: None,
            expiration_time_seconds: DEFAULT_EXPIRATION,
            salt: None,
        }
    }
}

impl OrderData {
    /// keccak256("Order(address makerAddress,address takerAddress,address feeRecipientAddress,address senderAddress,uint256 makerAssetAmount,uint256 takerAssetAmount,uint256 makerFee,uint256 takerFee,uint256 expirationTimeSeconds,uint256 salt,bytes makerAssetData,bytes takerAssetData,bytes makerFeeAssetData,bytes takerFeeAssetData)")
    pub const TYPE_HASH: [u8; 32] =
        hex!("f80322eb8376aafb64eadf8f0d7623f22130fd9491a221e902b713cb984a7534");

    /// Builds an order that trades all `maker_assets` for all
    /// `taker_assets` in a single fill. Fees are zero and no fee recipient or
    /// sender is set.
    pub fn new(
        maker_assets: &[SwappableAsset],
        taker_assets: &[SwappableAsset],
        maker: Address,
        config: &OrderConfig,
    ) -> Result<Self> {
        ensure!(!maker.is_zero(), "order maker must not be the zero address");
        Ok(Self {
            maker_address: maker,
            taker_address: config.taker.unwrap_or_default(),
            fee_recipient_address: Address::ZERO,
            sender_address: Address::ZERO,
            maker_asset_amount: U256::ONE,
            taker_asset_amount: U256::ONE,
            maker_fee: U256::ZERO,
            taker_fee: U256::ZERO,
            expiration_time_seconds: U256::from(config.expiration_time_seconds),
            salt: config
                .salt
                .unwrap_or_else(|| U256::from_be_bytes(rand::random::<[u8; 32]>())),
            maker_asset_data: asset::encode_bundle(maker_assets)
                .context("invalid maker assets")?,
            taker_asset_data: asset::encode_bundle(taker_assets)
                .context("invalid taker assets")?,
            maker_fee_asset_data: Bytes::new(),
            taker_fee_asset_data: Bytes::new(),
        })
    }

    pub fn hash_struct(&self) -> B256 {
        keccak256(OrderHashSol::abi_encode_sequence(&(
            B256::new(Self::TYPE_HASH),
            self.maker_address,
            self.taker_address,
            self.fee_recipient_address,
            self.sender_address,
            self.maker_asset_amount,
            self.taker_asset_amount,
            self.maker_fee,
            self.taker_fee,
            self.expiration_time_seconds,
            self.salt,
            keccak256(&self.maker_asset_data),
            keccak256(&self.taker_asset_data),
            keccak256(&self.maker_fee_asset_data),
            keccak256(&self.taker_fee_asset_data),
        )))
    }

    /// The digest the maker signs. The exchange identifies orders by it.
    pub fn hash(&self, domain_separator: &DomainSeparator) -> B256 {
        signature::hashed_eip712_message(domain_separator, &self.hash_struct())
    }

    pub fn maker_assets(&self) -> Result<Vec<SwappableAsset>> {
        asset::decode(&self.maker_asset_data, self.maker_asset_amount)
    }

    pub fn taker_assets(&self) -> Result<Vec<SwappableAsset>> {
        asset::decode(&self.taker_asset_data, self.taker_asset_amount)
    }
}

/// An order together with the maker's signature and the exchange it was
/// signed for.
#[derive(Eq, PartialEq, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    #[serde(flatten)]
    pub order: OrderData,
    pub chain_id: u64,
    pub exchange_address: Address,
    pub signature: Signature,
}

impl SignedOrder {
    pub fn domain_separator(&self) -> DomainSeparator {
        DomainSeparator::new(self.chain_id, self.exchange_address)
    }

    pub fn hash(&self) -> B256 {
        self.order.hash(&self.domain_separator())
    }

    /// Checks that the signature was produced by the order's maker.
    pub fn verify_owner(&self) -> Result<()> {
        let signer = self
            .signature
            .recover(&self.hash())
            .context("could not recover order signer")?;
        ensure!(
            signer == self.order.maker_address,
            "order signed by {signer} instead of maker {}",
            self.order.maker_address
        );
        Ok(())
    }
}

/// `LibOrder.OrderStatus` as reported by `Exchange.getOrderInfo`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderStatus {
    Invalid,
    InvalidMakerAssetAmount,
    InvalidTakerAssetAmount,
    Fillable,
    Expired,
    FullyFilled,
    Cancelled,
}

impl TryFrom<u8> for OrderStatus {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::Invalid,
            1 => Self::InvalidMakerAssetAmount,
            2 => Self::InvalidTakerAssetAmount,
            3 => Self::Fillable,
            4 => Self::Expired,
            5 => Self::FullyFilled,
            6 => Self::Cancelled,
            other => anyhow::bail!("unknown order status {other}"),
        })
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::Invalid => "invalid",
            Self::InvalidMakerAssetAmount => "invalid maker asset amount",
            Self::InvalidTakerAssetAmount => "invalid taker asset amount",
            Self::Fillable => "fillable",
            Self::Expired => "expired",
            Self::FullyFilled => "fully filled",
            Self::Cancelled => "cancelled",
        };
        f.write_str(status)
    }
}
