//! [`SwapClient`] backed by a node and a local key.

use {
    crate::traits::{GasFees, SwapClient},
    alloy::{
        network::Ethereum,
        primitives::{Address, Bytes, TxHash, U256},
        providers::{PendingTransactionBuilder, Provider},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
    contracts::alloy::{ERC20, ERC721, ERC1155, Exchange, InstanceExt},
    ethrpc::{AlloyProvider, alloy::errors::ignore_revert},
    model::{
        DomainSeparator,
        approval::{ApprovalStatus, MAX_APPROVAL_THRESHOLD},
        asset::{AssetProxyId, SwappableAsset},
        order::{OrderConfig, OrderData, OrderStatus, SignedOrder},
        signature::{Signature, SigningScheme},
    },
};

#[derive(Clone, Debug)]
pub struct Config {
    /// The chain the node is expected to be on. Orders are signed for it.
    pub chain_id: u64,
    /// Overrides the exchange deployment known for the chain.
    pub exchange: Option<Address>,
    pub order: OrderConfig,
    pub confirmations: u64,
}

pub struct NftSwap {
    provider: AlloyProvider,
    signer: PrivateKeySigner,
    exchange: Exchange::Instance,
    chain_id: u64,
    order_config: OrderConfig,
    confirmations: u64,
}

impl NftSwap {
    /// Connects the session. `provider` must send transactions from
    /// `signer`'s address.
    pub async fn new(
        provider: AlloyProvider,
        signer: PrivateKeySigner,
        config: Config,
    ) -> Result<Self> {
        let chain_id = provider
            .get_chain_id()
            .await
            .context("could not fetch current chain id")?;
        ensure!(
            chain_id == config.chain_id,
            "node is on chain {chain_id} but chain {} is configured",
            config.chain_id
        );
        let exchange = match config.exchange {
            Some(address) => Exchange::Instance::new(address, provider.clone()),
            None => Exchange::Instance::deployed(&provider).await?,
        };
        tracing::debug!(
            exchange = %exchange.address(),
            signer = %signer.address(),
            "connected swap client"
        );
        Ok(Self {
            provider,
            signer,
            exchange,
            chain_id,
            order_config: config.order,
            confirmations: config.confirmations,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    fn domain_separator(&self) -> DomainSeparator {
        DomainSeparator::new(self.chain_id, *self.exchange.address())
    }

    async fn asset_proxy(&self, id: AssetProxyId) -> Result<Address> {
        let proxy = self
            .exchange
            .getAssetProxy(id.selector())
            .call()
            .await
            .with_context(|| format!("could not look up {id:?} asset proxy"))?;
        ensure!(
            !proxy.is_zero(),
            "exchange has no asset proxy registered for {id:?}"
        );
        Ok(proxy)
    }

    /// Waits for a submitted transaction and checks that it succeeded.
    async fn confirm(&self, pending: PendingTransactionBuilder<Ethereum>) -> Result<TxHash> {
        let hash = *pending.tx_hash();
        tracing::debug!(?hash, "waiting for transaction");
        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .with_context(|| format!("failed to get receipt of {hash:?}"))?;
        ensure!(
            receipt.status(),
            "transaction reverted: {:?}",
            receipt.transaction_hash
        );
        Ok(receipt.transaction_hash)
    }
}

fn to_exchange_order(order: &OrderData) -> Exchange::Order {
    Exchange::Order {
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
        makerFeeAssetData: order.maker_fee_asset_data.clone(),
        takerFeeAssetData: order.taker_fee_asset_data.clone(),
    }
}

#[async_trait::async_trait]
impl SwapClient for NftSwap {
    async fn load_approval_status(
        &self,
        asset: &SwappableAsset,
        owner: Address,
    ) -> Result<ApprovalStatus> {
        let proxy = self.asset_proxy(asset.proxy_id()).await?;
        let status = match asset {
            SwappableAsset::Erc20 { token_address, .. } => {
                let allowance = ERC20::Instance::new(*token_address, self.provider.clone())
                    .allowance(owner, proxy)
                    .call()
                    .await
                    .context("could not fetch ERC20 allowance")?;
                tracing::debug!(%allowance, threshold = %MAX_APPROVAL_THRESHOLD, "ERC20 allowance");
                ApprovalStatus::from_allowance(allowance)
            }
            SwappableAsset::Erc721 {
                token_address,
                token_id,
            } => {
                let token = ERC721::Instance::new(*token_address, self.provider.clone());
                let contract_approved = token
                    .isApprovedForAll(owner, proxy)
                    .call()
                    .await
                    .context("could not fetch ERC721 operator approval")?;
                let approved = ignore_revert(token.getApproved(*token_id).call().await)
                    .context("could not fetch ERC721 token approval")?;
                ApprovalStatus {
                    contract_approved,
                    token_id_approved: approved.map(|approved| approved == proxy),
                }
            }
            SwappableAsset::Erc1155 { token_address, .. } => ApprovalStatus {
                contract_approved: ERC1155::Instance::new(*token_address, self.provider.clone())
                    .isApprovedForAll(owner, proxy)
                    .call()
                    .await
                    .context("could not fetch ERC1155 operator approval")?,
                token_id_approved: None,
            },
        };
        tracing::debug!(%asset, %owner, ?status, "loaded approval status");
        Ok(status)
    }

    async fn approve_asset(
        &self,
        asset: &SwappableAsset,
        owner: Address,
        gas: GasFees,
    ) -> Result<TxHash> {
        ensure!(
            owner == self.address(),
            "cannot approve for {owner} with the key of {}",
            self.address()
        );
        let proxy = self.asset_proxy(asset.proxy_id()).await?;
        tracing::debug!(%asset, %proxy, "approving asset proxy");
        let pending = match asset {
            SwappableAsset::Erc20 { token_address, .. } => {
                ERC20::Instance::new(*token_address, self.provider.clone())
                    .approve(proxy, U256::MAX)
                    .from(owner)
                    .max_fee_per_gas(gas.max_fee_per_gas)
                    .max_priority_fee_per_gas(gas.max_priority_fee_per_gas)
                    .send()
                    .await
            }
            SwappableAsset::Erc721 { token_address, .. } => {
                ERC721::Instance::new(*token_address, self.provider.clone())
                    .setApprovalForAll(proxy, true)
                    .from(owner)
                    .max_fee_per_gas(gas.max_fee_per_gas)
                    .max_priority_fee_per_gas(gas.max_priority_fee_per_gas)
                    .send()
                    .await
            }
            SwappableAsset::Erc1155 { token_address, .. } => {
                ERC1155::Instance::new(*token_address, self.provider.clone())
                    .setApprovalForAll(proxy, true)
                    .from(owner)
                    .max_fee_per_gas(gas.max_fee_per_gas)
                    .max_priority_fee_per_gas(gas.max_priority_fee_per_gas)
                    .send()
                    .await
            }
        }
        .context("failed to submit approval")?;
        self.confirm(pending).await
    }

    fn build_order(
        &self,
        maker_assets: &[SwappableAsset],
        taker_assets: &[SwappableAsset],
        maker: Address,
    ) -> Result<OrderData> {
        OrderData::new(maker_assets, taker_assets, maker, &self.order_config)
    }

    fn sign_order(&self, order: OrderData, signer: Address) -> Result<SignedOrder> {
        ensure!(
            signer == self.address(),
            "cannot sign for {signer} with the key of {}",
            self.address()
        );
        let domain_separator = self.domain_separator();
        let hash = order.hash(&domain_separator);
        let signature = Signature::sign(SigningScheme::Eip712, &hash, &self.signer)
            .context("failed to sign order")?;
        tracing::debug!(?hash, "signed order");
        Ok(SignedOrder {
            order,
            chain_id: self.chain_id,
            exchange_address: *self.exchange.address(),
            signature,
        })
    }

    async fn fill_signed_order(&self, order: &SignedOrder, gas: GasFees) -> Result<TxHash> {
        ensure!(
            order.chain_id == self.chain_id && order.exchange_address == *self.exchange.address(),
            "order was signed for exchange {} on chain {}",
            order.exchange_address,
            order.chain_id
        );
        order.verify_owner()?;

        let contract_order = to_exchange_order(&order.order);
        let info = self
            .exchange
            .getOrderInfo(contract_order.clone())
            .call()
            .await
            .context("could not fetch order info")?;
        let status = OrderStatus::try_from(info.orderStatus)?;
        ensure!(
            status == OrderStatus::Fillable,
            "order {:?} is not fillable: {status}",
            info.orderHash
        );

        let multiplier = self
            .exchange
            .protocolFeeMultiplier()
            .call()
            .await
            .context("could not fetch protocol fee multiplier")?;
        let protocol_fee = multiplier
            .checked_mul(U256::from(gas.max_fee_per_gas))
            .context("protocol fee overflows")?;
        tracing::debug!(hash = ?info.orderHash, %protocol_fee, "filling order");

        let pending = self
            .exchange
            .fillOrder(
                contract_order,
                order.order.taker_asset_amount,
                Bytes::from(order.signature),
            )
            .from(self.address())
            .value(protocol_fee)
            .max_fee_per_gas(gas.max_fee_per_gas)
            .max_priority_fee_per_gas(gas.max_priority_fee_per_gas)
            .send()
            .await
            .context("failed to submit fill")?;
        self.confirm(pending).await
    }
}
