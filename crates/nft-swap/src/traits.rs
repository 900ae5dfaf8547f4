//! The boundary between the swap sequence and the chain.
//!
//! One [`SwapClient`] exists per signing party so the sequence can be unit
//! tested with mocks.

use {
    alloy::primitives::{Address, TxHash},
    anyhow::Result,
    model::{
        approval::ApprovalStatus,
        asset::SwappableAsset,
        order::{OrderData, SignedOrder},
    },
};

/// EIP-1559 fee parameters for submitted transactions, in wei.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GasFees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// A session of one party with the exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SwapClient: Send + Sync {
    /// Whether the exchange's asset proxy may currently move `asset` out of
    /// `owner`'s wallet.
    async fn load_approval_status(
        &self,
        asset: &SwappableAsset,
        owner: Address,
    ) -> Result<ApprovalStatus>;

    /// Approves the asset proxy for `asset` and waits for the transaction to
    /// be confirmed. Fails if it reverted.
    async fn approve_asset(
        &self,
        asset: &SwappableAsset,
        owner: Address,
        gas: GasFees,
    ) -> Result<TxHash>;

    /// Builds an unsigned order trading the maker's assets for the taker's.
    fn build_order(
        &self,
        maker_assets: &[SwappableAsset],
        taker_assets: &[SwappableAsset],
        maker: Address,
    ) -> Result<OrderData>;

    /// Signs the order with the key for `signer`.
    fn sign_order(&self, order: OrderData, signer: Address) -> Result<SignedOrder>;

    /// Fills the whole order and waits for the transaction to be confirmed.
    async fn fill_signed_order(&self, order: &SignedOrder, gas: GasFees) -> Result<TxHash>;
}
