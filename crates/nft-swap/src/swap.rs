//! The swap sequence: approve, sign, approve, fill.

use {
    crate::traits::{GasFees, SwapClient},
    alloy::primitives::{Address, TxHash},
    anyhow::{Context, anyhow},
    model::{asset::SwappableAsset, order::SignedOrder},
    std::path::{Path, PathBuf},
};

/// Where a failed swap stopped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("setup failed: {0:?}")]
    Setup(#[source] anyhow::Error),
    #[error("could not load approval status: {0:?}")]
    ApprovalQuery(#[source] anyhow::Error),
    #[error("approval failed: {0:?}")]
    Approval(#[source] anyhow::Error),
    #[error("could not create order: {0:?}")]
    Order(#[source] anyhow::Error),
    #[error("fill failed: {0:?}")]
    Fill(#[source] anyhow::Error),
}

/// How far a run got. Each run submits at most one transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The maker's asset was not approved yet. The approval was submitted
    /// and no order was created.
    MakerApproved(TxHash),
    /// The order was signed but the taker's asset was not approved yet. The
    /// approval was submitted and the order was not filled.
    TakerApproved(TxHash),
    Filled(TxHash),
}

/// What to trade and between whom.
#[derive(Clone, Debug)]
pub struct Plan {
    pub maker: Address,
    pub maker_assets: Vec<SwappableAsset>,
    pub taker: Address,
    pub taker_assets: Vec<SwappableAsset>,
    pub gas: GasFees,
    pub signed_order_path: Option<PathBuf>,
}

pub struct Swap {
    maker: Box<dyn SwapClient>,
    taker: Box<dyn SwapClient>,
}

impl Swap {
    pub fn new(maker: Box<dyn SwapClient>, taker: Box<dyn SwapClient>) -> Self {
        Self { maker, taker }
    }

    pub async fn run(&self, plan: &Plan) -> Result<Outcome, Error> {
        let maker_asset = plan
            .maker_assets
            .first()
            .ok_or_else(|| Error::Setup(anyhow!("maker offers no assets")))?;
        let taker_asset = plan
            .taker_assets
            .first()
            .ok_or_else(|| Error::Setup(anyhow!("taker offers no assets")))?;

        let status = self
            .maker
            .load_approval_status(maker_asset, plan.maker)
            .await
            .map_err(Error::ApprovalQuery)?;
        tracing::info!(?status, maker = %plan.maker, "maker approval status");
        if !status.contract_approved {
            tracing::info!(asset = %maker_asset, "maker needs to approve swap");
            let hash = self
                .maker
                .approve_asset(maker_asset, plan.maker, plan.gas)
                .await
                .map_err(Error::Approval)?;
            tracing::info!(?hash, "maker approved swap");
            return Ok(Outcome::MakerApproved(hash));
        }
        tracing::info!("maker asset already approved");

        let order = self
            .maker
            .build_order(&plan.maker_assets, &plan.taker_assets, plan.maker)
            .map_err(Error::Order)?;
        let signed = self
            .maker
            .sign_order(order, plan.maker)
            .map_err(Error::Order)?;
        tracing::info!(hash = ?signed.hash(), "signed order");
        if let Some(path) = &plan.signed_order_path {
            write_signed_order(path, &signed).map_err(Error::Order)?;
            tracing::info!(path = %path.display(), "wrote signed order");
        }

        let status = self
            .taker
            .load_approval_status(taker_asset, plan.taker)
            .await
            .map_err(Error::ApprovalQuery)?;
        tracing::info!(?status, taker = %plan.taker, "taker approval status");
        if !status.contract_approved {
            tracing::info!(asset = %taker_asset, "taker needs to approve swap");
            let hash = self
                .taker
                .approve_asset(taker_asset, plan.taker, plan.gas)
                .await
                .map_err(Error::Approval)?;
            tracing::info!(?hash, "taker approved swap");
            return Ok(Outcome::TakerApproved(hash));
        }
        tracing::info!("taker asset already approved");

        let hash = self
            .taker
            .fill_signed_order(&signed, plan.gas)
            .await
            .map_err(Error::Fill)?;
        tracing::info!(?hash, "swap completed");
        Ok(Outcome::Filled(hash))
    }
}

fn write_signed_order(path: &Path, order: &SignedOrder) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(order)?;
    std::fs::write(path, json)
        .with_context(|| format!("could not write signed order to {}", path.display()))
}
