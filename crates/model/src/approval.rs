use {alloy::primitives::U256, serde::Serialize};

/// Allowance at or above which an ERC20 approval is considered unlimited.
/// Approvals are granted with `U256::MAX`, which token contracts may count
/// down as they are spent, so only require a large remainder.
/// (2^118 - 10^17)
pub const MAX_APPROVAL_THRESHOLD: U256 =
    U256::from_limbs([18_346_744_073_709_551_616, (1 << 54) - 1, 0, 0]);

/// Whether the asset proxy may move an owner's asset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatus {
    /// Operator approval for the whole contract, or a sufficient ERC20
    /// allowance. This is what a swap requires.
    pub contract_approved: bool,
    /// Approval of the single token id. Only ERC721 has this. Reported for
    /// information, a swap still asks for operator approval without it.
    pub token_id_approved: Option<bool>,
}

impl ApprovalStatus {
    pub fn from_allowance(allowance: U256) -> Self {
        Self {
            contract_approved: allowance >= MAX_APPROVAL_THRESHOLD,
            token_id_approved: None,
        }
    }
}
