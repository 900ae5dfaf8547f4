//! Contains the 0x v3 order model shared by the swap client: assets and their
//! proxy encoding, orders, signatures and approval state.

pub mod approval;
pub mod asset;
pub mod order;
pub mod signature;

use {
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    std::{fmt, sync::LazyLock},
};

type DomainSeparatorSol = sol! {
    tuple(
        bytes32, // EIP712_DOMAIN_TYPEHASH
        bytes32, // keccak(domain.name)
        bytes32, // keccak(domain.version)
        uint256, // chainId
        address, // verifyingContract
    )
};

#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub B256);

impl std::str::FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(B256::new(const_hex::decode_to_array(s)?)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl DomainSeparator {
    /// The domain of the 0x v3 exchange deployed at `exchange` on the chain
    /// with id `chain_id`.
    pub fn new(chain_id: u64, exchange: Address) -> Self {
        /// The EIP-712 domain type used computing the domain separator.
        static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
            keccak256(
                b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
            )
        });

        /// The EIP-712 domain name used for computing the domain separator.
        static DOMAIN_NAME: LazyLock<B256> = LazyLock::new(|| keccak256(b"0x Protocol"));

        /// The EIP-712 domain version used for computing the domain separator.
        static DOMAIN_VERSION: LazyLock<B256> = LazyLock::new(|| keccak256(b"3.0.0"));

        Self(keccak256(DomainSeparatorSol::abi_encode_sequence(&(
            *DOMAIN_TYPE_HASH,
            *DOMAIN_NAME,
            *DOMAIN_VERSION,
            U256::from(chain_id),
            exchange,
        ))))
    }
}
