pub mod networks {
    pub const MAINNET: u64 = 1;
    pub const POLYGON: u64 = 137;
}

crate::bindings!(
    Exchange {
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
            bytes makerFeeAssetData;
            bytes takerFeeAssetData;
        }

        struct FillResults {
            uint256 makerAssetFilledAmount;
            uint256 takerAssetFilledAmount;
            uint256 makerFeePaid;
            uint256 takerFeePaid;
            uint256 protocolFeePaid;
        }

        struct OrderInfo {
            uint8 orderStatus;
            bytes32 orderHash;
            uint256 orderTakerAssetFilledAmount;
        }

        #[sol(rpc)]
        interface Exchange {
            function fillOrder(
                Order memory order,
                uint256 takerAssetFillAmount,
                bytes memory signature
            ) external payable returns (FillResults memory fillResults);

            function getOrderInfo(Order memory order)
                external
                view
                returns (OrderInfo memory orderInfo);

            function getAssetProxy(bytes4 assetProxyId) external view returns (address);

            function protocolFeeMultiplier() external view returns (uint256);
        }
    },
    maplit::hashmap! {
        MAINNET => address!("0x61935cbdd02287b511119ddb11aeb42f1593b7ef"),
        POLYGON => address!("0xfede379e48c873c75f3cc0c81f7c784ad730a8f7"),
    }
);

crate::bindings!(ERC20 {
    #[sol(rpc)]
    interface ERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
});

crate::bindings!(ERC721 {
    #[sol(rpc)]
    interface ERC721 {
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function getApproved(uint256 tokenId) external view returns (address);
        function setApprovalForAll(address operator, bool approved) external;
    }
});

crate::bindings!(ERC1155 {
    #[sol(rpc)]
    interface ERC1155 {
        function isApprovedForAll(address account, address operator) external view returns (bool);
        function setApprovalForAll(address operator, bool approved) external;
    }
});

pub use alloy::providers::DynProvider as Provider;

/// Extension trait to attach some useful functions to the contract instance.
pub trait InstanceExt: Sized {
    /// Creates a contract instance at the expected address for the current
    /// network.
    fn deployed(
        provider: &Provider,
    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send;
}

#[macro_export]
macro_rules! bindings {
    ($contract:ident { $($sol:tt)* } $(, $deployment_info:expr)? $(,)?) => {
        paste::paste! {
            // Generate the main bindings in a private module. That allows
            // us to re-export all items in our own module while also adding
            // some items ourselves.
            #[allow(non_snake_case)]
            mod [<$contract Private>] {
                alloy::sol! {
                    #[allow(missing_docs)]
                    $($sol)*
                }
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                use alloy::providers::DynProvider;

                pub use super::[<$contract Private>]::*;
                pub type Instance = $contract::[<$contract Instance>]<DynProvider>;

                $(
                use {
                    std::{sync::LazyLock, collections::HashMap},
                    alloy::{
                        providers::Provider,
                        primitives::{address, Address},
                    },
                    anyhow::{Context, Result},
                    $crate::alloy::networks::*,
                };

                pub static DEPLOYMENT_INFO: LazyLock<HashMap<u64, Address>> = LazyLock::new(|| {
                    $deployment_info
                });

                impl $crate::alloy::InstanceExt for Instance {
                    fn deployed(provider: &DynProvider) -> impl Future<Output = Result<Self>> + Send {
                        async move {
                            let chain_id = provider
                                .get_chain_id()
                                .await
                                .context("could not fetch current chain id")?;
                            let address = DEPLOYMENT_INFO
                                .get(&chain_id)
                                .with_context(|| format!("no deployment info for chain {chain_id:?}"))?;

                            Ok(Instance::new(
                                *address,
                                provider.clone(),
                            ))
                        }
                    }
                }
                )*
            }
        }
    };
}
