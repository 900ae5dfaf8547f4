//! Assets that can be swapped and their 0x v3 asset data encoding.
//!
//! The exchange never moves tokens itself. Every asset is described by an
//! "asset data" blob whose 4-byte prefix selects the asset proxy that
//! performs the transfer and whose remainder is the ABI encoded payload for
//! that proxy.

use {
    alloy::{
        primitives::{Address, Bytes, FixedBytes, U256},
        sol,
        sol_types::SolCall,
    },
    anyhow::{Context, Result, anyhow, ensure},
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::fmt::{self, Display, Formatter},
};

sol! {
    function ERC20Token(address tokenAddress);
    function ERC721Token(address tokenAddress, uint256 tokenId);
    function ERC1155Assets(
        address tokenAddress,
        uint256[] tokenIds,
        uint256[] values,
        bytes callbackData
    );
    function MultiAsset(uint256[] amounts, bytes[] nestedAssetData);
}

/// Identifies the asset proxy responsible for an asset. The value is the
/// selector prefix of the asset data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AssetProxyId {
    Erc20,
    Erc721,
    Erc1155,
    MultiAsset,
}

impl AssetProxyId {
    pub fn selector(self) -> FixedBytes<4> {
        FixedBytes(match self {
            Self::Erc20 => ERC20TokenCall::SELECTOR,
            Self::Erc721 => ERC721TokenCall::SELECTOR,
            Self::Erc1155 => ERC1155AssetsCall::SELECTOR,
            Self::MultiAsset => MultiAssetCall::SELECTOR,
        })
    }

    /// Reads the proxy id from the prefix of some asset data.
    pub fn from_asset_data(data: &[u8]) -> Result<Self> {
        let selector: [u8; 4] = data
            .get(..4)
            .context("asset data shorter than a proxy id")?
            .try_into()?;
        [Self::Erc20, Self::Erc721, Self::Erc1155, Self::MultiAsset]
            .into_iter()
            .find(|id| id.selector().0 == selector)
            .ok_or_else(|| {
                anyhow!(
                    "unsupported asset proxy id {}",
                    const_hex::encode_prefixed(selector)
                )
            })
    }
}

/// An asset one side of the swap offers. The JSON form matches the one used
/// by 0x tooling, e.g. `{"type":"ERC721","tokenAddress":"0x..","tokenId":"10"}`.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SwappableAsset {
    #[serde(rename = "ERC20", rename_all = "camelCase")]
    Erc20 {
        token_address: Address,
        /// Amount in the token's smallest unit.
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    #[serde(rename = "ERC721", rename_all = "camelCase")]
    Erc721 {
        token_address: Address,
        #[serde_as(as = "HexOrDecimalU256")]
        token_id: U256,
    },
    #[serde(rename = "ERC1155", rename_all = "camelCase")]
    Erc1155 {
        token_address: Address,
        #[serde_as(as = "HexOrDecimalU256")]
        token_id: U256,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
}

impl SwappableAsset {
    pub fn token_address(&self) -> Address {
        match self {
            Self::Erc20 { token_address, .. }
            | Self::Erc721 { token_address, .. }
            | Self::Erc1155 { token_address, .. } => *token_address,
        }
    }

    pub fn proxy_id(&self) -> AssetProxyId {
        match self {
            Self::Erc20 { .. } => AssetProxyId::Erc20,
            Self::Erc721 { .. } => AssetProxyId::Erc721,
            Self::Erc1155 { .. } => AssetProxyId::Erc1155,
        }
    }

    /// Asset data for this asset on its own, i.e. how it appears nested in a
    /// multi asset bundle.
    pub fn asset_data(&self) -> Bytes {
        match self {
            Self::Erc20 { token_address, .. } => ERC20TokenCall {
                tokenAddress: *token_address,
            }
            .abi_encode(),
            Self::Erc721 {
                token_address,
                token_id,
            } => ERC721TokenCall {
                tokenAddress: *token_address,
                tokenId: *token_id,
            }
            .abi_encode(),
            Self::Erc1155 {
                token_address,
                token_id,
                amount,
            } => ERC1155AssetsCall {
                tokenAddress: *token_address,
                tokenIds: vec![*token_id],
                values: vec![*amount],
                callbackData: Bytes::new(),
            }
            .abi_encode(),
        }
        .into()
    }

    /// The amount this asset contributes to a multi asset bundle. ERC20
    /// amounts live here, ERC1155 amounts are already part of the nested
    /// asset data.
    fn bundle_amount(&self) -> U256 {
        match self {
            Self::Erc20 { amount, .. } => *amount,
            Self::Erc721 { .. } | Self::Erc1155 { .. } => U256::ONE,
        }
    }
}

impl Display for SwappableAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erc20 {
                token_address,
                amount,
            } => write!(f, "{amount} of ERC20 {token_address}"),
            Self::Erc721 {
                token_address,
                token_id,
            } => write!(f, "ERC721 {token_address} #{token_id}"),
            Self::Erc1155 {
                token_address,
                token_id,
                amount,
            } => write!(f, "{amount} of ERC1155 {token_address} #{token_id}"),
        }
    }
}

/// Encodes a list of assets as one multi asset bundle. Orders always use
/// bundles so that single assets and collections share one code path.
pub fn encode_bundle(assets: &[SwappableAsset]) -> Result<Bytes> {
    ensure!(!assets.is_empty(), "cannot encode an empty asset bundle");
    Ok(MultiAssetCall {
        amounts: assets.iter().map(SwappableAsset::bundle_amount).collect(),
        nestedAssetData: assets.iter().map(SwappableAsset::asset_data).collect(),
    }
    .abi_encode()
    .into())
}

/// Decodes asset data into the assets it transfers when the order side is
/// filled `amount` times.
pub fn decode(data: &[u8], amount: U256) -> Result<Vec<SwappableAsset>> {
    match AssetProxyId::from_asset_data(data)? {
        AssetProxyId::Erc20 => {
            let call = ERC20TokenCall::abi_decode(data).context("invalid ERC20 asset data")?;
            Ok(vec![SwappableAsset::Erc20 {
                token_address: call.tokenAddress,
                amount,
            }])
        }
        AssetProxyId::Erc721 => {
            let call = ERC721TokenCall::abi_decode(data).context("invalid ERC721 asset data")?;
            ensure!(
                amount == U256::ONE,
                "ERC721 asset transferred {amount} times"
            );
            Ok(vec![SwappableAsset::Erc721 {
                token_address: call.tokenAddress,
                token_id: call.tokenId,
            }])
        }
        AssetProxyId::Erc1155 => {
            let call =
                ERC1155AssetsCall::abi_decode(data).context("invalid ERC1155 asset data")?;
            ensure!(
                call.tokenIds.len() == call.values.len(),
                "ERC1155 asset data with {} ids but {} values",
                call.tokenIds.len(),
                call.values.len()
            );
            call.tokenIds
                .into_iter()
                .zip(call.values)
                .map(|(token_id, value)| {
                    Ok(SwappableAsset::Erc1155 {
                        token_address: call.tokenAddress,
                        token_id,
                        amount: value
                            .checked_mul(amount)
                            .context("ERC1155 amount overflows")?,
                    })
                })
                .collect()
        }
        AssetProxyId::MultiAsset => {
            let call = MultiAssetCall::abi_decode(data).context("invalid multi asset data")?;
            ensure!(
                call.amounts.len() == call.nestedAssetData.len(),
                "multi asset data with {} amounts but {} assets",
                call.amounts.len(),
                call.nestedAssetData.len()
            );
            let mut assets = Vec::with_capacity(call.amounts.len());
            for (nested_amount, nested) in call.amounts.into_iter().zip(call.nestedAssetData) {
                ensure!(
                    AssetProxyId::from_asset_data(&nested)? != AssetProxyId::MultiAsset,
                    "nested multi asset data is not supported"
                );
                let total = nested_amount
                    .checked_mul(amount)
                    .context("bundle amount overflows")?;
                assets.extend(decode(&nested, total)?);
            }
            Ok(assets)
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address, hex_literal::hex, serde_json::json};

    const NFT: Address = address!("0x1111111111111111111111111111111111111111");
    const TOKEN: Address = address!("0x2222222222222222222222222222222222222222");

    fn nft(token_id: u64) -> SwappableAsset {
        SwappableAsset::Erc721 {
            token_address: NFT,
            token_id: U256::from(token_id),
        }
    }

    fn usdt(amount: u64) -> SwappableAsset {
        SwappableAsset::Erc20 {
            token_address: TOKEN,
            amount: U256::from(amount),
        }
    }

    #[test]
    fn proxy_ids() {
        assert_eq!(AssetProxyId::Erc20.selector().0, hex!("f47261b0"));
        assert_eq!(AssetProxyId::Erc721.selector().0, hex!("02571792"));
        assert_eq!(AssetProxyId::Erc1155.selector().0, hex!("a7cb5fb7"));
        assert_eq!(AssetProxyId::MultiAsset.selector().0, hex!("94cfcdd7"));
    }

    #[test]
    fn single_asset_data() {
        assert_eq!(
            usdt(1_000_000).asset_data().as_ref(),
            hex!("f47261b00000000000000000000000002222222222222222222222222222222222222222")
        );
        assert_eq!(
            nft(10).asset_data().as_ref(),
            hex!(
                "02571792"
                "0000000000000000000000001111111111111111111111111111111111111111"
                "000000000000000000000000000000000000000000000000000000000000000a"
            )
        );
        let erc1155 = SwappableAsset::Erc1155 {
            token_address: NFT,
            token_id: U256::from(10),
            amount: U256::from(5),
        };
        assert_eq!(
            erc1155.asset_data().as_ref(),
            hex!(
                "a7cb5fb7"
                "0000000000000000000000001111111111111111111111111111111111111111"
                "0000000000000000000000000000000000000000000000000000000000000080"
                "00000000000000000000000000000000000000000000000000000000000000c0"
                "0000000000000000000000000000000000000000000000000000000000000100"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "000000000000000000000000000000000000000000000000000000000000000a"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000005"
                "0000000000000000000000000000000000000000000000000000000000000000"
            )
        );
    }

    #[test]
    fn bundles_wrap_single_assets() {
        assert_eq!(
            encode_bundle(&[nft(10)]).unwrap().as_ref(),
            hex!(
                "94cfcdd7"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000080"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000020"
                "0000000000000000000000000000000000000000000000000000000000000044"
                "02571792"
                "0000000000000000000000001111111111111111111111111111111111111111"
                "000000000000000000000000000000000000000000000000000000000000000a"
                "00000000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(
            encode_bundle(&[usdt(1_000_000)]).unwrap().as_ref(),
            hex!(
                "94cfcdd7"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000080"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "00000000000000000000000000000000000000000000000000000000000f4240"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000020"
                "0000000000000000000000000000000000000000000000000000000000000024"
                "f47261b0"
                "0000000000000000000000002222222222222222222222222222222222222222"
                "00000000000000000000000000000000000000000000000000000000"
            )
        );
        assert!(encode_bundle(&[]).is_err());
    }

    #[test]
    fn decode_bundle_of_mixed_assets() {
        let erc1155 = SwappableAsset::Erc1155 {
            token_address: NFT,
            token_id: U256::from(3),
            amount: U256::from(7),
        };
        let assets = vec![nft(10), nft(20), usdt(1_000_000), erc1155];
        let data = encode_bundle(&assets).unwrap();
        assert_eq!(decode(&data, U256::ONE).unwrap(), assets);
    }

    #[test]
    fn decode_scales_fungible_amounts() {
        let data = usdt(0).asset_data();
        assert_eq!(decode(&data, U256::from(42)).unwrap(), vec![usdt(42)]);
    }

    #[test]
    fn decode_rejects_malformed_data() {
        assert!(decode(&[], U256::ONE).is_err());
        assert!(decode(&hex!("deadbeef"), U256::ONE).is_err());
        // truncated ERC721 payload
        assert!(decode(&nft(10).asset_data()[..36], U256::ONE).is_err());
        // an NFT cannot be transferred twice
        assert!(decode(&nft(10).asset_data(), U256::from(2)).is_err());

        let nested = encode_bundle(&[nft(10)]).unwrap();
        let doubly_nested: Bytes = MultiAssetCall {
            amounts: vec![U256::ONE],
            nestedAssetData: vec![nested],
        }
        .abi_encode()
        .into();
        assert!(decode(&doubly_nested, U256::ONE).is_err());
    }

    #[test]
    fn json_form() {
        let value = json!({
            "type": "ERC721",
            "tokenAddress": "0x1111111111111111111111111111111111111111",
            "tokenId": "10",
        });
        assert_eq!(serde_json::to_value(nft(10)).unwrap(), value);
        assert_eq!(
            serde_json::from_value::<SwappableAsset>(value).unwrap(),
            nft(10)
        );

        let value = json!({
            "type": "ERC20",
            "tokenAddress": "0x2222222222222222222222222222222222222222",
            "amount": "1000000",
        });
        assert_eq!(
            serde_json::from_value::<SwappableAsset>(value).unwrap(),
            usdt(1_000_000)
        );
    }

    #[test]
    fn display_and_accessors() {
        assert_eq!(nft(10).token_address(), NFT);
        assert_eq!(usdt(1).token_address(), TOKEN);
        assert_eq!(usdt(1).proxy_id(), AssetProxyId::Erc20);
        assert_eq!(
            nft(10).to_string(),
            "ERC721 0x1111111111111111111111111111111111111111 #10"
        );
    }
}
