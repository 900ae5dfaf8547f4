pub mod arguments;
pub mod client;
pub mod swap;
pub mod traits;

use {
    alloy::signers::local::PrivateKeySigner,
    anyhow::{Context, Result},
    arguments::{Arguments, NftKind},
    clap::Parser,
    client::NftSwap,
    model::{asset::SwappableAsset, order::OrderConfig},
    std::ffi::OsString,
    swap::{Outcome, Plan, Swap},
    traits::GasFees,
};

/// Parses the command line. Help and version requests are printed by clap,
/// which then exits; every other parse failure is a setup error.
pub fn parse_arguments<I, T>(argv: I) -> Result<Arguments, swap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Arguments::try_parse_from(argv).map_err(|err| {
        if !err.use_stderr() {
            err.exit()
        }
        swap::Error::Setup(err.into())
    })
}

/// Runs the swap described by `args` up to the first step that needs a
/// transaction.
pub async fn run(args: Arguments) -> Result<Outcome, swap::Error> {
    let (swap, plan) = setup(args).await.map_err(swap::Error::Setup)?;
    let outcome = swap.run(&plan).await?;
    tracing::info!(?outcome, "swap run finished");
    Ok(outcome)
}

async fn setup(args: Arguments) -> Result<(Swap, Plan)> {
    let maker_address = args
        .maker_address
        .unwrap_or_else(|| args.maker_private_key.address());
    let taker_address = args
        .taker_address
        .unwrap_or_else(|| args.taker_private_key.address());

    let config = client::Config {
        chain_id: args.chain_id,
        exchange: args.exchange_address,
        order: OrderConfig {
            taker: args.restrict_to_taker.then_some(taker_address),
            expiration_time_seconds: args.order_expiry,
            salt: None,
        },
        confirmations: args.confirmations,
    };

    let rpc = ethrpc::alloy::client(args.node_url);
    let maker = connect(&rpc, "maker", args.maker_private_key, config.clone())
        .await
        .context("could not connect maker session")?;
    let taker = connect(&rpc, "taker", args.taker_private_key, config)
        .await
        .context("could not connect taker session")?;

    let nft = match args.nft_kind {
        NftKind::Erc721 => SwappableAsset::Erc721 {
            token_address: args.nft_contract,
            token_id: args.nft_token_id,
        },
        NftKind::Erc1155 => SwappableAsset::Erc1155 {
            token_address: args.nft_contract,
            token_id: args.nft_token_id,
            amount: args.nft_amount,
        },
    };
    let payment = SwappableAsset::Erc20 {
        token_address: args.erc20_contract,
        amount: args.erc20_amount,
    };
    tracing::info!(%nft, %payment, maker = %maker_address, taker = %taker_address, "swap plan");

    let plan = Plan {
        maker: maker_address,
        maker_assets: vec![nft],
        taker: taker_address,
        taker_assets: vec![payment],
        gas: GasFees {
            max_fee_per_gas: args.max_fee_per_gas,
            max_priority_fee_per_gas: args.max_priority_fee_per_gas,
        },
        signed_order_path: args.signed_order_path,
    };
    Ok((Swap::new(Box::new(maker), Box::new(taker)), plan))
}

async fn connect(
    rpc: &alloy::rpc::client::RpcClient,
    label: &str,
    signer: PrivateKeySigner,
    config: client::Config,
) -> Result<NftSwap> {
    let provider = ethrpc::alloy::provider_with_signer(rpc, label, signer.clone());
    NftSwap::new(provider, signer, config).await
}
