use {
    alloy::{
        primitives::{Address, U256},
        signers::local::PrivateKeySigner,
    },
    clap::{Parser, ValueEnum},
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env = "POLYGON_RPC")]
    pub node_url: Url,

    /// Private key of the maker, the party selling the NFT.
    #[clap(long, env = "MAKER_PVT_KEY")]
    pub maker_private_key: PrivateKeySigner,

    /// Private key of the taker, the party paying with ERC20 tokens.
    #[clap(long, env = "TAKER_PVT_KEY")]
    pub taker_private_key: PrivateKeySigner,

    /// The NFT contract the maker sells from.
    #[clap(long, env)]
    pub nft_contract: Address,

    /// The ERC20 token the taker pays with.
    #[clap(long, env = "ERC20_CONTRACT")]
    pub erc20_contract: Address,

    #[clap(long, env, default_value = "10")]
    pub nft_token_id: U256,

    #[clap(long, env, value_enum, default_value_t = NftKind::Erc721)]
    pub nft_kind: NftKind,

    /// Number of tokens of the id to sell. Only meaningful for ERC1155.
    #[clap(long, env, default_value = "1")]
    pub nft_amount: U256,

    /// Price of the NFT in the token's smallest unit.
    #[clap(long, env, default_value = "1000000")]
    pub erc20_amount: U256,

    /// The address that owns the NFT. Defaults to the maker key's address.
    #[clap(long, env)]
    pub maker_address: Option<Address>,

    /// The address that owns the ERC20 tokens. Defaults to the taker key's
    /// address.
    #[clap(long, env)]
    pub taker_address: Option<Address>,

    #[clap(long, env, default_value = "137")]
    pub chain_id: u64,

    /// Exchange contract to use instead of the known deployment for the
    /// chain.
    #[clap(long, env)]
    pub exchange_address: Option<Address>,

    #[clap(long, env, default_value = "44426392484")]
    pub max_priority_fee_per_gas: u128,

    #[clap(long, env, default_value = "45426392484")]
    pub max_fee_per_gas: u128,

    /// Unix timestamp in seconds after which the order can no longer be
    /// filled.
    #[clap(long, env, default_value = "2524604400")]
    pub order_expiry: u64,

    /// Only allow the taker address to fill the order. By default anyone
    /// can.
    #[clap(long, env)]
    pub restrict_to_taker: bool,

    /// Write the signed order as JSON to this file.
    #[clap(long, env)]
    pub signed_order_path: Option<PathBuf>,

    /// Number of confirmations to wait for after each transaction.
    #[clap(long, env, default_value = "1")]
    pub confirmations: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum NftKind {
    Erc721,
    Erc1155,
}

#[derive(Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,nft_swap=debug,ethrpc=info")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn to_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold.into_level(),
            self.use_json_logs,
        )
    }
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    match option {
        Some(display) => writeln!(f, "{name}: {display}"),
        None => writeln!(f, "{name}: None"),
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url: _,
            maker_private_key,
            taker_private_key,
            nft_contract,
            erc20_contract,
            nft_token_id,
            nft_kind,
            nft_amount,
            erc20_amount,
            maker_address,
            taker_address,
            chain_id,
            exchange_address,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            order_expiry,
            restrict_to_taker,
            signed_order_path,
            confirmations,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "node_url: SECRET")?;
        writeln!(f, "maker_private_key: SECRET")?;
        writeln!(f, "maker_signer: {}", maker_private_key.address())?;
        writeln!(f, "taker_private_key: SECRET")?;
        writeln!(f, "taker_signer: {}", taker_private_key.address())?;
        writeln!(f, "nft_contract: {nft_contract}")?;
        writeln!(f, "erc20_contract: {erc20_contract}")?;
        writeln!(f, "nft_token_id: {nft_token_id}")?;
        writeln!(f, "nft_kind: {nft_kind:?}")?;
        writeln!(f, "nft_amount: {nft_amount}")?;
        writeln!(f, "erc20_amount: {erc20_amount}")?;
        display_option(f, "maker_address", maker_address)?;
        display_option(f, "taker_address", taker_address)?;
        writeln!(f, "chain_id: {chain_id}")?;
        display_option(f, "exchange_address", exchange_address)?;
        writeln!(f, "max_priority_fee_per_gas: {max_priority_fee_per_gas}")?;
        writeln!(f, "max_fee_per_gas: {max_fee_per_gas}")?;
        writeln!(f, "order_expiry: {order_expiry}")?;
        writeln!(f, "restrict_to_taker: {restrict_to_taker}")?;
        display_option(
            f,
            "signed_order_path",
            &signed_order_path.as_ref().map(|path| path.display()),
        )?;
        writeln!(f, "confirmations: {confirmations}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    const MAKER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TAKER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn required() -> Vec<&'static str> {
        vec![
            "nft-swap",
            "--node-url",
            "https://polygon.example.org/v1/key",
            "--maker-private-key",
            MAKER_KEY,
            "--taker-private-key",
            TAKER_KEY,
            "--nft-contract",
            "0x1111111111111111111111111111111111111111",
            "--erc20-contract",
            "0x2222222222222222222222222222222222222222",
        ]
    }

    #[test]
    fn defaults() {
        let args = Arguments::try_parse_from(required()).unwrap();
        assert_eq!(
            args.nft_contract,
            address!("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(args.nft_token_id, U256::from(10));
        assert_eq!(args.nft_kind, NftKind::Erc721);
        assert_eq!(args.nft_amount, U256::ONE);
        assert_eq!(args.erc20_amount, U256::from(1_000_000));
        assert_eq!(args.maker_address, None);
        assert_eq!(args.taker_address, None);
        assert_eq!(args.chain_id, 137);
        assert_eq!(args.exchange_address, None);
        assert_eq!(args.max_priority_fee_per_gas, 44_426_392_484);
        assert_eq!(args.max_fee_per_gas, 45_426_392_484);
        assert_eq!(args.order_expiry, 2_524_604_400);
        assert!(!args.restrict_to_taker);
        assert_eq!(args.signed_order_path, None);
        assert_eq!(args.confirmations, 1);
        assert_eq!(args.logging.log_filter, "warn,nft_swap=debug,ethrpc=info");
        assert_eq!(args.logging.log_stderr_threshold, LevelFilter::ERROR);
    }

    #[test]
    fn overrides() {
        let mut argv = required();
        argv.extend([
            "--nft-kind",
            "erc1155",
            "--nft-amount",
            "3",
            "--nft-token-id",
            "0x2a",
            "--taker-address",
            "0x3333333333333333333333333333333333333333",
            "--restrict-to-taker",
            "--signed-order-path",
            "order.json",
            "--chain-id",
            "1",
        ]);
        let args = Arguments::try_parse_from(argv).unwrap();
        assert_eq!(args.nft_kind, NftKind::Erc1155);
        assert_eq!(args.nft_amount, U256::from(3));
        assert_eq!(args.nft_token_id, U256::from(42));
        assert_eq!(
            args.taker_address,
            Some(address!("0x3333333333333333333333333333333333333333"))
        );
        assert!(args.restrict_to_taker);
        assert_eq!(args.signed_order_path, Some(PathBuf::from("order.json")));
        assert_eq!(args.chain_id, 1);
    }

    #[test]
    fn rejects_invalid_values() {
        let mut argv = required();
        argv.extend(["--nft-kind", "erc20"]);
        assert!(Arguments::try_parse_from(argv).is_err());

        let mut argv = required();
        argv[4] = "0x1234";
        assert!(Arguments::try_parse_from(argv).is_err());

        let mut argv = required();
        argv[8] = "not an address";
        assert!(Arguments::try_parse_from(argv).is_err());
    }

    #[test]
    fn display_hides_secrets() {
        let args = Arguments::try_parse_from(required()).unwrap();
        let display = args.to_string();
        assert!(!display.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"));
        assert!(!display.contains("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"));
        assert!(!display.contains("polygon.example.org"));
        assert!(display.contains("node_url: SECRET"));
        assert!(display.contains(
            "maker_signer: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        ));
    }
}
