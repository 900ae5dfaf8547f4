#[tokio::main]
async fn main() {
    // Values from a `.env` file in the working directory act as environment
    // variables. The file is optional.
    let dotenv = dotenvy::dotenv();
    let args = match nft_swap::parse_arguments(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            observe::tracing::initialize(
                &observe::Config::default().with_stderr_threshold(tracing::Level::ERROR),
            );
            fail(err)
        }
    };
    observe::tracing::initialize(&args.logging.to_config());
    if let Err(err) = dotenv {
        tracing::debug!(?err, "no .env file loaded");
    }
    tracing::info!("running nft-swap with validated arguments:\n{}", args);

    if let Err(err) = nft_swap::run(args).await {
        fail(err)
    }
}

fn fail(err: nft_swap::swap::Error) -> ! {
    tracing::error!(?err, "swap failed");
    std::process::exit(1)
}
