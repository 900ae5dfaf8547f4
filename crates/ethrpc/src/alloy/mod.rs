pub mod errors;
mod instrumentation;

use {
    crate::AlloyProvider,
    alloy::{
        network::EthereumWallet,
        providers::{Provider, ProviderBuilder},
        rpc::client::{ClientBuilder, RpcClient},
        signers::local::PrivateKeySigner,
    },
    instrumentation::{InstrumentationLayer, LabelingLayer},
    tower::Layer,
    url::Url,
};

/// Creates the RPC client all providers share. Requests are traced with
/// the label of the provider that issued them.
pub fn client(url: Url) -> RpcClient {
    ClientBuilder::default()
        .layer(InstrumentationLayer)
        .http(url)
}

/// Wraps the transport of `client` so that every request is tagged with
/// `label`. The transport itself (and its connection pool) stays shared.
pub fn labeled(client: &RpcClient, label: &str) -> RpcClient {
    let transport = LabelingLayer {
        label: label.to_string(),
    }
    .layer(client.transport().clone());
    RpcClient::new(transport, client.is_local())
}

/// Creates a provider on top of the shared `client` that signs and sends
/// transactions as `signer`.
pub fn provider_with_signer(
    client: &RpcClient,
    label: &str,
    signer: PrivateKeySigner,
) -> AlloyProvider {
    tracing::debug!(label, address = %signer.address(), "creating provider");
    ProviderBuilder::new()
        .wallet(EthereumWallet::new(signer))
        .connect_client(labeled(client, label))
        .erased()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_clients_share_locality() {
        let local = client("http://localhost:8545".parse().unwrap());
        assert!(local.is_local());
        assert!(labeled(&local, "maker").is_local());

        let remote = client("https://polygon-rpc.com".parse().unwrap());
        assert!(!labeled(&remote, "taker").is_local());
    }
}
