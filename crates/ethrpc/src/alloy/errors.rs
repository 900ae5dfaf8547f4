use alloy::{contract::Error as ContractError, transports::RpcError};

/// Turns contract reverts into `None` and keeps node errors. Useful for view
/// calls that revert for inputs they have no answer for, like
/// `getApproved` of a token that was never minted.
pub fn ignore_revert<T>(result: Result<T, ContractError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.is_node_error() => Err(err.into()),
        Err(err) => {
            tracing::debug!(?err, "ignoring contract revert");
            Ok(None)
        }
    }
}

pub trait ContractErrorExt {
    /// Whether the contract rejected the call. This is every error except
    /// transport errors that carry no revert data.
    fn is_revert(&self) -> bool;

    /// Whether the node or the connection to it failed.
    fn is_node_error(&self) -> bool;
}

impl ContractErrorExt for ContractError {
    fn is_revert(&self) -> bool {
        !self.is_node_error()
    }

    fn is_node_error(&self) -> bool {
        match self {
            // Reverts surface as error responses with revert data. The data
            // may be empty (e.g. a call to a missing function) which alloy's
            // decoding helpers report as no revert, so check for it directly.
            ContractError::TransportError(RpcError::ErrorResp(err)) => {
                err.as_revert_data().is_none()
            }
            ContractError::TransportError(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::Bytes,
            rpc::json_rpc::ErrorPayload,
            transports::{TransportError, TransportErrorKind},
        },
    };

    fn node_error() -> ContractError {
        ContractError::TransportError(TransportError::ErrorResp(ErrorPayload::internal_error()))
    }

    fn revert() -> ContractError {
        ContractError::TransportError(TransportError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: Some(
                serde_json::value::to_raw_value(&Bytes::from_static(&[0x08, 0xc3, 0x79, 0xa0]))
                    .unwrap(),
            ),
        }))
    }

    #[test]
    fn classifies_errors() {
        assert!(node_error().is_node_error());
        assert!(!node_error().is_revert());
        assert!(revert().is_revert());
        assert!(ContractError::NotADeploymentTransaction.is_revert());
        assert!(
            ContractError::TransportError(TransportErrorKind::backend_gone()).is_node_error()
        );
    }

    #[test]
    fn ignores_reverts_only() {
        assert_eq!(ignore_revert(Ok::<_, ContractError>(1)).unwrap(), Some(1));
        assert_eq!(ignore_revert::<u8>(Err(revert())).unwrap(), None);
        assert!(ignore_revert::<u8>(Err(node_error())).is_err());
    }
}
