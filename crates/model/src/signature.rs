use {
    crate::DomainSeparator,
    alloy::{
        primitives::{self, Address, B256, Bytes, U256, keccak256},
        signers::{SignerSync, local::PrivateKeySigner},
    },
    anyhow::{Context as _, Result, bail},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Debug, Formatter},
};

/// How the order hash was turned into the message that got signed. The
/// exchange reads the scheme from the last byte of the signature.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    /// The order hash is signed directly.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712
    #[default]
    Eip712,
    /// The order hash is signed according to EIP-191's personal_sign
    /// signature format.
    ///
    /// https://eips.ethereum.org/EIPS/eip-191
    EthSign,
}

impl SigningScheme {
    /// The exchange's `SignatureType` enum value for this scheme.
    pub fn signature_type(self) -> u8 {
        match self {
            Self::Eip712 => 2,
            Self::EthSign => 3,
        }
    }

    pub fn from_signature_type(signature_type: u8) -> Result<Self> {
        match signature_type {
            2 => Ok(Self::Eip712),
            3 => Ok(Self::EthSign),
            other => bail!("unsupported signature type {other}"),
        }
    }

    /// Returns the message used for signing and recovery for the specified
    /// hash.
    fn signing_message(self, hash: &B256) -> B256 {
        match self {
            Self::Eip712 => *hash,
            Self::EthSign => {
                let mut buffer = [0u8; 60];
                buffer[..28].copy_from_slice(b"\x19Ethereum Signed Message:\n32");
                buffer[28..].copy_from_slice(hash.as_slice());
                keccak256(buffer)
            }
        }
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl EcdsaSignature {
    pub fn sign(scheme: SigningScheme, hash: &B256, signer: &PrivateKeySigner) -> Result<Self> {
        let signature = signer.sign_hash_sync(&scheme.signing_message(hash))?;
        Ok(Self {
            r: B256::new(signature.r().to_be_bytes::<32>()),
            s: B256::new(signature.s().to_be_bytes::<32>()),
            v: 27 + u8::from(signature.v()),
        })
    }

    pub fn recover(&self, scheme: SigningScheme, hash: &B256) -> Result<Address> {
        let y_parity = match self.v {
            27 => false,
            28 => true,
            v => bail!("invalid signature recovery id {v}"),
        };
        let signature = primitives::Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            y_parity,
        );
        signature
            .recover_address_from_prehash(&scheme.signing_message(hash))
            .context("unrecoverable signature")
    }
}

/// Signature over an order hash in the exchange's wire format.
#[derive(Eq, PartialEq, Clone, Copy, Deserialize, Serialize, Hash)]
#[serde(into = "Bytes", try_from = "Bytes")]
pub enum Signature {
    Eip712(EcdsaSignature),
    EthSign(EcdsaSignature),
}

impl Default for Signature {
    fn default() -> Self {
        Self::Eip712(Default::default())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let scheme = format!("{:?}", self.scheme());
        let bytes = const_hex::encode_prefixed(self.to_bytes());
        f.debug_tuple(&scheme).field(&bytes).finish()
    }
}

impl Signature {
    pub fn sign(scheme: SigningScheme, hash: &B256, signer: &PrivateKeySigner) -> Result<Self> {
        let signature = EcdsaSignature::sign(scheme, hash, signer)?;
        Ok(Self::new(scheme, signature))
    }

    pub fn new(scheme: SigningScheme, signature: EcdsaSignature) -> Self {
        match scheme {
            SigningScheme::Eip712 => Self::Eip712(signature),
            SigningScheme::EthSign => Self::EthSign(signature),
        }
    }

    /// Recovers the address that signed `hash`.
    pub fn recover(&self, hash: &B256) -> Result<Address> {
        self.ecdsa().recover(self.scheme(), hash)
    }

    pub fn scheme(&self) -> SigningScheme {
        match self {
            Self::Eip712(_) => SigningScheme::Eip712,
            Self::EthSign(_) => SigningScheme::EthSign,
        }
    }

    pub fn ecdsa(&self) -> &EcdsaSignature {
        match self {
            Self::Eip712(signature) | Self::EthSign(signature) => signature,
        }
    }

    /// v + r + s + signature type
    pub fn to_bytes(&self) -> [u8; 66] {
        let signature = self.ecdsa();
        let mut bytes = [0u8; 66];
        bytes[0] = signature.v;
        bytes[1..33].copy_from_slice(signature.r.as_slice());
        bytes[33..65].copy_from_slice(signature.s.as_slice());
        bytes[65] = self.scheme().signature_type();
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 66] = bytes
            .try_into()
            .context("order signature must be 66 bytes long")?;
        let scheme = SigningScheme::from_signature_type(bytes[65])?;
        Ok(Self::new(
            scheme,
            EcdsaSignature {
                v: bytes[0],
                r: B256::from_slice(&bytes[1..33]),
                s: B256::from_slice(&bytes[33..65]),
            },
        ))
    }
}

impl From<Signature> for Bytes {
    fn from(signature: Signature) -> Self {
        Bytes::copy_from_slice(&signature.to_bytes())
    }
}

impl TryFrom<Bytes> for Signature {
    type Error = anyhow::Error;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        Self::from_bytes(&bytes)
    }
}

/// The hash a signer commits to for an EIP-712 struct in the given domain.
pub fn hashed_eip712_message(domain_separator: &DomainSeparator, struct_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain_separator.0.as_slice());
    message[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(message)
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex, serde_json::json};

    fn signer() -> PrivateKeySigner {
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse()
            .unwrap()
    }

    #[test]
    fn sign_and_recover() {
        let signer = signer();
        let hash = B256::new(hex!(
            "6ae45ad341a6efc65422f23f3ca4cd84014a7668c4b12811f33a9e507cf42fe3"
        ));
        for scheme in [SigningScheme::Eip712, SigningScheme::EthSign] {
            let signature = Signature::sign(scheme, &hash, &signer).unwrap();
            assert_eq!(signature.scheme(), scheme);
            assert!(matches!(signature.ecdsa().v, 27 | 28));
            assert_eq!(signature.recover(&hash).unwrap(), signer.address());
            assert_ne!(
                signature.recover(&B256::repeat_byte(1)).ok(),
                Some(signer.address())
            );
        }
    }

    #[test]
    fn schemes_sign_different_messages() {
        let hash = B256::repeat_byte(7);
        let eip712 = Signature::sign(SigningScheme::Eip712, &hash, &signer()).unwrap();
        let ethsign = Signature::sign(SigningScheme::EthSign, &hash, &signer()).unwrap();
        assert_ne!(eip712.ecdsa(), ethsign.ecdsa());

        // An EIP-712 signature reinterpreted as EthSign recovers someone else.
        let reinterpreted = Signature::new(SigningScheme::EthSign, *eip712.ecdsa());
        assert_ne!(
            reinterpreted.recover(&hash).ok(),
            Some(signer().address())
        );
    }

    #[test]
    fn recover_rejects_bad_recovery_id() {
        let signature = Signature::Eip712(EcdsaSignature {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 0,
        });
        assert!(signature.recover(&B256::ZERO).is_err());
    }

    #[test]
    fn wire_format() {
        let signature = Signature::EthSign(EcdsaSignature {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 28,
        });
        let bytes = signature.to_bytes();
        assert_eq!(bytes[0], 28);
        assert_eq!(bytes[1..33], [1; 32]);
        assert_eq!(bytes[33..65], [2; 32]);
        assert_eq!(bytes[65], 3);
        assert_eq!(Signature::from_bytes(&bytes).unwrap(), signature);

        assert_eq!(Signature::default().to_bytes()[65], 2);
    }

    #[test]
    fn from_bytes_errors() {
        assert!(Signature::from_bytes(&[0u8; 65]).is_err());
        assert!(Signature::from_bytes(&[0u8; 67]).is_err());
        let mut bytes = [0u8; 66];
        // Wallet signatures are not supported.
        bytes[65] = 4;
        assert!(Signature::from_bytes(&bytes).is_err());
    }

    #[test]
    fn json_is_prefixed_hex() {
        let signature = Signature::Eip712(EcdsaSignature {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 27,
        });
        let value = json!(
            "0x1b\
             0101010101010101010101010101010101010101010101010101010101010101\
             0202020202020202020202020202020202020202020202020202020202020202\
             02"
        );
        assert_eq!(serde_json::to_value(signature).unwrap(), value);
        assert_eq!(
            serde_json::from_value::<Signature>(value).unwrap(),
            signature
        );
        assert!(serde_json::from_value::<Signature>(json!("0x0102")).is_err());
    }

    #[test]
    fn eip712_message_hash() {
        let domain = DomainSeparator(B256::new(hex!(
            "17068c8fc502c4938835d37c402e7c17f51ec6895246726893d5fe3198085a67"
        )));
        let struct_hash = B256::new(hex!(
            "386cc807e930e06fbd5b583df3284a4aea5e9f1d5434c1d8c4302c26b88fcfd5"
        ));
        assert_eq!(
            hashed_eip712_message(&domain, &struct_hash),
            B256::new(hex!(
                "6ae45ad341a6efc65422f23f3ca4cd84014a7668c4b12811f33a9e507cf42fe3"
            ))
        );
    }
}
