use {
    alloy::primitives::U256,
    serde::{Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::fmt,
};

/// Serialize [`U256`] as a decimal string and deserialize it from either a
/// decimal or a 0x prefixed hex string.
///
/// Order amounts, fees, salts and expirations are exchanged in this form.
#[derive(Debug)]
pub struct HexOrDecimalU256;

impl<'de> DeserializeAs<'de, U256> for HexOrDecimalU256 {
    fn deserialize_as<D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a u256 encoded either as 0x hex prefixed or decimal encoded string"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let trimmed = s.trim();
                if let Some(hex) = trimmed.strip_prefix("0x") {
                    U256::from_str_radix(hex, 16).map_err(|err| {
                        E::custom(format!("failed to decode {s:?} as hex u256: {err}"))
                    })
                } else {
                    U256::from_str_radix(trimmed, 10).map_err(|err| {
                        E::custom(format!("failed to decode {s:?} as decimal u256: {err}"))
                    })
                }
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl SerializeAs<U256> for HexOrDecimalU256 {
    fn serialize_as<S>(source: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde::{Deserialize, Serialize},
        serde_with::serde_as,
    };

    #[serde_as]
    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Wrapper(#[serde_as(as = "HexOrDecimalU256")] U256);

    #[test]
    fn test_deserialization_from_json() {
        let result: Wrapper = serde_json::from_str(r#""0x10""#).expect("Valid U256");
        assert_eq!(result, Wrapper(U256::from(16)));

        let result: Wrapper = serde_json::from_str(r#""10""#).expect("Valid U256");
        assert_eq!(result, Wrapper(U256::from(10)));

        assert!(serde_json::from_str::<Wrapper>(r#""10e""#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#""0xx1""#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#""0AFF""#).is_err());
        assert!(serde_json::from_str::<Wrapper>("10").is_err());
    }

    #[test]
    fn test_serialization() {
        let serialized = serde_json::to_string(&Wrapper(U256::from(1_000_000))).unwrap();
        assert_eq!(serialized, "\"1000000\"");

        let serialized = serde_json::to_string(&Wrapper(U256::MAX)).unwrap();
        assert_eq!(
            serialized,
            "\"115792089237316195423570985008687907853269984665640564039457584007913129639935\""
        );
    }
}
