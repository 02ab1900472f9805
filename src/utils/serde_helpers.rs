use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a 32-byte digest as a lowercase hex string
pub fn as_hex<S>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&hex::encode(bytes))
}

/// Deserialize a 64-character hex string into a 32-byte digest
pub fn from_hex<'de, D>(d: D) -> Result<[u8; 32], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    let bytes = hex::decode(&s).map_err(D::Error::custom)?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| D::Error::custom(format!("expected 32 bytes, got {}", bytes.len())))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper(
        #[serde(serialize_with = "super::as_hex", deserialize_with = "super::from_hex")] [u8; 32],
    );

    #[test]
    fn test_hex_digest_roundtrip() {
        let w = Wrapper([0xab; 32]);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
    }

    #[test]
    fn test_rejects_short_digest() {
        assert!(serde_json::from_str::<Wrapper>("\"abcd\"").is_err());
        assert!(serde_json::from_str::<Wrapper>("\"zz\"").is_err());
    }
}
