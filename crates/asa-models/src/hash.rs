use {
    crate::{error::ValidationError, primitives::decode_base64},
    base64::{Engine, prelude::BASE64_STANDARD},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    sha2::{Digest, Sha256, Sha512_256},
    std::{
        borrow::Cow,
        fmt::{self, Debug, Display, Formatter},
        str::FromStr,
    },
};

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

pub fn sha512_256(bytes: &[u8]) -> [u8; 32] {
    Sha512_256::digest(bytes).into()
}

/// Digest committed to by an asset's `metadata_hash` parameter when the
/// metadata carries `extra_metadata`:
///
/// ```text
/// SHA-512/256("arc0003/am" || SHA-512/256("arc0003/amj" || json) || extra)
/// ```
pub fn arc3_extra_metadata_hash(json: &[u8], extra_metadata: &[u8]) -> [u8; 32] {
    let json_hash = Sha512_256::new()
        .chain_update(b"arc0003/amj")
        .chain_update(json)
        .finalize();
    Sha512_256::new()
        .chain_update(b"arc0003/am")
        .chain_update(json_hash)
        .chain_update(extra_metadata)
        .finalize()
        .into()
}

/// The 32 byte `metadata_hash` asset parameter. It is represented as padded
/// standard base64 in JSON.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct MetadataHash(pub [u8; 32]);

impl Display for MetadataHash {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&BASE64_STANDARD.encode(self.0))
    }
}

impl Debug for MetadataHash {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "0x{}", const_hex::encode(self.0))
    }
}

impl FromStr for MetadataHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_base64(s)?;
        let bytes: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ValidationError::InvalidLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl Serialize for MetadataHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MetadataHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        s.parse().map_err(|err| {
            de::Error::custom(format!("failed to decode {s:?} as metadata hash: {err}"))
        })
    }
}

impl PartialEq<[u8; 32]> for MetadataHash {
    fn eq(&self, other: &[u8; 32]) -> bool {
        self.0 == *other
    }
}
