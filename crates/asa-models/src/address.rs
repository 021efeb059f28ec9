use {
    crate::{error::ValidationError, hash::sha512_256},
    multibase::Base,
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::{
        borrow::Cow,
        fmt::{self, Debug, Display, Formatter},
        str::FromStr,
    },
};

/// An Algorand account address.
///
/// The textual form is the unpadded base32 encoding of the 32 byte public key
/// followed by a 4 byte checksum, which is the tail of the SHA-512/256 digest
/// of the key. That makes it 58 characters long.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const LENGTH: usize = 58;

    fn checksum(&self) -> [u8; 4] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0; 4];
        checksum.copy_from_slice(&digest[28..]);
        checksum
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut bytes = [0u8; 36];
        bytes[..32].copy_from_slice(&self.0);
        bytes[32..].copy_from_slice(&self.checksum());
        f.write_str(&Base::Base32Upper.encode(bytes))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ValidationError::InvalidAddress {
            value: s.to_owned(),
            reason,
        };
        if s.len() != Self::LENGTH {
            return Err(invalid("must be 58 characters long"));
        }
        let bytes = Base::Base32Upper
            .decode(s)
            .map_err(|_| invalid("not valid base32"))?;
        if bytes.len() != 36 {
            return Err(invalid("must decode to 36 bytes"));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[..32]);
        let address = Self(key);
        if address.checksum() != bytes[32..] {
            return Err(invalid("checksum mismatch"));
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
