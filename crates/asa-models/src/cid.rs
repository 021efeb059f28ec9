//! IPFS content identifiers.
//!
//! Only what is needed to tie IPFS content to assets is supported: computing
//! the identifier of raw bytes offline and converting between identifiers and
//! the reserve address of ARC-19 assets.

use {
    crate::{address::Address, error::ValidationError, hash::sha256},
    multibase::Base,
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

/// Multicodec of raw binary content.
pub const RAW: u64 = 0x55;
/// Multicodec of UnixFS (`dag-pb`) content.
pub const DAG_PB: u64 = 0x70;
/// Multihash code of SHA2-256.
pub const SHA2_256: u64 = 0x12;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cid {
    pub version: u64,
    pub codec: u64,
    pub hash_code: u64,
    pub digest: Vec<u8>,
}

impl Cid {
    /// The CIDv1 with `raw` codec of `bytes`, i.e. what a pinning service
    /// returns for content uploaded without chunking.
    pub fn raw_sha256(bytes: &[u8]) -> Self {
        Self {
            version: 1,
            codec: RAW,
            hash_code: SHA2_256,
            digest: sha256(bytes).to_vec(),
        }
    }

    /// Rebuilds the CID an ARC-19 asset encodes in its reserve address.
    /// Version 0 always uses `dag-pb`.
    pub fn from_address(address: &Address, version: u64, codec: u64) -> Self {
        Self {
            version,
            codec: if version == 0 { DAG_PB } else { codec },
            hash_code: SHA2_256,
            digest: address.0.to_vec(),
        }
    }

    fn multihash(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.digest.len() + 4);
        write_varint(&mut bytes, self.hash_code);
        write_varint(&mut bytes, self.digest.len() as u64);
        bytes.extend_from_slice(&self.digest);
        bytes
    }

    /// The reserve address of an ARC-19 asset pointing at this CID.
    pub fn to_address(&self) -> Result<Address, ValidationError> {
        if self.hash_code != SHA2_256 {
            return Err(self.invalid("only sha2-256 CIDs can be stored in an address"));
        }
        let key = self
            .digest
            .as_slice()
            .try_into()
            .map_err(|_| self.invalid("digest must be 32 bytes"))?;
        Ok(Address(key))
    }

    fn invalid(&self, reason: &str) -> ValidationError {
        ValidationError::InvalidCid {
            value: self.to_string(),
            reason: reason.to_owned(),
        }
    }
}

impl Display for Cid {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.version == 0 {
            return f.write_str(&Base::Base58Btc.encode(self.multihash()));
        }
        let mut bytes = Vec::new();
        write_varint(&mut bytes, self.version);
        write_varint(&mut bytes, self.codec);
        bytes.extend(self.multihash());
        f.write_str(&multibase::encode(Base::Base32Lower, bytes))
    }
}

impl FromStr for Cid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidCid {
            value: s.to_owned(),
            reason: reason.to_owned(),
        };
        // CIDv0 is a bare base58btc multihash.
        if s.len() == 46 && s.starts_with("Qm") {
            let bytes = Base::Base58Btc
                .decode(s)
                .map_err(|_| invalid("not valid base58"))?;
            let (hash_code, digest) =
                read_multihash(&bytes).ok_or_else(|| invalid("bad multihash"))?;
            return Ok(Self {
                version: 0,
                codec: DAG_PB,
                hash_code,
                digest,
            });
        }
        let (_, bytes) = multibase::decode(s).map_err(|_| invalid("not valid multibase"))?;
        let mut rest = bytes.as_slice();
        let version = read_varint(&mut rest).ok_or_else(|| invalid("bad version"))?;
        if version != 1 {
            return Err(invalid("unsupported version"));
        }
        let codec = read_varint(&mut rest).ok_or_else(|| invalid("bad codec"))?;
        let (hash_code, digest) = read_multihash(rest).ok_or_else(|| invalid("bad multihash"))?;
        Ok(Self {
            version,
            codec,
            hash_code,
            digest,
        })
    }
}

/// Content identifier of `bytes` as a string, see [`Cid::raw_sha256`].
pub fn raw_sha256_cid(bytes: &[u8]) -> String {
    Cid::raw_sha256(bytes).to_string()
}

/// Parses a CID and converts it into the ARC-19 reserve address.
pub fn cid_to_address(cid: &str) -> Result<Address, ValidationError> {
    cid.parse::<Cid>()?.to_address()
}

fn read_multihash(mut bytes: &[u8]) -> Option<(u64, Vec<u8>)> {
    let code = read_varint(&mut bytes)?;
    let length = usize::try_from(read_varint(&mut bytes)?).ok()?;
    (bytes.len() == length).then(|| (code, bytes.to_vec()))
}

/// Unsigned LEB128 as used by multiformats, at most 9 bytes.
fn read_varint(bytes: &mut &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for (i, byte) in bytes.iter().enumerate().take(9) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            *bytes = &bytes[i + 1..];
            return Some(value);
        }
    }
    None
}

fn write_varint(bytes: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        bytes.push((value as u8) | 0x80);
        value >>= 7;
    }
    bytes.push(value as u8);
}
