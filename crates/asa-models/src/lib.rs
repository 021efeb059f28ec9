//! Validation of Algorand Standard Asset parameters and of ARC-3 / ARC-19
//! metadata documents.

pub mod address;
pub mod arc19;
pub mod arc3;
pub mod asa;
pub mod asset_params;
pub mod cid;
pub mod error;
pub mod hash;
pub mod primitives;
pub mod validation;

pub use {
    address::Address,
    arc19::Arc19Metadata,
    arc3::{Arc3Localization, Arc3Metadata, Arc3Properties, ExtraMetadata},
    asa::{Arc, Asa, AsaType, Metadata},
    asset_params::AssetParams,
    cid::{Cid, cid_to_address, raw_sha256_cid},
    error::{FieldError, ValidationError, ValidationErrors},
    hash::MetadataHash,
    validation::{Config, ParseMode, Validator},
};
