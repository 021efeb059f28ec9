use {
    crate::{
        address::Address,
        error::ValidationErrors,
        hash::MetadataHash,
        primitives::{validate_asa_url, validate_encoded_length},
        validation::{Config, Context},
    },
    serde::Serialize,
    serde_json::Value,
};

pub const MAX_DECIMALS: u64 = 19;
pub const MAX_UNIT_NAME_LENGTH: usize = 8;
pub const MAX_ASSET_NAME_LENGTH: usize = 32;

/// Parameters of an Algorand Standard Asset as set on creation.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: Option<String>,
    pub asset_name: Option<String>,
    pub url: Option<String>,
    pub metadata_hash: Option<MetadataHash>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

impl AssetParams {
    pub fn validate(value: &Value, config: &Config) -> Result<Self, ValidationErrors> {
        let mut ctx = Context::new(config);
        let params = Self::validate_in(&mut ctx, value);
        ctx.finish(params)
    }

    pub(crate) fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let total = ctx.required(object, "total", |ctx, v| ctx.uint(v, 1, u64::MAX));
        let decimals = ctx.optional(object, "decimals", |ctx, v| {
            ctx.uint(v, 0, MAX_DECIMALS).and_then(|d| u32::try_from(d).ok())
        });
        let default_frozen = ctx.optional(object, "default_frozen", |ctx, v| ctx.boolean(v));
        let unit_name = ctx.optional(object, "unit_name", |ctx, v| {
            ctx.string_with(v, |s| validate_encoded_length(s, MAX_UNIT_NAME_LENGTH))
        });
        let asset_name = ctx.optional(object, "asset_name", |ctx, v| {
            ctx.string_with(v, |s| validate_encoded_length(s, MAX_ASSET_NAME_LENGTH))
        });
        let url = ctx.optional(object, "url", |ctx, v| ctx.string_with(v, validate_asa_url));
        let metadata_hash = ctx.optional(object, "metadata_hash", |ctx, v| ctx.parse(v));
        let manager = ctx.optional(object, "manager", |ctx, v| ctx.parse(v));
        let reserve = ctx.optional(object, "reserve", |ctx, v| ctx.parse(v));
        let freeze = ctx.optional(object, "freeze", |ctx, v| ctx.parse(v));
        let clawback = ctx.optional(object, "clawback", |ctx, v| ctx.parse(v));

        Some(Self {
            total: total?,
            decimals: decimals?.unwrap_or(0),
            default_frozen: default_frozen?.unwrap_or(false),
            unit_name: unit_name?,
            asset_name: asset_name?,
            url: url?,
            metadata_hash: metadata_hash?,
            manager: manager?,
            reserve: reserve?,
            freeze: freeze?,
            clawback: clawback?,
        })
    }
}
