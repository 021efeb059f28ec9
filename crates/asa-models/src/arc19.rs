//! ARC-19 metadata: an ARC-3 document whose location is encoded in the
//! reserve address of the asset, so it can be replaced later.

use {
    crate::{
        arc3::Arc3Metadata,
        error::{ValidationError, ValidationErrors},
        hash::MetadataHash,
        validation::{Config, Context},
    },
    serde::Serialize,
    serde_json::Value,
};

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Arc19Metadata {
    pub arc3_metadata: Option<Arc3Metadata>,
}

impl Arc19Metadata {
    pub fn validate(value: &Value, config: &Config) -> Result<Self, ValidationErrors> {
        let mut ctx = Context::new(config);
        let metadata = Self::validate_in(&mut ctx, value);
        ctx.finish(metadata)
    }

    pub(crate) fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let arc3_metadata = ctx.optional(object, "arc3_metadata", |ctx, v| {
            let metadata = Arc3Metadata::validate_in(ctx, v)?;
            if metadata.extra_metadata.is_some() {
                ctx.at("extra_metadata", |ctx| {
                    ctx.report(ValidationError::Constraint(
                        "extra_metadata is not supported by ARC-19".to_owned(),
                    ))
                });
                return None;
            }
            Some(metadata)
        })?;
        Some(Self { arc3_metadata })
    }

    /// Hash of the nested ARC-3 document, if there is one.
    pub fn metadata_hash(&self) -> Option<MetadataHash> {
        self.arc3_metadata.as_ref().map(Arc3Metadata::metadata_hash)
    }
}
