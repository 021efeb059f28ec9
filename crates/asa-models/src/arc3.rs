//! ARC-3 NFT metadata.

use {
    crate::{
        error::{ValidationError, ValidationErrors},
        hash::{MetadataHash, arc3_extra_metadata_hash, sha256},
        primitives::{
            decode_base64,
            validate_arc3_sri,
            validate_arc3_url,
            validate_contains,
            validate_hex_color,
            validate_locale,
            validate_mime_essence,
            validate_mime_type,
        },
        validation::{Config, Context, PathSegment},
    },
    base64::{Engine, prelude::BASE64_STANDARD},
    indexmap::IndexMap,
    serde::{Serialize, Serializer},
    serde_json::{Map, Value, ser::PrettyFormatter},
};

pub const MAX_DECIMALS: u64 = 19;

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Arc3Metadata {
    pub name: Option<String>,
    pub decimals: Option<u32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_integrity: Option<String>,
    pub image_mimetype: Option<String>,
    pub background_color: Option<String>,
    pub external_url: Option<String>,
    pub external_url_integrity: Option<String>,
    pub external_url_mimetype: Option<String>,
    pub animation_url: Option<String>,
    pub animation_url_integrity: Option<String>,
    pub animation_url_mimetype: Option<String>,
    pub properties: Option<Arc3Properties>,
    pub extra_metadata: Option<ExtraMetadata>,
    pub localization: Option<Arc3Localization>,
}

/// Free-form `properties` of a metadata document.
///
/// `traits` follows ARC-16 and is always serialized first, the remaining
/// keys keep their input order.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Arc3Properties {
    pub traits: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Opaque bytes mixed into the metadata hash. Serialized as base64.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtraMetadata(pub Vec<u8>);

impl Serialize for ExtraMetadata {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64_STANDARD.encode(&self.0))
    }
}

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Arc3Localization {
    /// URI template with a `{locale}` placeholder.
    pub uri: String,
    pub default: String,
    pub locales: Vec<String>,
    pub integrity: Option<IndexMap<String, String>>,
}

impl Arc3Metadata {
    pub fn validate(value: &Value, config: &Config) -> Result<Self, ValidationErrors> {
        let mut ctx = Context::new(config);
        let metadata = Self::validate_in(&mut ctx, value);
        ctx.finish(metadata)
    }

    pub(crate) fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let arc = ctx.optional(object, "arc", |ctx, v| {
            let arc = ctx.string(v)?;
            let supported = (arc == "arc3")
                .then_some(())
                .ok_or(ValidationError::UnsupportedArc(arc));
            ctx.check(supported)
        });

        let name = ctx.optional(object, "name", |ctx, v| ctx.string(v));
        let decimals = ctx.optional(object, "decimals", |ctx, v| {
            ctx.uint(v, 0, MAX_DECIMALS).and_then(|d| u32::try_from(d).ok())
        });
        let description = ctx.optional(object, "description", |ctx, v| ctx.string(v));
        let image = optional_url(ctx, object, "image");
        let image_integrity = optional_integrity(ctx, object, "image_integrity");
        let image_mimetype = ctx.optional(object, "image_mimetype", |ctx, v| {
            ctx.string_with(v, |s| validate_mime_type(s, Some("image")))
        });
        let background_color = ctx.optional(object, "background_color", |ctx, v| {
            ctx.string_with(v, validate_hex_color)
        });
        let external_url = optional_url(ctx, object, "external_url");
        let external_url_integrity = optional_integrity(ctx, object, "external_url_integrity");
        let external_url_mimetype = ctx.optional(object, "external_url_mimetype", |ctx, v| {
            ctx.string_with(v, |s| validate_mime_essence(s, "text/html"))
        });
        let animation_url = optional_url(ctx, object, "animation_url");
        let animation_url_integrity = optional_integrity(ctx, object, "animation_url_integrity");
        let animation_url_mimetype = ctx.optional(object, "animation_url_mimetype", |ctx, v| {
            ctx.string_with(v, |s| validate_mime_type(s, None))
        });
        let properties = ctx.optional(object, "properties", Arc3Properties::validate_in);
        let extra_metadata = ctx.optional(object, "extra_metadata", |ctx, v| {
            let s = ctx.string(v)?;
            ctx.check(decode_base64(&s)).map(ExtraMetadata)
        });
        let localization = ctx.optional(object, "localization", Arc3Localization::validate_in);

        arc?;
        Some(Self {
            name: name?,
            decimals: decimals?,
            description: description?,
            image: image?,
            image_integrity: image_integrity?,
            image_mimetype: image_mimetype?,
            background_color: background_color?,
            external_url: external_url?,
            external_url_integrity: external_url_integrity?,
            external_url_mimetype: external_url_mimetype?,
            animation_url: animation_url?,
            animation_url_integrity: animation_url_integrity?,
            animation_url_mimetype: animation_url_mimetype?,
            properties: properties?,
            extra_metadata: extra_metadata?,
            localization: localization?,
        })
    }

    /// The canonical JSON encoding: 4 space indentation, fields in
    /// declaration order, absent fields omitted and non-ASCII characters
    /// written as UTF-8.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        // Only fails for non string map keys which these types cannot have.
        self.serialize(&mut serializer).unwrap();
        bytes
    }

    /// The value an asset's `metadata_hash` parameter has to commit to.
    pub fn metadata_hash(&self) -> MetadataHash {
        let json = self.to_json_bytes();
        MetadataHash(match &self.extra_metadata {
            Some(extra) => arc3_extra_metadata_hash(&json, &extra.0),
            None => sha256(&json),
        })
    }
}

fn optional_url(
    ctx: &mut Context,
    object: &Map<String, Value>,
    key: &str,
) -> Option<Option<String>> {
    ctx.optional(object, key, |ctx, v| ctx.string_with(v, validate_arc3_url))
}

fn optional_integrity(
    ctx: &mut Context,
    object: &Map<String, Value>,
    key: &str,
) -> Option<Option<String>> {
    ctx.optional(object, key, |ctx, v| ctx.string_with(v, validate_arc3_sri))
}

impl Arc3Properties {
    fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let mut traits = None;
        let mut other = Map::new();
        let mut valid = true;
        for (key, value) in object {
            if key == "traits" {
                traits = ctx.at("traits", |ctx| validate_traits(ctx, value));
                valid &= traits.is_some();
            } else {
                valid &= ctx.at(key.as_str(), |ctx| validate_property(ctx, value, 1));
                other.insert(key.clone(), value.clone());
            }
        }
        valid.then_some(Self { traits, other })
    }
}

fn validate_traits(ctx: &mut Context, value: &Value) -> Option<Map<String, Value>> {
    let object = ctx.object(value)?;
    let mut valid = true;
    for (key, value) in object {
        let integer = value.as_number().is_some_and(|n| n.is_i64() || n.is_u64() || !n.is_f64());
        if !(value.is_string() || integer) {
            ctx.at(key.as_str(), |ctx| ctx.report(ValidationError::InvalidTrait));
            valid = false;
        }
    }
    valid.then(|| object.clone())
}

/// Properties may hold any JSON value except `null`. The `properties` object
/// itself is the first nesting level.
fn validate_property(ctx: &mut Context, value: &Value, depth: usize) -> bool {
    let max = ctx.config().max_properties_depth;
    let children: Vec<(PathSegment, &Value)> = match value {
        Value::Null => {
            ctx.report(ValidationError::NullProperty);
            return false;
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => return true,
        _ if depth >= max => {
            ctx.report(ValidationError::TooDeep { max });
            return false;
        }
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.into(), v)).collect(),
        Value::Object(object) => object.iter().map(|(k, v)| (k.as_str().into(), v)).collect(),
    };
    let mut valid = true;
    for (segment, child) in children {
        valid &= ctx.at(segment, |ctx| validate_property(ctx, child, depth + 1));
    }
    valid
}

impl Arc3Localization {
    fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let uri = ctx.required(object, "uri", |ctx, v| {
            ctx.string_with(v, |s| {
                validate_arc3_url(s).and_then(|s| validate_contains(s, "{locale}"))
            })
        });
        let default = ctx.required(object, "default", |ctx, v| {
            ctx.string_with(v, validate_locale)
        });
        let locales = ctx.required(object, "locales", |ctx, v| {
            ctx.list(v, |ctx, v| ctx.string_with(v, validate_locale))
        });
        let mut integrity_valid = true;
        let integrity = ctx.optional(object, "integrity", |ctx, v| {
            let object = ctx.object(v)?;
            let mut integrity = IndexMap::new();
            for (locale, digest) in object {
                let digest = ctx.at(locale.as_str(), |ctx| {
                    ctx.check(validate_locale(locale))?;
                    ctx.string_with(digest, validate_arc3_sri)
                });
                match digest {
                    Some(digest) => {
                        integrity.insert(locale.clone(), digest);
                    }
                    None => integrity_valid = false,
                }
            }
            Some(integrity)
        });

        // Consistency is checked on whatever parsed, independent of errors in
        // sibling fields.
        let mut consistent = true;
        if let (Some(default), Some(locales)) = (&default, &locales) {
            if !locales.contains(default) {
                ctx.at("default", |ctx| {
                    ctx.report(ValidationError::DefaultLocaleNotListed(default.clone()))
                });
                consistent = false;
            }
            let parsed = integrity.iter().flatten().flat_map(|integrity| integrity.keys());
            for locale in parsed {
                if locale == default || !locales.contains(locale) {
                    ctx.at("integrity", |ctx| {
                        ctx.at(locale.as_str(), |ctx| {
                            ctx.report(ValidationError::UnexpectedIntegrityLocale(locale.clone()))
                        })
                    });
                    consistent = false;
                }
            }
        }

        let (Some(uri), Some(default), Some(locales), Some(integrity)) =
            (uri, default, locales, integrity)
        else {
            return None;
        };
        (consistent && integrity_valid).then_some(Self {
            uri,
            default,
            locales,
            integrity,
        })
    }
}
