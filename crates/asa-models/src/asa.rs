//! An asset together with its metadata and the checks that tie both
//! together.

use {
    crate::{
        arc3::Arc3Metadata,
        arc19::Arc19Metadata,
        asset_params::{AssetParams, MAX_ASSET_NAME_LENGTH},
        error::{ValidationError, ValidationErrors},
        hash::MetadataHash,
        primitives::validate_arc19_template,
        validation::{Config, Context},
    },
    serde::{Serialize, Serializer, ser::SerializeStruct},
    serde_json::Value,
    strum::VariantNames,
};

/// Metadata standards an asset can follow.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Arc {
    Arc3,
    Arc19,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AsaType {
    Fungible,
    /// A single indivisible unit.
    NonFungiblePure,
    /// A single unit split into `10^decimals` parts.
    NonFungibleFractional,
}

/// Metadata of an asset. On input the variant is chosen by the `arc` tag,
/// which is not part of the output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metadata {
    Arc3(Arc3Metadata),
    Arc19(Arc19Metadata),
}

impl Metadata {
    pub fn arc(&self) -> Arc {
        match self {
            Self::Arc3(_) => Arc::Arc3,
            Self::Arc19(_) => Arc::Arc19,
        }
    }

    pub fn metadata_hash(&self) -> Option<MetadataHash> {
        match self {
            Self::Arc3(metadata) => Some(metadata.metadata_hash()),
            Self::Arc19(metadata) => metadata.metadata_hash(),
        }
    }

    fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let arc = ctx.at("arc", |ctx| match object.get("arc") {
            None | Some(Value::Null) => {
                ctx.report(ValidationError::MissingDiscriminator {
                    expected: Arc::VARIANTS.join(", "),
                });
                None
            }
            Some(value) => {
                let arc = ctx.string(value)?;
                let parsed = arc
                    .parse::<Arc>()
                    .map_err(|_| ValidationError::UnsupportedArc(arc));
                ctx.check(parsed)
            }
        })?;
        match arc {
            Arc::Arc3 => Arc3Metadata::validate_in(ctx, value).map(Self::Arc3),
            Arc::Arc19 => Arc19Metadata::validate_in(ctx, value).map(Self::Arc19),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Asa {
    pub asa_type: Option<AsaType>,
    pub asset_params: AssetParams,
    pub metadata: Option<Metadata>,
}

impl Asa {
    pub fn validate(value: &Value, config: &Config) -> Result<Self, ValidationErrors> {
        let mut ctx = Context::new(config);
        let asa = Self::validate_in(&mut ctx, value);
        ctx.finish(asa)
    }

    /// Validates an asset assembled in code the same way a document would
    /// be validated.
    pub fn new(
        asa_type: Option<AsaType>,
        asset_params: AssetParams,
        metadata: Option<Metadata>,
        config: &Config,
    ) -> Result<Self, ValidationErrors> {
        let asa = Self {
            asa_type,
            asset_params,
            metadata,
        };
        Self::validate(&asa.to_document()?, config)
    }

    /// The input document of this asset, which unlike the serialized form
    /// carries the `arc` tag of the metadata.
    pub fn to_document(&self) -> Result<Value, ValidationErrors> {
        let invalid = |err: serde_json::Error| {
            ValidationErrors::root(ValidationError::InvalidJson(err.to_string()))
        };
        let mut document = serde_json::json!({
            "asset_params": serde_json::to_value(&self.asset_params).map_err(invalid)?,
        });
        if let Some(asa_type) = self.asa_type {
            document["asa_type"] = Value::String(asa_type.to_string());
        }
        if let Some(metadata) = &self.metadata {
            let mut value = serde_json::to_value(metadata).map_err(invalid)?;
            if let Value::Object(object) = &mut value {
                object.insert("arc".to_owned(), Value::String(metadata.arc().to_string()));
            }
            document["metadata"] = value;
        }
        Ok(document)
    }

    pub(crate) fn validate_in(ctx: &mut Context, value: &Value) -> Option<Self> {
        let object = ctx.object(value)?;
        let asa_type = ctx.optional(object, "asa_type", |ctx, v| ctx.choice(v));
        let asset_params = ctx.required(object, "asset_params", AssetParams::validate_in);
        let metadata = ctx.optional(object, "metadata", Metadata::validate_in);

        let asa = Self {
            asa_type: asa_type?,
            asset_params: asset_params?,
            metadata: metadata?,
        };
        let consistent = [
            asa.check_asa_type(ctx),
            asa.check_metadata_hash(ctx),
            asa.check_arc_constraints(ctx),
        ];
        consistent.iter().all(|ok| *ok).then_some(asa)
    }

    /// The type implied by the supply and the number of decimals.
    pub fn derived_asa_type(&self) -> AsaType {
        let AssetParams {
            total, decimals, ..
        } = self.asset_params;
        if total == 1 && decimals == 0 {
            AsaType::NonFungiblePure
        } else if 10u64.checked_pow(decimals) == Some(total) {
            AsaType::NonFungibleFractional
        } else {
            AsaType::Fungible
        }
    }

    /// Hash of the canonical metadata encoding, see
    /// [`Arc3Metadata::metadata_hash`].
    pub fn metadata_hash(&self) -> Option<MetadataHash> {
        self.metadata.as_ref().and_then(Metadata::metadata_hash)
    }

    fn check_asa_type(&self, ctx: &mut Context) -> bool {
        let Some(asa_type) = self.asa_type else {
            return true;
        };
        if asa_type == self.derived_asa_type() {
            return true;
        }
        let message = match asa_type {
            AsaType::NonFungiblePure => {
                "total number of units must be 1 and the number of digits after the decimal \
                 point must be 0 for a pure NFT"
            }
            AsaType::NonFungibleFractional => {
                "number of digits after the decimal point must be equal to the logarithm in base \
                 10 of the total number of units, i.e. the total supply must be exactly 1"
            }
            AsaType::Fungible => "total supply must be greater than 1 for a fungible asset",
        };
        ctx.at("asa_type", |ctx| {
            ctx.report(ValidationError::Constraint(message.to_owned()))
        });
        false
    }

    fn check_metadata_hash(&self, ctx: &mut Context) -> bool {
        let (Some(declared), Some(computed)) =
            (self.asset_params.metadata_hash, self.metadata_hash())
        else {
            return true;
        };
        if declared == computed {
            return true;
        }
        report_at(
            ctx,
            &["asset_params", "metadata_hash"],
            ValidationError::MetadataHashMismatch {
                declared: declared.to_string(),
                computed: computed.to_string(),
            },
        );
        false
    }

    fn check_arc_constraints(&self, ctx: &mut Context) -> bool {
        match &self.metadata {
            None => true,
            Some(Metadata::Arc3(metadata)) => self.check_arc3_constraints(ctx, metadata),
            Some(Metadata::Arc19(_)) => self.check_arc19_constraints(ctx),
        }
    }

    /// Errors for what ARC-3 forbids, warnings for what it allows but does
    /// not recommend.
    fn check_arc3_constraints(&self, ctx: &mut Context, metadata: &Arc3Metadata) -> bool {
        let params = &self.asset_params;
        let mut valid = true;

        if let (Some(unit_name), Some(name)) = (&params.unit_name, &metadata.name)
            && !name.to_lowercase().contains(&unit_name.to_lowercase())
        {
            tracing::warn!(
                %unit_name,
                %name,
                "asset unit name should be related to the name in the ARC-3 metadata"
            );
        }

        if let Some(decimals) = metadata.decimals
            && decimals != params.decimals
        {
            report_at(
                ctx,
                &["metadata", "decimals"],
                ValidationError::DecimalsMismatch {
                    asset: params.decimals,
                    metadata: decimals,
                },
            );
            valid = false;
        }

        let Some(asset_name) = &params.asset_name else {
            report_at(
                ctx,
                &["asset_params", "asset_name"],
                ValidationError::Constraint("asset name must be set for ARC-3 assets".to_owned()),
            );
            return false;
        };
        if asset_name == "arc3" {
            tracing::warn!("asset name 'arc3' is not recommended for ARC-3 assets");
            return valid;
        }
        if asset_name.ends_with("@arc3") {
            tracing::warn!(%asset_name, "asset name format <name>@arc3 is not recommended");
            return valid;
        }

        match &metadata.name {
            None => {
                report_at(
                    ctx,
                    &["metadata", "name"],
                    ValidationError::Constraint(format!(
                        "metadata name must be set if the asset name is '{asset_name}'"
                    )),
                );
                valid = false;
            }
            Some(name) if name == asset_name => (),
            // A metadata name that fits into the asset name has to be used
            // verbatim.
            Some(name) if name.len() <= MAX_ASSET_NAME_LENGTH => {
                report_at(
                    ctx,
                    &["asset_params", "asset_name"],
                    ValidationError::Constraint(format!(
                        "asset name '{asset_name}' must match the metadata name '{name}'"
                    )),
                );
                valid = false;
            }
            Some(name) if !name.starts_with(asset_name.as_str()) => {
                report_at(
                    ctx,
                    &["asset_params", "asset_name"],
                    ValidationError::Constraint(format!(
                        "asset name must be a shortened version of the metadata name '{name}'"
                    )),
                );
                valid = false;
            }
            Some(_) => (),
        }

        let url_error = match &params.url {
            None => Some("asset URL must be set for ARC-3 assets".to_owned()),
            Some(url) if !url.ends_with("#arc3") => Some(format!(
                "asset URL must end with '#arc3' if the asset name is '{asset_name}'"
            )),
            Some(_) => None,
        };
        if let Some(message) = url_error {
            report_at(
                ctx,
                &["asset_params", "url"],
                ValidationError::Constraint(message),
            );
            valid = false;
        }
        valid
    }

    /// ARC-19 assets point at their metadata through a template URL that is
    /// resolved with the CID stored in the reserve address.
    fn check_arc19_constraints(&self, ctx: &mut Context) -> bool {
        let params = &self.asset_params;
        let mut valid = true;
        let url = match &params.url {
            None => Err(ValidationError::Constraint(
                "asset URL must be set for ARC-19 assets".to_owned(),
            )),
            Some(url) => validate_arc19_template(url).map(|_| ()),
        };
        if let Err(err) = url {
            report_at(ctx, &["asset_params", "url"], err);
            valid = false;
        }
        if params.reserve.is_none() {
            report_at(
                ctx,
                &["asset_params", "reserve"],
                ValidationError::Constraint(
                    "reserve address must be set for ARC-19 assets, it encodes the metadata CID"
                        .to_owned(),
                ),
            );
            valid = false;
        }
        valid
    }
}

fn report_at(ctx: &mut Context, path: &[&str], error: ValidationError) {
    match path {
        [] => ctx.report(error),
        [first, rest @ ..] => ctx.at(*first, |ctx| report_at(ctx, rest, error)),
    }
}

/// Serializes the asset with its computed `metadata_hash`.
impl Serialize for Asa {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Asa", 4)?;
        if let Some(asa_type) = &self.asa_type {
            state.serialize_field("asa_type", asa_type)?;
        } else {
            state.skip_field("asa_type")?;
        }
        state.serialize_field("asset_params", &self.asset_params)?;
        match &self.metadata {
            Some(metadata) => state.serialize_field("metadata", metadata)?,
            None => state.skip_field("metadata")?,
        }
        match self.metadata_hash() {
            Some(hash) => state.serialize_field("metadata_hash", &hash)?,
            None => state.skip_field("metadata_hash")?,
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{ParseMode, arc3::Arc3Properties},
        serde_json::{Map, json},
    };

    const ADDRESS: &str = "7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF6Q";

    fn arc3_asa() -> Value {
        json!({
            "asset_params": {
                "total": 1,
                "decimals": 0,
                "unit_name": "SONG",
                "asset_name": "My Song",
                "url": "ipfs://QmQZyq4b89RfaUw8GESPd2re4hJqB8bnm4kVHNtyQrHnnK/#arc3",
                "metadata_hash": "qtxKRKnmERrK53fi97/7cNsmagUzKMXYuwTgRyP8qz8=",
            },
            "metadata": {
                "arc": "arc3",
                "name": "My Song",
                "decimals": 0,
                "description": "My first and best song!",
                "image": "https://s3.amazonaws.com/your-bucket/song/cover/mysong.png",
                "image_integrity": "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=",
                "image_mimetype": "image/png",
                "properties": {
                    "traits": {"background": "red", "tattoos": 4},
                    "simple_property": "example value",
                },
            },
        })
    }

    fn errors(value: Value) -> ValidationErrors {
        Asa::validate(&value, &Config::default()).unwrap_err()
    }

    fn paths(errors: &ValidationErrors) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn arc3_asset() {
        let asa = Asa::validate(&arc3_asa(), &Config::default()).unwrap();
        assert_eq!(asa.derived_asa_type(), AsaType::NonFungiblePure);
        assert_eq!(asa.metadata.as_ref().unwrap().arc(), Arc::Arc3);
        assert_eq!(
            asa.metadata_hash().unwrap().to_string(),
            "qtxKRKnmERrK53fi97/7cNsmagUzKMXYuwTgRyP8qz8="
        );

        let value = serde_json::to_value(&asa).unwrap();
        assert!(value["metadata"].get("arc").is_none());
        assert_eq!(
            value["metadata_hash"],
            json!("qtxKRKnmERrK53fi97/7cNsmagUzKMXYuwTgRyP8qz8=")
        );
        assert!(value.get("asa_type").is_none());
    }

    #[test]
    fn document_round_trip() {
        let asa = Asa::validate(&arc3_asa(), &Config::default()).unwrap();
        let document = asa.to_document().unwrap();
        assert_eq!(document["metadata"]["arc"], json!("arc3"));
        assert_eq!(Asa::validate(&document, &Config::default()).unwrap(), asa);
    }

    #[test]
    fn metadata_hash_mismatch() {
        let mut value = arc3_asa();
        value["asset_params"]["metadata_hash"] =
            json!("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=");
        let errors = errors(value);
        assert_eq!(paths(&errors), ["asset_params.metadata_hash"]);
        assert_eq!(
            errors.0[0].error.to_string(),
            "metadata hash mismatch: declared AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=, \
             computed qtxKRKnmERrK53fi97/7cNsmagUzKMXYuwTgRyP8qz8="
        );
    }

    #[test]
    fn discriminator() {
        let mut value = arc3_asa();
        value["metadata"].as_object_mut().unwrap().remove("arc");
        let errors = self::errors(value);
        assert_eq!(paths(&errors), ["metadata.arc"]);
        assert_eq!(
            errors.0[0].error,
            ValidationError::MissingDiscriminator {
                expected: "arc3, arc19".into()
            }
        );

        let mut value = arc3_asa();
        value["metadata"]["arc"] = json!("arc69");
        let errors = self::errors(value);
        assert_eq!(
            errors.0[0].error,
            ValidationError::UnsupportedArc("arc69".into())
        );
    }

    #[test]
    fn params_only() {
        let asa = Asa::validate(
            &json!({"asset_params": {"total": 1000, "decimals": 3}}),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(asa.metadata, None);
        assert_eq!(asa.metadata_hash(), None);
        assert_eq!(asa.derived_asa_type(), AsaType::NonFungibleFractional);

        let errors = self::errors(json!({"asset_params": {"total": 0}}));
        assert_eq!(paths(&errors), ["asset_params.total"]);
        let errors = self::errors(json!({}));
        assert_eq!(paths(&errors), ["asset_params"]);
    }

    #[test]
    fn asa_type_must_match() {
        let value = json!({"asa_type": "fungible", "asset_params": {"total": 1}});
        let errors = errors(value);
        assert_eq!(paths(&errors), ["asa_type"]);

        let value = json!({"asa_type": "non_fungible_pure", "asset_params": {"total": 1}});
        assert!(Asa::validate(&value, &Config::default()).is_ok());

        let value = json!({"asa_type": "nft", "asset_params": {"total": 1}});
        let errors = self::errors(value);
        assert!(matches!(
            errors.0[0].error,
            ValidationError::InvalidChoice { .. }
        ));
    }

    #[test]
    fn derived_types() {
        let asa = |total, decimals| Asa {
            asa_type: None,
            asset_params: AssetParams {
                total,
                decimals,
                default_frozen: false,
                unit_name: None,
                asset_name: None,
                url: None,
                metadata_hash: None,
                manager: None,
                reserve: None,
                freeze: None,
                clawback: None,
            },
            metadata: None,
        };
        assert_eq!(asa(1, 0).derived_asa_type(), AsaType::NonFungiblePure);
        assert_eq!(asa(100, 2).derived_asa_type(), AsaType::NonFungibleFractional);
        assert_eq!(asa(100, 0).derived_asa_type(), AsaType::Fungible);
        assert_eq!(asa(u64::MAX, 19).derived_asa_type(), AsaType::Fungible);
    }

    #[test]
    fn arc3_name_rules() {
        let mut value = arc3_asa();
        value["asset_params"]["asset_name"] = json!("My Other Song");
        assert_eq!(paths(&errors(value)), ["asset_params.asset_name"]);

        // Long metadata names may be truncated in the asset name.
        let long_name = "My Song With A Name Too Long For An Asset";
        let mut value = arc3_asa();
        value["metadata"]["name"] = json!(long_name);
        value["asset_params"].as_object_mut().unwrap().remove("metadata_hash");
        assert!(Asa::validate(&value, &Config::default()).is_ok());

        value["asset_params"]["asset_name"] = json!("Another Song");
        assert_eq!(paths(&errors(value)), ["asset_params.asset_name"]);

        let mut value = arc3_asa();
        value["asset_params"].as_object_mut().unwrap().remove("asset_name");
        assert_eq!(paths(&errors(value)), ["asset_params.asset_name"]);
    }

    #[test]
    fn arc3_url_rules() {
        let mut value = arc3_asa();
        value["asset_params"]["url"] = json!("https://example.com/song.json");
        assert_eq!(paths(&errors(value)), ["asset_params.url"]);

        // Not recommended, but allowed without the #arc3 suffix.
        let mut value = arc3_asa();
        value["asset_params"]["asset_name"] = json!("song@arc3");
        value["asset_params"]["url"] = json!("https://example.com/song.json");
        assert!(Asa::validate(&value, &Config::default()).is_ok());
    }

    #[test]
    fn arc3_decimals_must_match() {
        let mut value = arc3_asa();
        value["metadata"]["decimals"] = json!(2);
        value["asset_params"].as_object_mut().unwrap().remove("metadata_hash");
        let errors = errors(value);
        assert_eq!(paths(&errors), ["metadata.decimals"]);
        assert_eq!(
            errors.0[0].error,
            ValidationError::DecimalsMismatch {
                asset: 0,
                metadata: 2
            }
        );
    }

    #[test]
    fn arc19_asset() {
        let value = json!({
            "asset_params": {
                "total": 1,
                "url": "template-ipfs://{ipfscid:1:raw:reserve:sha2-256}",
                "reserve": ADDRESS,
            },
            "metadata": {"arc": "arc19", "arc3_metadata": {"name": "Song"}},
        });
        let asa = Asa::validate(&value, &Config::default()).unwrap();
        assert_eq!(asa.metadata.as_ref().unwrap().arc(), Arc::Arc19);

        let value = json!({
            "asset_params": {"total": 1, "url": "https://example.com"},
            "metadata": {"arc": "arc19"},
        });
        assert_eq!(
            paths(&errors(value)),
            ["asset_params.url", "asset_params.reserve"]
        );
    }

    #[test]
    fn new_validates_like_a_document() {
        let params = Asa::validate(&arc3_asa(), &Config::default())
            .unwrap()
            .asset_params;
        let metadata = Arc3Metadata {
            name: Some("My Song".into()),
            properties: Some(Arc3Properties {
                traits: None,
                other: Map::from_iter([("null".to_owned(), Value::Null)]),
            }),
            ..Default::default()
        };
        let errors = Asa::new(
            None,
            AssetParams {
                metadata_hash: None,
                ..params
            },
            Some(Metadata::Arc3(metadata)),
            &Config::new(ParseMode::Strict),
        )
        .unwrap_err();
        assert_eq!(paths(&errors), ["metadata.properties.null"]);
    }
}
