//! Validators for single values.
//!
//! Each function returns its input unchanged when it is valid, so checks can
//! be chained with `and_then`.

use {
    crate::{address::Address, error::ValidationError},
    base64::{Engine, prelude::BASE64_STANDARD},
    regex::Regex,
    std::sync::LazyLock,
    url::Url,
};

/// Hosts of public IPFS gateways. Metadata should reference content with an
/// `ipfs://` URL instead of pinning it to one of these.
pub const IPFS_GATEWAYS: &[&str] = &[
    "ipfs.io",
    "gateway.ipfs.io",
    "dweb.link",
    "cloudflare-ipfs.com",
    "cf-ipfs.com",
    "gateway.pinata.cloud",
    "nftstorage.link",
    "w3s.link",
    "4everland.io",
];

static MIME_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "^(?i:(?P<type>application|audio|font|example|image|message|model|multipart|text|video))",
        "/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}",
        r#"(\s*;\s*[A-Za-z0-9!#$&^_.+-]+=("[^"]*"|[A-Za-z0-9!#$&^_.+-]+))*$"#,
    ))
    .unwrap()
});

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-9a-fA-F]{6}$").unwrap());

static LOCALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{2,3}([_-][A-Z][a-z]{3})?([_-]([A-Z]{2}|[0-9]{3}))?$").unwrap()
});

static ARC19_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^template-ipfs://\{ipfscid:(0:dag-pb|1:(raw|dag-pb)):reserve:sha2-256\}").unwrap()
});

/// Upper bound of the URL fields of assets and metadata.
pub const MAX_URL_LENGTH: usize = 96;

pub fn validate_address(value: &str) -> Result<&str, ValidationError> {
    value.parse::<Address>()?;
    Ok(value)
}

/// Byte length of the UTF-8 encoding, not the number of characters.
pub fn validate_encoded_length(value: &str, max: usize) -> Result<&str, ValidationError> {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            max,
            actual: value.len(),
        });
    }
    Ok(value)
}

pub fn validate_uint(value: u64, min: u64, max: u64) -> Result<u64, ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            value: value.to_string(),
            min,
            max,
        });
    }
    Ok(value)
}

/// Checks `type/subtype[;parameters]` syntax with a registered top-level
/// type. If `primary` is given the top-level type has to match it.
pub fn validate_mime_type<'a>(
    value: &'a str,
    primary: Option<&str>,
) -> Result<&'a str, ValidationError> {
    let captures = MIME_TYPE
        .captures(value)
        .ok_or_else(|| ValidationError::InvalidMimeType(value.to_owned()))?;
    if let Some(primary) = primary
        && !captures["type"].eq_ignore_ascii_case(primary)
    {
        return Err(ValidationError::UnexpectedMimeType {
            value: value.to_owned(),
            expected: format!("{primary}/*"),
        });
    }
    Ok(value)
}

/// A well-formed MIME type whose `type/subtype` part equals `essence`.
pub fn validate_mime_essence<'a>(
    value: &'a str,
    essence: &str,
) -> Result<&'a str, ValidationError> {
    validate_mime_type(value, None)?;
    let actual = value.split(';').next().unwrap_or_default().trim();
    if !actual.eq_ignore_ascii_case(essence) {
        return Err(ValidationError::UnexpectedMimeType {
            value: value.to_owned(),
            expected: essence.to_owned(),
        });
    }
    Ok(value)
}

pub fn validate_hex_color(value: &str) -> Result<&str, ValidationError> {
    if !HEX_COLOR.is_match(value) {
        return Err(ValidationError::InvalidColor(value.to_owned()));
    }
    Ok(value)
}

/// An absolute URL with one of the allowed schemes.
pub fn validate_url<'a>(value: &'a str, schemes: &[&str]) -> Result<&'a str, ValidationError> {
    let url = Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        value: value.to_owned(),
        reason: err.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ValidationError::UnsupportedScheme {
            scheme: url.scheme().to_owned(),
            allowed: schemes.join(", "),
        });
    }
    Ok(value)
}

/// Rejects URLs served by one of the [`IPFS_GATEWAYS`], including their
/// subdomain gateways (`<cid>.ipfs.dweb.link`).
pub fn validate_not_ipfs_gateway(value: &str) -> Result<&str, ValidationError> {
    let Some(host) = Url::parse(value)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
    else {
        return Ok(value);
    };
    let is_gateway = IPFS_GATEWAYS.iter().any(|gateway| {
        host == *gateway
            || host
                .strip_suffix(gateway)
                .is_some_and(|prefix| prefix.ends_with('.'))
    });
    if is_gateway {
        return Err(ValidationError::IpfsGateway(value.to_owned()));
    }
    Ok(value)
}

/// URL of an ARC-3 resource: `https` or `ipfs`, at most
/// [`MAX_URL_LENGTH`] bytes and not on a public gateway.
pub fn validate_arc3_url(value: &str) -> Result<&str, ValidationError> {
    validate_encoded_length(value, MAX_URL_LENGTH)
        .and_then(|value| validate_url(value, &["https", "ipfs"]))
        .and_then(validate_not_ipfs_gateway)
}

/// The `url` asset parameter: any absolute URL or an ARC-19 template URL.
pub fn validate_asa_url(value: &str) -> Result<&str, ValidationError> {
    validate_encoded_length(value, MAX_URL_LENGTH)?;
    if value.starts_with("template-ipfs://") {
        return validate_arc19_template(value);
    }
    Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        value: value.to_owned(),
        reason: err.to_string(),
    })?;
    Ok(value)
}

/// `template-ipfs://{ipfscid:<version>:<codec>:reserve:sha2-256}` followed
/// by an optional path. Version 0 implies the `dag-pb` codec.
pub fn validate_arc19_template(value: &str) -> Result<&str, ValidationError> {
    if !ARC19_TEMPLATE.is_match(value) {
        return Err(ValidationError::InvalidUrl {
            value: value.to_owned(),
            reason: "not an ARC-19 template of the form \
                     template-ipfs://{ipfscid:<version>:<codec>:reserve:sha2-256}"
                .to_owned(),
        });
    }
    Ok(value)
}

pub fn validate_contains<'a>(
    value: &'a str,
    needle: &'static str,
) -> Result<&'a str, ValidationError> {
    if !value.contains(needle) {
        return Err(ValidationError::MissingSubstring {
            value: value.to_owned(),
            needle,
        });
    }
    Ok(value)
}

pub fn decode_base64(value: &str) -> Result<Vec<u8>, ValidationError> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|_| ValidationError::InvalidBase64(value.to_owned()))
}

pub fn validate_base64(value: &str) -> Result<&str, ValidationError> {
    decode_base64(value)?;
    Ok(value)
}

/// A W3C subresource integrity digest, `<algorithm>-<base64 digest>`.
pub fn validate_sri(value: &str) -> Result<&str, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidSri {
        value: value.to_owned(),
        reason: reason.to_owned(),
    };
    let (algorithm, digest) = value
        .split_once('-')
        .ok_or_else(|| invalid("expected <algorithm>-<base64 digest>"))?;
    let size = match algorithm {
        "sha256" => 32,
        "sha384" => 48,
        "sha512" => 64,
        _ => return Err(invalid("algorithm must be one of sha256, sha384, sha512")),
    };
    let digest = decode_base64(digest).map_err(|_| invalid("digest is not valid base64"))?;
    if digest.len() != size {
        return Err(invalid(&format!(
            "{algorithm} digests are {size} bytes, got {}",
            digest.len()
        )));
    }
    Ok(value)
}

/// ARC-3 only allows SHA-256 integrity digests.
pub fn validate_arc3_sri(value: &str) -> Result<&str, ValidationError> {
    validate_sri(value)?;
    if !value.starts_with("sha256-") {
        return Err(ValidationError::InvalidSri {
            value: value.to_owned(),
            reason: "ARC-3 requires a sha256 digest".to_owned(),
        });
    }
    Ok(value)
}

/// CLDR style locale identifier: language, optional script, optional region.
pub fn validate_locale(value: &str) -> Result<&str, ValidationError> {
    if !LOCALE.is_match(value) {
        return Err(ValidationError::InvalidLocale(value.to_owned()));
    }
    Ok(value)
}

pub fn validate_is_power_of_10(value: u64) -> Result<u64, ValidationError> {
    let mut rest = value;
    while rest >= 10 && rest % 10 == 0 {
        rest /= 10;
    }
    if rest != 1 {
        return Err(ValidationError::NotPowerOf10(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF6Q", true)]
    #[case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ", true)]
    // Last character changed, checksum no longer matches.
    #[case("7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF6A", false)]
    #[case("7zueca7hflztxenrv24shlu4avputmttdufubnbd64c73f3uhrthaiof6q", false)]
    #[case("7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF", false)]
    #[case("", false)]
    fn addresses(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_address(value).is_ok(), valid);
    }

    #[rstest]
    #[case("USDT", 8, true)]
    #[case("ABCDEFGHI", 8, false)]
    // Four characters, twelve bytes.
    #[case("ドルドル", 8, false)]
    #[case("ドル", 8, true)]
    fn encoded_lengths(#[case] value: &str, #[case] max: usize, #[case] valid: bool) {
        assert_eq!(validate_encoded_length(value, max).is_ok(), valid);
    }

    #[rstest]
    #[case("image/png", None, true)]
    #[case("IMAGE/PNG", Some("image"), true)]
    #[case("text/html; charset=utf-8", Some("text"), true)]
    #[case("video/mp4", Some("image"), false)]
    #[case("image", None, false)]
    #[case("unknown/thing", None, false)]
    #[case("image/", None, false)]
    fn mime_types(#[case] value: &str, #[case] primary: Option<&str>, #[case] valid: bool) {
        assert_eq!(validate_mime_type(value, primary).is_ok(), valid);
    }

    #[test]
    fn mime_essence() {
        assert!(validate_mime_essence("text/html", "text/html").is_ok());
        assert!(validate_mime_essence("text/html;charset=UTF-8", "text/html").is_ok());
        assert!(validate_mime_essence("text/plain", "text/html").is_err());
    }

    #[rstest]
    #[case("ffffff", true)]
    #[case("00aaFF", true)]
    #[case("#ffffff", false)]
    #[case("fff", false)]
    #[case("gggggg", false)]
    fn hex_colors(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_hex_color(value).is_ok(), valid);
    }

    #[rstest]
    #[case("https://example.com/image.png", true)]
    #[case("ipfs://bafkreietui4xdkiu4xvmx4fi2jivjtndbhb4drzpxomrjvd4mdz4w2avra", true)]
    #[case("https://s3.amazonaws.com/your-bucket/images/{id}.png", true)]
    #[case("http://example.com/image.png", false)]
    #[case("example.com/image.png", false)]
    #[case("https://ipfs.io/ipfs/QmQZyq4b89RfaUw8GESPd2re4hJqB8bnm4kVHNtyQrHnnK", false)]
    #[case("https://bafybeib.ipfs.dweb.link/", false)]
    #[case("https://notdweb.link/", true)]
    fn arc3_urls(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_arc3_url(value).is_ok(), valid);
    }

    #[test]
    fn arc3_url_length() {
        let url = format!("https://example.com/{}", "a".repeat(77));
        assert_eq!(url.len(), 97);
        assert!(matches!(
            validate_arc3_url(&url),
            Err(ValidationError::TooLong { max: 96, actual: 97 })
        ));
    }

    #[rstest]
    #[case("https://tether.to/", true)]
    #[case("ipfs://QmQZyq4b89RfaUw8GESPd2re4hJqB8bnm4kVHNtyQrHnnK/#arc3", true)]
    #[case("template-ipfs://{ipfscid:1:raw:reserve:sha2-256}", true)]
    #[case("template-ipfs://{ipfscid:0:dag-pb:reserve:sha2-256}/metadata.json", true)]
    #[case("template-ipfs://{ipfscid:2:raw:reserve:sha2-256}", false)]
    // Version 0 CIDs are always dag-pb.
    #[case("template-ipfs://{ipfscid:0:raw:reserve:sha2-256}/arc3.json", false)]
    #[case("template-ipfs://{ipfscid:v1:raw:reserve:sha2-256}", false)]
    #[case("template-ipfs://{ipfscid:1:raw:manager:sha2-256}", false)]
    #[case("not a url", false)]
    fn asa_urls(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_asa_url(value).is_ok(), valid);
    }

    #[rstest]
    #[case("sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=", true)]
    #[case("sha256-7IGatqxLhUYkruDsEva52Ku43up6774yAmf0k98MXnU=", true)]
    // A sha256 digest labelled as sha384.
    #[case("sha384-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=", false)]
    #[case("md5-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=", false)]
    #[case("sha256-not base64", false)]
    #[case("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=", false)]
    fn sris(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_sri(value).is_ok(), valid);
    }

    #[test]
    fn arc3_sri_requires_sha256() {
        let sha512 = format!("sha512-{}", BASE64_STANDARD.encode([0u8; 64]));
        assert!(validate_sri(&sha512).is_ok());
        assert!(validate_arc3_sri(&sha512).is_err());
    }

    #[rstest]
    #[case("en", true)]
    #[case("es_MX", true)]
    #[case("zh-Hant-TW", true)]
    #[case("es-419", true)]
    #[case("e", false)]
    #[case("en_us", false)]
    #[case("english", false)]
    fn locales(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(validate_locale(value).is_ok(), valid);
    }

    #[rstest]
    #[case(1, true)]
    #[case(10, true)]
    #[case(10u64.pow(19), true)]
    #[case(0, false)]
    #[case(20, false)]
    #[case(101, false)]
    fn powers_of_10(#[case] value: u64, #[case] valid: bool) {
        assert_eq!(validate_is_power_of_10(value).is_ok(), valid);
    }

    #[test]
    fn contains_and_base64() {
        assert!(validate_contains("ipfs://x/{locale}.json", "{locale}").is_ok());
        assert!(validate_contains("ipfs://x/en.json", "{locale}").is_err());
        assert!(validate_base64("iHcUslDaL/jEM/oTxqEX++4CS8o3+IZp7/V5Rgchqwc=").is_ok());
        assert!(validate_base64("not base64!").is_err());
        assert!(validate_uint(20, 0, 19).is_err());
    }
}
