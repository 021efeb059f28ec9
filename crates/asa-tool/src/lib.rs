pub mod arguments;

use {
    anyhow::{Context, Result},
    arguments::{Arguments, Command},
    asa_models::{Config, ValidationErrors, Validator, raw_sha256_cid},
    ipfs::{ContentId, IpfsConfig, IpfsPinning, NftStorage, http_client::HttpClientFactory},
    serde::Serialize,
    std::{io::Write, path::Path},
};

/// Whether the processed document was accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Valid,
    Invalid,
}

/// Runs the command of `args`, writing its output to `out`.
pub async fn run(args: &Arguments, out: &mut impl Write) -> Result<Status> {
    let validator = Validator::new(Config::new(args.parse_mode));
    match &args.command {
        Command::ValidateAsa { file } => report(out, validator.asa(&read(file).await?)),
        Command::ValidateArc3 { file } => report(out, validator.arc3_metadata(&read(file).await?)),
        Command::ValidateAssetParams { file } => {
            report(out, validator.asset_params(&read(file).await?))
        }
        Command::MetadataHash { file } => {
            let metadata = validator.arc3_metadata(&read(file).await?);
            report(out, metadata.map(|metadata| metadata.metadata_hash()))
        }
        Command::Cid { file } => {
            writeln!(out, "{}", raw_sha256_cid(&read(file).await?))?;
            Ok(Status::Valid)
        }
        Command::StoreJson { file } => {
            let ipfs = ipfs_client(args).await?;
            store_json(&ipfs, &read(file).await?, out).await
        }
        Command::PinStatus { cid } => {
            let ipfs = ipfs_client(args).await?;
            let status = ipfs
                .fetch_pin_status(&ContentId::from(cid.as_str()))
                .await
                .context("failed to fetch pin status")?;
            writeln!(out, "{status}")?;
            Ok(Status::Valid)
        }
    }
}

/// Writes the validated value as JSON, or every field error on its own line.
fn report<T: Serialize>(
    out: &mut impl Write,
    result: Result<T, ValidationErrors>,
) -> Result<Status> {
    match result {
        Ok(value) => {
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
            Ok(Status::Valid)
        }
        Err(errors) => {
            tracing::debug!(count = errors.len(), "document is invalid");
            for error in errors {
                writeln!(out, "{error}")?;
            }
            Ok(Status::Invalid)
        }
    }
}

async fn store_json(
    ipfs: &dyn IpfsPinning,
    document: &[u8],
    out: &mut impl Write,
) -> Result<Status> {
    if let Err(err) = serde_json::from_slice::<serde_json::Value>(document) {
        writeln!(out, "document is not valid JSON: {err}")?;
        return Ok(Status::Invalid);
    }
    let cid = ipfs
        .store_json(document)
        .await
        .context("failed to store document")?;
    writeln!(out, "{cid}")?;
    Ok(Status::Valid)
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn load_ipfs_config(path: &Path) -> Result<IpfsConfig> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    // Not printing the TOML error in detail since it could leak the API key.
    toml::from_str(&data).map_err(|_| anyhow::anyhow!("invalid IPFS config {}", path.display()))
}

async fn ipfs_client(args: &Arguments) -> Result<NftStorage> {
    let config = match &args.ipfs_config {
        Some(path) => load_ipfs_config(path).await?,
        None => IpfsConfig::default(),
    };
    tracing::debug!(?config, "IPFS config");
    let mut builder = HttpClientFactory::new(&args.http_client).builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("failed to create HTTP client")?;
    let api_key = args.nft_storage_api_key.clone().or(config.api_key);
    NftStorage::new(client, config.api_url, api_key).context("failed to create IPFS client")
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        arguments::LoggingArguments,
        asa_models::ParseMode,
        ipfs::{MockIpfsPinning, http_client},
        std::{path::PathBuf, time::Duration},
    };

    fn args(parse_mode: ParseMode, command: Command) -> Arguments {
        Arguments {
            logging: LoggingArguments {
                log_filter: "warn".to_owned(),
                log_stderr_threshold: tracing::level_filters::LevelFilter::ERROR,
                use_json_logs: false,
            },
            parse_mode,
            http_client: http_client::Arguments {
                http_timeout: Duration::from_secs(1),
            },
            ipfs_config: None,
            nft_storage_api_key: None,
            command,
        }
    }

    fn document(contents: &str) -> tempfile::TempPath {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.into_temp_path()
    }

    async fn execute(args: &Arguments) -> (Status, String) {
        let mut out = Vec::new();
        let status = run(args, &mut out).await.unwrap();
        (status, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn validate_asset_params() {
        let file = document(r#"{"total": "10", "decimals": 1, "unit_name": "TOOLONGNAME"}"#);
        let (status, out) = execute(&args(
            ParseMode::Strict,
            Command::ValidateAssetParams {
                file: file.to_path_buf(),
            },
        ))
        .await;
        assert_eq!(status, Status::Invalid);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("total: "));
        assert!(lines[1].starts_with("unit_name: "));

        let file = document(r#"{"total": "10", "decimals": 1}"#);
        let (status, out) = execute(&args(
            ParseMode::Coercing,
            Command::ValidateAssetParams {
                file: file.to_path_buf(),
            },
        ))
        .await;
        assert_eq!(status, Status::Valid);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total"], 10);
    }

    #[tokio::test]
    async fn metadata_hash() {
        let file = document(r#"{"name": "My Song", "decimals": 0}"#);
        let (status, out) = execute(&args(
            ParseMode::Strict,
            Command::MetadataHash {
                file: file.to_path_buf(),
            },
        ))
        .await;
        assert_eq!(status, Status::Valid);
        let hash: String = serde_json::from_str(&out).unwrap();
        assert_eq!(hash.len(), 44);
    }

    #[tokio::test]
    async fn cid_of_file() {
        let file = document(r#"{"hello":"world"}"#);
        let (status, out) = execute(&args(
            ParseMode::Strict,
            Command::Cid {
                file: file.to_path_buf(),
            },
        ))
        .await;
        assert_eq!(status, Status::Valid);
        assert_eq!(
            out,
            "bafkreietui4xdkiu4xvmx4fi2jivjtndbhb4drzpxomrjvd4mdz4w2avra\n"
        );
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let file = document("{");
        let (status, out) = execute(&args(
            ParseMode::Strict,
            Command::ValidateAsa {
                file: file.to_path_buf(),
            },
        ))
        .await;
        assert_eq!(status, Status::Invalid);
        assert_eq!(out.lines().count(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let args = args(
            ParseMode::Strict,
            Command::ValidateArc3 {
                file: PathBuf::from("/nonexistent/metadata.json"),
            },
        );
        let err = run(&args, &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/metadata.json"));
    }

    #[tokio::test]
    async fn store_json_uploads_valid_documents() {
        let mut ipfs = MockIpfsPinning::new();
        ipfs.expect_store_json()
            .withf(|document| document == br#"{"a":1}"#.as_slice())
            .times(1)
            .returning(|_| Ok(ContentId::from("bafkrei")));

        let mut out = Vec::new();
        let status = store_json(&ipfs, br#"{"a":1}"#, &mut out).await.unwrap();
        assert_eq!(status, Status::Valid);
        assert_eq!(out, b"bafkrei\n");

        let mut out = Vec::new();
        let status = store_json(&ipfs, b"not json", &mut out).await.unwrap();
        assert_eq!(status, Status::Invalid);
    }

    #[tokio::test]
    async fn ipfs_client_configuration() {
        let config = document("api-url = \"http://localhost:5001/\"\ntimeout = \"2s\"\n");
        let mut args = args(
            ParseMode::Strict,
            Command::PinStatus {
                cid: "bafkrei".to_owned(),
            },
        );
        args.ipfs_config = Some(config.to_path_buf());
        assert!(ipfs_client(&args).await.is_err());

        args.nft_storage_api_key = Some("secret".to_owned());
        assert!(ipfs_client(&args).await.is_ok());

        let broken = document("api-key = \"secret\"\nunknown = 1\n");
        args.ipfs_config = Some(broken.to_path_buf());
        let err = ipfs_client(&args).await.err().unwrap();
        assert!(!format!("{err:?}").contains("secret"));
    }
}
