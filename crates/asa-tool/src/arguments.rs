use {
    asa_models::ParseMode,
    ipfs::http_client,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
};

macro_rules! logging_args_with_default_filter {
    ($struct_name:ident, $default_filter:literal, $default_stderr_threshold:literal) => {
        #[derive(clap::Parser)]
        #[group(skip)]
        pub struct $struct_name {
            #[clap(long, env, default_value = $default_filter)]
            pub log_filter: String,

            /// Events at least this severe are written to stderr, all others
            /// to stdout.
            #[clap(long, env, default_value = $default_stderr_threshold)]
            pub log_stderr_threshold: LevelFilter,

            /// Log events as JSON objects.
            #[clap(long, env)]
            pub use_json_logs: bool,
        }

        impl Display for $struct_name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let Self {
                    log_filter,
                    log_stderr_threshold,
                    use_json_logs,
                } = self;

                writeln!(f, "log_filter: {log_filter}")?;
                writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
                writeln!(f, "use_json_logs: {use_json_logs}")?;
                Ok(())
            }
        }
    };
}

// Command output is written to stdout so logs default to stderr.
logging_args_with_default_filter!(
    LoggingArguments,
    "warn,asa_tool=info,asa_models=info,ipfs=info",
    "trace"
);

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        let config = observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold.into_level(),
            false,
        );
        if self.use_json_logs {
            config.with_json_format()
        } else {
            config
        }
    }
}

/// Validates Algorand Standard Asset documents and pins ARC-3 metadata on
/// IPFS.
#[derive(clap::Parser)]
#[clap(version)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// How JSON types are matched: `strict` requires the exact types,
    /// `coercing` also accepts numeric strings and integral floats for
    /// integers and 0/1 or yes/no style values for booleans.
    #[clap(long, env)]
    pub parse_mode: ParseMode,

    #[clap(flatten)]
    pub http_client: http_client::Arguments,

    /// TOML file configuring the pinning service.
    #[clap(long, env)]
    pub ipfs_config: Option<PathBuf>,

    /// API key of the pinning service. Takes precedence over the key in the
    /// IPFS config file.
    #[clap(long, env = "NFT_STORAGE_API_KEY")]
    pub nft_storage_api_key: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, clap::Subcommand)]
pub enum Command {
    /// Validates a full asset document with asset parameters and metadata.
    ValidateAsa { file: PathBuf },
    /// Validates an ARC-3 metadata document.
    ValidateArc3 { file: PathBuf },
    /// Validates asset parameters.
    ValidateAssetParams { file: PathBuf },
    /// Prints the metadata hash of an ARC-3 metadata document.
    MetadataHash { file: PathBuf },
    /// Stores a JSON document on IPFS and prints its CID.
    StoreJson { file: PathBuf },
    /// Prints the pinning status of a CID.
    PinStatus { cid: String },
    /// Prints the raw CIDv1 of a file's contents.
    Cid { file: PathBuf },
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self {
            logging,
            parse_mode,
            http_client,
            ipfs_config,
            nft_storage_api_key,
            command,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "parse_mode: {parse_mode}")?;
        write!(f, "{http_client}")?;
        display_option(
            f,
            "ipfs_config",
            &ipfs_config.as_ref().map(|path| path.display()),
        )?;
        display_secret_option(f, "nft_storage_api_key", nft_storage_api_key)?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}

fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}
