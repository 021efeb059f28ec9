//! Minting single-unit ARC-3 NFTs with sensible defaults.

mod chain;

pub use chain::{Account, AssetConfigTxn, AssetId, ChainClient, PendingTransaction, TxId};
#[cfg(any(test, feature = "test-util"))]
pub use chain::MockChainClient;
use {
    asa_models::{
        Arc3Metadata,
        Asa,
        AssetParams,
        Config,
        Metadata,
        ParseMode,
        ValidationErrors,
    },
    ipfs::{ContentId, IpfsPinning},
    serde_json::{Map, Value},
};

/// Name used for both the asset and its metadata.
pub const NFT_NAME: &str = "NFT";

/// Number of rounds to wait for the asset creation to be confirmed.
pub const CONFIRMATION_ROUNDS: u64 = 4;

#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("asset is invalid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("chain client failed")]
    Chain(#[from] anyhow::Error),

    #[error("transaction {0} was confirmed without creating an asset")]
    NotCreated(TxId),
}

/// ARC-3 metadata of an NFT named [`NFT_NAME`].
pub fn create_metadata(
    description: Option<&str>,
    properties: Option<Map<String, Value>>,
) -> Result<Arc3Metadata, ValidationErrors> {
    let mut document = serde_json::json!({
        "name": NFT_NAME,
        "decimals": 0,
    });
    if let Some(description) = description {
        document["description"] = Value::from(description);
    }
    if let Some(properties) = properties {
        document["properties"] = Value::Object(properties);
    }
    Arc3Metadata::validate(&document, &config())
}

/// A pure NFT whose metadata is stored on IPFS under `cid`.
pub fn create_asa(metadata: Arc3Metadata, cid: &ContentId) -> Result<Asa, ValidationErrors> {
    let asset_params = AssetParams {
        total: 1,
        decimals: 0,
        default_frozen: false,
        unit_name: Some(NFT_NAME.to_owned()),
        asset_name: Some(NFT_NAME.to_owned()),
        url: Some(format!("ipfs://{cid}/#arc3")),
        metadata_hash: None,
        manager: None,
        reserve: None,
        freeze: None,
        clawback: None,
    };
    Asa::new(None, asset_params, Some(Metadata::Arc3(metadata)), &config())
}

/// Asset creation transaction for `asa` sent by `account`, which also
/// becomes the manager and reserve of the asset.
pub fn create_asset_config_txn(account: &Account, asa: &Asa) -> AssetConfigTxn {
    let params = &asa.asset_params;
    AssetConfigTxn {
        sender: account.address,
        total: params.total,
        decimals: params.decimals,
        default_frozen: false,
        unit_name: params.unit_name.clone(),
        asset_name: params.asset_name.clone(),
        url: params.url.clone(),
        metadata_hash: asa.metadata_hash(),
        manager: Some(account.address),
        reserve: Some(account.address),
        freeze: None,
        clawback: None,
    }
}

/// Stores the canonical JSON of `metadata` on IPFS.
pub async fn store_metadata(
    ipfs: &dyn IpfsPinning,
    metadata: &Arc3Metadata,
) -> Result<ContentId, ipfs::Error> {
    ipfs.store_json(&metadata.to_json_bytes()).await
}

/// Mints an NFT described by `metadata` stored under `cid` and returns the
/// id of the created asset once the transaction is confirmed.
pub async fn mint(
    chain: &dyn ChainClient,
    account: &Account,
    metadata: Arc3Metadata,
    cid: &ContentId,
) -> Result<AssetId, MintError> {
    let asa = create_asa(metadata, cid)?;
    let txn = create_asset_config_txn(account, &asa);
    let tx_id = chain.send_asset_config(account, txn).await?;
    tracing::debug!(%tx_id, "sent asset creation transaction");
    let pending = chain
        .wait_for_confirmation(&tx_id, CONFIRMATION_ROUNDS)
        .await?;
    let asset_id = pending.asset_index.map(AssetId).ok_or(MintError::NotCreated(tx_id))?;
    tracing::info!(%asset_id, "minted NFT");
    Ok(asset_id)
}

fn config() -> Config {
    Config::new(ParseMode::Strict)
}
