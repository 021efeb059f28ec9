use {
    asa_models::{Address, MetadataHash},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

/// Account sending the asset creation transaction. Signing happens in the
/// [`ChainClient`], which holds the keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Account {
    pub address: Address,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl Display for TxId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset configuration transaction creating a new asset.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AssetConfigTxn {
    pub sender: Address,
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

/// The parts of a pending transaction response the minting flow needs.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransaction {
    pub confirmed_round: Option<u64>,
    pub asset_index: Option<u64>,
}

/// Submits transactions to an Algorand node.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Signs `txn` with the keys of `account` and sends it.
    async fn send_asset_config(
        &self,
        account: &Account,
        txn: AssetConfigTxn,
    ) -> anyhow::Result<TxId>;

    /// Waits up to `rounds` rounds for the transaction to be confirmed.
    async fn wait_for_confirmation(
        &self,
        tx_id: &TxId,
        rounds: u64,
    ) -> anyhow::Result<PendingTransaction>;
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn deserialize_pending_transaction() {
        let pending: PendingTransaction = serde_json::from_value(json!({
            "asset-index": 1008,
            "confirmed-round": 21,
            "pool-error": "",
            "txn": {},
        }))
        .unwrap();
        assert_eq!(
            pending,
            PendingTransaction {
                confirmed_round: Some(21),
                asset_index: Some(1008),
            }
        );

        let pending: PendingTransaction =
            serde_json::from_value(json!({"pool-error": ""})).unwrap();
        assert_eq!(pending, PendingTransaction::default());
    }

    #[test]
    fn serialize_asset_config_txn() {
        let address: Address = "EEQYWGGBHRDAMTEVDPVOSDVX3HJQIG6K6IVNR3RXHYOHV64ZWAEISS4CTI"
            .parse()
            .unwrap();
        let txn = AssetConfigTxn {
            sender: address,
            total: 1,
            decimals: 0,
            default_frozen: false,
            unit_name: Some("NFT".into()),
            asset_name: None,
            url: None,
            metadata_hash: None,
            manager: Some(address),
            reserve: None,
            freeze: None,
            clawback: None,
        };
        assert_eq!(
            serde_json::to_value(&txn).unwrap(),
            json!({
                "sender": "EEQYWGGBHRDAMTEVDPVOSDVX3HJQIG6K6IVNR3RXHYOHV64ZWAEISS4CTI",
                "total": 1,
                "decimals": 0,
                "default_frozen": false,
                "unit_name": "NFT",
                "manager": "EEQYWGGBHRDAMTEVDPVOSDVX3HJQIG6K6IVNR3RXHYOHV64ZWAEISS4CTI",
            })
        );
    }
}
