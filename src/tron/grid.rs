use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;

use super::{is_valid_address, AccountInfo, AccountResource, AccountSource};

const API_KEY_HEADER: &str = "tron-pro-api-key";

/// Subset of `wallet/getaccount`. Nodes answer `{}` for unknown accounts and
/// leave `balance` out when it is zero.
#[derive(Deserialize)]
struct AccountResponse {
    address: Option<String>,
    #[serde(default)]
    balance: i64,
}

/// Subset of `wallet/getaccountresource`, zero valued fields are left out.
#[derive(Deserialize, Default)]
#[serde(default)]
struct AccountResourceResponse {
    #[serde(rename = "freeNetLimit")]
    free_net_limit: i64,
    #[serde(rename = "freeNetUsed")]
    free_net_used: i64,
    #[serde(rename = "NetLimit")]
    net_limit: i64,
    #[serde(rename = "NetUsed")]
    net_used: i64,
    #[serde(rename = "EnergyLimit")]
    energy_limit: i64,
    #[serde(rename = "EnergyUsed")]
    energy_used: i64,
}

fn account_info(
    account: AccountResponse,
    resources: AccountResourceResponse,
) -> Option<AccountInfo> {
    // an account that was never activated has no address in the response
    if account.address.is_none() {
        return None;
    }

    let bandwidth = (resources.free_net_limit - resources.free_net_used)
        + (resources.net_limit - resources.net_used);
    let energy = resources.energy_limit - resources.energy_used;

    Some(AccountInfo {
        balance: Some(account.balance as f64),
        bandwidth: Some(AccountResource {
            available: Some(bandwidth.max(0) as f64),
        }),
        energy: Some(AccountResource {
            available: Some(energy.max(0) as f64),
        }),
    })
}

/// Client for the HTTP API TRON full nodes and TronGrid expose.
#[derive(Clone)]
pub struct TronGridClient {
    nodes: Vec<Url>,
    client: reqwest::Client,
}

impl TronGridClient {
    pub fn new(nodes: &[Url], api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        if nodes.is_empty() {
            return Err(anyhow!(
                "tried to instantiate TronGridClient without at least one url"
            ));
        }

        let mut headers = header::HeaderMap::new();
        if let Some(api_key) = api_key {
            headers.insert(
                API_KEY_HEADER,
                header::HeaderValue::from_str(api_key).context("invalid TRON api key")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            nodes: nodes.to_vec(),
            client,
        })
    }

    // poor mans load balancer, get random node from list
    fn get_node(&self) -> Result<&Url> {
        self.nodes
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| anyhow!("no TRON node configured"))
    }

    async fn post_wallet<T: DeserializeOwned>(&self, method: &str, address: &str) -> Result<T> {
        let url = self.get_node()?.join(&format!("wallet/{}", method))?;
        // base58 addresses have to be flagged as visible, hex ones must not be
        let visible = address.starts_with('T');

        debug!(%url, address, "calling TRON node");

        self.client
            .post(url)
            .json(&json!({ "address": address, "visible": visible }))
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode {} response", method))
    }
}

#[async_trait]
impl AccountSource for TronGridClient {
    fn is_address(&self, address: &str) -> bool {
        is_valid_address(address)
    }

    async fn get_account(&self, address: &str) -> Result<Option<AccountInfo>> {
        let (account, resources) = tokio::try_join!(
            self.post_wallet::<AccountResponse>("getaccount", address),
            self.post_wallet::<AccountResourceResponse>("getaccountresource", address),
        )?;

        Ok(account_info(account, resources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_is_none() {
        let account: AccountResponse = serde_json::from_str("{}").unwrap();
        let resources: AccountResourceResponse = serde_json::from_str("{}").unwrap();

        assert_eq!(account_info(account, resources), None);
    }

    #[test]
    fn sums_free_and_staked_bandwidth() {
        let account: AccountResponse = serde_json::from_str(
            r#"{"address": "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t", "balance": 1500000, "create_time": 1}"#,
        )
        .unwrap();
        let resources: AccountResourceResponse = serde_json::from_str(
            r#"{
                "freeNetLimit": 600,
                "freeNetUsed": 100,
                "NetLimit": 50,
                "NetUsed": 10,
                "EnergyLimit": 3000,
                "EnergyUsed": 500,
                "TotalNetLimit": 43200000000
            }"#,
        )
        .unwrap();

        let info = account_info(account, resources).unwrap();

        assert_eq!(info.balance, Some(1_500_000.0));
        assert_eq!(info.bandwidth.unwrap().available, Some(540.0));
        assert_eq!(info.energy.unwrap().available, Some(2500.0));
    }

    #[test]
    fn missing_balance_and_resources_are_zero() {
        let account: AccountResponse =
            serde_json::from_str(r#"{"address": "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"}"#).unwrap();
        let resources: AccountResourceResponse =
            serde_json::from_str(r#"{"freeNetLimit": 600}"#).unwrap();

        let info = account_info(account, resources).unwrap();

        assert_eq!(info.balance, Some(0.0));
        assert_eq!(info.bandwidth.unwrap().available, Some(600.0));
        assert_eq!(info.energy.unwrap().available, Some(0.0));
    }

    #[test]
    fn requires_a_node() {
        assert!(TronGridClient::new(&[], None, Duration::from_secs(1)).is_err());
    }
}
