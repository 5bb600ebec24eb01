use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    history::{HistoryError, HistoryFields, HistoryRepository, HistoryView},
    tron::{AccountInfo, AccountResource, AccountSource},
};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0:#}")]
    Upstream(anyhow::Error),
    #[error("storage error: {0}")]
    Storage(sqlx::Error),
}

impl From<HistoryError> for LookupError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Validation(message) => LookupError::Validation(message),
            HistoryError::NotFound(_) => LookupError::NotFound(err.to_string()),
            HistoryError::Storage(err) => LookupError::Storage(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressView {
    pub address: String,
    pub bandwidth: Option<f64>,
    pub energy: Option<f64>,
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub page: i64,
    pub per_page: i64,
    pub logs: Vec<HistoryView>,
}

/// Missing upstream values count as zero here, unlike in the store where they stay null.
fn extract_fields(address: &str, account: &AccountInfo) -> HistoryFields {
    let available = |resource: &Option<AccountResource>| {
        resource
            .as_ref()
            .and_then(|resource| resource.available)
            .unwrap_or(0.0)
    };

    HistoryFields {
        address: Some(address.to_string()),
        balance: Some(account.balance.unwrap_or(0.0)),
        bandwidth: Some(available(&account.bandwidth)),
        energy: Some(available(&account.energy)),
    }
}

pub struct LookupService {
    history: Arc<dyn HistoryRepository + Send + Sync>,
    accounts: Arc<dyn AccountSource + Send + Sync>,
}

impl LookupService {
    pub fn new(
        history: Arc<dyn HistoryRepository + Send + Sync>,
        accounts: Arc<dyn AccountSource + Send + Sync>,
    ) -> Self {
        Self { history, accounts }
    }

    /// Fetches the account, records the lookup and returns what was recorded.
    pub async fn perform_lookup(&self, address: &str) -> Result<AddressView, LookupError> {
        let address = address.trim();

        if !self.accounts.is_address(address) {
            return Err(LookupError::Validation("Invalid address".to_string()));
        }

        let account = self
            .accounts
            .get_account(address)
            .await
            .map_err(|err| {
                warn!(address, "failed to fetch account: {:#}", err);
                LookupError::Upstream(err)
            })?
            .filter(|account| !account.is_empty())
            .ok_or_else(|| LookupError::NotFound("Account not found".to_string()))?;

        let fields = extract_fields(address, &account);
        let view = AddressView {
            address: address.to_string(),
            bandwidth: fields.bandwidth,
            energy: fields.energy,
            balance: fields.balance,
        };

        let id = self.history.add_one(fields).await?;

        info!(id, address, "recorded account lookup");

        Ok(view)
    }

    pub async fn list_history(&self, page: i64, per_page: i64) -> Result<HistoryPage, LookupError> {
        let logs = self.history.get_all(page, per_page).await?;
        Ok(HistoryPage {
            page,
            per_page,
            logs,
        })
    }

    pub async fn history_entry(&self, id: i64) -> Result<HistoryView, LookupError> {
        self.history.get_one(id).await.map_err(Into::into)
    }
}
