mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use store::{HistoryRecord, HistoryStore, NewHistoryRecord};

#[cfg(test)]
pub use store::tests::memory_store;

pub const MAX_ADDRESS_LEN: usize = 42;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("{0}")]
    Validation(String),
    #[error("history record {0} not found")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Loosely typed input for a new record, the address may be missing.
#[derive(Debug, Clone, Default)]
pub struct HistoryFields {
    pub address: Option<String>,
    pub bandwidth: Option<f64>,
    pub energy: Option<f64>,
    pub balance: Option<f64>,
}

impl TryFrom<HistoryFields> for NewHistoryRecord {
    type Error = HistoryError;

    fn try_from(fields: HistoryFields) -> Result<Self, Self::Error> {
        let address = fields
            .address
            .filter(|address| !address.trim().is_empty())
            .ok_or_else(|| HistoryError::Validation("address is required".to_string()))?;

        if address.chars().count() > MAX_ADDRESS_LEN {
            return Err(HistoryError::Validation(format!(
                "address is longer than {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        Ok(NewHistoryRecord {
            address,
            bandwidth: fields.bandwidth,
            energy: fields.energy,
            balance: fields.balance,
        })
    }
}

/// Read-only view of a record as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub address: String,
    pub bandwidth: Option<f64>,
    pub energy: Option<f64>,
    pub balance: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryView {
    fn from(record: HistoryRecord) -> Self {
        Self {
            address: record.address,
            bandwidth: record.bandwidth,
            energy: record.energy,
            balance: record.balance,
            timestamp: record.timestamp,
        }
    }
}

fn page_offset(page: i64, per_page: i64) -> Result<i64, HistoryError> {
    if page < 1 || per_page < 1 {
        return Err(HistoryError::Validation(
            "page and per_page must be at least 1".to_string(),
        ));
    }
    (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| HistoryError::Validation("page is out of range".to_string()))
}

#[async_trait]
pub trait HistoryRepository {
    async fn add_one(&self, fields: HistoryFields) -> Result<i64, HistoryError>;
    async fn get_one(&self, id: i64) -> Result<HistoryView, HistoryError>;
    /// Pages start at 1, newest records first.
    async fn get_all(&self, page: i64, per_page: i64) -> Result<Vec<HistoryView>, HistoryError>;
}

pub struct StoreHistoryRepository {
    store: HistoryStore,
}

impl StoreHistoryRepository {
    pub fn new(store: HistoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HistoryRepository for StoreHistoryRepository {
    async fn add_one(&self, fields: HistoryFields) -> Result<i64, HistoryError> {
        let record = NewHistoryRecord::try_from(fields)?;
        self.store.insert(&record).await
    }

    async fn get_one(&self, id: i64) -> Result<HistoryView, HistoryError> {
        self.store.get_by_id(id).await.map(Into::into)
    }

    async fn get_all(&self, page: i64, per_page: i64) -> Result<Vec<HistoryView>, HistoryError> {
        let offset = page_offset(page, per_page)?;
        self.store
            .list_page(offset, per_page)
            .await
            .map(|records| records.into_iter().map(Into::into).collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    async fn repository() -> StoreHistoryRepository {
        StoreHistoryRepository::new(memory_store().await)
    }

    fn fields(address: &str) -> HistoryFields {
        HistoryFields {
            address: Some(address.to_string()),
            bandwidth: Some(100.0),
            energy: Some(50.0),
            balance: Some(1000.0),
        }
    }

    #[tokio::test]
    async fn add_then_get_one() {
        let repository = repository().await;

        let id = repository.add_one(fields("test_address_1")).await.unwrap();
        let view = repository.get_one(id).await.unwrap();

        assert_eq!(view.address, "test_address_1");
        assert_eq!(view.bandwidth, Some(100.0));
        assert_eq!(view.energy, Some(50.0));
        assert_eq!(view.balance, Some(1000.0));
    }

    #[tokio::test]
    async fn missing_address_is_a_validation_error() {
        let repository = repository().await;

        let missing = repository.add_one(HistoryFields::default()).await;
        let blank = repository.add_one(fields("   ")).await;

        assert!(matches!(missing, Err(HistoryError::Validation(_))));
        assert!(matches!(blank, Err(HistoryError::Validation(_))));
        assert!(repository.get_all(1, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overlong_address_is_a_validation_error() {
        let repository = repository().await;

        let result = repository.add_one(fields(&"T".repeat(43))).await;

        assert!(matches!(result, Err(HistoryError::Validation(_))));
    }

    #[tokio::test]
    async fn get_one_missing_is_not_found() {
        let repository = repository().await;

        assert!(matches!(
            repository.get_one(7).await,
            Err(HistoryError::NotFound(7))
        ));
    }

    #[tokio::test]
    async fn rejects_pages_below_one() {
        let repository = repository().await;

        assert!(matches!(
            repository.get_all(0, 10).await,
            Err(HistoryError::Validation(_))
        ));
        assert!(matches!(
            repository.get_all(1, 0).await,
            Err(HistoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn offset_overflow_is_a_validation_error() {
        let repository = repository().await;
        let in_memory = test_repository::InMemoryHistoryRepository::default();

        assert!(matches!(
            repository.get_all(i64::MAX, 2).await,
            Err(HistoryError::Validation(_))
        ));
        assert!(matches!(
            in_memory.get_all(i64::MAX, 2).await,
            Err(HistoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn pages_do_not_overlap() {
        let repository = repository().await;
        for i in 0..7 {
            repository
                .add_one(fields(&format!("address_{}", i)))
                .await
                .unwrap();
        }

        let everything = repository.get_all(1, 100).await.unwrap();
        for per_page in 1..=4 {
            let mut concatenated = Vec::new();
            for page in 1..=10 {
                concatenated.extend(repository.get_all(page, per_page).await.unwrap());
            }
            assert_eq!(concatenated, everything);
        }
    }

    #[tokio::test]
    async fn get_all_is_idempotent() {
        let repository = repository().await;
        for i in 0..3 {
            repository
                .add_one(fields(&format!("address_{}", i)))
                .await
                .unwrap();
        }

        let first = repository.get_all(1, 2).await.unwrap();
        let second = repository.get_all(1, 2).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn in_memory_repository_orders_like_the_store() {
        let repository = test_repository::InMemoryHistoryRepository::default();
        for i in 1..=3 {
            repository
                .add_one(fields(&format!("address_{}", i)))
                .await
                .unwrap();
        }

        let page = repository.get_all(1, 2).await.unwrap();
        let addresses: Vec<_> = page.iter().map(|v| v.address.as_str()).collect();

        assert_eq!(addresses, vec!["address_3", "address_2"]);
        assert!(repository.get_all(3, 2).await.unwrap().is_empty());
    }
}
