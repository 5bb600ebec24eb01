mod grid;

pub use grid::TronGridClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Version byte every TRON address starts with.
const ADDRESS_PREFIX: u8 = 0x41;
/// Prefix byte plus the 20 byte account hash.
const ADDRESS_BYTES: usize = 21;
const BASE58_ADDRESS_LEN: usize = 34;
const HEX_ADDRESS_LEN: usize = 42;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountResource {
    pub available: Option<f64>,
}

/// Account state as reported by a network node. Any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountInfo {
    /// Balance in sun.
    pub balance: Option<f64>,
    pub bandwidth: Option<AccountResource>,
    pub energy: Option<AccountResource>,
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.balance.is_none() && self.bandwidth.is_none() && self.energy.is_none()
    }
}

#[async_trait]
pub trait AccountSource {
    fn is_address(&self, address: &str) -> bool;

    /// `Ok(None)` when the network does not know the account.
    async fn get_account(&self, address: &str) -> Result<Option<AccountInfo>>;
}

/// Accepts base58check (`T...`) and hex (`41...`) encoded addresses.
pub fn is_valid_address(address: &str) -> bool {
    match address.len() {
        BASE58_ADDRESS_LEN => bs58::decode(address)
            .with_check(Some(ADDRESS_PREFIX))
            .into_vec()
            .map_or(false, |bytes| bytes.len() == ADDRESS_BYTES),
        HEX_ADDRESS_LEN => hex::decode(address).map_or(false, |bytes| {
            bytes.len() == ADDRESS_BYTES && bytes[0] == ADDRESS_PREFIX
        }),
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_base58_address() {
        assert!(is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
    }

    #[test]
    fn rejects_bad_checksum() {
        // last character changed
        assert!(!is_valid_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u"));
    }

    #[test]
    fn accepts_hex_address() {
        assert!(is_valid_address(
            "41a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        ));
    }

    #[test]
    fn rejects_hex_with_wrong_prefix() {
        assert!(!is_valid_address(
            "42a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        ));
        assert!(!is_valid_address(
            "41z614f803b6fd780986a42c78ec9c7f77e6ded13c"
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("invalid"));
        assert!(!is_valid_address("0x71C7656EC7ab88b098defB751B7401B5f6d8976F"));
    }

    #[test]
    fn empty_account_info() {
        assert!(AccountInfo::default().is_empty());
        assert!(!AccountInfo {
            balance: Some(0.0),
            ..Default::default()
        }
        .is_empty());
    }
}
