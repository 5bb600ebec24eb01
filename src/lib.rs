mod env;
mod history;
mod log;
mod lookup;
mod serve;
mod tron;

pub use history::{
    HistoryError, HistoryFields, HistoryRecord, HistoryRepository, HistoryStore, HistoryView,
    NewHistoryRecord, StoreHistoryRepository,
};
pub use lookup::{AddressView, HistoryPage, LookupError, LookupService};
pub use serve::{router, start_server, AppState};
pub use tron::{is_valid_address, AccountInfo, AccountResource, AccountSource, TronGridClient};
