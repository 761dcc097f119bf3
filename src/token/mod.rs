mod duration;
mod memory;
mod persistent;
mod policy;
mod record;
mod store;

pub use duration::TokenDuration;
pub use memory::MemoryTokenStore;
pub use persistent::{DEFAULT_STORE_FILE, PersistentTokenStore, default_store_path};
pub use policy::{DEFAULT_EXPIRY_MARGIN, DEFAULT_REFRESH_THRESHOLD, RefreshPolicy};
pub use record::TokenRecord;
pub use store::TokenStore;
