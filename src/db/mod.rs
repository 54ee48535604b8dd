pub mod db;
pub mod jobdb;
pub mod memory;
pub mod notificationdb;
pub mod userdb;
pub mod walletdb;

pub use db::DBClient;
pub use jobdb::JobExt;
pub use memory::MemoryStore;
pub use notificationdb::NotificationExt;
pub use userdb::UserExt;
pub use walletdb::WalletExt;

/// Everything the services need from a backend. Implemented by the
/// PostgreSQL client and by the in-process store.
pub trait Store: UserExt + JobExt + NotificationExt + WalletExt + Send + Sync + std::fmt::Debug {}

impl<T> Store for T where T: UserExt + JobExt + NotificationExt + WalletExt + Send + Sync + std::fmt::Debug {}
