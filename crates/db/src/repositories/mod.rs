//! Repository abstractions for data access.

pub mod transaction;
pub mod wallet;

pub use transaction::TransactionRepository;
pub use wallet::WalletRepository;
