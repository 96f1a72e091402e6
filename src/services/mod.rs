//! Business logic: credential store capability and the account flows.

pub mod account;
pub mod credentials;

pub use account::AccountService;
pub use credentials::CredentialStore;
