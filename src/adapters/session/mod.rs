//! Credential store adapters.

mod file_store;
mod in_memory;

pub use file_store::FileCredentialStore;
pub use in_memory::InMemoryCredentialStore;
