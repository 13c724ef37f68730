//! Backend adapters for the fetch capability.

#[cfg(feature = "env")]
mod env;
#[cfg(feature = "gcp")]
mod gcp;
mod memory;
mod nosecrets;

#[cfg(feature = "env")]
pub use env::EnvProvider;
#[cfg(feature = "gcp")]
pub use gcp::GcpProvider;
pub use memory::MemoryProvider;
pub use nosecrets::NoSecretsProvider;
