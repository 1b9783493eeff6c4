//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.

mod constants;
mod fixtures;
mod server;

pub use constants::*;
pub use server::TestServer;
