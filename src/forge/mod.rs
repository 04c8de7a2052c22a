//! Laravel Forge REST client

mod client;
mod error;
mod types;

pub use client::{ForgeClient, ForgeResult};
pub use error::ForgeError;
pub use types::*;
