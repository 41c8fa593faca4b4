//! Access token models held by the session cache.

pub mod record;
pub mod secret;
