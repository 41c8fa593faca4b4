//! Scope sets, redacted secrets, and cached token records.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{record::*, secret::*};
