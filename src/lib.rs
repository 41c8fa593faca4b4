//! Typed OnSched REST client with OAuth 2.0 client-credentials token management.
//!
//! [`Client`](client::Client) resolves sandbox/production hosts, lazily exchanges client
//! credentials for bearer tokens (single-flight, cached until the preemptive window), and
//! maps the company endpoint's JSON model to strongly typed records.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod codec;
pub mod company;
pub mod config;
pub mod env;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod session;
pub mod webhook;

mod _prelude {
	pub use std::{
		collections::hash_map::DefaultHasher,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::{Hash, Hasher},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::Client;
pub use company::Company;
pub use config::ClientConfig;
pub use env::{Endpoints, Environment};
pub use error::{Error, ErrorKind, Result};
pub use reqwest;
pub use url;
pub use webhook::WebhookSettings;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
