//! # Bank
//!
//! Everything the site knows about associates, plans and subscriptions lives
//! in a hosted backend. This crate is the only thing that talks to it.
//!
//! ## Layers
//! - [`Backend`]: the two external collaborators, auth (sign in/up/out) and
//!   generic table rows (select/insert/update with equality filters).
//! - [`remote::RemoteBank`]: the hosted service over HTTP.
//! - [`memory::MemoryBank`]: same semantics in-process, for local runs and tests.
//! - [`tables`]: typed reads and writes built on top of [`Backend`].
//!
//! ## Tables
//! - `profiles`: one row per associate, keyed by `user_id`
//! - `membership_plans`: the plan catalog, public
//! - `subscriptions`: `user_id` + `plan_id` with a start and end date
use async_trait::async_trait;
use serde_json::Value;

pub mod error;
pub mod memory;
pub mod models;
pub mod remote;
pub mod rest;
pub mod tables;

pub use error::BankError;
use models::AuthSession;
use rest::{Filter, Select, Table};

pub type Row = serde_json::Map<String, Value>;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BankError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), BankError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BankError>;

    /// Rows matching every filter. `token` is `None` for anonymous reads.
    async fn select(&self, token: Option<&str>, query: &Select) -> Result<Vec<Row>, BankError>;

    async fn insert(&self, token: &str, table: Table, row: Value) -> Result<(), BankError>;

    /// Applies `patch` to every row matching `filters`, returns how many matched.
    async fn update(
        &self,
        token: &str,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<usize, BankError>;
}
