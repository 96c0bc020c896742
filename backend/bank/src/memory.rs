//! # In-memory backend
//!
//! Holds accounts, access tokens and the three tables in process memory.
//!
//! Mirrors what the hosted service does for us:
//! - equality filters, ordering (timestamps and numbers compare by value), limits
//! - embedded relations, see [`Table::relation`]
//! - row visibility: associates only see and touch their own `profiles` and
//!   `subscriptions` rows, admins see everything, plans are public to read
//! - the signup trigger that creates an empty, inactive profile
//!
//! Nothing is persisted. Restarting loses every account.
use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use rand::{RngCore, rngs::OsRng};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::{
    Backend, BankError, Row,
    models::{AuthSession, AuthUser, Role},
    rest::{Column, Filter, Select, Table},
    tables::default_plans,
};

const MIN_PASSWORD: usize = 6;

struct Account {
    user: AuthUser,
    password_digest: String,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    tables: HashMap<Table, Vec<Row>>,
}

#[derive(Default)]
pub struct MemoryBank {
    store: RwLock<Store>,
}

fn digest(password: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(password.as_bytes()))
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn random_id() -> String {
    Uuid::new_v4().to_string()
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn rejected(status: u16, message: &str) -> BankError {
    BankError::Rejected {
        status,
        message: message.to_string(),
    }
}

/// Filter text of a cell, the way it appears after `eq.` in a query.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|filter| row.get(&filter.column).map(text).as_deref() == Some(filter.value.as_str()))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) if !a.is_null() && !b.is_null() => (a, b),
        (a, b) => {
            // Nulls last when ascending, first when descending.
            let present = |v: Option<&Value>| v.is_some_and(|v| !v.is_null());
            return present(b).cmp(&present(a));
        }
    };

    let (a, b) = (text(a), text(b));

    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(&a),
        DateTime::parse_from_rfc3339(&b),
    ) {
        return a.cmp(&b);
    }

    if let (Ok(a), Ok(b)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }

    a.cmp(&b)
}

impl Store {
    fn caller(&self, token: Option<&str>) -> Option<&AuthUser> {
        let user_id = self.tokens.get(token?)?;

        self.accounts
            .iter()
            .map(|account| &account.user)
            .find(|user| &user.id == user_id)
    }

    fn rows(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn project(&self, table: Table, row: &Row, columns: &[Column]) -> Row {
        let mut projected = Row::new();

        for column in columns {
            match column {
                Column::All => projected.extend(row.clone()),
                Column::Field(name) => {
                    projected.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
                }
                Column::Embed {
                    table: embedded,
                    columns: inner,
                } => {
                    let related = table.relation(*embedded).and_then(|(local, foreign)| {
                        let key = row.get(local).map(text)?;

                        self.rows(*embedded)
                            .iter()
                            .find(|candidate| candidate.get(foreign).map(text).as_deref() == Some(key.as_str()))
                    });

                    let value = related
                        .map(|found| Value::Object(self.project(*embedded, found, inner)))
                        .unwrap_or(Value::Null);

                    projected.insert(embedded.as_str().to_string(), value);
                }
            }
        }

        projected
    }
}

/// Whether `caller` may see or change `row`, standing in for row level security.
fn visible(caller: Option<&AuthUser>, table: Table, row: &Row) -> bool {
    match (table, caller) {
        (Table::MembershipPlans, _) => true,
        (_, None) => false,
        (_, Some(user)) if user.role == Role::Admin => true,
        (_, Some(user)) => row.get("user_id").map(text).as_deref() == Some(user.id.as_str()),
    }
}

fn writable(caller: &AuthUser, table: Table, row: &Row) -> bool {
    match table {
        Table::MembershipPlans => caller.role == Role::Admin,
        _ => visible(Some(caller), table, row),
    }
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank with the default plan catalog in place.
    pub fn seeded() -> Self {
        let bank = Self::new();

        {
            let mut store = bank.store.write();
            let plans = store.tables.entry(Table::MembershipPlans).or_default();

            for seed in default_plans() {
                if let Value::Object(mut row) = seed.row() {
                    row.insert("id".to_string(), Value::String(random_id()));
                    plans.push(row);
                }
            }
        }

        bank
    }

    pub fn with_admin(self, email: &str, password: &str) -> Self {
        self.store.write().accounts.push(Account {
            user: AuthUser {
                id: random_id(),
                email: email.trim().to_lowercase(),
                role: Role::Admin,
            },
            password_digest: digest(password),
        });

        info!("Seeded admin account {email}");
        self
    }
}

#[async_trait]
impl Backend for MemoryBank {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BankError> {
        let email = email.trim().to_lowercase();
        let mut store = self.store.write();

        let user = store
            .accounts
            .iter()
            .find(|account| account.user.email == email && account.password_digest == digest(password))
            .map(|account| account.user.clone())
            .ok_or_else(|| rejected(400, "Invalid login credentials"))?;

        let access_token = random_token();
        store.tokens.insert(access_token.clone(), user.id.clone());

        Ok(AuthSession { access_token, user })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), BankError> {
        let email = email.trim().to_lowercase();

        if password.chars().count() < MIN_PASSWORD {
            return Err(rejected(422, "Password should be at least 6 characters."));
        }

        let mut store = self.store.write();

        if store.accounts.iter().any(|account| account.user.email == email) {
            return Err(rejected(422, "User already registered"));
        }

        let user = AuthUser {
            id: random_id(),
            email,
            role: Role::Associate,
        };

        let profile = json!({
            "user_id": user.id,
            "salon_name": null,
            "owner_name": null,
            "mobile": null,
            "city": null,
            "address": null,
            "services": null,
            "is_active": false,
            "created_at": timestamp(Utc::now()),
        });

        if let Value::Object(row) = profile {
            store.tables.entry(Table::Profiles).or_default().push(row);
        }

        store.accounts.push(Account {
            user,
            password_digest: digest(password),
        });

        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BankError> {
        self.store.write().tokens.remove(access_token);
        Ok(())
    }

    async fn select(&self, token: Option<&str>, query: &Select) -> Result<Vec<Row>, BankError> {
        let store = self.store.read();
        let caller = store.caller(token);

        if caller.is_none() && query.table != Table::MembershipPlans {
            return Err(BankError::Unauthorized);
        }

        let mut rows: Vec<&Row> = store
            .rows(query.table)
            .iter()
            .filter(|row| visible(caller, query.table, row) && matches(row, &query.filters))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending { ordering } else { ordering.reverse() }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows
            .into_iter()
            .map(|row| store.project(query.table, row, &query.columns))
            .collect())
    }

    async fn insert(&self, token: &str, table: Table, row: Value) -> Result<(), BankError> {
        let Value::Object(mut row) = row else {
            return Err(rejected(400, "Row must be an object"));
        };

        let mut store = self.store.write();
        let caller = store.caller(Some(token)).cloned().ok_or(BankError::Unauthorized)?;

        if !writable(&caller, table, &row) {
            return Err(rejected(403, "new row violates row-level security policy"));
        }

        if table != Table::Profiles {
            row.entry("id").or_insert_with(|| Value::String(random_id()));
        }
        row.entry("created_at").or_insert_with(|| timestamp(Utc::now()));

        store.tables.entry(table).or_default().push(row);
        Ok(())
    }

    async fn update(
        &self,
        token: &str,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<usize, BankError> {
        let Value::Object(patch) = patch else {
            return Err(rejected(400, "Patch must be an object"));
        };

        let mut store = self.store.write();
        let caller = store.caller(Some(token)).cloned().ok_or(BankError::Unauthorized)?;

        let mut changed = 0;
        for row in store.tables.entry(table).or_default().iter_mut() {
            if matches(row, filters) && writable(&caller, table, row) {
                row.extend(patch.clone());
                changed += 1;
            }
        }

        Ok(changed)
    }
}
