//! # Table Queries
//!
//! Rows-in/rows-out requests against the hosted tables.
//!
//! A [`Select`] is a small description of one read: which table, which columns
//! (including embedded relations such as `membership_plans(name, price)`),
//! equality filters, an optional ordering and an optional limit. The remote
//! backend renders it into PostgREST query pairs, the memory backend
//! interprets it directly.
//!
//! ## Relations
//! - `subscriptions.plan_id` -> `membership_plans.id`
//! - `subscriptions.user_id` -> `profiles.user_id`
use std::{fmt, str::FromStr};

use crate::error::BankError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    MembershipPlans,
    Subscriptions,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Profiles, Table::MembershipPlans, Table::Subscriptions];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::MembershipPlans => "membership_plans",
            Table::Subscriptions => "subscriptions",
        }
    }

    /// Join columns `(local, foreign)` used when `embedded` is nested under `self`.
    pub fn relation(self, embedded: Table) -> Option<(&'static str, &'static str)> {
        match (self, embedded) {
            (Table::Subscriptions, Table::MembershipPlans) => Some(("plan_id", "id")),
            (Table::Subscriptions, Table::Profiles) => Some(("user_id", "user_id")),
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| BankError::UnknownTable(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    All,
    Field(String),
    Embed { table: Table, columns: Vec<Column> },
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::All => f.write_str("*"),
            Column::Field(name) => f.write_str(name),
            Column::Embed { table, columns } => write!(f, "{table}({})", join(columns)),
        }
    }
}

fn join(columns: &[Column]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a column spec like `*, membership_plans(name, price)`.
pub fn parse_columns(spec: &str) -> Result<Vec<Column>, BankError> {
    let mut columns = Vec::new();

    for part in split_top_level(spec)? {
        let part = part.trim();

        if part.is_empty() {
            return Err(BankError::MalformedSelect(spec.to_string()));
        }

        if part == "*" {
            columns.push(Column::All);
            continue;
        }

        match part.find('(') {
            Some(open) if part.ends_with(')') => {
                let table = part[..open].trim().parse()?;
                let inner = parse_columns(&part[open + 1..part.len() - 1])?;

                columns.push(Column::Embed {
                    table,
                    columns: inner,
                });
            }
            Some(_) => return Err(BankError::MalformedSelect(spec.to_string())),
            None if part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                columns.push(Column::Field(part.to_string()));
            }
            None => return Err(BankError::MalformedSelect(spec.to_string())),
        }
    }

    Ok(columns)
}

fn split_top_level(spec: &str) -> Result<Vec<&str>, BankError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in spec.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| BankError::MalformedSelect(spec.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(&spec[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(BankError::MalformedSelect(spec.to_string()));
    }

    parts.push(&spec[start..]);
    Ok(parts)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: Table,
    pub columns: Vec<Column>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            columns: vec![Column::All],
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, spec: &str) -> Result<Self, BankError> {
        self.columns = parse_columns(spec)?;
        Ok(self)
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// PostgREST query string pairs, in a stable order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), join(&self.columns))];

        pairs.extend(self.filters.iter().map(Filter::query_pair));

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_star_with_embed() {
        let columns = parse_columns("*, membership_plans(name, price)").unwrap();

        assert_eq!(
            columns,
            vec![
                Column::All,
                Column::Embed {
                    table: Table::MembershipPlans,
                    columns: vec![
                        Column::Field("name".to_string()),
                        Column::Field("price".to_string())
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_columns("name, (price").is_err());
        assert!(parse_columns("name,,price").is_err());
        assert!(parse_columns("bogus_table(*)").is_err());
        assert!(parse_columns("name; drop").is_err());
    }

    #[test]
    fn test_query_pairs() {
        let select = Select::from(Table::Subscriptions)
            .columns("*, membership_plans(*)")
            .unwrap()
            .eq("user_id", "abc")
            .eq("status", "active")
            .order("start_date", false)
            .limit(1);

        assert_eq!(
            select.query_pairs(),
            vec![
                ("select".to_string(), "*,membership_plans(*)".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("status".to_string(), "eq.active".to_string()),
                ("order".to_string(), "start_date.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            Table::Subscriptions.relation(Table::MembershipPlans),
            Some(("plan_id", "id"))
        );
        assert_eq!(Table::Profiles.relation(Table::Subscriptions), None);
        assert_eq!("profiles".parse::<Table>().unwrap(), Table::Profiles);
    }
}
