use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    Backend, BankError, Row,
    models::{
        MembershipPlan, NewSubscription, Profile, ProfileUpdate, Subscription, SubscriptionStatus,
        SubscriptionWithPlan,
    },
    rest::{Filter, Select, Table},
};

const WITH_PLAN: &str = "*, membership_plans(*)";

fn decode<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, BankError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(BankError::from))
        .collect()
}

pub async fn profile(
    backend: &dyn Backend,
    token: &str,
    user_id: &str,
) -> Result<Option<Profile>, BankError> {
    let query = Select::from(Table::Profiles).eq("user_id", user_id).limit(1);
    let rows = backend.select(Some(token), &query).await?;

    Ok(decode(rows)?.into_iter().next())
}

pub async fn update_profile(
    backend: &dyn Backend,
    token: &str,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<usize, BankError> {
    backend
        .update(
            token,
            Table::Profiles,
            &[Filter::eq("user_id", user_id)],
            serde_json::to_value(update)?,
        )
        .await
}

/// Every associate, newest first.
pub async fn associates(backend: &dyn Backend, token: &str) -> Result<Vec<Profile>, BankError> {
    let query = Select::from(Table::Profiles).order("created_at", false);

    decode(backend.select(Some(token), &query).await?)
}

pub async fn set_active(
    backend: &dyn Backend,
    token: &str,
    user_id: &str,
    active: bool,
) -> Result<usize, BankError> {
    backend
        .update(
            token,
            Table::Profiles,
            &[Filter::eq("user_id", user_id)],
            json!({ "is_active": active }),
        )
        .await
}

/// The public plan catalog, cheapest first.
pub async fn plans(backend: &dyn Backend) -> Result<Vec<MembershipPlan>, BankError> {
    let query = Select::from(Table::MembershipPlans).order("price", true);

    decode(backend.select(None, &query).await?)
}

pub async fn plan(backend: &dyn Backend, plan_id: &str) -> Result<Option<MembershipPlan>, BankError> {
    let query = Select::from(Table::MembershipPlans).eq("id", plan_id).limit(1);

    Ok(decode(backend.select(None, &query).await?)?.into_iter().next())
}

/// Latest active subscription of one associate, with its plan.
pub async fn active_subscription(
    backend: &dyn Backend,
    token: &str,
    user_id: &str,
) -> Result<Option<SubscriptionWithPlan>, BankError> {
    let query = Select::from(Table::Subscriptions)
        .columns(WITH_PLAN)?
        .eq("user_id", user_id)
        .eq("status", SubscriptionStatus::Active.as_str())
        .order("start_date", false)
        .limit(1);

    Ok(decode(backend.select(Some(token), &query).await?)?.into_iter().next())
}

/// Every subscription with its plan, newest first.
pub async fn subscriptions(
    backend: &dyn Backend,
    token: &str,
) -> Result<Vec<SubscriptionWithPlan>, BankError> {
    let query = Select::from(Table::Subscriptions)
        .columns(WITH_PLAN)?
        .order("start_date", false);

    decode(backend.select(Some(token), &query).await?)
}

pub async fn subscribe(
    backend: &dyn Backend,
    token: &str,
    user_id: &str,
    plan: &MembershipPlan,
    now: DateTime<Utc>,
) -> Result<NewSubscription, BankError> {
    let subscription = NewSubscription::for_plan(user_id, plan, now);

    backend
        .insert(token, Table::Subscriptions, serde_json::to_value(&subscription)?)
        .await?;

    debug!("Subscribed {user_id} to {} until {}", plan.name, subscription.end_date);
    Ok(subscription)
}

/// Marks active subscriptions whose end date has passed as expired.
pub async fn expire_lapsed(
    backend: &dyn Backend,
    token: &str,
    now: DateTime<Utc>,
) -> Result<usize, BankError> {
    let query = Select::from(Table::Subscriptions)
        .eq("status", SubscriptionStatus::Active.as_str())
        .order("end_date", true);

    let active: Vec<Subscription> =
        decode(backend.select(Some(token), &query).await?)?;

    let mut expired = 0;
    for subscription in active.iter().filter(|s| s.end_date <= now) {
        expired += backend
            .update(
                token,
                Table::Subscriptions,
                &[Filter::eq("id", &subscription.id)],
                json!({ "status": SubscriptionStatus::Expired.as_str() }),
            )
            .await?;
    }

    Ok(expired)
}

/// A plan to seed, without the backend-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSeed {
    pub name: &'static str,
    pub plan_type: &'static str,
    pub price: Decimal,
    pub duration_months: u32,
    pub features: &'static [&'static str],
}

impl PlanSeed {
    pub fn row(&self) -> Value {
        json!({
            "name": self.name,
            "plan_type": self.plan_type,
            "price": self.price,
            "duration_months": self.duration_months,
            "features": self.features,
        })
    }
}

pub fn default_plans() -> Vec<PlanSeed> {
    vec![
        PlanSeed {
            name: "Starter Plan",
            plan_type: "basic",
            price: Decimal::new(999, 0),
            duration_months: 1,
            features: &[
                "Digital marketing support",
                "Listing on the Gauranshi associate network",
                "Access to the associate dashboard",
                "Monthly social media templates",
            ],
        },
        PlanSeed {
            name: "Growth Plan",
            plan_type: "growth",
            price: Decimal::new(4999, 0),
            duration_months: 6,
            features: &[
                "Everything in Starter",
                "Priority lead generation",
                "10 premium social media templates every month",
                "Dedicated marketing campaigns",
                "Featured placement in city listings",
            ],
        },
    ]
}

/// Default plans not in the catalog yet, matched by name.
pub async fn missing_plans(backend: &dyn Backend) -> Result<Vec<PlanSeed>, BankError> {
    let existing = plans(backend).await?;

    Ok(default_plans()
        .into_iter()
        .filter(|seed| !existing.iter().any(|plan| plan.name == seed.name))
        .collect())
}
