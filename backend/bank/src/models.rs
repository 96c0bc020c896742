use std::sync::LazyLock;

use chrono::{DateTime, Months, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

pub fn is_email(input: &str) -> bool {
    EMAIL.is_match(input.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Associate,
    Admin,
}

impl Role {
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Associate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub salon_name: Option<String>,
    pub owner_name: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub services: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|value| !value.trim().is_empty())
}

impl Profile {
    /// Salon, owner, mobile and city are what gets an associate listed.
    pub fn is_complete(&self) -> bool {
        filled(&self.salon_name) && filled(&self.owner_name) && filled(&self.mobile) && filled(&self.city)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub salon_name: String,
    pub owner_name: String,
    pub mobile: String,
    pub city: String,
    pub address: String,
    pub services: String,
}

impl ProfileUpdate {
    pub fn from_profile(profile: &Profile) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();

        Self {
            salon_name: text(&profile.salon_name),
            owner_name: text(&profile.owner_name),
            mobile: text(&profile.mobile),
            city: text(&profile.city),
            address: text(&profile.address),
            services: text(&profile.services),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.salon_name.trim().is_empty() || self.owner_name.trim().is_empty() {
            return Err("Salon name and owner name are required");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: String,
    pub name: String,
    pub plan_type: String,
    pub price: Decimal,
    pub duration_months: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

impl MembershipPlan {
    pub fn is_popular(&self) -> bool {
        self.plan_type == "growth"
    }

    pub fn period_label(&self) -> String {
        let plural = if self.duration_months > 1 { "s" } else { "" };
        format!("{} month{plural}", self.duration_months)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Subscription {
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        days_remaining(self.end_date, now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionWithPlan {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub membership_plans: MembershipPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewSubscription {
    pub fn for_plan(user_id: &str, plan: &MembershipPlan, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            plan_id: plan.id.clone(),
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: expiry(now, plan.duration_months),
        }
    }
}

/// `start` plus whole calendar months, clamped to the last day of a shorter month. Jan 31 plus
/// one month is Feb 28, it never rolls over into March.
pub fn expiry(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole days left, rounded up, never negative.
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (end - now).num_milliseconds();

    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}
