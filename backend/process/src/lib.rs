//! # Operator Tasks
//!
//! Upkeep of the hosted backend that the website never does on its own.
//!
//! ## Commands
//! - `seed-plans`: inserts default membership plans missing from the catalog, matched by name.
//!   Plans already there are left alone, prices included.
//!
//! - `associates [--active]`: prints every associate with the plan of their latest subscription.
//!
//! - `expire`: marks active subscriptions whose end date has passed as expired. The dashboard
//!   counts days on its own, this only keeps the `status` column honest.
//!
//! ## Auth
//! Every command signs in with an admin email and password first. Row level security on the
//! backend only lets admins write plans and read other associates.
use anyhow::{Context, Result, bail};
use bank::{Backend, models::Role, rest::Table, tables};
use chrono::{DateTime, Utc};

pub mod utils;

use utils::{associate_rows, format_table, progress, spinner};

/// Signs in and returns the access token, refusing anyone who is not an admin.
pub async fn sign_in(backend: &dyn Backend, email: &str, password: &str) -> Result<String> {
    let session = backend
        .sign_in(email, password)
        .await
        .with_context(|| format!("Failed to sign in as {email}"))?;

    if session.user.role != Role::Admin {
        backend.sign_out(&session.access_token).await.ok();
        bail!("{email} is not an admin");
    }

    println!("Signed in as {}\n", session.user.email);
    Ok(session.access_token)
}

pub async fn seed_plans(backend: &dyn Backend, token: &str) -> Result<usize> {
    let missing = tables::missing_plans(backend)
        .await
        .context("Failed to load membership plans")?;

    if missing.is_empty() {
        println!("All default plans already present. Exiting.");
        return Ok(0);
    }

    let pb = progress(missing.len() as u64)?;

    for seed in &missing {
        pb.set_message(format!("Inserting {}", seed.name));

        backend
            .insert(token, Table::MembershipPlans, seed.row())
            .await
            .with_context(|| format!("Failed to insert {}", seed.name))?;

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("\nNew Plans: {}", missing.len());

    Ok(missing.len())
}

pub async fn list_associates(backend: &dyn Backend, token: &str, active_only: bool) -> Result<String> {
    let pb = spinner("Fetching associates")?;

    let associates = tables::associates(backend, token)
        .await
        .context("Failed to load associates")?;
    let subscriptions = tables::subscriptions(backend, token)
        .await
        .context("Failed to load subscriptions")?;

    pb.finish_and_clear();

    let rows = associate_rows(&associates, &subscriptions, active_only);
    let active = associates.iter().filter(|a| a.is_active).count();

    Ok(format!(
        "{}\nTotal Associates: {}\nActive: {}\nSubscriptions: {}",
        format_table(&rows),
        associates.len(),
        active,
        subscriptions.len()
    ))
}

pub async fn expire(backend: &dyn Backend, token: &str, now: DateTime<Utc>) -> Result<usize> {
    let pb = spinner("Expiring lapsed subscriptions")?;

    let expired = tables::expire_lapsed(backend, token, now)
        .await
        .context("Failed to expire subscriptions")?;

    pb.finish_with_message("Done");

    if expired == 0 {
        println!("No lapsed subscriptions found. Exiting.");
    } else {
        println!("Expired Subscriptions: {expired}");
    }

    Ok(expired)
}

#[cfg(test)]
mod tests {
    use bank::{
        memory::MemoryBank,
        models::{ProfileUpdate, SubscriptionStatus},
    };
    use chrono::Duration;

    use super::*;

    const ADMIN: (&str, &str) = ("admin@irasalon.com", "admin-secret");

    #[tokio::test]
    async fn test_only_admins_get_in() {
        let bank = MemoryBank::new().with_admin(ADMIN.0, ADMIN.1);
        bank.sign_up("owner@irasalon.com", "secret").await.unwrap();

        assert!(sign_in(&bank, ADMIN.0, ADMIN.1).await.is_ok());
        assert!(sign_in(&bank, "owner@irasalon.com", "secret").await.is_err());
        assert!(sign_in(&bank, ADMIN.0, "wrong").await.is_err());
    }

    #[tokio::test]
    async fn test_seed_plans_once() {
        let bank = MemoryBank::new().with_admin(ADMIN.0, ADMIN.1);
        let token = sign_in(&bank, ADMIN.0, ADMIN.1).await.unwrap();

        assert_eq!(seed_plans(&bank, &token).await.unwrap(), 2);
        assert_eq!(seed_plans(&bank, &token).await.unwrap(), 0);
        assert_eq!(tables::plans(&bank).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_and_expire() {
        let bank = MemoryBank::seeded().with_admin(ADMIN.0, ADMIN.1);
        bank.sign_up("owner@irasalon.com", "secret").await.unwrap();
        let owner = bank.sign_in("owner@irasalon.com", "secret").await.unwrap();

        let plan = tables::plans(&bank).await.unwrap().remove(0);
        let now = Utc::now();
        tables::subscribe(&bank, &owner.access_token, &owner.user.id, &plan, now - Duration::days(40))
            .await
            .unwrap();

        let token = sign_in(&bank, ADMIN.0, ADMIN.1).await.unwrap();
        tables::update_profile(
            &bank,
            &token,
            &owner.user.id,
            &ProfileUpdate {
                salon_name: "IRA Studio Dwarka".to_string(),
                owner_name: "Asha".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let listing = list_associates(&bank, &token, false).await.unwrap();
        assert!(listing.contains("IRA Studio Dwarka"));
        assert!(listing.contains("Starter Plan"));
        assert!(listing.contains("Total Associates: 1"));

        let active_only = list_associates(&bank, &token, true).await.unwrap();
        assert!(!active_only.contains("IRA Studio Dwarka"));

        assert_eq!(expire(&bank, &token, now).await.unwrap(), 1);
        assert_eq!(expire(&bank, &token, now).await.unwrap(), 0);

        let subscriptions = tables::subscriptions(&bank, &token).await.unwrap();
        assert_eq!(subscriptions[0].subscription.status, SubscriptionStatus::Expired);
    }
}
