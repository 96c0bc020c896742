//! Website of the Gauranshi Salons associate program.
//!
//!
//!
//! # General Infrastructure
//! - Marketing pages are rendered on the server from hard-coded copy
//! - Auth and data live in a hosted backend-as-a-service, spoken to over REST
//! - Sessions stay on this server, the browser only holds an opaque cookie
//! - `BACKEND_MODE=memory` swaps the hosted backend for an in-process one
//!
//!
//!
//! # Areas
//!
//! ## Public
//! Home, about, brands, services, become-associate, plans and contact.
//!
//! ## Associate
//! `/dashboard` with overview, salon profile, current plan and marketing templates.
//!
//! ## Admin
//! `/admin` lists every associate with their plan and lets an admin toggle them on or off.
//!
//!
//!
//! # Notes
//!
//! ## Flash messages
//! Every form posts, then redirects. The outcome rides along in the session and is shown
//! once on the next page. Validation failures skip the redirect and re-render the form
//! with a 422 so typed values survive.
//!
//! ## Expiry
//! A subscription ends `duration_months` calendar months after it starts. A start on a day
//! the end month lacks is clamped to that month's last day: Jan 31 plus one month is Feb 28
//! (Feb 29 in leap years), never Mar 3. Lapsed rows are only marked expired by
//! `process expire`, the dashboard shows them with 0 days left.
//!
//! ## Sessions
//! Sessions that expire are swept every `SESSION_SWEEP_SECS`. Any user still signed in on
//! one is signed out of the backend too, so its access token stops working.
//!
//!
//!
//! # Setup
//!
//! Run against the hosted backend.
//! ```sh
//! BACKEND_URL=https://project.example.co BACKEND_ANON_KEY=... cargo run -p gauranshi
//! ```
//!
//! Run with nothing but memory.
//! ```sh
//! BACKEND_MODE=memory ADMIN_EMAIL=admin@irasalon.com ADMIN_PASSWORD=changeme cargo run -p gauranshi
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{future::pending, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal, task::JoinHandle, time::interval};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod content;
pub mod error;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

use config::Config;
use error::AppError;
use routes::{
    about_handler, admin_handler, become_associate_handler, brands_handler, contact_handler,
    contact_submit_handler, dashboard_handler, health_handler, home_handler, login_handler,
    login_page_handler, logout_handler, not_found_handler, plans_handler, profile_handler,
    services_handler, signup_handler, signup_page_handler, stylesheet_handler, subscribe_handler,
    toggle_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/about", get(about_handler))
        .route("/brands", get(brands_handler))
        .route("/services", get(services_handler))
        .route("/become-associate", get(become_associate_handler))
        .route("/plans", get(plans_handler))
        .route("/plans/{plan_id}/subscribe", post(subscribe_handler))
        .route("/contact", get(contact_handler).post(contact_submit_handler))
        .route("/login", get(login_page_handler).post(login_handler))
        .route("/signup", get(signup_page_handler).post(signup_handler))
        .route("/logout", post(logout_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/profile", post(profile_handler))
        .route("/admin", get(admin_handler))
        .route("/admin/associates/{user_id}/toggle", post(toggle_handler))
        .route("/healthz", get(health_handler))
        .route("/static/site.css", get(stylesheet_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;
    sweep_sessions(state.clone());

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

/// Forgets expired sessions and revokes the backend tokens they held.
pub async fn purge_sessions(state: &AppState) -> usize {
    let signed_in = state.sessions.purge_expired();

    for user in &signed_in {
        if let Err(e) = state.backend.sign_out(&user.access_token).await {
            warn!("Failed to revoke token of {}: {e}", user.email);
        }
    }

    signed_in.len()
}

/// Runs [`purge_sessions`] every `SESSION_SWEEP_SECS`.
pub fn sweep_sessions(state: Arc<AppState>) -> JoinHandle<()> {
    let period = state.config.session_sweep.max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let before = state.sessions.len();
            let signed_out = purge_sessions(&state).await;
            let left = state.sessions.len();

            if left < before {
                debug!(
                    "Purged {} expired sessions ({signed_out} signed out), {left} left",
                    before - left
                );
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
