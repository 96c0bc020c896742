use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, Query, State, rejection::FormRejection},
    http::{StatusCode, Uri, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect, Response},
};
use bank::{
    BankError,
    models::{ProfileUpdate, is_email},
    tables,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    pages::{self, AdminView, Chrome, ContactForm, DashboardView, Tab},
    session::{
        Admin, Associate, Flash, SessionUser, Visitor, redirect_with, sign_in_redirect,
        sign_out_redirect,
    },
    state::AppState,
};

const SITE_CSS: &str = include_str!("../static/site.css");
const MIN_PASSWORD: usize = 6;

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        debug!("Rejected form: {rejection}");
        AppError::MalformedPayload
    }
}

fn render(visitor: &Visitor, path: &str, title: &str, body: &str, flash: Option<Flash>) -> Html<String> {
    pages::render(
        Chrome {
            path,
            user: visitor.user.as_ref(),
            flash,
        },
        title,
        body,
    )
}

fn page(state: &AppState, visitor: &Visitor, path: &str, title: &str, body: &str) -> Html<String> {
    render(visitor, path, title, body, visitor.take_flash(&state.sessions))
}

/// Form re-rendered with an error in place of the usual redirect.
fn invalid(visitor: &Visitor, path: &str, title: &str, body: &str, message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        render(visitor, path, title, body, Some(Flash::error(message))),
    )
        .into_response()
}

/// An expired backend token ends the session, anything else is an error page.
fn backend_failure(state: &AppState, visitor: &Visitor, e: BankError) -> Response {
    match e {
        BankError::Unauthorized => {
            if let Some(id) = visitor.session_id.as_deref() {
                state.sessions.end(id);
            }

            let anonymous = Visitor {
                session_id: None,
                user: None,
            };
            redirect_with(
                &state.sessions,
                &anonymous,
                "/login",
                Flash::info("Your session has expired. Please login again."),
            )
        }
        e => AppError::Backend(e).into_response(),
    }
}

pub async fn home_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Html<String> {
    page(&state, &visitor, "/", "Home", &pages::home())
}

pub async fn about_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Html<String> {
    page(&state, &visitor, "/about", "About Us", &pages::about())
}

pub async fn brands_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Html<String> {
    page(&state, &visitor, "/brands", "Our Brands", &pages::brands())
}

pub async fn services_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Html<String> {
    page(&state, &visitor, "/services", "Services", &pages::services())
}

pub async fn become_associate_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
) -> Html<String> {
    page(
        &state,
        &visitor,
        "/become-associate",
        "Become Associate",
        &pages::become_associate(),
    )
}

pub async fn plans_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
) -> Result<Html<String>, AppError> {
    let plans = tables::plans(state.backend.as_ref()).await?;

    Ok(page(&state, &visitor, "/plans", "Membership Plans", &pages::plans(&plans)))
}

pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    Path(plan_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(user) = visitor.user.as_ref() else {
        return Ok(redirect_with(
            &state.sessions,
            &visitor,
            "/login",
            Flash::info("Please login to subscribe"),
        ));
    };

    let backend = state.backend.as_ref();
    let plan = tables::plan(backend, &plan_id).await?.ok_or(AppError::NotFound)?;

    match tables::subscribe(backend, &user.access_token, &user.id, &plan, Utc::now()).await {
        Ok(subscription) => {
            info!("{} subscribed to {} until {}", user.email, plan.name, subscription.end_date);

            Ok(redirect_with(
                &state.sessions,
                &visitor,
                "/dashboard",
                Flash::success(format!("Subscribed to {}!", plan.name)),
            ))
        }
        Err(BankError::Unauthorized) => Ok(backend_failure(&state, &visitor, BankError::Unauthorized)),
        Err(e) => {
            warn!("Failed to subscribe {} to {plan_id}: {e}", user.email);

            Ok(redirect_with(
                &state.sessions,
                &visitor,
                "/plans",
                Flash::error("Failed to subscribe. Please try again."),
            ))
        }
    }
}

pub async fn contact_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Html<String> {
    page(&state, &visitor, "/contact", "Contact Us", &pages::contact(&ContactForm::default()))
}

pub async fn contact_submit_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;

    let missing = [&form.name, &form.email, &form.message]
        .iter()
        .any(|field| field.trim().is_empty());

    let problem = if missing {
        Some("Please fill in all required fields")
    } else if !is_email(&form.email) {
        Some("Please enter a valid email address")
    } else {
        None
    };

    if let Some(message) = problem {
        return Ok(invalid(&visitor, "/contact", "Contact Us", &pages::contact(&form), message));
    }

    info!(
        sender = form.name.trim(),
        email = form.email.trim(),
        phone = form.phone.trim(),
        "Contact message received: {}",
        form.message.trim()
    );

    Ok(redirect_with(
        &state.sessions,
        &visitor,
        "/contact",
        Flash::success("Thank you for your message! We'll get back to you soon."),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Response {
    if visitor.user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    page(&state, &visitor, "/login", "Login", &pages::login("")).into_response()
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let email = form.email.trim();
    let body = pages::login(email);

    if email.is_empty() || form.password.is_empty() {
        return Ok(invalid(&visitor, "/login", "Login", &body, "Please fill in all fields"));
    }

    match state.backend.sign_in(email, &form.password).await {
        Ok(session) => {
            let user = SessionUser::from(session);
            info!("{} signed in as {:?}", user.email, user.role);

            Ok(sign_in_redirect(
                &state.sessions,
                &visitor,
                user,
                "/dashboard",
                Flash::success("Login successful!"),
            ))
        }
        Err(e) => {
            warn!("Sign in failed for {email}: {e}");
            let message = e.user_message().unwrap_or("Login failed");

            Ok(invalid(&visitor, "/login", "Login", &body, message))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupForm {
    fn problem(&self) -> Option<&'static str> {
        if self.email.trim().is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            Some("Please fill in all fields")
        } else if !is_email(&self.email) {
            Some("Please enter a valid email address")
        } else if self.password.chars().count() < MIN_PASSWORD {
            Some("Password must be at least 6 characters")
        } else if self.password != self.confirm_password {
            Some("Passwords do not match")
        } else {
            None
        }
    }
}

pub async fn signup_page_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Response {
    if visitor.user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    page(&state, &visitor, "/signup", "Register", &pages::signup("")).into_response()
}

pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let email = form.email.trim();
    let body = pages::signup(email);

    if let Some(message) = form.problem() {
        return Ok(invalid(&visitor, "/signup", "Register", &body, message));
    }

    match state.backend.sign_up(email, &form.password).await {
        Ok(()) => {
            info!("New associate registered: {email}");

            Ok(redirect_with(
                &state.sessions,
                &visitor,
                "/login",
                Flash::success(
                    "Registration successful! Please check your email to verify your account.",
                ),
            ))
        }
        Err(e) => {
            warn!("Sign up failed for {email}: {e}");
            let message = e.user_message().unwrap_or("Signup failed");

            Ok(invalid(&visitor, "/signup", "Register", &body, message))
        }
    }
}

pub async fn logout_handler(State(state): State<Arc<AppState>>, visitor: Visitor) -> Response {
    if let Some(user) = visitor.user.as_ref() {
        if let Err(e) = state.backend.sign_out(&user.access_token).await {
            warn!("Backend sign out failed for {}: {e}", user.email);
        }
    }

    if let Some(id) = visitor.session_id.as_deref() {
        if let Some(user) = state.sessions.end(id) {
            info!("{} signed out", user.email);
        }
    }

    sign_out_redirect(&state.sessions, "/")
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

async fn dashboard_page(
    state: &AppState,
    visitor: &Visitor,
    user: &SessionUser,
    tab: Tab,
    form: Option<ProfileUpdate>,
    flash: Option<Flash>,
    status: StatusCode,
) -> Response {
    let backend = state.backend.as_ref();

    let (profile, subscription) = tokio::join!(
        tables::profile(backend, &user.access_token, &user.id),
        tables::active_subscription(backend, &user.access_token, &user.id),
    );

    let (profile, subscription) = match (profile, subscription) {
        (Ok(profile), Ok(subscription)) => (profile, subscription),
        (Err(e), _) | (_, Err(e)) => return backend_failure(state, visitor, e),
    };

    let form = form.unwrap_or_else(|| {
        profile
            .as_ref()
            .map(ProfileUpdate::from_profile)
            .unwrap_or_default()
    });

    let view = DashboardView {
        user,
        profile,
        subscription,
        tab,
        form,
        now: Utc::now(),
    };

    (
        status,
        render(visitor, "/dashboard", "Dashboard", &pages::dashboard(&view), flash),
    )
        .into_response()
}

pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Associate(user): Associate,
    visitor: Visitor,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let tab = Tab::from_query(query.tab.as_deref());
    let flash = visitor.take_flash(&state.sessions);

    dashboard_page(&state, &visitor, &user, tab, None, flash, StatusCode::OK).await
}

pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Associate(user): Associate,
    visitor: Visitor,
    form: Result<Form<ProfileUpdate>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(update) = form?;

    if let Err(message) = update.validate() {
        return Ok(dashboard_page(
            &state,
            &visitor,
            &user,
            Tab::Profile,
            Some(update),
            Some(Flash::error(message)),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await);
    }

    let to = "/dashboard?tab=profile";

    match tables::update_profile(state.backend.as_ref(), &user.access_token, &user.id, &update).await {
        Ok(updated) => {
            debug!("Updated {updated} profile row(s) for {}", user.email);
            Ok(redirect_with(&state.sessions, &visitor, to, Flash::success("Profile updated successfully!")))
        }
        Err(BankError::Unauthorized) => Ok(backend_failure(&state, &visitor, BankError::Unauthorized)),
        Err(e) => {
            warn!("Failed to update profile of {}: {e}", user.email);
            Ok(redirect_with(&state.sessions, &visitor, to, Flash::error("Failed to update profile")))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub view: Option<String>,
}

pub async fn admin_handler(
    State(state): State<Arc<AppState>>,
    Admin(user): Admin,
    visitor: Visitor,
    Query(query): Query<AdminQuery>,
) -> Response {
    let backend = state.backend.as_ref();

    let (associates, subscriptions) = tokio::join!(
        tables::associates(backend, &user.access_token),
        tables::subscriptions(backend, &user.access_token),
    );

    let (associates, subscriptions) = match (associates, subscriptions) {
        (Ok(associates), Ok(subscriptions)) => (associates, subscriptions),
        (Err(e), _) | (_, Err(e)) => return backend_failure(&state, &visitor, e),
    };

    let selected = query
        .view
        .and_then(|id| associates.iter().find(|a| a.user_id == id).cloned());

    let view = AdminView {
        associates,
        subscriptions,
        selected,
    };

    page(&state, &visitor, "/admin", "Admin Panel", &pages::admin(&view)).into_response()
}

pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Admin(user): Admin,
    visitor: Visitor,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let backend = state.backend.as_ref();

    let associate = match tables::profile(backend, &user.access_token, &user_id).await {
        Ok(associate) => associate.ok_or(AppError::NotFound)?,
        Err(e) => return Ok(backend_failure(&state, &visitor, e)),
    };

    let active = !associate.is_active;

    match tables::set_active(backend, &user.access_token, &user_id, active).await {
        Ok(_) => {
            info!("{} set {user_id} active={active}", user.email);
            let message = if active { "Associate activated" } else { "Associate deactivated" };

            Ok(redirect_with(&state.sessions, &visitor, "/admin", Flash::success(message)))
        }
        Err(BankError::Unauthorized) => Ok(backend_failure(&state, &visitor, BankError::Unauthorized)),
        Err(e) => {
            warn!("Failed to update status of {user_id}: {e}");

            Ok(redirect_with(
                &state.sessions,
                &visitor,
                "/admin",
                Flash::error("Failed to update status"),
            ))
        }
    }
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn stylesheet_handler() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], SITE_CSS)
}

pub async fn not_found_handler(
    State(state): State<Arc<AppState>>,
    visitor: Visitor,
    uri: Uri,
) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        page(&state, &visitor, uri.path(), "Page not found", &pages::not_found(uri.path())),
    )
}
