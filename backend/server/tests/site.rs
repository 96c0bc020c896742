use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bank::{
    Backend, BankError, Row,
    memory::MemoryBank,
    models::AuthSession,
    rest::{Filter, Select, Table},
};
use reqwest::{
    Client, Response, StatusCode,
    header::{LOCATION, SET_COOKIE},
    redirect::Policy,
};
use serde_json::Value;
use server::{config::Config, purge_sessions, router, session::SessionUser, state::AppState};
use tokio::net::TcpListener;

const ADMIN: (&str, &str) = ("admin@irasalon.com", "admin-secret");

fn seeded_bank() -> MemoryBank {
    MemoryBank::seeded().with_admin(ADMIN.0, ADMIN.1)
}

async fn spawn_site() -> String {
    spawn_with(Arc::new(seeded_bank())).await
}

async fn spawn_with(backend: Arc<dyn Backend>) -> String {
    let state = AppState::with_backend(Config::local(0), backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{address}")
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Outage,
    Expired,
}

/// Memory backend whose writes and sign outs always fail. Reads and sign ins still work.
struct FailingBank {
    inner: MemoryBank,
    failure: Failure,
}

impl FailingBank {
    fn new(failure: Failure) -> Arc<Self> {
        Arc::new(Self {
            inner: seeded_bank(),
            failure,
        })
    }

    fn error(&self) -> BankError {
        match self.failure {
            Failure::Outage => BankError::Rejected {
                status: 503,
                message: "Service unavailable".to_string(),
            },
            Failure::Expired => BankError::Unauthorized,
        }
    }
}

#[async_trait]
impl Backend for FailingBank {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BankError> {
        self.inner.sign_in(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), BankError> {
        self.inner.sign_up(email, password).await
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BankError> {
        Err(self.error())
    }

    async fn select(&self, token: Option<&str>, query: &Select) -> Result<Vec<Row>, BankError> {
        self.inner.select(token, query).await
    }

    async fn insert(&self, _token: &str, _table: Table, _row: Value) -> Result<(), BankError> {
        Err(self.error())
    }

    async fn update(
        &self,
        _token: &str,
        _table: Table,
        _filters: &[Filter],
        _patch: Value,
    ) -> Result<usize, BankError> {
        Err(self.error())
    }
}

const PROFILE_FORM: [(&str, &str); 6] = [
    ("salon_name", "IRA Studio Dwarka"),
    ("owner_name", "Asha"),
    ("mobile", "+91 98765 43210"),
    ("city", "New Delhi"),
    ("address", "Sector 6"),
    ("services", "Hair, Facial"),
];

/// Follows nothing, remembers the session cookie.
struct Browser {
    client: Client,
    base: String,
    cookie: Option<String>,
}

impl Browser {
    fn new(base: &str) -> Self {
        Self {
            client: Client::builder().redirect(Policy::none()).build().unwrap(),
            base: base.to_string(),
            cookie: None,
        }
    }

    fn remember(&mut self, response: &Response) {
        let Some(value) = response.headers().get(SET_COOKIE) else {
            return;
        };

        let pair = value.to_str().unwrap().split(';').next().unwrap().to_string();
        self.cookie = match pair.split_once('=') {
            Some((_, "")) => None,
            _ => Some(pair),
        };
    }

    async fn get(&mut self, path: &str) -> Response {
        let mut request = self.client.get(format!("{}{path}", self.base));
        if let Some(cookie) = &self.cookie {
            request = request.header("cookie", cookie);
        }

        let response = request.send().await.unwrap();
        self.remember(&response);
        response
    }

    async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> Response {
        let mut request = self.client.post(format!("{}{path}", self.base)).form(form);
        if let Some(cookie) = &self.cookie {
            request = request.header("cookie", cookie);
        }

        let response = request.send().await.unwrap();
        self.remember(&response);
        response
    }

    async fn page(&mut self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.unwrap()
    }

    async fn login(&mut self, email: &str, password: &str) {
        let response = self.post("/login", &[("email", email), ("password", password)]).await;
        assert_redirect(&response, "/dashboard");
    }

    async fn register(&mut self, email: &str, password: &str) {
        let response = self
            .post(
                "/signup",
                &[("email", email), ("password", password), ("confirm_password", password)],
            )
            .await;
        assert_redirect(&response, "/login");
    }
}

fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], to);
}

fn cookie_header(response: &Response) -> &str {
    response.headers()[SET_COOKIE].to_str().unwrap()
}

/// Ids in the order they appear in `action="{prefix}{id}{suffix}"` attributes.
fn action_ids(body: &str, prefix: &str, suffix: &str) -> Vec<String> {
    body.split(&format!(r#"action="{prefix}"#))
        .skip(1)
        .filter_map(|rest| rest.split_once(suffix).map(|(id, _)| id.to_string()))
        .collect()
}

#[tokio::test]
async fn test_public_pages_render() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    for (path, marker) in [
        ("/", "Our Exclusive Brands"),
        ("/about", "Our Core Values"),
        ("/brands", "IRA La Salon"),
        ("/services", "Bridal Packages"),
        ("/become-associate", "How It Works"),
        ("/plans", "Growth Plan"),
        ("/contact", "Send Us a Message"),
        ("/login", "Associate Login"),
        ("/signup", "Become an Associate"),
    ] {
        assert!(browser.page(path).await.contains(marker), "{path} missing {marker}");
    }

    let health = browser.get("/healthz").await;
    assert_eq!(health.text().await.unwrap(), "ok");

    let css = browser.get("/static/site.css").await;
    assert_eq!(css.headers()["content-type"], "text/css; charset=utf-8");

    let missing = browser.get("/nope").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.text().await.unwrap().contains("Page not found"));
}

#[tokio::test]
async fn test_gated_pages_redirect_visitors() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    assert_redirect(&browser.get("/dashboard").await, "/login");
    assert_redirect(&browser.get("/admin").await, "/login");
    assert_redirect(
        &browser.post("/dashboard/profile", &[("salon_name", "x")]).await,
        "/login",
    );
}

#[tokio::test]
async fn test_signup_validation() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    for (form, message) in [
        (
            [("email", ""), ("password", "secret"), ("confirm_password", "secret")],
            "Please fill in all fields",
        ),
        (
            [("email", "owner@irasalon.com"), ("password", "abc"), ("confirm_password", "abc")],
            "Password must be at least 6 characters",
        ),
        (
            [("email", "owner@irasalon.com"), ("password", "secret1"), ("confirm_password", "secret2")],
            "Passwords do not match",
        ),
    ] {
        let response = browser.post("/signup", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.text().await.unwrap().contains(message));
    }

    browser.register("owner@irasalon.com", "secret").await;

    let again = browser
        .post(
            "/signup",
            &[("email", "owner@irasalon.com"), ("password", "secret"), ("confirm_password", "secret")],
        )
        .await;
    assert_eq!(again.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(again.text().await.unwrap().contains("User already registered"));
}

#[tokio::test]
async fn test_signup_login_and_logout() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    browser.register("owner@irasalon.com", "secret").await;
    assert!(browser.page("/login").await.contains("Registration successful!"));

    let blank = browser.post("/login", &[("email", "owner@irasalon.com"), ("password", "")]).await;
    assert!(blank.text().await.unwrap().contains("Please fill in all fields"));

    let wrong = browser
        .post("/login", &[("email", "owner@irasalon.com"), ("password", "wrong-one")])
        .await;
    assert_eq!(wrong.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(wrong.text().await.unwrap().contains("Invalid login credentials"));

    browser.login("owner@irasalon.com", "secret").await;

    let dashboard = browser.page("/dashboard").await;
    assert!(dashboard.contains("Login successful!"));
    assert!(dashboard.contains("Welcome back, Associate!"));
    assert!(dashboard.contains("Complete your profile"));
    assert!(dashboard.contains("No Plan"));
    assert!(dashboard.contains("Locked"));

    assert_redirect(&browser.get("/login").await, "/dashboard");
    assert_redirect(&browser.get("/admin").await, "/dashboard");

    assert_redirect(&browser.post("/logout", &[]).await, "/");
    assert!(browser.cookie.is_none());
    assert_redirect(&browser.get("/dashboard").await, "/login");
}

#[tokio::test]
async fn test_subscribe_flow() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    let plans = browser.page("/plans").await;
    let ids = action_ids(&plans, "/plans/", "/subscribe");
    assert_eq!(ids.len(), 2);
    let growth = &ids[1];

    let anonymous = browser.post(&format!("/plans/{growth}/subscribe"), &[]).await;
    assert_redirect(&anonymous, "/login");
    assert!(cookie_header(&anonymous).ends_with("Max-Age=600"));
    assert!(
        browser
            .page("/login")
            .await
            .contains(r#"<div class="flash info" role="status">Please login to subscribe</div>"#)
    );

    browser.register("owner@irasalon.com", "secret").await;
    let login = browser
        .post("/login", &[("email", "owner@irasalon.com"), ("password", "secret")])
        .await;
    assert_redirect(&login, "/dashboard");
    assert!(cookie_header(&login).ends_with("Max-Age=3600"));

    let unknown = browser.post("/plans/no-such-plan/subscribe", &[]).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    assert_redirect(
        &browser.post(&format!("/plans/{growth}/subscribe"), &[]).await,
        "/dashboard",
    );

    let dashboard = browser.page("/dashboard").await;
    assert!(dashboard.contains("Subscribed to Growth Plan!"));
    assert!(dashboard.contains("10 Available"));
    assert!(dashboard.contains("Active until"));

    let plan = browser.page("/dashboard?tab=subscription").await;
    assert!(plan.contains("Benefits Included:"));
    assert!(plan.contains("days</strong> remaining"));

    let templates = browser.page("/dashboard?tab=templates").await;
    assert!(templates.contains("Grand Opening Post"));
    assert!(templates.contains("Weekend Special"));
}

#[tokio::test]
async fn test_profile_update() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    browser.register("owner@irasalon.com", "secret").await;
    browser.login("owner@irasalon.com", "secret").await;

    let invalid = browser
        .post(
            "/dashboard/profile",
            &[
                ("salon_name", "IRA Studio Dwarka"),
                ("owner_name", " "),
                ("mobile", ""),
                ("city", ""),
                ("address", ""),
                ("services", ""),
            ],
        )
        .await;
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = invalid.text().await.unwrap();
    assert!(body.contains("Salon name and owner name are required"));
    assert!(body.contains(r#"value="IRA Studio Dwarka""#));

    let saved = browser
        .post(
            "/dashboard/profile",
            &PROFILE_FORM,
        )
        .await;
    assert_redirect(&saved, "/dashboard?tab=profile");

    let profile = browser.page("/dashboard?tab=profile").await;
    assert!(profile.contains("Profile updated successfully!"));
    assert!(profile.contains(r#"value="New Delhi""#));

    let overview = browser.page("/dashboard").await;
    assert!(overview.contains("Welcome back, Asha!"));
    assert!(!overview.contains("Complete your profile"));
}

#[tokio::test]
async fn test_admin_toggles_associates() {
    let base = spawn_site().await;

    let mut associate = Browser::new(&base);
    associate.register("owner@irasalon.com", "secret").await;
    associate.login("owner@irasalon.com", "secret").await;

    let mut admin = Browser::new(&base);
    admin.login(ADMIN.0, ADMIN.1).await;

    let panel = admin.page("/admin").await;
    assert!(panel.contains("Admin Panel"));
    assert!(panel.contains("Total Associates"));
    assert!(panel.contains("Activate"));

    let ids = action_ids(&panel, "/admin/associates/", "/toggle");
    assert_eq!(ids.len(), 1);
    let id = &ids[0];

    let detail = admin.page(&format!("/admin?view={id}")).await;
    assert!(detail.contains("Associate Details"));

    assert_redirect(
        &admin.post(&format!("/admin/associates/{id}/toggle"), &[]).await,
        "/admin",
    );
    let panel = admin.page("/admin").await;
    assert!(panel.contains("Associate activated"));
    assert!(panel.contains("Deactivate"));
    assert!(associate.page("/dashboard").await.contains("Active Associate"));

    assert_redirect(
        &admin.post(&format!("/admin/associates/{id}/toggle"), &[]).await,
        "/admin",
    );
    assert!(admin.page("/admin").await.contains("Associate deactivated"));

    let missing = admin.post("/admin/associates/nobody/toggle", &[]).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_form() {
    let base = spawn_site().await;
    let mut browser = Browser::new(&base);

    let blank = browser
        .post("/contact", &[("name", "Asha"), ("email", ""), ("phone", ""), ("message", "Hi")])
        .await;
    assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = blank.text().await.unwrap();
    assert!(body.contains("Please fill in all required fields"));
    assert!(body.contains(r#"value="Asha""#));

    let sent = browser
        .post(
            "/contact",
            &[
                ("name", "Asha"),
                ("email", "asha@example.com"),
                ("phone", ""),
                ("message", "I would like to book a bridal package."),
            ],
        )
        .await;
    assert_redirect(&sent, "/contact");
    assert!(browser.cookie.is_some());
    assert!(browser.page("/contact").await.contains("Thank you for your message!"));
}

#[tokio::test]
async fn test_failed_writes_are_reported() {
    let base = spawn_with(FailingBank::new(Failure::Outage)).await;

    let mut associate = Browser::new(&base);
    associate.register("owner@irasalon.com", "secret").await;
    associate.login("owner@irasalon.com", "secret").await;

    let ids = action_ids(&associate.page("/plans").await, "/plans/", "/subscribe");
    assert_redirect(
        &associate.post(&format!("/plans/{}/subscribe", ids[0]), &[]).await,
        "/plans",
    );
    assert!(associate.page("/plans").await.contains(
        r#"<div class="flash error" role="status">Failed to subscribe. Please try again.</div>"#
    ));
    assert!(associate.page("/dashboard").await.contains("No Plan"));

    assert_redirect(
        &associate.post("/dashboard/profile", &PROFILE_FORM).await,
        "/dashboard?tab=profile",
    );
    assert!(associate.page("/dashboard?tab=profile").await.contains("Failed to update profile"));

    let mut admin = Browser::new(&base);
    admin.login(ADMIN.0, ADMIN.1).await;

    let ids = action_ids(&admin.page("/admin").await, "/admin/associates/", "/toggle");
    assert_redirect(
        &admin.post(&format!("/admin/associates/{}/toggle", ids[0]), &[]).await,
        "/admin",
    );
    let panel = admin.page("/admin").await;
    assert!(panel.contains("Failed to update status"));
    assert!(panel.contains("Activate"));

    assert_redirect(&associate.post("/logout", &[]).await, "/");
    assert!(associate.cookie.is_none());
    assert_redirect(&associate.get("/dashboard").await, "/login");
}

#[tokio::test]
async fn test_expired_backend_token_ends_session() {
    let base = spawn_with(FailingBank::new(Failure::Expired)).await;
    let expired = r#"<div class="flash info" role="status">Your session has expired. Please login again.</div>"#;

    let mut associate = Browser::new(&base);
    associate.register("owner@irasalon.com", "secret").await;
    associate.login("owner@irasalon.com", "secret").await;

    let ids = action_ids(&associate.page("/plans").await, "/plans/", "/subscribe");
    assert_redirect(
        &associate.post(&format!("/plans/{}/subscribe", ids[0]), &[]).await,
        "/login",
    );
    assert!(associate.page("/login").await.contains(expired));
    assert_redirect(&associate.get("/dashboard").await, "/login");

    associate.login("owner@irasalon.com", "secret").await;
    assert_redirect(&associate.post("/dashboard/profile", &PROFILE_FORM).await, "/login");
    assert!(associate.page("/login").await.contains(expired));

    let mut admin = Browser::new(&base);
    admin.login(ADMIN.0, ADMIN.1).await;

    let ids = action_ids(&admin.page("/admin").await, "/admin/associates/", "/toggle");
    assert_redirect(
        &admin.post(&format!("/admin/associates/{}/toggle", ids[0]), &[]).await,
        "/login",
    );
    assert!(admin.page("/login").await.contains(expired));
    assert_redirect(&admin.get("/admin").await, "/login");
}

#[tokio::test]
async fn test_sweep_revokes_expired_sessions() {
    let bank = Arc::new(seeded_bank());
    bank.sign_up("owner@irasalon.com", "secret").await.unwrap();
    let session = bank.sign_in("owner@irasalon.com", "secret").await.unwrap();
    let token = session.access_token.clone();

    let mut config = Config::local(0);
    config.session_ttl = Duration::ZERO;
    let state = AppState::with_backend(config, bank.clone());

    let id = state.sessions.sign_in(None, SessionUser::from(session));
    assert_eq!(state.sessions.user(&id), None);

    assert_eq!(purge_sessions(&state).await, 1);
    assert!(state.sessions.is_empty());
    assert!(matches!(
        bank.select(Some(&token), &Select::from(Table::Profiles)).await,
        Err(BankError::Unauthorized)
    ));

    assert_eq!(purge_sessions(&state).await, 0);
}
