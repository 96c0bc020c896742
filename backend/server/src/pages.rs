//! # Pages
//!
//! Server-rendered HTML. Every page is a body string wrapped by [`render`] in
//! the shared navbar, flash banner and footer.
//!
//! All text that did not come from this file goes through [`escape`].
use std::fmt::Write;

use axum::{http::StatusCode, response::Html};
use bank::models::{MembershipPlan, Profile, ProfileUpdate, SubscriptionWithPlan, days_remaining};
use chrono::{DateTime, Datelike, Utc};

use crate::{
    content::{
        ABOUT, BENEFITS, BRANDS, COMPANY, CONTACT, MISSION, NAV_LINKS, SERVICES, SHORT_NAME,
        STEPS, TAGLINE, TEMPLATES, VALUES, VISION,
    },
    session::{Flash, FlashKind, SessionUser},
};

const DASH: &str = "—";

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => escape(value),
        _ => DASH.to_string(),
    }
}

fn short_date(at: DateTime<Utc>) -> String {
    at.format("%-d/%-m/%Y").to_string()
}

fn long_date(at: DateTime<Utc>) -> String {
    at.format("%-d %B %Y").to_string()
}

/// What surrounds every page.
pub struct Chrome<'a> {
    pub path: &'a str,
    pub user: Option<&'a SessionUser>,
    pub flash: Option<Flash>,
}

fn navbar(chrome: &Chrome) -> String {
    let mut links = String::new();

    for link in &NAV_LINKS {
        let class = if chrome.path == link.path { " class=\"active\"" } else { "" };
        let _ = write!(links, r#"<a href="{}"{class}>{}</a>"#, link.path, link.name);
    }

    let account = match chrome.user {
        Some(user) => {
            let admin = if user.is_admin() { r#"<a href="/admin">Admin</a>"# } else { "" };
            format!(
                r#"<a href="/dashboard">Dashboard</a>{admin}
                <form method="post" action="/logout" class="inline"><button type="submit" class="link">Sign Out</button></form>"#
            )
        }
        None => r#"<a href="/login">Login</a><a href="/signup" class="button">Register</a>"#.to_string(),
    };

    format!(
        r#"<header class="navbar"><a href="/" class="logo">{SHORT_NAME}</a><nav>{links}</nav><div class="account">{account}</div></header>"#
    )
}

fn flash_banner(flash: Option<&Flash>) -> String {
    let Some(flash) = flash else {
        return String::new();
    };

    let kind = match flash.kind {
        FlashKind::Success => "success",
        FlashKind::Error => "error",
        FlashKind::Info => "info",
    };

    format!(r#"<div class="flash {kind}" role="status">{}</div>"#, escape(&flash.message))
}

fn footer() -> String {
    let year = Utc::now().year();
    let address = CONTACT.address.join(", ");

    format!(
        r#"<footer>
  <div class="columns">
    <div><p class="brand">{COMPANY}</p><p class="tagline">"{TAGLINE}"</p></div>
    <div><h4>Quick Links</h4><a href="/">Home</a><a href="/about">About Us</a><a href="/brands">Our Brands</a><a href="/services">Services</a><a href="/contact">Contact Us</a></div>
    <div><h4>Our Brands</h4><p>IRA Studio</p><p>IRA La Salon</p></div>
    <div><h4>Contact</h4><p>{address}</p><p>{phone}</p><p>{email}</p></div>
  </div>
  <p class="copyright">&copy; {year} {COMPANY} All rights reserved.</p>
</footer>"#,
        phone = CONTACT.phone,
        email = CONTACT.email,
    )
}

pub fn render(chrome: Chrome, title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {SHORT_NAME}</title>
<link rel="stylesheet" href="/static/site.css">
</head>
<body>
{navbar}
{flash}
<main>
{body}
</main>
{footer}
</body>
</html>"#,
        title = escape(title),
        navbar = navbar(&chrome),
        flash = flash_banner(chrome.flash.as_ref()),
        footer = footer(),
    ))
}

fn hero(title: &str, subtitle: &str) -> String {
    format!(r#"<section class="hero"><h1>{title}</h1><p>{subtitle}</p></section>"#)
}

fn cards(cards: &[crate::content::Card], class: &str) -> String {
    cards
        .iter()
        .map(|card| format!(r#"<div class="{class}"><h3>{}</h3><p>{}</p></div>"#, card.title, card.text))
        .collect()
}

fn tagline() -> String {
    format!(r#"<section class="tagline-band"><p>"{TAGLINE}"</p></section>"#)
}

pub fn home() -> String {
    let brands: String = BRANDS
        .iter()
        .map(|brand| {
            format!(
                r#"<div class="card brand"><h3>{}</h3><p>{}</p><span class="pill">{}</span></div>"#,
                brand.name, brand.summary, brand.size
            )
        })
        .collect();

    let services: String = SERVICES
        .iter()
        .map(|service| {
            format!(
                r#"<div class="card"><h3>{title}</h3><p>Professional {lower} services by expert stylists</p></div>"#,
                title = service.title,
                lower = escape(&service.title.to_lowercase()),
            )
        })
        .collect();

    format!(
        r#"<section class="hero home">
  <h1>Welcome to {COMPANY}</h1>
  <p>Two Unique Unisex Salon Concepts – IRA Studio &amp; IRA La Salon</p>
  <div class="actions"><a class="button" href="/brands">Explore Our Brands</a><a class="button outline" href="/contact">Book Appointment</a></div>
</section>
<section><h2>Our Exclusive Brands</h2><p class="lead">Experience the perfect blend of style and comfort with our two unique salon concepts</p>
  <div class="grid two">{brands}</div>
  <a class="button outline" href="/brands">Learn More About Our Brands</a>
</section>
<section class="accent"><h2>Our Services</h2><p class="lead">Professional beauty and grooming services for everyone</p>
  <div class="grid three">{services}</div>
  <a class="button" href="/services">View All Services</a>
</section>
<section class="cta"><h2>Ready to Transform Your Look?</h2><p>Book an appointment with our expert stylists and experience the Gauranshi difference</p>
  <a class="button" href="/contact">Book Now</a>
</section>"#
    )
}

pub fn about() -> String {
    format!(
        r#"{hero}
<section><div class="grid two">
  <div class="card"><h4>Our Vision</h4><h3>{vision_title}</h3><p>{vision_text}</p></div>
  <div class="card"><h4>Our Mission</h4><h3>{mission_title}</h3><p>{mission_text}</p></div>
</div></section>
<section class="accent"><h2>Our Core Values</h2><p class="lead">The principles that guide everything we do</p>
  <div class="grid four">{values}</div>
</section>
{tagline}"#,
        hero = hero("About Us", ABOUT),
        vision_title = VISION.title,
        vision_text = VISION.text,
        mission_title = MISSION.title,
        mission_text = MISSION.text,
        values = cards(&VALUES, "card center"),
        tagline = tagline(),
    )
}

pub fn brands() -> String {
    let sections: String = BRANDS
        .iter()
        .map(|brand| {
            let features: String = brand
                .features
                .iter()
                .map(|feature| format!("<li>{}</li>", escape(feature)))
                .collect();

            format!(
                r#"<section class="brand-detail"><span class="pill">{badge}</span><h2>{name}</h2><p>{description}</p><p class="size">{size}</p><ul class="checks">{features}</ul></section>"#,
                badge = brand.badge,
                name = brand.name,
                description = brand.description,
                size = brand.size,
            )
        })
        .collect();

    format!(
        r#"{hero}
{sections}
<section class="cta"><h2>Ready to Experience IRA?</h2><a class="button" href="/contact">Book Your Appointment</a></section>"#,
        hero = hero("Our Brands", "Two unique salon concepts designed to meet every customer's needs"),
    )
}

pub fn services() -> String {
    let grid: String = SERVICES
        .iter()
        .map(|service| {
            let features: String = service
                .features
                .iter()
                .map(|feature| format!(r#"<span class="pill">{}</span>"#, escape(feature)))
                .collect();

            format!(
                r#"<div class="card"><h3>{}</h3><p>{}</p><div class="pills">{features}</div></div>"#,
                escape(service.title),
                service.description
            )
        })
        .collect();

    format!(
        r#"{hero}
<section><div class="grid three">{grid}</div></section>
<section class="accent"><h2>Customized Pricing</h2><p class="lead">Our services are priced based on your specific requirements. Contact us for a personalized quote or visit our salon for a consultation.</p>
  <a class="button" href="/contact">Get a Quote</a>
</section>
<section class="cta"><h2>Book Your Appointment Today</h2><p>Experience the difference at Gauranshi Salons</p><a class="button" href="/contact">Contact Us</a></section>"#,
        hero = hero("Our Services", "Professional beauty and grooming services tailored for you"),
    )
}

pub fn become_associate() -> String {
    let steps: String = STEPS
        .iter()
        .enumerate()
        .map(|(index, step)| {
            format!(
                r#"<div class="card center"><span class="step">{:02}</span><h3>{}</h3><p>{}</p></div>"#,
                index + 1,
                step.title,
                step.text
            )
        })
        .collect();

    format!(
        r#"<section class="hero"><h1>Become an Associate</h1>
  <p>Join the Gauranshi Salons network and grow your salon business with our digital marketing and lead generation support.</p>
  <div class="actions"><a class="button" href="/signup">Register Now</a><a class="button outline" href="/plans">View Plans</a></div>
</section>
<section><h2>Why Join Us?</h2><p class="lead">We provide everything you need to grow your salon business</p>
  <div class="grid four">{benefits}</div>
</section>
<section class="accent"><h2>How It Works</h2><div class="grid four">{steps}</div></section>
<section class="cta"><h2>Ready to Grow Your Salon?</h2><p>Register today and start your journey with Gauranshi Salons</p><a class="button" href="/signup">Get Started</a></section>"#,
        benefits = cards(&BENEFITS, "card center"),
    )
}

fn features_list(features: &[String]) -> String {
    features
        .iter()
        .map(|feature| format!("<li>{}</li>", escape(feature)))
        .collect()
}

pub fn plans(plans: &[MembershipPlan]) -> String {
    let cards: String = plans
        .iter()
        .map(|plan| {
            let (class, badge) = if plan.is_popular() {
                ("card plan popular", r#"<span class="badge">Popular</span>"#)
            } else {
                ("card plan", "")
            };

            format!(
                r#"<div class="{class}">{badge}
  <h2>{name}</h2>
  <p class="price">&#8377;{price} <span>/ {period}</span></p>
  <ul class="checks">{features}</ul>
  <form method="post" action="/plans/{id}/subscribe"><button type="submit" class="button wide">Subscribe Now</button></form>
</div>"#,
                name = escape(&plan.name),
                price = plan.price,
                period = plan.period_label(),
                features = features_list(&plan.features),
                id = escape(&plan.id),
            )
        })
        .collect();

    let empty = if plans.is_empty() {
        r#"<p class="lead">No membership plans are available right now. Please check back soon.</p>"#
    } else {
        ""
    };

    format!(
        r#"{hero}
<section>{empty}<div class="grid two">{cards}</div></section>"#,
        hero = hero(
            "Membership Plans",
            "Choose the perfect plan to grow your salon business with digital marketing and lead generation support"
        ),
    )
}

/// Contact form contents, echoed back when validation fails.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

pub fn contact(form: &ContactForm) -> String {
    format!(
        r#"{hero}
<section><div class="grid two">
  <div>
    <h2>Get In Touch</h2>
    <p>We'd love to hear from you. Reach out for appointments, business inquiries, or any questions about our services.</p>
    <div class="card"><h3>Address</h3><p>{address}</p></div>
    <div class="card"><h3>Phone</h3><p>{phone}</p></div>
    <div class="card"><h3>Email</h3><p>{email}</p></div>
    <div class="card"><h3>Working Hours</h3><p>{hours}</p></div>
  </div>
  <form method="post" action="/contact" class="card form">
    <h2>Send Us a Message</h2>
    <label>Your Name<input name="name" value="{name}" placeholder="Enter your name" required></label>
    <label>Email Address<input name="email" type="email" value="{form_email}" placeholder="Enter your email" required></label>
    <label>Phone Number<input name="phone" type="tel" value="{form_phone}" placeholder="Enter your phone number"></label>
    <label>Message<textarea name="message" rows="4" placeholder="How can we help you?" required>{message}</textarea></label>
    <button type="submit" class="button wide">Send Message</button>
  </form>
</div></section>
{tagline}"#,
        hero = hero("Contact Us", "Get in touch with us for appointments, inquiries, or feedback"),
        address = CONTACT.address.join("<br>"),
        phone = CONTACT.phone,
        email = CONTACT.email,
        hours = CONTACT.hours,
        name = escape(&form.name),
        form_email = escape(&form.email),
        form_phone = escape(&form.phone),
        message = escape(&form.message),
        tagline = tagline(),
    )
}

pub fn login(email: &str) -> String {
    format!(
        r#"<section class="auth"><form method="post" action="/login" class="card form">
  <h1>Associate Login</h1>
  <p>Sign in to access your dashboard</p>
  <label>Email<input name="email" type="email" value="{email}" placeholder="your@email.com" required></label>
  <label>Password<input name="password" type="password" placeholder="Enter your password" required></label>
  <button type="submit" class="button wide">Sign In</button>
  <p>Don't have an account? <a href="/signup">Register as Associate</a></p>
</form></section>"#,
        email = escape(email),
    )
}

pub fn signup(email: &str) -> String {
    format!(
        r#"<section class="auth"><form method="post" action="/signup" class="card form">
  <h1>Become an Associate</h1>
  <p>Create your account to join our network</p>
  <label>Email<input name="email" type="email" value="{email}" placeholder="your@email.com" required></label>
  <label>Password<input name="password" type="password" placeholder="Minimum 6 characters" required></label>
  <label>Confirm Password<input name="confirm_password" type="password" placeholder="Confirm your password" required></label>
  <button type="submit" class="button wide">Register</button>
  <p>Already have an account? <a href="/login">Sign In</a></p>
</form></section>"#,
        email = escape(email),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Profile,
    Subscription,
    Templates,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Profile, Tab::Subscription, Tab::Templates];

    pub fn from_query(tab: Option<&str>) -> Self {
        Tab::ALL
            .into_iter()
            .find(|candidate| Some(candidate.slug()) == tab)
            .unwrap_or_default()
    }

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Profile => "profile",
            Tab::Subscription => "subscription",
            Tab::Templates => "templates",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Profile => "Salon Profile",
            Tab::Subscription => "My Plan",
            Tab::Templates => "Marketing",
        }
    }
}

pub struct DashboardView<'a> {
    pub user: &'a SessionUser,
    pub profile: Option<Profile>,
    pub subscription: Option<SubscriptionWithPlan>,
    pub tab: Tab,
    pub form: ProfileUpdate,
    pub now: DateTime<Utc>,
}

impl DashboardView<'_> {
    fn owner_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|profile| profile.owner_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    fn is_active(&self) -> bool {
        self.profile.as_ref().is_some_and(|profile| profile.is_active)
    }

    fn days_remaining(&self) -> i64 {
        self.subscription
            .as_ref()
            .map(|s| days_remaining(s.subscription.end_date, self.now))
            .unwrap_or(0)
    }
}

fn stat(label: &str, value: &str, accent: bool) -> String {
    let class = if accent { "stat accent" } else { "stat" };
    format!(r#"<div class="{class}"><p>{label}</p><strong>{value}</strong></div>"#)
}

fn profile_item(label: &str, value: Option<&str>) -> String {
    format!(r#"<div class="item"><span>{label}</span><strong>{}</strong></div>"#, or_dash(value))
}

fn plan_price(plan: &MembershipPlan) -> String {
    format!(
        "&#8377;{} <span>/{} month(s)</span>",
        plan.price, plan.duration_months
    )
}

fn overview(view: &DashboardView) -> String {
    let name = view.owner_name().map(escape).unwrap_or_else(|| "Associate".to_string());
    let days = view.days_remaining();
    let subscription = view.subscription.as_ref();

    let alert = match &view.profile {
        Some(profile) if profile.is_complete() => String::new(),
        _ => r#"<div class="alert"><div><strong>Complete your profile</strong><p>Fill in your salon details to get listed on our platform and receive leads.</p></div><a class="button outline small" href="/dashboard?tab=profile">Complete</a></div>"#.to_string(),
    };

    let plan_name = subscription
        .map(|s| escape(&s.membership_plans.name))
        .unwrap_or_else(|| "No Plan".to_string());
    let days_label = match subscription {
        Some(_) => format!("{days} days"),
        None => DASH.to_string(),
    };
    let status = if view.is_active() { "Active" } else { "Inactive" };
    let templates = if subscription.is_some() { "10 Available" } else { "Locked" };

    let stats = [
        stat("Current Plan", &plan_name, subscription.is_some()),
        stat("Days Remaining", &days_label, days > 0),
        stat("Status", status, view.is_active()),
        stat("Templates", templates, subscription.is_some()),
    ]
    .concat();

    let plan_card = match subscription {
        Some(s) => format!(
            r#"<div class="summary"><h3>{name}</h3><p class="price">{price}</p></div>
<p class="check">Active until {until}</p>
<a class="button outline small" href="/dashboard?tab=subscription">View Full Details</a>"#,
            name = escape(&s.membership_plans.name),
            price = plan_price(&s.membership_plans),
            until = short_date(s.subscription.end_date),
        ),
        None => r#"<div class="empty"><p>No active subscription</p><a class="button small" href="/plans">Subscribe Now</a></div>"#.to_string(),
    };

    let salon_card = match view.profile.as_ref().filter(|p| {
        p.salon_name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }) {
        Some(profile) => format!(
            r#"{}{}{}{}{}<a class="button outline small" href="/dashboard?tab=profile">Edit Profile</a>"#,
            profile_item("Salon", profile.salon_name.as_deref()),
            profile_item("Owner", profile.owner_name.as_deref()),
            profile_item("Mobile", profile.mobile.as_deref()),
            profile_item("City", profile.city.as_deref()),
            profile_item("Services", profile.services.as_deref()),
        ),
        None => r#"<div class="empty"><p>Set up your salon profile</p><a class="button small" href="/dashboard?tab=profile">Fill Profile</a></div>"#.to_string(),
    };

    format!(
        r#"<div class="welcome"><h2>Welcome back, {name}!</h2><p>Here's what's happening with your salon partnership today.</p></div>
{alert}
<div class="grid four">{stats}</div>
<div class="grid two">
  <div class="card"><h3>Plan Overview</h3>{plan_card}</div>
  <div class="card"><h3>Salon Info</h3>{salon_card}</div>
</div>"#
    )
}

fn profile_form(form: &ProfileUpdate) -> String {
    format!(
        r#"<form method="post" action="/dashboard/profile" class="card form">
  <h2>Salon Profile</h2>
  <p>Update your salon information</p>
  <div class="grid two">
    <label>Salon Name *<input name="salon_name" value="{salon_name}" placeholder="Enter salon name"></label>
    <label>Owner Name *<input name="owner_name" value="{owner_name}" placeholder="Enter owner name"></label>
    <label>Mobile Number<input name="mobile" value="{mobile}" placeholder="+91 XXXXX XXXXX"></label>
    <label>City<input name="city" value="{city}" placeholder="Enter city"></label>
  </div>
  <label>Address<textarea name="address" rows="2" placeholder="Full salon address">{address}</textarea></label>
  <label>Services Offered<textarea name="services" rows="2" placeholder="e.g. Hair Cutting, Coloring, Facial, Bridal Packages">{services}</textarea></label>
  <button type="submit" class="button wide">Save Profile</button>
</form>"#,
        salon_name = escape(&form.salon_name),
        owner_name = escape(&form.owner_name),
        mobile = escape(&form.mobile),
        city = escape(&form.city),
        address = escape(&form.address),
        services = escape(&form.services),
    )
}

fn subscription_tab(view: &DashboardView) -> String {
    let Some(s) = view.subscription.as_ref() else {
        return r#"<div class="card empty"><h2>No Active Plan</h2><p>Subscribe to a membership plan to unlock digital marketing support, lead generation, and social media templates.</p><a class="button" href="/plans">View Membership Plans</a></div>"#.to_string();
    };

    format!(
        r#"<div class="welcome"><p>Current Plan</p><h2>{name}</h2><p class="price">{price}</p><span class="pill">Active</span></div>
<div class="card">
  <h3>Plan Details</h3>
  <div class="grid two"><div class="stat"><p>Start Date</p><strong>{start}</strong></div><div class="stat"><p>End Date</p><strong>{end}</strong></div></div>
  <h4>Benefits Included:</h4>
  <ul class="checks">{features}</ul>
</div>
<div class="alert"><p><strong>{days} days</strong> remaining in your current plan</p></div>"#,
        name = escape(&s.membership_plans.name),
        price = plan_price(&s.membership_plans),
        start = long_date(s.subscription.start_date),
        end = long_date(s.subscription.end_date),
        features = features_list(&s.membership_plans.features),
        days = view.days_remaining(),
    )
}

fn templates_tab(view: &DashboardView) -> String {
    let header = r#"<h2>Marketing Templates</h2><p>Download ready-to-use social media templates for your salon</p>"#;

    if view.subscription.is_none() {
        return format!(
            r#"{header}<div class="empty accent"><h3>Templates Locked</h3><p>Subscribe to a membership plan to access 10 premium social media templates every month.</p><a class="button" href="/plans">Subscribe Now</a></div>"#
        );
    }

    let grid: String = TEMPLATES
        .iter()
        .map(|template| {
            format!(
                r#"<div class="card template"><span class="pill">{}</span><h3>{}</h3><p>{}</p><button type="button" class="button outline small wide">Download</button></div>"#,
                escape(template.category),
                escape(template.title),
                escape(template.description)
            )
        })
        .collect();

    format!(r#"{header}<div class="grid three">{grid}</div>"#)
}

pub fn dashboard(view: &DashboardView) -> String {
    let tabs: String = Tab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == view.tab { " class=\"active\"" } else { "" };
            format!(r#"<a href="/dashboard?tab={}"{class}>{}</a>"#, tab.slug(), tab.label())
        })
        .collect();

    let badge = if view.is_active() {
        r#"<span class="pill success">Active Associate</span>"#
    } else {
        r#"<span class="pill danger">Inactive</span>"#
    };

    let content = match view.tab {
        Tab::Overview => overview(view),
        Tab::Profile => profile_form(&view.form),
        Tab::Subscription => subscription_tab(view),
        Tab::Templates => templates_tab(view),
    };

    let display_name = view
        .owner_name()
        .map(escape)
        .unwrap_or_else(|| "Associate".to_string());

    format!(
        r#"<div class="dashboard">
<aside>
  <div class="who"><strong>{display_name}</strong><span>{email}</span></div>
  <nav>{tabs}</nav>
  <form method="post" action="/logout"><button type="submit" class="link">Sign Out</button></form>
</aside>
<div class="panel">
  <div class="topbar"><h1>{title}</h1>{badge}</div>
  {content}
</div>
</div>"#,
        email = escape(&view.user.email),
        title = view.tab.label(),
    )
}

pub struct AdminView {
    pub associates: Vec<Profile>,
    pub subscriptions: Vec<SubscriptionWithPlan>,
    pub selected: Option<Profile>,
}

impl AdminView {
    /// Latest subscription of an associate, if any.
    pub fn subscription_of(&self, user_id: &str) -> Option<&SubscriptionWithPlan> {
        self.subscriptions
            .iter()
            .find(|s| s.subscription.user_id == user_id)
    }
}

fn associate_detail(profile: &Profile) -> String {
    let status = if profile.is_active { "Active" } else { "Inactive" };
    let joined = short_date(profile.created_at);

    format!(
        r#"<div class="modal"><div class="card"><h2>Associate Details</h2>{}{}{}{}{}{}{}{}<a class="button outline wide" href="/admin">Close</a></div></div>"#,
        profile_item("Salon Name", profile.salon_name.as_deref()),
        profile_item("Owner Name", profile.owner_name.as_deref()),
        profile_item("Mobile", profile.mobile.as_deref()),
        profile_item("City", profile.city.as_deref()),
        profile_item("Address", profile.address.as_deref()),
        profile_item("Services", profile.services.as_deref()),
        profile_item("Status", Some(status)),
        profile_item("Joined", Some(&joined)),
    )
}

pub fn admin(view: &AdminView) -> String {
    let active = view.associates.iter().filter(|a| a.is_active).count();

    let mut rows = String::new();
    for associate in &view.associates {
        let plan = match view.subscription_of(&associate.user_id) {
            Some(s) => format!(r#"<span class="pill">{}</span>"#, escape(&s.membership_plans.name)),
            None => r#"<span class="muted">None</span>"#.to_string(),
        };
        let (status, action, action_class) = if associate.is_active {
            (r#"<span class="success">Active</span>"#, "Deactivate", "danger")
        } else {
            (r#"<span class="danger">Inactive</span>"#, "Activate", "success")
        };
        let id = escape(&associate.user_id);

        let _ = write!(
            rows,
            r#"<tr><td>{salon}</td><td>{owner}</td><td>{city}</td><td>{mobile}</td><td>{plan}</td><td>{status}</td>
<td><a href="/admin?view={id}" title="View details">View</a>
<form method="post" action="/admin/associates/{id}/toggle" class="inline"><button type="submit" class="small {action_class}">{action}</button></form></td></tr>"#,
            salon = or_dash(associate.salon_name.as_deref()),
            owner = or_dash(associate.owner_name.as_deref()),
            city = or_dash(associate.city.as_deref()),
            mobile = or_dash(associate.mobile.as_deref()),
        );
    }

    if view.associates.is_empty() {
        rows.push_str(r#"<tr><td colspan="7" class="muted center">No associates registered yet</td></tr>"#);
    }

    let detail = view.selected.as_ref().map(associate_detail).unwrap_or_default();

    format!(
        r#"<section class="admin">
<div class="topbar"><div><h1>Admin Panel</h1><p>Manage associates and subscriptions</p></div>
  <form method="post" action="/logout"><button type="submit" class="button outline">Sign Out</button></form></div>
<div class="grid three">{total}{active}{subscriptions}</div>
{detail}
<div class="card"><h2>All Associates</h2>
<table><thead><tr><th>Salon</th><th>Owner</th><th>City</th><th>Mobile</th><th>Plan</th><th>Status</th><th>Actions</th></tr></thead>
<tbody>{rows}</tbody></table></div>
</section>"#,
        total = stat("Total Associates", &view.associates.len().to_string(), false),
        active = stat("Active", &active.to_string(), true),
        subscriptions = stat("Subscriptions", &view.subscriptions.len().to_string(), true),
    )
}

pub fn not_found(path: &str) -> String {
    format!(
        r#"<section class="hero"><h1>404</h1><p>Oops! Page not found</p><p class="muted">{}</p><a class="button" href="/">Return to Home</a></section>"#,
        escape(path)
    )
}

/// Standalone page for failures that happen before a layout can be built.
pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Something went wrong");

    format!(
        r#"<!doctype html><html lang="en"><head><meta charset="utf-8"><title>{code} | {SHORT_NAME}</title><link rel="stylesheet" href="/static/site.css"></head>
<body><main><section class="hero"><h1>{code}</h1><p>{reason}</p><a class="button" href="/">Return to Home</a></section></main></body></html>"#,
        code = status.as_u16(),
    )
}

#[cfg(test)]
mod tests {
    use bank::models::{Role, Subscription, SubscriptionStatus};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use super::*;

    fn plan(plan_type: &str) -> MembershipPlan {
        MembershipPlan {
            id: "p1".to_string(),
            name: "Growth <Plan>".to_string(),
            plan_type: plan_type.to_string(),
            price: Decimal::new(4999, 0),
            duration_months: 6,
            features: vec!["Priority lead generation".to_string()],
        }
    }

    fn user() -> SessionUser {
        SessionUser {
            id: "u1".to_string(),
            email: "owner@irasalon.com".to_string(),
            access_token: "t".to_string(),
            role: Role::Associate,
        }
    }

    fn profile(is_active: bool) -> Profile {
        Profile {
            user_id: "u1".to_string(),
            salon_name: Some("IRA Studio Dwarka".to_string()),
            owner_name: Some("Asha".to_string()),
            mobile: None,
            city: None,
            address: None,
            services: None,
            is_active,
            created_at: Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
        assert_eq!(or_dash(Some("  ")), DASH);
        assert_eq!(or_dash(None), DASH);
    }

    #[test]
    fn test_tab_from_query() {
        assert_eq!(Tab::from_query(Some("templates")), Tab::Templates);
        assert_eq!(Tab::from_query(Some("bogus")), Tab::Overview);
        assert_eq!(Tab::from_query(None), Tab::Overview);
    }

    #[test]
    fn test_plan_cards() {
        let html = plans(&[plan("growth"), plan("basic")]);

        assert_eq!(html.matches("Popular").count(), 1);
        assert!(html.contains("Growth &lt;Plan&gt;"));
        assert!(html.contains("&#8377;4999 <span>/ 6 months</span>"));
        assert!(html.contains(r#"action="/plans/p1/subscribe""#));
    }

    #[test]
    fn test_dashboard_without_subscription() {
        let user = user();
        let view = DashboardView {
            user: &user,
            profile: Some(profile(false)),
            subscription: None,
            tab: Tab::Overview,
            form: ProfileUpdate::default(),
            now: Utc::now(),
        };
        let html = dashboard(&view);

        assert!(html.contains("Welcome back, Asha!"));
        assert!(html.contains("Complete your profile"));
        assert!(html.contains("No Plan"));
        assert!(html.contains("Locked"));
        assert!(html.contains("Inactive"));
    }

    #[test]
    fn test_dashboard_plan_tab_counts_days() {
        let user = user();
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        let subscription = SubscriptionWithPlan {
            subscription: Subscription {
                id: "s1".to_string(),
                user_id: "u1".to_string(),
                plan_id: "p1".to_string(),
                status: SubscriptionStatus::Active,
                start_date: now - Duration::days(1),
                end_date: now + Duration::days(9) + Duration::hours(2),
            },
            membership_plans: plan("growth"),
        };
        let view = DashboardView {
            user: &user,
            profile: Some(profile(true)),
            subscription: Some(subscription),
            tab: Tab::Subscription,
            form: ProfileUpdate::default(),
            now,
        };
        let html = dashboard(&view);

        assert!(html.contains("<strong>10 days</strong> remaining"));
        assert!(html.contains("4 March 2026"));
        assert!(html.contains("Active Associate"));
    }

    #[test]
    fn test_admin_table() {
        let mut inactive = profile(false);
        inactive.user_id = "u2".to_string();
        inactive.salon_name = None;

        let view = AdminView {
            associates: vec![profile(true), inactive],
            subscriptions: vec![],
            selected: None,
        };
        let html = admin(&view);

        assert!(html.contains("Deactivate"));
        assert!(html.contains(r#"action="/admin/associates/u2/toggle""#));
        assert!(html.contains(DASH));
        assert!(!html.contains("Associate Details"));

        let empty = admin(&AdminView {
            associates: vec![],
            subscriptions: vec![],
            selected: None,
        });
        assert!(empty.contains("No associates registered yet"));
    }
}
