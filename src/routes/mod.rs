mod appointments;
mod courses;
mod demo_login;
mod google_auth;
mod health;
mod login;
mod payments;
mod profile;
mod register;
mod reviews;
mod services;
mod upload;
mod users;
mod working_hours;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// Three layers of access. Public routes gate admin writes per-handler
/// through the AdminClaims extractor; the authed and admin routers put the
/// check in middleware so every route under them is covered.
pub fn create_router() -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/register", post(register::register_user))
        .route("/auth/login", post(login::login_user))
        .route("/auth/google", post(google_auth::google_auth))
        .route("/auth/demo-login", post(demo_login::demo_login))
        .route("/appointments/by-date", get(appointments::list_by_date))
        .route(
            "/appointments/check",
            get(appointments::check_slot_availability),
        )
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route(
            "/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/reviews/all", get(reviews::list_all_reviews))
        .route(
            "/reviews/{id}",
            put(reviews::moderate_review).delete(reviews::delete_review),
        )
        .route(
            "/working-hours",
            get(working_hours::get_working_hours).post(working_hours::upsert_working_hours),
        )
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route("/webhook/stripe", post(payments::stripe_webhook));

    let authed = Router::new()
        .route("/auth/user", get(profile::current_user))
        .route("/auth/logout", post(profile::logout))
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/appointments/user", get(appointments::list_user_appointments))
        .route(
            "/appointments/{id}",
            put(appointments::update_appointment).delete(appointments::delete_appointment),
        )
        .route("/users/me", put(users::update_profile))
        .layer(middleware::from_fn(crate::middleware::auth_middleware));

    let admin = Router::new()
        .route(
            "/appointments/recent",
            get(appointments::list_recent_appointments),
        )
        .route("/users", get(users::list_users).post(users::admin_create_user))
        .route("/users/{id}", put(users::admin_update_user))
        .route("/upload", post(upload::upload_file))
        .layer(middleware::from_fn(crate::middleware::admin_middleware));

    Router::new().nest("/api", public.merge(authed).merge(admin))
}
