use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, admin_login, admin_logout, borrow_item, get_eligibility, get_overdue_report,
    get_user, list_items, list_overdue_loans, list_user_loans, pay_fine, quote_fine,
    record_fine, register_item, register_user, return_item, send_reminders, unregister_user,
};

/// Creates the API router with all circulation endpoints
///
/// Users and admin:
/// - POST /users, GET /users/:id, DELETE /users/:id (admin only)
/// - POST /admin/login, POST /admin/logout
///
/// Catalog and loans:
/// - POST /items, GET /items
/// - POST /loans, POST /loans/:id/return, GET /loans/overdue
/// - GET /users/:id/loans, GET /users/:id/eligibility
///
/// Fines, reports and reminders:
/// - GET /fine-rates/:item_type
/// - POST /users/:id/fines, POST /users/:id/fines/payments
/// - GET /users/:id/overdue-report, POST /reminders
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Users and admin session
        .route("/users", post(register_user))
        .route("/users/:id", get(get_user).delete(unregister_user))
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        // Catalog
        .route("/items", get(list_items).post(register_item))
        // Loans
        .route("/loans", post(borrow_item))
        .route("/loans/overdue", get(list_overdue_loans))
        .route("/loans/:id/return", post(return_item))
        .route("/users/:id/loans", get(list_user_loans))
        .route("/users/:id/eligibility", get(get_eligibility))
        // Fines and reports
        .route("/fine-rates/:item_type", get(quote_fine))
        .route("/users/:id/fines", post(record_fine))
        .route("/users/:id/fines/payments", post(pay_fine))
        .route("/users/:id/overdue-report", get(get_overdue_report))
        .route("/reminders", post(send_reminders))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
