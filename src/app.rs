use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/company", get(handlers::search))
        .route("/company/:corp_id", get(handlers::company_page))
        .route("/company/:corp_id/ai-report", post(handlers::ai_report))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/company/:corp_id/charts", get(handlers::get_charts))
        .route("/api/company/:corp_id/sector", post(handlers::apply_sector))
        .route("/api/company/:corp_id/theme", post(handlers::toggle_theme))
        .with_state(state)
}
