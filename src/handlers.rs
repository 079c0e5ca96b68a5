use crate::company::{company_detail, placeholder_detail, resolve_stock_code};
use crate::dashboard::{Dashboard, DashboardFrame, PageData};
use crate::errors::AppError;
use crate::models::{CompanyDetail, CompanyQuery, SectorRequest, SectorResponse};
use crate::registry::{FrameBackend, Slot};
use crate::state::AppState;
use crate::theme::{CookiePreferences, PresentationContext, Theme, ThemeController};
use crate::ui::{PageView, render_page};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect},
};
use tracing::{info, warn};

const PREFERS_COLOR_SCHEME: &str = "sec-ch-prefers-color-scheme";

pub async fn index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("/company/{}", state.config.default_company))
}

pub async fn search(State(state): State<AppState>, Query(query): Query<CompanyQuery>) -> Redirect {
    let requested = query.corp_id.unwrap_or_default();
    let resolved = {
        let data = state.data.lock().await;
        resolve_stock_code(&requested, &data)
    };
    let code = match resolved {
        Ok(code) => code,
        Err(err) => {
            warn!(corp_id = %requested, "{err}, showing default company");
            state.config.default_company.clone()
        }
    };
    Redirect::to(&format!("/company/{code}"))
}

pub async fn company_page(
    State(state): State<AppState>,
    Path(corp_id): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let detail = load_detail(&state, &corp_id).await;
    render_company(&state, &detail, &headers, None)
}

pub async fn ai_report(
    State(state): State<AppState>,
    Path(corp_id): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let detail = load_detail(&state, &corp_id).await;
    let report = state.reports.generate(&detail);
    info!(ticker = %detail.company_info.ticker, "generated report");
    render_company(&state, &detail, &headers, Some(&report))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<CompanyDetail>, AppError> {
    let corp_id = query
        .corp_id
        .ok_or_else(|| AppError::bad_request("corp_id is required"))?;
    let data = state.data.lock().await;
    let code = resolve_stock_code(&corp_id, &data)?;
    Ok(Json(company_detail(&code, &data)?))
}

pub async fn get_charts(
    State(state): State<AppState>,
    Path(corp_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DashboardFrame>, AppError> {
    let detail = load_detail(&state, &corp_id).await;
    let theme = theme_controller(&headers).current();
    let mut dashboard = dashboard(&state, &detail, theme)?;
    dashboard.render_all();
    Ok(Json(dashboard.frame()))
}

pub async fn apply_sector(
    State(state): State<AppState>,
    Path(corp_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<SectorRequest>,
) -> Result<Json<SectorResponse>, AppError> {
    let detail = load_detail(&state, &corp_id).await;
    let theme = theme_controller(&headers).current();
    let mut dashboard = dashboard(&state, &detail, theme)?;

    let sector = dashboard
        .sector_mut()
        .ok_or_else(|| AppError::not_found("no sector data"))?;
    sector.restore(&payload.selected, payload.keep_highlight);
    let view = dashboard
        .apply_sector_filter()
        .cloned()
        .ok_or_else(|| AppError::not_found("no sector chart"))?;

    let chart = dashboard
        .registry()
        .get(Slot::Sector)
        .map(|chart| chart.config.clone());
    Ok(Json(SectorResponse { view, chart }))
}

pub async fn toggle_theme(
    State(state): State<AppState>,
    Path(corp_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<SectorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let detail = load_detail(&state, &corp_id).await;
    let mut controller = theme_controller(&headers);
    let mut dashboard = dashboard(&state, &detail, controller.current())?;
    if let Some(sector) = dashboard.sector_mut() {
        sector.restore_applied(&payload.selected, payload.keep_highlight);
    }

    let event = controller.toggle();
    dashboard.on_theme_changed(event);
    info!(theme = event.theme.as_str(), "theme toggled");

    let cookies = controller
        .store()
        .set_cookie_headers()
        .into_iter()
        .map(|value| (header::SET_COOKIE, value));
    Ok((AppendHeaders(cookies), Json(dashboard.frame())))
}

fn render_company(
    state: &AppState,
    detail: &CompanyDetail,
    headers: &HeaderMap,
    report: Option<&str>,
) -> Result<Html<String>, AppError> {
    let theme = theme_controller(headers).current();
    let mut dashboard = dashboard(state, detail, theme)?;
    dashboard.render_all();
    let frame = dashboard.frame();

    Ok(Html(render_page(&PageView {
        detail,
        frame: &frame,
        sector: dashboard.sector(),
        report_html: report,
    })))
}

/// Company detail for a page, or a placeholder when the id resolves to
/// nothing.
async fn load_detail(state: &AppState, corp_id: &str) -> CompanyDetail {
    let data = state.data.lock().await;
    match resolve_stock_code(corp_id, &data).and_then(|code| company_detail(&code, &data)) {
        Ok(detail) => detail,
        Err(err) => {
            warn!(%corp_id, "{err}, rendering placeholder");
            placeholder_detail(corp_id)
        }
    }
}

fn dashboard(
    state: &AppState,
    detail: &CompanyDetail,
    theme: Theme,
) -> Result<Dashboard<FrameBackend>, AppError> {
    let data = PageData::from_detail(detail)?;
    let backend = FrameBackend::with_surfaces(data.surfaces());
    let context = PresentationContext::new(theme, state.stylesheet.clone());
    Ok(Dashboard::new(backend, context, data))
}

fn theme_controller(headers: &HeaderMap) -> ThemeController<CookiePreferences> {
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(CookiePreferences::parse)
        .unwrap_or_default();
    let prefers_dark = headers
        .get(PREFERS_COLOR_SCHEME)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_matches('"').eq_ignore_ascii_case("dark"));
    ThemeController::init(cookies, prefers_dark)
}
