use crate::config::AppConfig;
use crate::models::AppData;
use crate::report::ReportGenerator;
use crate::theme::Stylesheet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub data: Arc<Mutex<AppData>>,
    pub stylesheet: Arc<Stylesheet>,
    pub reports: Arc<dyn ReportGenerator>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        data: AppData,
        stylesheet: Stylesheet,
        reports: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(Mutex::new(data)),
            stylesheet: Arc::new(stylesheet),
            reports,
        }
    }
}
