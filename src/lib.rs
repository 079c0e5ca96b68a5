pub mod app;
pub mod charts;
pub mod company;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod feed;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod registry;
pub mod render;
pub mod report;
pub mod sector;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::load_data;
