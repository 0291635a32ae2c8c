pub mod charts;
pub mod config;
pub mod templates;

pub use config::{Config, LogFormat, PredictorKind};
pub use templates::{build_info, BuildInfo, DashboardTemplate, FormValues, ReportView};
