// Services module: the dashboard service and its section handlers.
pub mod dashboard_service;

pub use dashboard_service::{Chart, DashboardService, SectionId, SectionReport};
