// Engine configuration module
pub mod settings;

pub use settings::DashboardSettings;
