mod app;

pub use app::MonitorApp;
