pub mod app;
pub mod health_check;
