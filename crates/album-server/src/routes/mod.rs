//! Page and API routes.

pub mod health;
pub mod login;
pub mod photos;

pub use health::{HealthResponse, health_routes};
pub use login::{LoginForm, login_page, login_submit, logout};
pub use photos::{ViewQuery, list_handler, upload_handler, upload_page, view_handler};
