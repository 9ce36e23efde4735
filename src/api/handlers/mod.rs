pub mod health;
pub mod markets;
pub mod metrics;
pub mod predictions;
pub mod profiles;

use serde::Serialize;

/// Uniform response envelope for /api routes.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
