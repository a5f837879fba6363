mod health;
mod query;
mod url;

pub use health::HealthResponse;
pub use query::{DaysQuery, LimitQuery};
pub use url::{CreateUrlRequest, CreateUrlResponse, ErrorResponse};
