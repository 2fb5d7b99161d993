mod handlers;
mod routes;
mod state;

pub use handlers::{RecommendationList, RecommendationRequest};
pub use routes::create_router;
pub use state::AppState;
