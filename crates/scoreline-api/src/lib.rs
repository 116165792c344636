pub mod accounts;
pub mod chats;
pub mod error;
pub mod extract;
pub mod friends;
pub mod matches;
pub mod routes;
pub mod state;
pub mod tournaments;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
