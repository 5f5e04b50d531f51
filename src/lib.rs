pub mod app;
pub mod config;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod models;
pub mod program;
pub mod progress;
pub mod sessions;
pub mod state;
pub mod store;
pub mod tracker;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::Store;
pub use tracker::Tracker;
