pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::{AppConfig, load_config};
pub use server::{ServerBuilder, SurgischedServer, build_app};
pub use state::AppState;
