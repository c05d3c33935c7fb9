mod auth;
mod health;
mod socket;
mod threads;

pub use auth::verify_token_handler;
pub use health::health_handler;
pub use socket::ws_handler;
pub use threads::{create_thread_handler, get_chats_handler, list_threads_handler};
