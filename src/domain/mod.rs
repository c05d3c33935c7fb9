mod chat;
mod chat_id;
mod chat_role;
mod connection_id;
mod thread;
mod thread_id;
mod user_id;

pub use chat::Chat;
pub use chat_id::ChatId;
pub use chat_role::ChatRole;
pub use connection_id::ConnectionId;
pub use thread::Thread;
pub use thread_id::ThreadId;
pub use user_id::UserId;
