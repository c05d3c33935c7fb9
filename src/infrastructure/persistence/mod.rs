mod pg_pool;
mod pg_thread_repository;

pub use pg_pool::create_pool;
pub use pg_thread_repository::PgThreadRepository;
