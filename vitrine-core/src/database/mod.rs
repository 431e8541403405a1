pub mod cache;
pub mod infrastructure;
pub mod ports;
pub mod postgres;

pub use cache::{CacheKeys, ListingEntity, NoopCache, RedisCache, RedisSettings};
pub use postgres::{PoolSettings, PoolStats, PostgresDatabase};
