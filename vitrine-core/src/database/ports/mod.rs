//! Repository ports (interfaces) grouped by bounded context.
//! These keep the listing engine independent of the concrete store and
//! cache so it can be composed and tested against in-memory adapters.
//!
//! Implementations live in the Postgres adapter under
//! `database::infrastructure::postgres` and in `database::cache`.

pub mod cache;
pub mod maintenance;
pub mod orders;
pub mod product_colors;
pub mod statistics;
