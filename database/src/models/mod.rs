// Row types as stored in PostgreSQL

pub mod subscription;

pub use subscription::*;
