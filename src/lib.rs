pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod storage;

pub use domain::*;
pub use storage::{Backend, MemoryStore, OrderStore, SqliteStore};
