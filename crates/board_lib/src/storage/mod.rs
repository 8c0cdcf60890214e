pub mod journal;
pub mod schema;

pub use journal::*;
