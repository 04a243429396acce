pub mod config;
pub mod hash;
pub mod ingest;
pub mod util;

pub use config::*;
pub use hash::*;
pub use ingest::*;
pub use util::*;
