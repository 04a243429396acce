pub mod ids;
pub mod model;
pub mod rollup;
pub mod types;

pub use ids::*;
pub use model::*;
pub use rollup::*;
pub use types::*;
