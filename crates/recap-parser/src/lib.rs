pub mod error;
pub mod recap;
pub mod report;
pub mod scan;

pub use error::*;
pub use recap::*;
pub use report::*;
pub use scan::*;
