//! API request handlers

mod control;
mod health;
mod load;
mod metrics;
mod orders;

pub use control::*;
pub use health::*;
pub use load::*;
pub use metrics::*;
pub use orders::*;
