pub mod channel;
pub mod generator;
pub mod metrics;
pub mod polling;

pub use channel::*;
pub use generator::*;
pub use metrics::*;
pub use polling::*;
