pub mod notification;
pub mod registry;

pub use notification::*;
pub use registry::*;
