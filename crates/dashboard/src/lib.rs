pub mod analysis;
pub mod pages;
pub mod widgets;

pub use analysis::*;
pub use pages::*;
