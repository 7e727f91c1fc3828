pub mod error;
pub mod innings;
pub mod matches;
pub mod players;
pub mod predictions;
pub mod stats;

pub use error::*;
pub use innings::*;
pub use matches::*;
pub use players::*;
pub use predictions::*;
