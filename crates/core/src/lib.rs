pub mod aliases;
pub mod models;
pub mod traits;

pub use aliases::*;
pub use models::*;
pub use traits::*;
