pub mod classes;
pub mod error;
pub mod parameters;
pub mod resolve;
pub mod traverse;

pub use classes::*;
pub use error::*;
pub use parameters::*;
pub use resolve::*;
pub use traverse::*;
