pub mod class;
pub mod common;
pub mod group;
pub mod node;
pub mod parameter;
pub mod views;

pub use class::*;
pub use common::*;
pub use group::*;
pub use node::*;
pub use parameter::*;
pub use views::*;
