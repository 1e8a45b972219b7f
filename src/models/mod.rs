pub mod item;
pub mod health;
pub mod message;
pub mod error;

pub use item::*;
pub use health::*;
pub use message::*;
pub use error::*;
