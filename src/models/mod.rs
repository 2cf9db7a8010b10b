pub mod agent;
pub mod chat;
pub mod discussion;
pub mod rental;
pub mod review;
pub mod usage;

pub use agent::*;
pub use chat::*;
pub use discussion::*;
pub use rental::*;
pub use review::*;
pub use usage::*;
