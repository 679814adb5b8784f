pub mod clock;
pub mod config;
pub mod engine;

pub use clock::*;
pub use config::*;
pub use engine::*;
