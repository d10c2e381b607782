pub mod config;
pub mod error;
pub mod event;
pub mod states;

pub use config::Config;
pub use error::*;
pub use event::*;
pub use states::StateClassification;
