pub mod chain;
pub mod subscribe;

pub use chain::*;
pub use subscribe::*;
