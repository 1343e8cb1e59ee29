//! The built-in combinators. Each is a [`Transform`](crate::Transform) chained through
//! [`ProducerExt`](crate::ProducerExt).

pub mod cached;
pub mod debounce;
pub mod filter;
pub mod flat_map;
pub mod map;
pub mod merge;
pub mod side_effect;
pub mod switch;

pub use cached::*;
pub use debounce::*;
pub use filter::*;
pub use flat_map::*;
pub use map::*;
pub use merge::*;
pub use side_effect::*;
pub use switch::*;
