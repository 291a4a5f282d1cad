pub mod priority;
pub mod record;

pub use priority::*;
pub use record::*;
