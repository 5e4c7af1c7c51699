pub mod notices;
pub mod throttle;

pub use notices::*;
pub use throttle::*;
