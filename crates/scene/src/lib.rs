pub mod feature;
pub mod state;
pub mod store;
pub mod temporal;
pub mod vertex;

pub use feature::*;
pub use state::*;
pub use store::*;
pub use vertex::*;
