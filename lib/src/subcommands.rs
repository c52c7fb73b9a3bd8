pub use classify::*;
pub use plot::*;
pub use scaffold::*;

pub mod classify;
pub mod plot;
pub mod scaffold;
