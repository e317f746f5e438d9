pub mod entity;
pub mod event;
pub mod state;

pub use entity::*;
pub use event::*;
pub use state::*;
