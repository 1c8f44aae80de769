//! The simulated house: its fields, the simulation step, and the shared handle.

mod field;
mod shared;
mod state;

pub use field::FieldKey;
pub use field::HvacMode;
pub use shared::House;
pub use state::HouseState;
pub use state::Toggle;
pub(crate) use state::split_pair;
