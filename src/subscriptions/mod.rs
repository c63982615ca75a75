//! Subscription wrappers and the instructions they carry.
//!
//! A wrapper is sent from the primary side of a foreign-key join to the
//! partition owning the foreign key. It names the primary key, what to do
//! with its subscription, and the protocol version that produced it.

mod instruction;
mod wire;
mod wrapper;

pub use instruction::{Instruction, StoreEffect};
pub use wire::SubscriptionWrapperSerde;
pub use wrapper::{SubscriptionWrapper, CURRENT_VERSION};
