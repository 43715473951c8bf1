//! State-change bus: decoupled broadcast of named experiment states.
//!
//! This module contains:
//! - [`StateChangeBus`]: Synchronous, subscription-ordered multicast
//! - [`ExtraData`] / [`ExtraValue`]: The structured payload attached to a publish
//!
//! Presentation components (camera switching, screen blanking, audio cues)
//! subscribe while enabled and react to named states (`"WORD"`, `"ORIENT"`,
//! `"ENCODING"`, …) without depending on each other or on who published.

mod extra;
mod state_bus;

pub use extra::{ExtraData, ExtraValue};
pub use state_bus::{StateChangeBus, SubscriptionId};
