//! Platform-independent handling of inbound chat messages.
//!
//! Concrete adapters translate platform events into [`InboundMessage`]s and
//! implement [`ChatTransport`]; [`ReplyHandler`] carries out the rest of a
//! turn: recording, reply gating, generation, filtering and delivery.

pub mod chunk;
pub mod gate;
pub mod handler;
pub mod mentions;
pub mod transport;

pub use handler::{ReplyHandler, TurnOutcome};
pub use transport::{ChatTransport, InboundMessage};
