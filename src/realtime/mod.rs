//! Real-time chat over WebSocket
//!
//! ```text
//! /ws ─> handler ─┬─ writer task  (mpsc queue → socket)
//!                 └─ Session      (frames → Assistant → registry.send_to)
//! ```

pub mod handler;
pub mod protocol;
pub mod registry;
pub mod session;

pub use handler::{realtime_router, RealtimeState};
pub use protocol::{FrameKind, InboundFrame, OutboundMessage};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use session::Session;
