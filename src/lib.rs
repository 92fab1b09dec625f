//! Ares Travel - travel agency backend with a real-time chat assistant
//!
//! Serves a destination catalog, JSON-file backed bookings and a chat
//! assistant over both HTTP and a WebSocket channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        HTTP (axum)                         │
//! │  /  /health  /destinations  /config  /bookings  /api/* /ws │
//! └─────┬─────────────┬──────────────┬─────────────┬───────────┘
//!       │             │              │             │
//! ┌─────▼─────┐ ┌─────▼────────┐ ┌───▼───────┐ ┌───▼───────────┐
//! │  Catalog  │ │ BookingStore │ │ Assistant │◄┤ Session (/ws) │
//! └───────────┘ └─────┬────────┘ └───┬───────┘ └───┬───────────┘
//!                     │              │             │
//!               ┌─────▼────┐ ┌───────▼──────┐ ┌────▼───────────────┐
//!               │ DataFile │ │ mock | openai│ │ ConnectionRegistry │
//!               └──────────┘ └──────────────┘ └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`realtime`]: WebSocket sessions, keep-alive and the connection registry
//! - [`assistant`]: response providers, fallback replies, chat endpoints
//! - [`bookings`]: booking validation, ids and persistence
//! - [`catalog`]: destination list
//! - [`storage`]: JSON data file with scratch/seed precedence
//! - [`api`]: router assembly and root endpoints
//! - [`config`]: configuration management

pub mod api;
pub mod assistant;
pub mod bookings;
pub mod catalog;
pub mod config;
pub mod error;
pub mod realtime;
pub mod server;
pub mod site;
pub mod storage;

pub use config::AresConfig;
pub use error::{Error, Result};
pub use server::{Server, ServerBuilder};
