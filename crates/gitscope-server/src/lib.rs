//! HTTP + WebSocket server and the embedded browser client

pub mod assets;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;
pub mod state;
pub mod websocket;

pub use router::create_router;
pub use server::{GitscopeServer, ServerConfig};
pub use state::{RefreshEvent, ServerState};
