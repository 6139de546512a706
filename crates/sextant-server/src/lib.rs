//! Protocol server: exposes the extractor and scorer to external agents over
//! JSON-RPC (one exchange per WebSocket message) plus an HTTP health endpoint.

pub mod handlers;
pub mod rpc;
pub mod server;

pub use handlers::HandlerState;
pub use rpc::{RpcError, RpcRequest, RpcResponse};
pub use server::{start, ServerConfig, ServerHandle};
