// crates/mekgold-rpc/src/lib.rs
//
// mekgold-rpc: JSON-RPC server and handlers for the income engine.
//
// A single tonic service accepts JSON-encoded `{method, params}` requests and
// dispatches them to the handler modules. No protobuf codegen is involved.

pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server type for ergonomic access.
pub use server::{JsonRpcRequest, JsonRpcResponse, MekGoldRpcServer, RpcConfig, SERVICE_NAME};
