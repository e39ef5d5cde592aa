// MCP (Model Context Protocol) gateway: authenticated tool dispatch over JSON-RPC

pub mod dispatch;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatch::Dispatcher;
pub use server::{McpReply, McpServer};
