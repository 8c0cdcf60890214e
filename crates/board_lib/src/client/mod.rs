pub mod program;
pub mod rpc;
pub mod transport;
