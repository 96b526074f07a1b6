pub mod discovery_flow;
pub mod flow_phase;
pub mod save_payload;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use discovery_flow::DiscoveryFlow;
pub use flow_phase::{Completion, FlowPhase, RequestKind, RequestTicket, SelectionTicket};
pub use save_payload::build_save_request;
pub use session::DiscoverySession;
