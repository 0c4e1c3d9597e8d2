//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::GatewayAppState;
pub use middleware::csrf_protect;
pub use router::{gateway_router, gateway_router_generic};
