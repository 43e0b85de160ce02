//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, carries flash messages)
//! 5. Security headers (CSP, frame options, etc.)

pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use flash::{Flash, FlashLevel, push_flash, take_flashes};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, postgres_session_store};
