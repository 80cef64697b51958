//! Email backend implementations
//!
//! - **SMTP**: send through an SMTP relay (production)
//! - **Console**: log emails instead of sending them (development)

pub mod console;
pub mod smtp;
