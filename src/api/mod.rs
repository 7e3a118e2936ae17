//! HTTP request API.
//!
//! - [`query`]: request-target splitting and percent-decoding
//! - [`router`]: path → controller operation, reply building
//! - [`channels`]: bridge from the HTTP task to the control loop

pub mod channels;
pub mod query;
pub mod router;
