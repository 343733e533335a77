//! Reusable utils for binaries that handle common behavior, such as
//! initializing the tracing framework.

pub mod logging;
