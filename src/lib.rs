//! Single-active-planner multiplexer.
//!
//! A fixed set of interchangeable planners sits behind one control surface.
//! Commands (select, enable, precision) are forwarded to whichever planner is
//! active, and only that planner's status stream is relayed outward.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod logging;
pub mod relay;
pub mod router;
pub mod server;
pub mod shutdown;
