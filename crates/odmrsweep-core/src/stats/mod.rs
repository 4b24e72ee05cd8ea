//! Statistics module
//!
//! Retention of completed sweep runs for later inspection ([`history`]).

pub mod history;
