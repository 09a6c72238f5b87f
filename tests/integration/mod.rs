//! Integration test suite
//!
//! End-to-end turn flows over the in-memory database and a scripted
//! reasoning provider.

mod support;

mod breaker_test;
mod isolation_test;
mod recurrence_test;
mod turn_flow_test;
