//! Workspace integration tests.

mod config_test;
mod helpers;
mod session_test;
mod storage_test;
