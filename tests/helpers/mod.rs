// Shared helpers for the integration suites.
#![allow(dead_code)]

pub mod testroot;

pub use facts::TestEmitter;
pub use testroot::TestRoot;
