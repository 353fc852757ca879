//! Shared fakes and harness for controller integration tests.
#![allow(dead_code)]

pub mod fakes;
pub mod harness;
