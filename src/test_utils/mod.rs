//! Consolidated test utilities for the LinzNetz to InfluxDB2 forwarder.
//!
//! Fixtures, an in-process portal driver, config builders and server mocks
//! shared by the unit tests of every module.

#![cfg(test)]

pub mod config;
pub mod fixtures;
pub mod mocks;
