//! End-to-end tests: spawn the compiled `cubby-server` binary and drive
//! it over real TCP connections.
//!
//! Requires `cargo build` to have produced the server binary first.
#![cfg(test)]

mod helpers;

mod concurrency;
