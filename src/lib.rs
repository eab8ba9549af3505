//! Newsdesk - a news feed with comments and personal notes
//!
//! This library provides the core functionality shared by the `newsdesk`
//! server binary and its test harness.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod views;

#[cfg(test)]
pub mod testing;
