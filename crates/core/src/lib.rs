//! Circuit Cart Core - Shared types library.
//!
//! This crate provides the domain types used across the Circuit Cart
//! admin components:
//! - `admin` - Dashboard library (gateway, view model, session gate, controller)
//! - `cli` - Operator command line
//!
//! # Architecture
//!
//! The core crate contains only types and their rules - no I/O, no HTTP
//! clients. Everything the backend store hands back is decoded into these
//! types before the dashboard touches it.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, emails, categories and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
