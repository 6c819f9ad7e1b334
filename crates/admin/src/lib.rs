//! Circuit Cart admin dashboard library.
//!
//! The dashboard lets the store operator manage the product catalog, look at
//! customers' saved carts, and move orders through fulfillment. It is a thin
//! layer over a backend-as-a-service:
//!
//! - [`gateway`] - the only code that talks to the backend and image host
//! - [`view_model`] - pure aggregates (cart totals, revenue, pending orders)
//! - [`session`] - the single-address admin allow-list
//! - [`dashboard`] - the controller tying them together: refresh, tabs,
//!   mutations and notifications
//!
//! # Security
//!
//! Everything is gated on the admin session. Destructive actions (scrapping a
//! product, rejecting or deleting an order) go through a confirmation prompt.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
pub mod view_model;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Outcome};
pub use error::DashboardError;
