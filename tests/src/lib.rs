//! MediCitas Test Suite
//!
//! End-to-end tests over the in-memory backend:
//! - Booking validation and the stored document shape
//! - Cancellation and doctor confirmation
//! - Patient scoping of appointment lists
//! - Account and profile flows through the assembled services
//! - Property tests for the status machine and form helpers

pub mod harness;

pub mod booking;
pub mod cancellation;
pub mod listing;
pub mod accounts;

pub mod property_tests;
