//! Core types for Driftwood Home.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod mobile;
pub mod order_number;
pub mod otp;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{Mobile, MobileError};
pub use order_number::{OrderNumber, OrderNumberError};
pub use otp::{OtpCode, OtpError};
pub use status::*;
