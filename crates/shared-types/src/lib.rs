//! # Shared Types Crate
//!
//! Fixed-width primitive types used by every crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the byte widths of addresses, BLS keys and
//!   signatures are defined here and nowhere else.
//! - **No Implicit Conversions**: values are built from exact-width arrays or
//!   through [`FixedBytes::from_slice`] / [`FixedBytes::from_hex`], which
//!   reject anything of the wrong size.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
