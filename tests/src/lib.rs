//! # Service-Node Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── aggregation_benchmarks.rs   # Hashing, verification and folding costs
//! │
//! └── src/integration/                # Full rounds over an in-process network
//!     └── aggregation_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sn-tests
//!
//! # By category
//! cargo test -p sn-tests integration::
//!
//! # Benchmarks
//! cargo bench -p sn-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
