//! # Domain Layer
//!
//! Pure claim hashing and BLS logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod accumulator;
pub mod bls;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod registration;
pub mod tags;
pub mod value_objects;
