//! # Wire Format
//!
//! Request argument decoding and the sorted-key reply bodies exchanged
//! between responders and aggregators.

pub mod codec;
pub mod messages;

pub use codec::{SortedDictConsumer, SortedDictProducer, WireError};
pub use messages::{
    decode_fixed_arg, decode_signed_reply, encode_signed_reply, error_reply, success_reply,
    SIGNATURE_FIELD, STATUS_OK,
};
