//! # Request and Reply Messages
//!
//! ```text
//! request: endpoint, [subject]            subject = address (20) or BLS pubkey (96)
//! reply:   ["200", body] | ["400" | "403" | "500", message]
//!
//! reward body:       {"address", "balance", "height", "signature"}
//! exit body:         {"exit", "signature"}
//! liquidation body:  {"liquidate", "signature"}
//! ```

use shared_types::{Address, BlsPublicKey, BlsSignature, FixedBytes};

use super::codec::{SortedDictConsumer, SortedDictProducer, WireError};
use crate::domain::entities::{Claim, ClaimKind, MessageParts, SignedReply};
use crate::domain::errors::Rejection;

/// Status of a successful reply.
pub const STATUS_OK: &str = "200";

/// Key carrying the signature in every reply body.
pub const SIGNATURE_FIELD: &str = "signature";

fn is_hex(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_hexdigit)
}

/// Decode the single fixed-width argument of a request.
///
/// Accepts `0x`/`0X`-prefixed hex, bare hex or raw bytes, in that order of
/// precedence.
pub fn decode_fixed_arg<T: FixedBytes>(
    parts: &[Vec<u8>],
    command: &str,
    value_name: &str,
) -> Result<T, Rejection> {
    let [arg] = parts else {
        return Err(Rejection::BadRequest(format!(
            "Bad request: {command} command should have one {value_name} data part; received {}",
            parts.len()
        )));
    };

    let decoded = if arg.len() == 2 + 2 * T::LEN
        && (arg.starts_with(b"0x") || arg.starts_with(b"0X"))
        && is_hex(&arg[2..])
    {
        std::str::from_utf8(arg).ok().and_then(|s| T::from_hex(s).ok())
    } else if arg.len() == 2 * T::LEN && is_hex(arg) {
        std::str::from_utf8(arg).ok().and_then(|s| T::from_hex(s).ok())
    } else if arg.len() == T::LEN {
        T::from_slice(arg).ok()
    } else {
        None
    };

    decoded.ok_or_else(|| {
        Rejection::BadRequest(format!(
            "Bad request: {command} command data should be a {}-byte {value_name}; got {} bytes",
            T::LEN,
            arg.len()
        ))
    })
}

/// Body of a successful reply.
pub fn encode_signed_reply(reply: &SignedReply) -> Result<Vec<u8>, WireError> {
    let mut body = SortedDictProducer::new();
    match &reply.claim {
        Claim::RewardBalance {
            address,
            amount,
            height,
        } => {
            body.append_bytes("address", address)?
                .append_u64("balance", *amount)?
                .append_u64("height", *height)?;
        }
        Claim::Exit { bls_pubkey } | Claim::Liquidation { bls_pubkey } => {
            body.append_bytes(reply.claim.kind().subject_field(), bls_pubkey)?;
        }
    }
    body.append_bytes(SIGNATURE_FIELD, &reply.signature)?;
    body.finish()
}

/// Parse a successful reply body for a `kind` request.
pub fn decode_signed_reply(kind: ClaimKind, body: &[u8]) -> Result<SignedReply, WireError> {
    let mut dict = SortedDictConsumer::parse(body)?;

    let claim = match kind {
        ClaimKind::RewardBalance => {
            let address: Address = dict.require_bytes("address")?;
            let amount = dict.require_u64("balance")?;
            let height = dict.require_u64("height")?;
            Claim::RewardBalance {
                address,
                amount,
                height,
            }
        }
        ClaimKind::Exit => Claim::Exit {
            bls_pubkey: dict.require_bytes::<BlsPublicKey>(kind.subject_field())?,
        },
        ClaimKind::Liquidation => Claim::Liquidation {
            bls_pubkey: dict.require_bytes::<BlsPublicKey>(kind.subject_field())?,
        },
    };
    let signature: BlsSignature = dict.require_bytes(SIGNATURE_FIELD)?;

    Ok(SignedReply { claim, signature })
}

/// `["200", body]`.
pub fn success_reply(body: Vec<u8>) -> MessageParts {
    vec![STATUS_OK.as_bytes().to_vec(), body]
}

/// `[status, message]` for a refused request.
pub fn error_reply(rejection: &Rejection) -> MessageParts {
    vec![
        rejection.status().as_bytes().to_vec(),
        rejection.to_string().into_bytes(),
    ]
}
