//! # Response Validation
//!
//! Decides whether one peer's reply may contribute to the aggregate. The
//! claim and hash are always the caller's; the reply is only checked against
//! them.

use shared_types::BlsSignature;

use crate::domain::bls::verify_bls;
use crate::domain::entities::{Claim, MessageHash, PeerResponse};
use crate::domain::errors::ResponseRejection;
use crate::wire::{decode_signed_reply, STATUS_OK};

/// Validate `response` against the caller's `claim` and return the signature
/// to fold.
///
/// Checks, in order: transport success, status and shape, echoed claim
/// fields, then the signature against the peer's directory key and the
/// locally computed `message_hash`.
pub fn validate_response(
    claim: &Claim,
    message_hash: &MessageHash,
    response: &PeerResponse,
) -> Result<BlsSignature, ResponseRejection> {
    if !response.success {
        return Err(ResponseRejection::TransportFailure);
    }

    let Some((status, rest)) = response.data.split_first() else {
        return Err(ResponseRejection::Malformed("empty reply".into()));
    };

    if status.as_slice() != STATUS_OK.as_bytes() {
        let parts: Vec<_> = response
            .data
            .iter()
            .map(|part| String::from_utf8_lossy(part))
            .collect();
        return Err(ResponseRejection::ErrorStatus(parts.join(" ")));
    }

    let [body] = rest else {
        return Err(ResponseRejection::Malformed(format!(
            "expected one body part, got {}",
            rest.len()
        )));
    };

    let reply = decode_signed_reply(claim.kind(), body)?;
    check_echo(claim, &reply.claim)?;

    if !verify_bls(message_hash, &reply.signature, &response.peer.bls_pubkey) {
        return Err(ResponseRejection::InvalidSignature {
            bls_pubkey: response.peer.bls_pubkey,
        });
    }

    Ok(reply.signature)
}

fn check_echo(expected: &Claim, echoed: &Claim) -> Result<(), ResponseRejection> {
    match (expected, echoed) {
        (
            Claim::RewardBalance {
                address,
                amount,
                height,
            },
            Claim::RewardBalance {
                address: echoed_address,
                amount: echoed_amount,
                height: echoed_height,
            },
        ) => {
            if address != echoed_address {
                return Err(ResponseRejection::SubjectMismatch);
            }
            if amount != echoed_amount || height != echoed_height {
                return Err(ResponseRejection::ClaimMismatch {
                    expected_amount: *amount,
                    expected_height: *height,
                    amount: *echoed_amount,
                    height: *echoed_height,
                });
            }
            Ok(())
        }
        (Claim::Exit { bls_pubkey: a }, Claim::Exit { bls_pubkey: b })
        | (Claim::Liquidation { bls_pubkey: a }, Claim::Liquidation { bls_pubkey: b })
            if a == b =>
        {
            Ok(())
        }
        _ => Err(ResponseRejection::SubjectMismatch),
    }
}
