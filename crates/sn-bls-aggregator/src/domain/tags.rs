//! # Domain Tags
//!
//! Every signed hash starts with a tag bound to the claim kind and to the
//! network, so a signature for one kind or one network never verifies as
//! another.
//!
//! ```text
//! tag = keccak(label || chain_id (32-byte BE) || contract address)
//! ```
//!
//! The chain id and contract fields are fixed width, so the label is
//! recoverable from the preimage and distinct labels can never collide.

use primitive_types::U256;
use shared_types::{Address, FixedBytes, Hash};

use super::entities::ClaimKind;
use super::hashing::keccak256;

/// Label of the proof-of-possession tag used by registrations.
pub const POP_TAG_LABEL: &[u8] = b"BLS_SIG_TRYANDINCREMENT_POP";

/// The network a tag is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkIdentity {
    /// EVM chain id of the network's settlement chain
    pub chain_id: u64,
    /// Address of the contract that consumes the aggregate signatures
    pub contract: Address,
}

impl NetworkIdentity {
    pub fn new(chain_id: u64, contract: Address) -> Self {
        Self { chain_id, contract }
    }
}

/// A domain-separation tag (Keccak-256 digest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DomainTag(pub Hash);

impl DomainTag {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Build the tag for `kind` on `network`.
pub fn build_tag(kind: ClaimKind, network: &NetworkIdentity) -> DomainTag {
    tag_hash(kind.tag_label(), network)
}

/// Build the proof-of-possession tag on `network`.
pub fn build_pop_tag(network: &NetworkIdentity) -> DomainTag {
    tag_hash(POP_TAG_LABEL, network)
}

fn tag_hash(label: &[u8], network: &NetworkIdentity) -> DomainTag {
    let mut chain_id = [0u8; 32];
    U256::from(network.chain_id).to_big_endian(&mut chain_id);
    DomainTag(keccak256(&[label, &chain_id, network.contract.as_bytes()]))
}

/// All tags for one network, computed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainTags {
    network: NetworkIdentity,
    reward: DomainTag,
    removal: DomainTag,
    liquidation: DomainTag,
    pop: DomainTag,
}

impl DomainTags {
    pub fn new(network: NetworkIdentity) -> Self {
        Self {
            reward: build_tag(ClaimKind::RewardBalance, &network),
            removal: build_tag(ClaimKind::Exit, &network),
            liquidation: build_tag(ClaimKind::Liquidation, &network),
            pop: build_pop_tag(&network),
            network,
        }
    }

    pub fn network(&self) -> &NetworkIdentity {
        &self.network
    }

    pub fn for_kind(&self, kind: ClaimKind) -> &DomainTag {
        match kind {
            ClaimKind::RewardBalance => &self.reward,
            ClaimKind::Exit => &self.removal,
            ClaimKind::Liquidation => &self.liquidation,
        }
    }

    pub fn pop(&self) -> &DomainTag {
        &self.pop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn networks() -> Vec<NetworkIdentity> {
        vec![
            NetworkIdentity::new(42161, Address::new([0xaa; 20])),
            NetworkIdentity::new(421614, Address::new([0xaa; 20])),
            NetworkIdentity::new(42161, Address::new([0xbb; 20])),
            NetworkIdentity::new(1, Address::null()),
        ]
    }

    #[test]
    fn test_build_tag_is_deterministic() {
        for network in networks() {
            for kind in ClaimKind::ALL {
                assert_eq!(build_tag(kind, &network), build_tag(kind, &network));
            }
        }
    }

    #[test]
    fn test_build_tag_is_injective_over_kind_and_network() {
        let mut seen = HashSet::new();
        for network in networks() {
            for kind in ClaimKind::ALL {
                assert!(seen.insert(build_tag(kind, &network)), "{kind:?} {network:?}");
            }
            assert!(seen.insert(build_pop_tag(&network)));
        }
        assert_eq!(seen.len(), networks().len() * 4);
    }

    #[test]
    fn test_domain_tags_cache_matches_builder() {
        let network = networks()[0];
        let tags = DomainTags::new(network);

        for kind in ClaimKind::ALL {
            assert_eq!(tags.for_kind(kind), &build_tag(kind, &network));
        }
        assert_eq!(tags.pop(), &build_pop_tag(&network));
        assert_eq!(tags.network(), &network);
    }

    #[test]
    fn test_tag_preimage_layout() {
        let network = NetworkIdentity::new(0x0102, Address::new([0x33; 20]));

        let mut preimage = ClaimKind::Exit.tag_label().to_vec();
        let mut chain_id = [0u8; 32];
        chain_id[30] = 0x01;
        chain_id[31] = 0x02;
        preimage.extend_from_slice(&chain_id);
        preimage.extend_from_slice(&[0x33; 20]);

        assert_eq!(
            build_tag(ClaimKind::Exit, &network).0,
            keccak256(&[&preimage])
        );
    }
}
