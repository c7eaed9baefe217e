//! Content versioning for xDS resource sets

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::resources::{EnvoyResource, ResourceType};

/// Version assigned to a resource set that is intentionally empty
pub const EMPTY_VERSION: &str = "empty";

static HASH_FAILURE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("marshalling {resource_type} resource {name} for hashing: {reason}")]
    Marshal {
        resource_type: ResourceType,
        name: String,
        reason: String,
    },

    #[error("hashing {resource_type}: {reason}")]
    Failed {
        resource_type: ResourceType,
        reason: String,
    },
}

/// Computes a content version for a set of resources
///
/// Implementations must be deterministic and insensitive to the order of
/// `resources`.
pub trait ResourceHasher {
    fn hash<R: EnvoyResource>(&self, resources: &[R]) -> Result<u64, HashError>;
}

/// SHA-256 over each resource's JSON encoding
///
/// Per-resource digests are sorted before being folded, so any permutation of
/// the same resources produces the same version.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256ResourceHasher;

impl ResourceHasher for Sha256ResourceHasher {
    fn hash<R: EnvoyResource>(&self, resources: &[R]) -> Result<u64, HashError> {
        let mut digests = resources
            .iter()
            .map(|res| {
                let encoded = serde_json::to_vec(res).map_err(|e| HashError::Marshal {
                    resource_type: R::RESOURCE_TYPE,
                    name: res.resource_name().to_string(),
                    reason: e.to_string(),
                })?;
                let digest: [u8; 32] = Sha256::digest(&encoded).into();
                Ok(digest)
            })
            .collect::<Result<Vec<_>, HashError>>()?;
        digests.sort_unstable();

        let mut hasher = Sha256::new();
        for digest in &digests {
            hasher.update(digest);
        }
        let out = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&out[..8]);
        Ok(u64::from_be_bytes(prefix))
    }
}

/// Version token of one resource family in a snapshot
///
/// A failed hash gets a unique id, so two failures never compare equal and a
/// cache always treats them as a change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Version {
    Hashed(String),
    HashFailed {
        resource_type: ResourceType,
        id: u64,
        error: HashError,
    },
}

impl Version {
    pub fn empty() -> Self {
        Version::Hashed(EMPTY_VERSION.to_string())
    }

    pub fn failed(resource_type: ResourceType, error: HashError) -> Self {
        Version::HashFailed {
            resource_type,
            id: HASH_FAILURE_ID.fetch_add(1, Ordering::Relaxed),
            error,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Version::HashFailed { .. })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Hashed(v) => f.write_str(v),
            Version::HashFailed {
                resource_type, id, ..
            } => write!(f, "{resource_type}-hashErr-{id}"),
        }
    }
}
