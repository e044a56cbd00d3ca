//! Claim-code digests and digest-membership checks.
//!
//! A locked payload stores only digests of its claim codes. The digest is the
//! lowercase hex of a one-way hash over the code's UTF-8 bytes, so a code
//! sealed in one environment validates in any other that uses the same
//! primitive:
//!
//! ```text
//! digest("X1") = hex(SHA-256(b"X1"))
//! ```
//!
//! The hash primitive is a capability chosen once at construction. There is
//! no fallback: a verifier without a primitive cannot be built.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256 as Sha256Hasher};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::AccessError;

/// A deterministic one-way hash over bytes.
pub trait HashPrimitive: Send + Sync {
    /// Short algorithm name, for logs and configuration.
    fn name(&self) -> &'static str;

    /// Hashes `input` into a fixed-length digest.
    fn hash(&self, input: &[u8]) -> Vec<u8>;
}

/// SHA-256 via the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl HashPrimitive for Sha256 {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn hash(&self, input: &[u8]) -> Vec<u8> {
        Sha256Hasher::digest(input).to_vec()
    }
}

/// Configurable hash algorithm names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Returns the primitive implementing this algorithm.
    pub fn primitive(self) -> Arc<dyn HashPrimitive> {
        match self {
            HashAlgorithm::Sha256 => Arc::new(Sha256),
        }
    }
}

/// Computes claim-code digests and checks them against a stored set.
#[derive(Clone)]
pub struct AccessVerifier {
    primitive: Arc<dyn HashPrimitive>,
}

impl fmt::Debug for AccessVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessVerifier")
            .field("primitive", &self.primitive.name())
            .finish()
    }
}

impl AccessVerifier {
    /// Creates a verifier backed by SHA-256.
    pub fn sha256() -> Self {
        Self::new(Arc::new(Sha256))
    }

    /// Creates a verifier backed by the given primitive.
    pub fn new(primitive: Arc<dyn HashPrimitive>) -> Self {
        Self { primitive }
    }

    /// Creates a verifier for a configured algorithm.
    pub fn for_algorithm(algorithm: HashAlgorithm) -> Self {
        Self::new(algorithm.primitive())
    }

    /// Starts a builder; `build` fails if no primitive was supplied.
    pub fn builder() -> AccessVerifierBuilder {
        AccessVerifierBuilder::default()
    }

    /// Name of the configured primitive.
    pub fn algorithm(&self) -> &'static str {
        self.primitive.name()
    }

    /// Returns the lowercase hex digest of a claim code.
    pub fn digest(&self, code: &str) -> Result<String, AccessError> {
        let raw = self.primitive.hash(code.as_bytes());
        if raw.is_empty() {
            return Err(AccessError::EmptyDigest);
        }
        Ok(hex::encode(raw))
    }

    /// Returns true iff `candidate` equals one of `stored`.
    ///
    /// Order does not matter. An empty candidate never matches, even against
    /// an empty stored digest.
    pub fn is_authorized<S: AsRef<str>>(&self, candidate: &str, stored: &[S]) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let candidate = candidate.as_bytes();
        // Compare against every entry so timing does not depend on position.
        stored.iter().fold(false, |found, digest| {
            let digest = digest.as_ref().as_bytes();
            let equal = digest.len() == candidate.len() && bool::from(digest.ct_eq(candidate));
            found | equal
        })
    }

    /// Digests `code` and checks it against `stored`.
    pub fn check<S: AsRef<str>>(&self, code: &str, stored: &[S]) -> Result<(), AccessError> {
        let candidate = self.digest(code)?;
        if self.is_authorized(&candidate, stored) {
            debug!(algorithm = self.algorithm(), "claim code accepted");
            Ok(())
        } else {
            debug!(algorithm = self.algorithm(), stored = stored.len(), "claim code rejected");
            Err(AccessError::Denied)
        }
    }
}

/// Builder for [`AccessVerifier`].
#[derive(Default)]
pub struct AccessVerifierBuilder {
    primitive: Option<Arc<dyn HashPrimitive>>,
}

impl AccessVerifierBuilder {
    /// Sets the hash primitive.
    pub fn primitive(mut self, primitive: Arc<dyn HashPrimitive>) -> Self {
        self.primitive = Some(primitive);
        self
    }

    /// Sets the hash primitive from a configured algorithm.
    pub fn algorithm(self, algorithm: HashAlgorithm) -> Self {
        self.primitive(algorithm.primitive())
    }

    /// Builds the verifier.
    pub fn build(self) -> Result<AccessVerifier, AccessError> {
        self.primitive
            .map(AccessVerifier::new)
            .ok_or(AccessError::MissingHashPrimitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl HashPrimitive for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn hash(&self, _input: &[u8]) -> Vec<u8> {
            Vec::new()
        }
    }

    #[test]
    fn test_sha256_known_vectors() {
        let verifier = AccessVerifier::sha256();
        assert_eq!(
            verifier.digest("").unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            verifier.digest("abc").unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_is_utf8_based() {
        let verifier = AccessVerifier::sha256();
        let d = verifier.digest("\u{00E9}").unwrap();
        assert_eq!(d, hex::encode(Sha256Hasher::digest("\u{00E9}".as_bytes())));
        assert_eq!(d.len(), 64);
    }

    #[test]
    fn test_membership_order_independent() {
        let verifier = AccessVerifier::sha256();
        let a = verifier.digest("A").unwrap();
        let b = verifier.digest("B").unwrap();
        let c = verifier.digest("C").unwrap();

        assert!(verifier.is_authorized(&b, &[a.clone(), b.clone()]));
        assert!(verifier.is_authorized(&b, &[b.clone(), a.clone()]));
        assert!(!verifier.is_authorized(&c, &[a, b]));
        assert!(!verifier.is_authorized(&c, &[] as &[String]));
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        let verifier = AccessVerifier::sha256();
        assert!(!verifier.is_authorized("", &[""]));
    }

    #[test]
    fn test_check() {
        let verifier = AccessVerifier::sha256();
        let stored = vec![verifier.digest("X1").unwrap()];
        assert!(verifier.check("X1", &stored).is_ok());
        assert_eq!(verifier.check("wrong", &stored), Err(AccessError::Denied));
    }

    #[test]
    fn test_builder_requires_primitive() {
        let result = AccessVerifier::builder().build();
        assert!(matches!(result, Err(AccessError::MissingHashPrimitive)));

        let verifier = AccessVerifier::builder()
            .algorithm(HashAlgorithm::Sha256)
            .build()
            .unwrap();
        assert_eq!(verifier.algorithm(), "sha256");
    }

    #[test]
    fn test_empty_digest_is_an_error() {
        let verifier = AccessVerifier::new(Arc::new(Broken));
        assert_eq!(verifier.digest("anything"), Err(AccessError::EmptyDigest));
        assert_eq!(verifier.check("anything", &[""]), Err(AccessError::EmptyDigest));
    }
}
