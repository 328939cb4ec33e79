//! The pki_environment_traits module features type definitions that are used by [`PkiEnvironment`]
//! to provide functionality that supports building and/or validating X.509 certification paths.

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::util::error::*;
use crate::{
    CertificationPath, CertificationPathResults, CertificationPathSettings, PkiEnvironment,
};

/// `SignatureStatus` is the outcome of a signature verification that could be evaluated.
///
/// A signature that could not be evaluated at all, i.e., because the algorithm is not supported or
/// the public key is malformed, is reported as an error instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SignatureStatus {
    /// The public key verifies the signature over the message
    Valid,
    /// The public key does not verify the signature over the message, including when the key is
    /// not of a type that can produce signatures using the indicated algorithm
    Invalid,
}

impl SignatureStatus {
    /// `is_valid` returns true for [`SignatureStatus::Valid`]
    pub fn is_valid(&self) -> bool {
        SignatureStatus::Valid == *self
    }
}

/// `ValidatePath` provides a function signature for implementations that perform certification path
/// validation.
pub type ValidatePath = fn(
    &PkiEnvironment,
    &CertificationPathSettings,    // path settings to govern validation
    &CertificationPath,            // path to verify
    &mut CertificationPathResults, // path validation results
) -> Result<()>;

/// `VerifySignatureMessage` provides a function signature for implementations that perform signature
/// verification over a message.
pub type VerifySignatureMessage = fn(
    &PkiEnvironment,
    &[u8],                      // message to hash and verify
    &[u8],                      // signature
    &AlgorithmIdentifierOwned,  // signature algorithm
    &SubjectPublicKeyInfoOwned, // public key
) -> Result<SignatureStatus>;
