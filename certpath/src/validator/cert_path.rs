//! Provides structures that represent a certification path, before and after validation, including
//! target, intermediate CA certificates and trust anchor.

use alloc::vec::Vec;

use spki::SubjectPublicKeyInfoOwned;

use crate::PDVCertificate;

/// `CertificateChain` is a typedef for a vector of `PDVCertificate`.
pub type CertificateChain = Vec<PDVCertificate>;

/// `CertificationPath` is used to represent the trust anchor, intermediate CA certificates and target certificate
/// that comprise a certification path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[readonly::make]
pub struct CertificationPath {
    /// `target` contains the target certificate for the certification path
    #[readonly]
    pub target: PDVCertificate,
    /// `intermediates` contains zero or more intermediate CA certificates, beginning with the certificate that
    /// issued `target` and proceeding in order to a certificate that was issued by `trust_anchor`, i.e.,
    /// `intermediates\[0\]` verifies `target`, `intermediates\[1\]` verifies `intermediates\[0\]`, etc. until
    /// `trust_anchor` verifies `intermediates[intermediates.len() - 1]`.
    #[readonly]
    pub intermediates: CertificateChain,
    /// `trust_anchor` contains the self-signed trust anchor for the certification path
    #[readonly]
    pub trust_anchor: PDVCertificate,
}

impl CertificationPath {
    /// instantiates a new CertificationPath
    pub fn new(
        trust_anchor: PDVCertificate,
        intermediates: CertificateChain,
        target: PDVCertificate,
    ) -> CertificationPath {
        CertificationPath {
            trust_anchor,
            intermediates,
            target,
        }
    }

    /// `len` returns the number of certificates in the path, including target and trust anchor
    pub fn len(&self) -> usize {
        self.intermediates.len() + 2
    }

    /// A path always contains at least a target and a trust anchor
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `certificates` returns references to the certificates in the path, beginning with the target
    /// and ending with the trust anchor.
    pub fn certificates(&self) -> Vec<&PDVCertificate> {
        let mut v = Vec::with_capacity(self.len());
        v.push(&self.target);
        v.extend(self.intermediates.iter());
        v.push(&self.trust_anchor);
        v
    }
}

/// `VerifiedChain` is a certification path that has been successfully validated. Certificates are
/// ordered from the target to the trust anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[readonly::make]
pub struct VerifiedChain {
    /// Target first, trust anchor last
    pub certificates: CertificateChain,
}

impl From<CertificationPath> for VerifiedChain {
    fn from(path: CertificationPath) -> Self {
        let mut certificates = Vec::with_capacity(path.len());
        certificates.push(path.target);
        certificates.extend(path.intermediates);
        certificates.push(path.trust_anchor);
        VerifiedChain { certificates }
    }
}

impl VerifiedChain {
    /// `target` returns the certificate that was verified
    pub fn target(&self) -> &PDVCertificate {
        &self.certificates[0]
    }

    /// `trust_anchor` returns the trust anchor at which the chain terminates
    pub fn trust_anchor(&self) -> &PDVCertificate {
        &self.certificates[self.certificates.len() - 1]
    }

    /// `target_public_key` returns the public key of the verified certificate
    pub fn target_public_key(&self) -> &SubjectPublicKeyInfoOwned {
        self.target().public_key()
    }

    /// `len` returns the number of certificates in the chain, including target and trust anchor
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// A verified chain always contains at least a target and a trust anchor
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}
