//! Partitions a pool of certificates into trust anchors and intermediate CA certificates

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use log::debug;

use crate::{util::error::*, CertificateChain, PDVCertificate, PkiEnvironment};

/// `ClassifiedCertificates` holds the result of [`classify`]. Each certificate from the pool appears
/// in exactly one of the two lists, in the order it was first encountered in the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedCertificates {
    /// Self-signed certificates
    pub trust_anchors: CertificateChain,
    /// Certificates that are not self-signed
    pub intermediates: CertificateChain,
}

impl ClassifiedCertificates {
    /// `len` returns the total number of classified certificates
    pub fn len(&self) -> usize {
        self.trust_anchors.len() + self.intermediates.len()
    }

    /// `is_empty` returns true when no certificates were classified
    pub fn is_empty(&self) -> bool {
        self.trust_anchors.is_empty() && self.intermediates.is_empty()
    }
}

/// `classify` partitions the pool into trust anchors (certificates whose own public key verifies their
/// signature) and intermediates (everything else).
///
/// Duplicate certificates, i.e., those with identical encodings, are collapsed to the first occurrence.
/// A signature that does not verify places a certificate among the intermediates. A signature that
/// cannot be evaluated at all is returned as an error rather than being treated as not self-signed.
pub fn classify(pe: &PkiEnvironment, pool: &[PDVCertificate]) -> Result<ClassifiedCertificates> {
    classify_pool(pe, pool).map_err(|e| e.error)
}

/// An error raised while classifying a pool or searching it for a path, along with the certificate
/// being examined when it occurred and, for signature checks, the candidate issuer.
#[derive(Debug)]
pub(crate) struct PoolError<'a> {
    pub(crate) error: Error,
    pub(crate) certificate: &'a PDVCertificate,
    pub(crate) issuer: Option<&'a PDVCertificate>,
}

/// [`classify`] that reports which certificate could not be classified
pub(crate) fn classify_pool<'a>(
    pe: &PkiEnvironment,
    pool: &'a [PDVCertificate],
) -> core::result::Result<ClassifiedCertificates, PoolError<'a>> {
    let mut seen: BTreeSet<&[u8]> = BTreeSet::new();
    let mut trust_anchors = Vec::new();
    let mut intermediates = Vec::new();

    for cert in pool {
        if !seen.insert(cert.encoded_cert.as_slice()) {
            continue;
        }

        let self_signed = pe.is_self_signed(cert).map_err(|error| PoolError {
            error,
            certificate: cert,
            issuer: None,
        })?;
        if self_signed {
            debug!("Classified {} as a trust anchor", cert.subject_name());
            trust_anchors.push(cert.clone());
        } else {
            debug!("Classified {} as an intermediate", cert.subject_name());
            intermediates.push(cert.clone());
        }
    }

    Ok(ClassifiedCertificates {
        trust_anchors,
        intermediates,
    })
}
