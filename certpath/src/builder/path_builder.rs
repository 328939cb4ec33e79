//! Builds a certification path from a target certificate to a trust anchor
//!
//! The search is depth first over issuer/subject relationships, beginning at the target. At each
//! step trust anchors are tried before intermediate CA certificates, and within each group candidates
//! are tried in the order in which they appeared in the pool. A certificate already on the current
//! path is never revisited, so mutually cross-certified CAs cannot cause unbounded searching. An
//! intermediate whose every onward route has been shown not to reach a trust anchor is remembered for
//! the rest of the search and not extended again, so each intermediate is explored at most once.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use log::{debug, error};

use crate::{
    environment::pki_environment_traits::SignatureStatus, path_settings::*,
    util::error::*, util::pdv_utilities::*, CertificationPath, ClassifiedCertificates,
    PDVCertificate, PkiEnvironment, PoolError,
};

/// `check_target` verifies that a target certificate was supplied, that it is within its validity
/// period at the `PS_TIME_OF_INTEREST` and that it is not self-signed, in that order.
///
/// These are preconditions, not search failures: no path is built for a target that fails any of them.
pub fn check_target<'a>(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    target: Option<&'a PDVCertificate>,
) -> Result<&'a PDVCertificate> {
    let target = match target {
        Some(target) => target,
        None => {
            error!("No target certificate was provided");
            return Err(Error::PathValidation(
                PathValidationStatus::MissingCertificate,
            ));
        }
    };

    valid_at_time(
        &target.decoded_cert.tbs_certificate,
        cps.get_time_of_interest(),
        false,
    )?;

    if pe.is_self_signed(target)? {
        log_error_for_cert(target, "target certificate is self-signed");
        return Err(Error::PathValidation(
            PathValidationStatus::SelfSignedTarget,
        ));
    }
    Ok(target)
}

/// `build_path` checks the target using [`check_target`] then searches for a path from the target to
/// one of the classified trust anchors through zero or more of the classified intermediates.
///
/// The first path found is returned. When `PS_USE_VALIDATOR_FILTER_WHEN_BUILDING` is set, an edge
/// is only followed when the candidate issuer's public key verifies the subordinate certificate's
/// signature. If the search is exhausted, `NoPathsFound` is returned unless a signature could not be
/// evaluated along the way, in which case that error is returned instead.
pub fn build_path(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    target: Option<&PDVCertificate>,
    classified: &ClassifiedCertificates,
) -> Result<CertificationPath> {
    let target = check_target(pe, cps, target)?;
    find_path(pe, cps, target, classified).map_err(|e| e.error)
}

/// Path search without the target preconditions. Errors name the certificate they concern: the
/// target when no path exists, or the subordinate certificate whose signature could not be evaluated.
pub(crate) fn find_path<'a>(
    pe: &'a PkiEnvironment,
    cps: &CertificationPathSettings,
    target: &'a PDVCertificate,
    classified: &'a ClassifiedCertificates,
) -> core::result::Result<CertificationPath, PoolError<'a>> {
    let mut search = PathSearch {
        pe,
        classified,
        use_filter: cps.get_use_validator_filter_when_building(),
        crypto_error: None,
        on_path: BTreeSet::new(),
        dead_ends: BTreeSet::new(),
        path: Vec::new(),
    };

    search.on_path.insert(target.encoded_cert.as_slice());
    if let Some(ta) = search.extend(target) {
        let intermediates = search.path.iter().map(|c| (*c).clone()).collect();
        debug!(
            "Found path for {} terminating at {}",
            target.subject_name(),
            ta.subject_name()
        );
        return Ok(CertificationPath::new(
            ta.clone(),
            intermediates,
            target.clone(),
        ));
    }

    if let Some(e) = search.crypto_error {
        error!(
            "No path found for {}; signature evaluation failed during search: {}",
            target.subject_name(),
            e.error
        );
        return Err(e);
    }

    error!("No path found for {}", target.subject_name());
    Err(PoolError {
        error: Error::PathValidation(PathValidationStatus::NoPathsFound),
        certificate: target,
        issuer: None,
    })
}

struct PathSearch<'a> {
    pe: &'a PkiEnvironment,
    classified: &'a ClassifiedCertificates,
    use_filter: bool,
    crypto_error: Option<PoolError<'a>>,
    /// encodings of certificates on the current path, including the target
    on_path: BTreeSet<&'a [u8]>,
    /// encodings of intermediates from which no trust anchor can be reached
    dead_ends: BTreeSet<&'a [u8]>,
    /// intermediate CA certificates on the current path, target side first
    path: Vec<&'a PDVCertificate>,
}

impl<'a> PathSearch<'a> {
    /// Returns the trust anchor that terminates a path through `current`, leaving the intermediates
    /// of that path in `self.path`.
    fn extend(&mut self, current: &'a PDVCertificate) -> Option<&'a PDVCertificate> {
        let classified = self.classified;

        for ta in &classified.trust_anchors {
            if self.is_candidate(current, ta) {
                return Some(ta);
            }
        }

        for ca in &classified.intermediates {
            if self.dead_ends.contains(ca.encoded_cert.as_slice()) {
                continue;
            }
            if !self.is_candidate(current, ca) {
                continue;
            }
            self.on_path.insert(ca.encoded_cert.as_slice());
            self.path.push(ca);
            if let Some(ta) = self.extend(ca) {
                return Some(ta);
            }
            self.path.pop();
            self.on_path.remove(ca.encoded_cert.as_slice());
        }

        // any route skipped here for being on the current path leads back through an ancestor
        self.dead_ends.insert(current.encoded_cert.as_slice());
        None
    }

    fn is_candidate(&mut self, child: &'a PDVCertificate, parent: &'a PDVCertificate) -> bool {
        if self.on_path.contains(parent.encoded_cert.as_slice()) {
            return false;
        }
        if !compare_names(parent.subject(), child.issuer()) {
            return false;
        }
        if !self.use_filter {
            return true;
        }

        match self.pe.verify_certificate_signature(child, parent) {
            Ok(SignatureStatus::Valid) => true,
            Ok(SignatureStatus::Invalid) => {
                debug!(
                    "Skipping {} as issuer of {}: signature does not verify",
                    parent.subject_name(),
                    child.subject_name()
                );
                false
            }
            Err(e) => {
                debug!(
                    "Skipping {} as issuer of {}: {}",
                    parent.subject_name(),
                    child.subject_name(),
                    e
                );
                if self.crypto_error.is_none() {
                    self.crypto_error = Some(PoolError {
                        error: e,
                        certificate: child,
                        issuer: Some(parent),
                    });
                }
                false
            }
        }
    }
}
