//! Verification façade that classifies a pool of certificates, builds a certification path for a
//! target certificate and validates it.
//!
//! ```no_run
//! use certpath::*;
//!
//! # fn demo(leaf: &[u8], pool: &[Vec<u8>]) -> Result<()> {
//! let target = PDVCertificate::try_from(leaf)?;
//! let pool = pool
//!     .iter()
//!     .map(|c| PDVCertificate::try_from(c.as_slice()))
//!     .collect::<core::result::Result<Vec<_>, _>>()?;
//!
//! let verifier = CertificateVerifier::default();
//! let cps = CertificationPathSettings::default();
//! match verifier.verify_certificate(&cps, Some(&target), &pool) {
//!     Ok(chain) => println!("verified through {}", chain.trust_anchor().subject_name()),
//!     Err(e) => println!("{}", e),
//! }
//! # Ok(())
//! # }
//! ```

use log::info;

use crate::builder::classifier::classify_pool;
use crate::builder::path_builder::{check_target, find_path};
use crate::{
    path_results::*, path_settings::*, populate_5280_pki_environment, util::error::*,
    CertificationPath, PDVCertificate, PkiEnvironment, VerificationError, VerifiedChain,
};

/// `CertificateVerifier` owns the [`PkiEnvironment`] used for signature verification and path
/// validation. It holds no other state, so a single instance may be shared across threads and
/// each call to [`CertificateVerifier::verify_certificate`] is independent.
#[derive(Clone)]
pub struct CertificateVerifier {
    pe: PkiEnvironment,
}

impl Default for CertificateVerifier {
    /// Uses a [`PkiEnvironment`] prepared by [`populate_5280_pki_environment`]
    fn default() -> Self {
        let mut pe = PkiEnvironment::new();
        populate_5280_pki_environment(&mut pe);
        CertificateVerifier { pe }
    }
}

impl CertificateVerifier {
    /// Creates a verifier that uses the given environment
    pub fn new(pe: PkiEnvironment) -> Self {
        CertificateVerifier { pe }
    }

    /// Returns the environment used by the verifier
    pub fn environment(&self) -> &PkiEnvironment {
        &self.pe
    }

    /// `verify_certificate` returns a verified chain from `target` to a self-signed certificate in
    /// `pool`, through zero or more other certificates from `pool`.
    ///
    /// Processing proceeds in order: the target must be present, valid at the time of interest and
    /// not self-signed; the pool is then classified into trust anchors and intermediates; a path is
    /// built; and finally the path is validated. The first failure is returned with the identity of
    /// the certificate that caused it.
    ///
    /// When `cps` has no `PS_TIME_OF_INTEREST`, the current time is read once and used for every
    /// validity check made by the call.
    pub fn verify_certificate(
        &self,
        cps: &CertificationPathSettings,
        target: Option<&PDVCertificate>,
        pool: &[PDVCertificate],
    ) -> core::result::Result<VerifiedChain, VerificationError> {
        let cps = cps.pin_time_of_interest();

        let target = match check_target(&self.pe, &cps, target) {
            Ok(target) => target,
            Err(e) => return Err(VerificationError::new(e, target, None)),
        };

        let classified = match classify_pool(&self.pe, pool) {
            Ok(classified) => classified,
            Err(e) => {
                return Err(VerificationError::new(
                    e.error,
                    Some(e.certificate),
                    e.issuer,
                ))
            }
        };

        let path = match find_path(&self.pe, &cps, target, &classified) {
            Ok(path) => path,
            Err(e) => {
                return Err(VerificationError::new(
                    e.error,
                    Some(e.certificate),
                    e.issuer,
                ))
            }
        };

        let mut cpr = CertificationPathResults::new();
        if let Err(e) = self.pe.validate_path(&cps, &path, &mut cpr) {
            return Err(path_error(e, &path, &cpr));
        }

        info!(
            "Verified {} through {} intermediate(s) to {}",
            path.target.subject_name(),
            path.intermediates.len(),
            path.trust_anchor.subject_name()
        );
        Ok(VerifiedChain::from(path))
    }
}

/// Wraps a validation error using the failed certificate index recorded in the results, defaulting to
/// the target.
fn path_error(
    e: Error,
    path: &CertificationPath,
    cpr: &CertificationPathResults,
) -> VerificationError {
    let certs = path.certificates();
    let index = cpr
        .get_failed_certificate_index()
        .filter(|i| *i < certs.len())
        .unwrap_or(0);
    VerificationError::new(e, Some(certs[index]), certs.get(index + 1).copied())
}
