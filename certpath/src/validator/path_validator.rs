//! Provides certification path validation for paths produced by the path builder
//!
//! [`verify_path`] checks, in order:
//! - that names chain from the target through the intermediate CA certificates to the trust anchor,
//! - that each certificate's signature is verified by the public key of the next certificate,
//! - that every certificate is valid at the time of interest, and
//! - that intermediate CA certificates assert CA authority and satisfy path length constraints.
//!
//! The first failure ends processing. The status and the position of the offending certificate,
//! counted from the target, are recorded in the [`CertificationPathResults`].

use const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS;

use crate::{
    environment::pki_environment::PkiEnvironment, environment::pki_environment_traits::*,
    log_message, path_results::*, path_settings::*, pdv_extension::*, util::error::*,
    util::pdv_utilities::*, CertificationPath, PeLogLevels,
};

/// `verify_path` implements the [`ValidatePath`](crate::ValidatePath) interface for
/// [`PkiEnvironment`].
///
/// - The [`PkiEnvironment`] parameter provides the signature verification callbacks.
/// - The [`CertificationPathSettings`] parameter provides the time of interest and governs trust
/// anchor validity checks and basic constraints enforcement.
/// - The [`CertificationPath`] parameter provides the target certificate to validate along with a trust
/// anchor and, if necessary, intermediate CA certificates.
/// - The [`CertificationPathResults`] parameter is used to collect the validation status and, upon
/// failure, the index of the offending certificate.
pub fn verify_path(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    check_names(pe, cps, cp, cpr)?;
    verify_signatures(pe, cps, cp, cpr)?;
    check_validity(pe, cps, cp, cpr)?;
    if cps.get_enforce_basic_constraints() {
        check_basic_constraints(pe, cps, cp, cpr)?;
    }
    cpr.set_validation_status(PathValidationStatus::Valid);
    log_message(
        &PeLogLevels::PeInfo,
        format!(
            "Successfully completed path validation checks for certificate issued to {}",
            cp.target.subject_name()
        )
        .as_str(),
    );
    Ok(())
}

fn record_failure(cpr: &mut CertificationPathResults, pvs: PathValidationStatus, index: usize) {
    cpr.set_validation_status(pvs);
    cpr.set_failed_certificate_index(index);
}

fn fail(cpr: &mut CertificationPathResults, pvs: PathValidationStatus, index: usize) -> Error {
    record_failure(cpr, pvs, index);
    Error::PathValidation(pvs)
}

//-----------------------------------------------------------------------------
// Functions that perform some small aspect of path validation
//-----------------------------------------------------------------------------
/// `check_names` ensures that the issuer name of each certificate matches the subject name of the
/// next certificate in the path.
pub fn check_names(
    _pe: &PkiEnvironment,
    _cps: &CertificationPathSettings,
    cp: &CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    let certs = cp.certificates();
    for (i, pair) in certs.windows(2).enumerate() {
        let (child, parent) = (pair[0], pair[1]);
        if !compare_names(child.issuer(), parent.subject()) {
            log_error_for_cert(
                child,
                format!(
                    "issuer name does not match subject name of next certificate: {}",
                    parent.subject_name()
                )
                .as_str(),
            );
            return Err(fail(cpr, PathValidationStatus::NameChainingFailure, i));
        }
    }
    Ok(())
}

/// `verify_signatures` verifies the certificate signatures of certificates found in a certification path.
///
/// A signature that does not verify yields `SignatureVerificationFailure`. A signature that cannot be
/// evaluated yields the error reported by the [`PkiEnvironment`] with `CryptoEvaluationFailure`
/// recorded as the validation status.
pub fn verify_signatures(
    pe: &PkiEnvironment,
    _cps: &CertificationPathSettings,
    cp: &CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    let certs = cp.certificates();
    for (i, pair) in certs.windows(2).enumerate() {
        let (child, parent) = (pair[0], pair[1]);
        match pe.verify_certificate_signature(child, parent) {
            Ok(SignatureStatus::Valid) => {}
            Ok(SignatureStatus::Invalid) => {
                log_error_for_cert(child, "signature verification failure");
                return Err(fail(
                    cpr,
                    PathValidationStatus::SignatureVerificationFailure,
                    i,
                ));
            }
            Err(e) => {
                log_error_for_cert(
                    child,
                    format!("signature verification error: {}", e).as_str(),
                );
                record_failure(cpr, PathValidationStatus::CryptoEvaluationFailure, i);
                return Err(e);
            }
        }
    }
    Ok(())
}

/// `check_validity` evaluates the target certificate, intermediate certificates and, if
/// `PS_ENFORCE_TRUST_ANCHOR_VALIDITY` is set, the trust anchor against the `PS_TIME_OF_INTEREST`
/// value read from the [`CertificationPathSettings`] parameter.
pub fn check_validity(
    _pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    let toi = cps.get_time_of_interest();
    if 0 == toi {
        log_message(
            &PeLogLevels::PeInfo,
            "check_validity invoked with no time of interest; validity check disabled",
        );
        return Ok(());
    }

    let certs = cp.certificates();
    let ta_index = certs.len() - 1;
    for (i, cert) in certs.iter().enumerate() {
        if i == ta_index && !cps.get_enforce_trust_anchor_validity() {
            break;
        }
        if let Err(e) = valid_at_time(&cert.decoded_cert.tbs_certificate, toi, false) {
            if let Error::PathValidation(pvs) = e {
                record_failure(cpr, pvs, i);
            }
            return Err(e);
        }
    }
    Ok(())
}

/// `check_basic_constraints` ensures all intermediate CA certificates feature a basicConstraints extension
/// with the cA field set to true and that the certificate path length does not violate length constraints.
///
/// It uses values from the [`PS_INITIAL_PATH_LENGTH_CONSTRAINT`] item in the [`CertificationPathSettings`]
/// and the path_len_constraint field of basicConstraints extensions. The trust anchor's path_len_constraint
/// is only considered when `PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS` is set.
pub fn check_basic_constraints(
    _pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    let mut path_len_constraint = cps.get_initial_path_length_constraint();
    if cps.get_enforce_trust_anchor_constraints() {
        if let Some(pl) = cp
            .trust_anchor
            .basic_constraints()
            .and_then(|bc| bc.path_len_constraint)
        {
            path_len_constraint = path_len_constraint.min(pl);
        }
    }

    // process from the certificate issued by the trust anchor towards the target
    for (i, ca_cert) in cp.intermediates.iter().enumerate().rev() {
        let index = i + 1;

        // self-issued certificates do not count against the path length
        if !is_self_issued(&ca_cert.decoded_cert) {
            if path_len_constraint == 0 {
                log_error_for_cert(ca_cert, "path length constraint violation");
                return Err(fail(cpr, PathValidationStatus::InvalidPathLength, index));
            }
            path_len_constraint -= 1;
        }

        let bc = match ca_cert.get_extension(&ID_CE_BASIC_CONSTRAINTS)? {
            Some(PDVExtension::BasicConstraints(bc)) => bc,
            _ => {
                log_error_for_cert(ca_cert, "missing basic constraints");
                return Err(fail(
                    cpr,
                    PathValidationStatus::MissingBasicConstraints,
                    index,
                ));
            }
        };

        if !bc.ca {
            log_error_for_cert(ca_cert, "invalid basic constraints");
            return Err(fail(
                cpr,
                PathValidationStatus::InvalidBasicConstraints,
                index,
            ));
        }

        if let Some(pl) = bc.path_len_constraint {
            path_len_constraint = path_len_constraint.min(pl);
        }
    }

    Ok(())
}

