//! Error returned by the certificate verification façade

use alloc::string::String;
use core::fmt;

use x509_cert::time::Validity;

use crate::util::error::{Error, ErrorKind, PathValidationStatus};
use crate::PDVCertificate;

/// `VerificationError` wraps the error that ended a verification attempt with the identity of the
/// certificate most relevant to the failure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[readonly::make]
pub struct VerificationError {
    /// Category of the failure
    pub kind: ErrorKind,
    /// Granular status, when the failure was a path validation failure
    pub status: Option<PathValidationStatus>,
    /// Subject name of the offending certificate, if a certificate was available
    pub subject: Option<String>,
    /// Subject name of the claimed issuer when a link between two certificates was broken, or of the
    /// candidate issuer whose key could not be used to evaluate the signature
    pub issuer_subject: Option<String>,
    /// Validity period of the offending certificate when the failure was due to expiry
    pub validity: Option<Validity>,
    /// The underlying error
    pub cause: Error,
}

impl VerificationError {
    /// `new` wraps `cause` with context drawn from `cert`, the offending certificate, and `issuer`,
    /// the certificate `cert` failed to chain to, if any.
    pub fn new(
        cause: Error,
        cert: Option<&PDVCertificate>,
        issuer: Option<&PDVCertificate>,
    ) -> VerificationError {
        let kind = cause.kind();
        let validity = match kind {
            ErrorKind::Expired => cert.map(|c| c.validity().clone()),
            _ => None,
        };
        let issuer_subject = match kind {
            ErrorKind::BrokenChainLink | ErrorKind::CryptoEvaluationFailure => {
                issuer.map(|c| c.subject_name())
            }
            _ => None,
        };
        VerificationError {
            kind,
            status: cause.status(),
            subject: cert.map(|c| c.subject_name()),
            issuer_subject,
            validity,
            cause,
        }
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.cause)?;
        if let Some(subject) = &self.subject {
            write!(f, " (certificate: {}", subject)?;
            if let Some(issuer) = &self.issuer_subject {
                write!(f, "; issuer: {}", issuer)?;
            }
            if let Some(validity) = &self.validity {
                write!(
                    f,
                    "; not before: {}; not after: {}",
                    validity.not_before, validity.not_after
                )?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

#[test]
fn verification_error_display_test() {
    let e = VerificationError::new(
        Error::PathValidation(PathValidationStatus::MissingCertificate),
        None,
        None,
    );
    assert_eq!(ErrorKind::AbsentCertificate, e.kind);
    assert_eq!(Some(PathValidationStatus::MissingCertificate), e.status);
    assert_eq!(
        "AbsentCertificate: PathValidationError: MissingCertificate",
        e.to_string()
    );

    let e = VerificationError::new(Error::Unrecognized, None, None);
    assert_eq!(ErrorKind::CryptoEvaluationFailure, e.kind);
    assert_eq!(None, e.status);
}
