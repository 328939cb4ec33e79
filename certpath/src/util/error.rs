//! Error types

use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// `ErrorKind` is the caller-facing taxonomy of verification failures. Each [`PathValidationStatus`]
/// other than `Valid` maps to exactly one kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// The certificate to validate was not supplied.
    AbsentCertificate,
    /// A certificate in the candidate path is outside its validity window at the time of interest.
    Expired,
    /// The certificate to validate is itself self-signed.
    SelfSignedLeaf,
    /// No trust anchor is reachable from the target through the supplied intermediate CA certificates.
    NoPathFound,
    /// A certificate in the path does not chain (by name or by signature) to its claimed issuer.
    BrokenChainLink,
    /// A non-terminal certificate lacks CA authority or a path length constraint is exceeded.
    ConstraintViolation,
    /// Signature or key primitives could not be evaluated at all.
    CryptoEvaluationFailure,
}

/// Granular path processing status
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum PathValidationStatus {
    /// No errors were encountered while validating certification path
    Valid,
    /// MissingCertificate occurs when no target certificate was provided.
    MissingCertificate,
    /// InvalidNotBeforeDate occurs when a certificate contains a notBefore date that is after the
    /// time of interest used for a certification path processing operation.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a certificate contains a notAfter date that is before the time
    /// of interest used for a certification path processing operation.
    InvalidNotAfterDate,
    /// SelfSignedTarget occurs when the target certificate can be verified using its own public key.
    SelfSignedTarget,
    /// NoPathsFound occurs when the certification path builder fails to find any candidate paths.
    NoPathsFound,
    /// NameChainingFailure occurs when a CertificationPath features certificates for which the subject
    /// name of a superior certificate does not match the issuer name of the immediately subordinate certificate.
    NameChainingFailure,
    /// SignatureVerificationFailure occurs when a CertificationPath features certificates for which the subject
    /// public key of a superior certificate does not verify the signature of the immediately subordinate certificate.
    SignatureVerificationFailure,
    /// MissingBasicConstraints occurs when a CertificationPath features an intermediate CA certificate that
    /// does not contain a basicConstraints extension.
    MissingBasicConstraints,
    /// InvalidBasicConstraints occurs when a CertificationPath features an intermediate CA certificate that
    /// contains a basicConstraints extension with the cA field set to false.
    InvalidBasicConstraints,
    /// InvalidPathLength occurs when a CertificationPath has more certificates than allowed by either an
    /// initial path length configuration or a constraint asserted in a CA certificate in the path.
    InvalidPathLength,
    /// CryptoEvaluationFailure occurs when a signature could not be evaluated, i.e., due to an
    /// unsupported algorithm or a malformed public key.
    CryptoEvaluationFailure,
}

impl PathValidationStatus {
    /// `kind` returns the [`ErrorKind`] associated with a failure status or None for `Valid`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PathValidationStatus::Valid => None,
            PathValidationStatus::MissingCertificate => Some(ErrorKind::AbsentCertificate),
            PathValidationStatus::InvalidNotBeforeDate | PathValidationStatus::InvalidNotAfterDate => {
                Some(ErrorKind::Expired)
            }
            PathValidationStatus::SelfSignedTarget => Some(ErrorKind::SelfSignedLeaf),
            PathValidationStatus::NoPathsFound => Some(ErrorKind::NoPathFound),
            PathValidationStatus::NameChainingFailure
            | PathValidationStatus::SignatureVerificationFailure => {
                Some(ErrorKind::BrokenChainLink)
            }
            PathValidationStatus::MissingBasicConstraints
            | PathValidationStatus::InvalidBasicConstraints
            | PathValidationStatus::InvalidPathLength => Some(ErrorKind::ConstraintViolation),
            PathValidationStatus::CryptoEvaluationFailure => {
                Some(ErrorKind::CryptoEvaluationFailure)
            }
        }
    }
}

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// PathValidationError encountered
    PathValidation(PathValidationStatus),
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// Unrecognized occurs when an error conditions does not match anything else here, i.e., when
    /// no registered signature verification callback recognized an algorithm.
    Unrecognized,
    /// An artifact could not be parsed
    ParseError,
    /// Asn1Error is used to propagate error information from the der crate.
    Asn1Error(der::Error),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    StdIoError(std::io::ErrorKind),
}

impl Error {
    /// `kind` maps an error onto the [`ErrorKind`] taxonomy. Errors that do not carry a path
    /// validation status indicate that some input could not be evaluated at all.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PathValidation(pvs) => pvs
                .kind()
                .unwrap_or(ErrorKind::CryptoEvaluationFailure),
            _ => ErrorKind::CryptoEvaluationFailure,
        }
    }

    /// `status` returns the path validation status carried by the error, if any.
    pub fn status(&self) -> Option<PathValidationStatus> {
        match self {
            Error::PathValidation(pvs) => Some(*pvs),
            _ => None,
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl From<PathValidationStatus> for Error {
    fn from(pvs: PathValidationStatus) -> Error {
        Error::PathValidation(pvs)
    }
}

impl std::error::Error for Error {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::AbsentCertificate => write!(f, "AbsentCertificate"),
            ErrorKind::Expired => write!(f, "Expired"),
            ErrorKind::SelfSignedLeaf => write!(f, "SelfSignedLeaf"),
            ErrorKind::NoPathFound => write!(f, "NoPathFound"),
            ErrorKind::BrokenChainLink => write!(f, "BrokenChainLink"),
            ErrorKind::ConstraintViolation => write!(f, "ConstraintViolation"),
            ErrorKind::CryptoEvaluationFailure => write!(f, "CryptoEvaluationFailure"),
        }
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::Valid => write!(f, "Valid"),
            PathValidationStatus::MissingCertificate => write!(f, "MissingCertificate"),
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
            PathValidationStatus::SelfSignedTarget => write!(f, "SelfSignedTarget"),
            PathValidationStatus::NoPathsFound => write!(f, "NoPathsFound"),
            PathValidationStatus::NameChainingFailure => write!(f, "Name chaining failure"),
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::MissingBasicConstraints => write!(f, "MissingBasicConstraints"),
            PathValidationStatus::InvalidBasicConstraints => write!(f, "InvalidBasicConstraints"),
            PathValidationStatus::InvalidPathLength => write!(f, "InvalidPathLength"),
            PathValidationStatus::CryptoEvaluationFailure => write!(f, "CryptoEvaluationFailure"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PathValidation(err) => write!(f, "PathValidationError: {}", err),
            Error::NotFound => write!(f, "NotFound"),
            Error::Unrecognized => write!(f, "Unrecognized"),
            Error::ParseError => write!(f, "ParseError"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
            Error::StdIoError(err) => write!(f, "StdError: {:?}", err),
        }
    }
}

#[test]
fn error_test() {
    let _s = format!("{}", PathValidationStatus::Valid);
    let _s = format!("{}", PathValidationStatus::MissingCertificate);
    let _s = format!("{}", PathValidationStatus::InvalidNotBeforeDate);
    let _s = format!("{}", PathValidationStatus::InvalidNotAfterDate);
    let _s = format!("{}", PathValidationStatus::SelfSignedTarget);
    let _s = format!("{}", PathValidationStatus::NoPathsFound);
    let _s = format!("{}", PathValidationStatus::NameChainingFailure);
    let _s = format!("{}", PathValidationStatus::SignatureVerificationFailure);
    let _s = format!("{}", PathValidationStatus::MissingBasicConstraints);
    let _s = format!("{}", PathValidationStatus::InvalidBasicConstraints);
    let _s = format!("{}", PathValidationStatus::InvalidPathLength);
    let _s = format!("{}", PathValidationStatus::CryptoEvaluationFailure);

    let _s = format!("{}", Error::NotFound);
    let _s = format!("{}", Error::Unrecognized);
    let _s = format!("{}", Error::ParseError);
    let _s = format!("{}", Error::StdIoError(std::io::ErrorKind::NotFound));
    assert_eq!(
        "PathValidationError: NoPathsFound",
        format!("{}", Error::PathValidation(PathValidationStatus::NoPathsFound))
    );
}

#[test]
fn error_kind_test() {
    assert_eq!(None, PathValidationStatus::Valid.kind());
    assert_eq!(
        Some(ErrorKind::AbsentCertificate),
        PathValidationStatus::MissingCertificate.kind()
    );
    assert_eq!(
        Some(ErrorKind::Expired),
        PathValidationStatus::InvalidNotBeforeDate.kind()
    );
    assert_eq!(
        Some(ErrorKind::Expired),
        PathValidationStatus::InvalidNotAfterDate.kind()
    );
    assert_eq!(
        Some(ErrorKind::SelfSignedLeaf),
        PathValidationStatus::SelfSignedTarget.kind()
    );
    assert_eq!(
        Some(ErrorKind::NoPathFound),
        PathValidationStatus::NoPathsFound.kind()
    );
    assert_eq!(
        Some(ErrorKind::BrokenChainLink),
        PathValidationStatus::NameChainingFailure.kind()
    );
    assert_eq!(
        Some(ErrorKind::BrokenChainLink),
        PathValidationStatus::SignatureVerificationFailure.kind()
    );
    assert_eq!(
        Some(ErrorKind::ConstraintViolation),
        PathValidationStatus::InvalidPathLength.kind()
    );
    assert_eq!(
        ErrorKind::CryptoEvaluationFailure,
        Error::Unrecognized.kind()
    );
    assert_eq!(
        ErrorKind::ConstraintViolation,
        Error::PathValidation(PathValidationStatus::MissingBasicConstraints).kind()
    );
    assert_eq!(
        Some(PathValidationStatus::NoPathsFound),
        Error::from(PathValidationStatus::NoPathsFound).status()
    );
}
