//! Structures and functions related to results from certification path processing operations

use alloc::collections::BTreeMap;

use certpath_macros::*;

use crate::PathValidationStatus;

/// `CertificationPathResultsTypes` is used to define a variant map with types associated with
/// the results of certification path validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertificationPathResultsTypes {
    /// Represents validation result
    PathValidationStatus(PathValidationStatus),
    /// Represents an index into a certification path
    Usize(usize),
}

/// `CertificationPathResults` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Clone, Debug, Default)]
pub struct CertificationPathResults(pub BTreeMap<&'static str, CertificationPathResultsTypes>);

impl CertificationPathResults {
    /// Creates a new [`CertificationPathResults`]
    pub fn new() -> Self {
        Self(Default::default())
    }
}

/// `PR_VALIDATION_STATUS` is used to retrieve a status code indicating validation result.
pub static PR_VALIDATION_STATUS: &str = "cprValidationStatus";

/// `PR_FAILED_CERTIFICATE_INDEX` is used to retrieve the position of the certificate that caused
/// validation to fail, counting from the target (0) through the trust anchor.
pub static PR_FAILED_CERTIFICATE_INDEX: &str = "cprFailedCertificateIndex";

//-----------------------------------------------------------------------------------------------
// Getters/setters for results
//-----------------------------------------------------------------------------------------------
cpr_gets_and_sets!(PR_VALIDATION_STATUS, PathValidationStatus);
cpr_gets_and_sets!(PR_FAILED_CERTIFICATE_INDEX, usize);

#[test]
fn test_default_gets_cpr() {
    let mut cpr = CertificationPathResults::new();
    assert_eq!(None, cpr.get_validation_status());
    assert_eq!(None, cpr.get_failed_certificate_index());

    cpr.set_validation_status(PathValidationStatus::InvalidPathLength);
    cpr.set_failed_certificate_index(2);
    assert_eq!(
        Some(PathValidationStatus::InvalidPathLength),
        cpr.get_validation_status()
    );
    assert_eq!(Some(2), cpr.get_failed_certificate_index());
}
