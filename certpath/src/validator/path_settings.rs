//! Structures and functions related to configuring certification path processing operations

use alloc::collections::BTreeMap;
use alloc::string::String;
use std::path::Path;

use serde::{Deserialize, Serialize};

use certpath_macros::*;

use crate::alloc::string::ToString;
use crate::util::error::*;
use crate::util::pdv_utilities::get_now_as_unix_epoch;

/// `CertificationPathSettings` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationPathSettings(pub BTreeMap<String, CertificationPathProcessingTypes>);

impl CertificationPathSettings {
    /// Creates a new empty [`CertificationPathSettings`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of these settings with `PS_TIME_OF_INTEREST` set explicitly, reading the
    /// current time if no value was present. An explicit value, including zero, is kept.
    pub fn pin_time_of_interest(&self) -> Self {
        let mut cps = self.clone();
        cps.set_time_of_interest(self.get_time_of_interest());
        cps
    }
}

//-----------------------------------------------------------------------------------------------
// Enum used to define all path settings
//-----------------------------------------------------------------------------------------------
/// `CertificationPathProcessingTypes` is used to define a variant map with types associated with
/// performing certification path discovery and validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificationPathProcessingTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u8 values
    U8(u8),
    /// Represents u64 values
    U64(u64),
}

//-----------------------------------------------------------------------------------------------
// Types of path settings
//-----------------------------------------------------------------------------------------------
/// `PS_TIME_OF_INTEREST` is used to retrieve a Time value from a [`CertificationPathSettings`]
/// object. This corresponds to the current date/time value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. The value
/// need not be current data/time and can be a time in the past to support retrospective validation.
/// The value is expressed as a u64 containing seconds since Unix epoch (i.e., 1970-01-01T00:00:00Z).
/// By default, the value is set to current time. A value of zero disables validity checks.
pub static PS_TIME_OF_INTEREST: &str = "psTimeOfInterest";

/// `PS_ENFORCE_TRUST_ANCHOR_VALIDITY` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. When true, the validity period of the trust anchor certificate is evaluated along with
/// the other certificates in the path. By default, this value is set to true.
pub static PS_ENFORCE_TRUST_ANCHOR_VALIDITY: &str = "psEnforceTrustAnchorValidity";

/// `PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the enforceTrustAnchorConstraints value described in
/// [RFC 5937 Section 3.1]: <https://datatracker.ietf.org/doc/html/rfc5937#section-3.1>. When true, a
/// pathLenConstraint asserted in the trust anchor's basicConstraints extension limits the number
/// of intermediate CA certificates. By default, this value is set to false.
pub static PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS: &str = "psEnforceTrustAnchorConstraints";

/// `PS_ENFORCE_BASIC_CONSTRAINTS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. When true, each intermediate CA certificate must assert cA in a basicConstraints
/// extension and path length constraints are enforced. By default, this value is set to true.
pub static PS_ENFORCE_BASIC_CONSTRAINTS: &str = "psEnforceBasicConstraints";

/// `PS_INITIAL_PATH_LENGTH_CONSTRAINT` is used to retrieve a u8 value from a [`CertificationPathSettings`]
/// object. This value is the maximum number of non-self-issued intermediate CA certificates that
/// may appear in a path. By default, the value is [`PS_MAX_PATH_LENGTH_CONSTRAINT`].
pub static PS_INITIAL_PATH_LENGTH_CONSTRAINT: &str = "psInitialPathLengthConstraint";

/// `PS_USE_VALIDATOR_FILTER_WHEN_BUILDING` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. When true, the path builder only follows an edge from a certificate to a candidate
/// issuer when the candidate's public key verifies the certificate's signature. When false, edges
/// are followed on the basis of names alone and signatures are checked by the path validator. By
/// default, this value is set to true.
pub static PS_USE_VALIDATOR_FILTER_WHEN_BUILDING: &str = "psUseValidatorFilterWhenBuilding";

/// `PS_MAX_PATH_LENGTH_CONSTRAINT` is the default value for [`PS_INITIAL_PATH_LENGTH_CONSTRAINT`].
pub const PS_MAX_PATH_LENGTH_CONSTRAINT: u8 = 15;

//-----------------------------------------------------------------------------------------------
// Getters/setters for settings
//-----------------------------------------------------------------------------------------------
cps_gets_and_sets_with_default!(PS_TIME_OF_INTEREST, u64, get_now_as_unix_epoch());
cps_gets_and_sets_with_default!(PS_ENFORCE_TRUST_ANCHOR_VALIDITY, bool, true);
cps_gets_and_sets_with_default!(PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS, bool, false);
cps_gets_and_sets_with_default!(PS_ENFORCE_BASIC_CONSTRAINTS, bool, true);
cps_gets_and_sets_with_default!(
    PS_INITIAL_PATH_LENGTH_CONSTRAINT,
    u8,
    PS_MAX_PATH_LENGTH_CONSTRAINT
);
cps_gets_and_sets_with_default!(PS_USE_VALIDATOR_FILTER_WHEN_BUILDING, bool, true);

/// `read_settings` accepts a string containing the name of a file that notionally contains JSON data that
/// represents CertificationPathSettings.
///
/// When no file name is provided, or the named file does not exist, a default settings object is
/// returned. A file that exists but cannot be read or parsed yields an error.
pub fn read_settings(fname: &Option<String>) -> Result<CertificationPathSettings> {
    if let Some(fname) = fname {
        let p = Path::new(fname.as_str());
        if Path::exists(p) {
            let json = std::fs::read(p)?;
            return match serde_json::from_slice::<CertificationPathSettings>(&json) {
                Ok(cps) => Ok(cps),
                Err(_e) => Err(Error::ParseError),
            };
        }
    }
    Ok(CertificationPathSettings::new())
}

#[test]
fn test_default_gets_cps() {
    let cps = CertificationPathSettings::default();

    let before = get_now_as_unix_epoch();
    assert!(cps.get_time_of_interest() >= before);
    assert!(cps.get_enforce_trust_anchor_validity());
    assert!(!cps.get_enforce_trust_anchor_constraints());
    assert!(cps.get_enforce_basic_constraints());
    assert_eq!(15, cps.get_initial_path_length_constraint());
    assert!(cps.get_use_validator_filter_when_building());
}

#[test]
fn test_sets_cps() {
    let mut cps = CertificationPathSettings::new();
    cps.set_time_of_interest(1_600_000_000);
    cps.set_enforce_basic_constraints(false);
    cps.set_initial_path_length_constraint(2);
    assert_eq!(1_600_000_000, cps.get_time_of_interest());
    assert!(!cps.get_enforce_basic_constraints());
    assert_eq!(2, cps.get_initial_path_length_constraint());
    assert_eq!(3, cps.0.len());
}

#[test]
fn test_pin_time_of_interest() {
    let before = get_now_as_unix_epoch();
    let pinned = CertificationPathSettings::new().pin_time_of_interest();
    assert!(pinned.0.contains_key(PS_TIME_OF_INTEREST));
    let toi = pinned.get_time_of_interest();
    assert!(toi >= before);
    assert_eq!(toi, pinned.get_time_of_interest());

    for explicit in [0, 1_600_000_000] {
        let mut cps = CertificationPathSettings::new();
        cps.set_use_validator_filter_when_building(false);
        cps.set_time_of_interest(explicit);
        let pinned = cps.pin_time_of_interest();
        assert_eq!(cps, pinned);
        assert_eq!(explicit, pinned.get_time_of_interest());
    }
}

#[test]
fn test_read_settings() {
    let mut cps = CertificationPathSettings::new();
    cps.set_time_of_interest(1_600_000_000);
    cps.set_use_validator_filter_when_building(false);
    let json = serde_json::to_string(&cps).unwrap();

    let dir = std::env::temp_dir().join(format!("certpath-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let good = dir.join("settings.json");
    std::fs::write(&good, json).unwrap();
    let read = read_settings(&Some(good.to_str().unwrap().to_string())).unwrap();
    assert_eq!(cps, read);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, b"not json").unwrap();
    assert_eq!(
        Err(Error::ParseError),
        read_settings(&Some(bad.to_str().unwrap().to_string()))
    );

    let missing = dir.join("missing.json");
    assert_eq!(
        CertificationPathSettings::new(),
        read_settings(&Some(missing.to_str().unwrap().to_string())).unwrap()
    );
    assert_eq!(CertificationPathSettings::new(), read_settings(&None).unwrap());

    let _ = std::fs::remove_dir_all(&dir);
}
