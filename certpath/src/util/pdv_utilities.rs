//! Utility functions that support certification path processing

use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use log::error;
use regex::Regex;

use der::asn1::{Ia5String, PrintableString, Utf8StringRef};
use der::{Encode, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;
use x509_cert::{Certificate, TbsCertificate};

use crate::{
    environment::pki_environment::PkiEnvironment, pdv_certificate::PDVCertificate,
    util::error::*,
};

/// `get_now_as_unix_epoch` returns the current time as seconds since the Unix epoch, or zero if the
/// system clock reads earlier than the epoch.
pub fn get_now_as_unix_epoch() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_secs(),
        Err(_) => 0,
    }
}

/// `is_self_signed` returns Ok(true) if the public key in the certificate can be used to verify the
/// signature on the certificate, Ok(false) if it cannot and an error if the signature could not be
/// evaluated at all, i.e., due to an unsupported algorithm.
pub fn is_self_signed(pe: &PkiEnvironment, cert: &PDVCertificate) -> Result<bool> {
    pe.is_self_signed(cert)
}

/// `is_self_issued` returns true if the subject field in the certificate is the same as the issuer
/// field.
pub fn is_self_issued(cert: &Certificate) -> bool {
    compare_names(&cert.tbs_certificate.issuer, &cert.tbs_certificate.subject)
}

/// `valid_at_time` evaluates the not_before and not_after fields of the given TBSCertificate instance
/// and provides an indication of validity relative to presented time of interest.
///
/// It returns the number of seconds left to live if the certificate is valid at the given time or
/// an error indicating which field failed if the certificate is not valid. The not_before field is
/// evaluated first. A time of interest of zero disables the check.
///
/// To stifle logging output upon error, pass true for the stifle_log parameter.
pub fn valid_at_time(target: &TbsCertificate, toi: u64, stifle_log: bool) -> Result<u64> {
    if 0 == toi {
        // zero is used to disable validity check
        return Ok(0);
    }

    let nb = target.validity.not_before.to_unix_duration().as_secs();
    if nb > toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                format!(
                    "certificate is not yet valid relative to the configured time of interest: {}",
                    target.validity.not_before
                )
                .as_str(),
            );
        }
        return Err(Error::PathValidation(
            PathValidationStatus::InvalidNotBeforeDate,
        ));
    }

    let na = target.validity.not_after.to_unix_duration().as_secs();
    if na < toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                format!(
                    "certificate is expired relative to the configured time of interest: {}",
                    target.validity.not_after
                )
                .as_str(),
            );
        }
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate,
        ))
    } else {
        Ok(na - toi)
    }
}

/// `has_expired` returns true if the not_after field of the certificate is before the time of
/// interest. A certificate that is not yet valid has not expired; use [`valid_at_time`] to evaluate
/// both ends of the validity period.
pub fn has_expired(cert: &Certificate, toi: u64) -> bool {
    matches!(
        valid_at_time(&cert.tbs_certificate, toi, true),
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        ))
    )
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    let name_str = name_to_string(name);
    error!(
        "Encountered error while processing certificate with subject {}: {}",
        name_str, msg
    );
}

pub(crate) fn log_error_for_cert(cert: &PDVCertificate, msg: &str) {
    log_error_for_name(&cert.decoded_cert.tbs_certificate.subject, msg);
}

/// `name_to_string` returns a string representation of given Name value.
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// get_value_from_rdn returns the value from AttributeTypeAndValue as a string for use in comparing
/// values where leading whitespace may be a factor
pub fn get_value_from_rdn(atav: &AttributeTypeAndValue) -> Result<String> {
    let val = match atav.value.tag() {
        der::Tag::PrintableString => atav
            .value
            .decode_as()
            .ok()
            .map(|s: PrintableString| s.to_string()),
        der::Tag::Utf8String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Utf8StringRef<'_>| s.to_string()),
        der::Tag::Ia5String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Ia5String| s.to_string()),
        _ => None,
    };

    let mut s = String::new();
    if let Some(val) = val {
        let mut iter = val.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            match c {
                '#' if i == 0 => s.push_str("\\#"),
                ' ' if i == 0 || iter.peek().is_none() => s.push_str("\\ "),
                '"' | '+' | ',' | ';' | '<' | '>' | '\\' => s.push_str(format!("\\{}", c).as_str()),
                '\x00'..='\x1f' | '\x7f' => s.push_str(format!("\\{:02x}", c as u8).as_str()),
                _ => s.push(c),
            }
        }
    } else {
        let val = atav.value.to_der()?;
        s.push_str(format!("{}=#", atav.oid).as_str());
        for c in val {
            s.push_str(format!("{:02x}", c).as_str());
        }
    }
    Ok(s)
}

/// [`compare_names`] compares two Name values returning true if they match and false otherwise.
///
/// Names match when the RDN sequences are identical or when each attribute pairs up by type with a
/// value that is equal after trimming, lowercasing and collapsing internal whitespace.
pub fn compare_names(left: &Name, right: &Name) -> bool {
    lazy_static! {
        static ref WHITESPACE: Option<Regex> = Regex::new(r"\s+").ok();
    }

    // no match if not the same number of RDNs
    if left.0.len() != right.0.len() {
        return false;
    }

    for (lrdn, rrdn) in left.0.iter().zip(right.0.iter()) {
        if lrdn.0.len() != rrdn.0.len() {
            return false;
        }

        if lrdn == rrdn {
            continue;
        }

        for (l, r) in lrdn.0.iter().zip(rrdn.0.iter()) {
            if l.oid != r.oid {
                return false;
            }

            let l_str_val = match get_value_from_rdn(l) {
                Ok(val) => val.replace("\\ ", " "),
                Err(_e) => return false,
            };
            let r_str_val = match get_value_from_rdn(r) {
                Ok(val) => val.replace("\\ ", " "),
                Err(_e) => return false,
            };

            let l_val = l_str_val.trim().to_lowercase();
            let r_val = r_str_val.trim().to_lowercase();

            if l_val != r_val {
                let re = match WHITESPACE.as_ref() {
                    Some(re) => re,
                    None => return false,
                };

                //collapse multiple whitespace instances into one
                if re.replace_all(l_val.as_str(), " ") != re.replace_all(r_val.as_str(), " ") {
                    return false;
                }
            }
        }
    }
    true
}

#[test]
fn compare_names_test() {
    use core::str::FromStr;

    let a = Name::from_str("CN=Test CA,O=Example,C=US").unwrap();
    let b = Name::from_str("CN=Test CA,O=Example,C=US").unwrap();
    assert!(compare_names(&a, &b));

    let c = Name::from_str("CN=test   ca,O=EXAMPLE,C=US").unwrap();
    assert!(compare_names(&a, &c));

    let d = Name::from_str("CN=Other CA,O=Example,C=US").unwrap();
    assert!(!compare_names(&a, &d));

    let e = Name::from_str("CN=Test CA,O=Example").unwrap();
    assert!(!compare_names(&a, &e));
}

#[test]
fn valid_at_time_disabled_test() {
    use core::str::FromStr;
    use der::asn1::{BitString, UtcTime};
    use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
    use std::time::Duration;
    use x509_cert::certificate::Version;
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::time::{Time, Validity};

    let alg = AlgorithmIdentifierOwned {
        oid: crate::PKIXALG_ECDSA_WITH_SHA256,
        parameters: None,
    };
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[1]).unwrap(),
        signature: alg.clone(),
        issuer: Name::from_str("CN=Issuer").unwrap(),
        validity: Validity {
            not_before: Time::UtcTime(
                UtcTime::from_unix_duration(Duration::from_secs(1_000_000_000)).unwrap(),
            ),
            not_after: Time::UtcTime(
                UtcTime::from_unix_duration(Duration::from_secs(1_100_000_000)).unwrap(),
            ),
        },
        subject: Name::from_str("CN=Subject").unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: alg,
            subject_public_key: BitString::from_bytes(&[1, 2, 3]).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    assert_eq!(0, valid_at_time(&tbs, 0, true).unwrap());
    assert_eq!(
        100_000_000,
        valid_at_time(&tbs, 1_000_000_000, true).unwrap()
    );
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotBeforeDate
        )),
        valid_at_time(&tbs, 999_999_999, true)
    );
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        )),
        valid_at_time(&tbs, 1_100_000_001, true)
    );
}
