//! Synthetic certificates and a signature callback for exercising path building and validation
//! without real cryptography.
//!
//! A synthetic certificate carries its "public key" as a single byte and its "signature" as the
//! byte of the key that signed it. [`mock_verify_signature_message`] treats a signature as valid
//! when it equals the public key it is checked against.

#![allow(dead_code)]

use core::str::FromStr;
use std::time::Duration;

use const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS;
use der::asn1::{BitString, ObjectIdentifier, OctetString, UtcTime};
use der::Encode;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

use certpath::*;

/// 2023-11-14T22:13:20Z
pub const TOI: u64 = 1_700_000_000;
pub const YEAR: u64 = 365 * 24 * 60 * 60;

/// id-Ed25519, which the mock callback does not support
pub const UNSUPPORTED_SIG_ALG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// Key byte the mock callback treats as a malformed key
pub const MALFORMED_KEY: u8 = 0;

fn is_ec_alg(oid: &ObjectIdentifier) -> bool {
    [
        PKIXALG_ECDSA_WITH_SHA224,
        PKIXALG_ECDSA_WITH_SHA256,
        PKIXALG_ECDSA_WITH_SHA384,
        PKIXALG_ECDSA_WITH_SHA512,
    ]
    .contains(oid)
}

fn is_rsa_alg(oid: &ObjectIdentifier) -> bool {
    [
        PKIXALG_SHA224_WITH_RSA_ENCRYPTION,
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION,
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION,
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION,
    ]
    .contains(oid)
}

/// Signature callback with the same outcome rules as the RustCrypto callback: unsupported
/// algorithms and malformed keys are errors, a key of the wrong family is an invalid signature.
pub fn mock_verify_signature_message(
    _pe: &PkiEnvironment,
    _message: &[u8],
    signature: &[u8],
    signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<SignatureStatus> {
    let family_matches = if is_ec_alg(&signature_alg.oid) {
        spki.algorithm.oid == PKIXALG_EC_PUBLIC_KEY
    } else if is_rsa_alg(&signature_alg.oid) {
        spki.algorithm.oid == PKIXALG_RSA_ENCRYPTION
    } else {
        return Err(Error::Unrecognized);
    };
    if !family_matches {
        return Ok(SignatureStatus::Invalid);
    }

    let key = spki.subject_public_key.raw_bytes();
    if key == [MALFORMED_KEY] {
        return Err(Error::ParseError);
    }
    if key == signature {
        Ok(SignatureStatus::Valid)
    } else {
        Ok(SignatureStatus::Invalid)
    }
}

/// Environment featuring the mock signature callback and the default path validator
pub fn mock_pki_environment() -> PkiEnvironment {
    let mut pe = PkiEnvironment::new();
    pe.add_verify_signature_message_callback(mock_verify_signature_message);
    pe.add_validate_path_callback(verify_path);
    pe
}

pub fn mock_verifier() -> CertificateVerifier {
    CertificateVerifier::new(mock_pki_environment())
}

/// Settings with the time of interest fixed at [`TOI`]
pub fn settings() -> CertificationPathSettings {
    let mut cps = CertificationPathSettings::new();
    cps.set_time_of_interest(TOI);
    cps
}

/// Builder for synthetic certificates
#[derive(Clone)]
pub struct TestCert {
    subject: String,
    issuer: String,
    key: u8,
    signer: u8,
    serial: u8,
    key_alg: ObjectIdentifier,
    sig_alg: ObjectIdentifier,
    not_before: u64,
    not_after: u64,
    basic_constraints: Option<BasicConstraints>,
}

impl TestCert {
    /// Certificate for `subject` with public key `key`, issued by `issuer` and signed with `signer`,
    /// valid for a year either side of [`TOI`]
    pub fn new(subject: &str, issuer: &str, key: u8, signer: u8) -> Self {
        TestCert {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            key,
            signer,
            serial: 1,
            key_alg: PKIXALG_EC_PUBLIC_KEY,
            sig_alg: PKIXALG_ECDSA_WITH_SHA256,
            not_before: TOI - YEAR,
            not_after: TOI + YEAR,
            basic_constraints: None,
        }
    }

    /// Self-signed CA certificate
    pub fn root(subject: &str, key: u8) -> Self {
        TestCert::new(subject, subject, key, key).ca(None)
    }

    /// CA certificate asserting cA and an optional path length constraint
    pub fn intermediate(subject: &str, issuer: &str, key: u8, signer: u8) -> Self {
        TestCert::new(subject, issuer, key, signer).ca(None)
    }

    pub fn ca(mut self, path_len_constraint: Option<u8>) -> Self {
        self.basic_constraints = Some(BasicConstraints {
            ca: true,
            path_len_constraint,
        });
        self
    }

    pub fn not_ca(mut self) -> Self {
        self.basic_constraints = Some(BasicConstraints {
            ca: false,
            path_len_constraint: None,
        });
        self
    }

    pub fn without_basic_constraints(mut self) -> Self {
        self.basic_constraints = None;
        self
    }

    pub fn serial(mut self, serial: u8) -> Self {
        self.serial = serial;
        self
    }

    pub fn validity(mut self, not_before: u64, not_after: u64) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn rsa_key(mut self) -> Self {
        self.key_alg = PKIXALG_RSA_ENCRYPTION;
        self
    }

    pub fn sig_alg(mut self, sig_alg: ObjectIdentifier) -> Self {
        self.sig_alg = sig_alg;
        self
    }

    pub fn build(&self) -> PDVCertificate {
        let alg = AlgorithmIdentifierOwned {
            oid: self.sig_alg,
            parameters: None,
        };

        let extensions = self.basic_constraints.as_ref().map(|bc| {
            vec![Extension {
                extn_id: ID_CE_BASIC_CONSTRAINTS,
                critical: true,
                extn_value: OctetString::new(bc.to_der().unwrap()).unwrap(),
            }]
        });

        let tbs_certificate = TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(&[1, self.serial, self.key, self.signer]).unwrap(),
            signature: alg.clone(),
            issuer: Name::from_str(&self.issuer).unwrap(),
            validity: Validity {
                not_before: to_time(self.not_before),
                not_after: to_time(self.not_after),
            },
            subject: Name::from_str(&self.subject).unwrap(),
            subject_public_key_info: SubjectPublicKeyInfoOwned {
                algorithm: AlgorithmIdentifierOwned {
                    oid: self.key_alg,
                    parameters: None,
                },
                subject_public_key: BitString::from_bytes(&[self.key]).unwrap(),
            },
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions,
        };

        let cert = Certificate {
            tbs_certificate,
            signature_algorithm: alg,
            signature: BitString::from_bytes(&[self.signer]).unwrap(),
        };
        PDVCertificate::try_from(cert).unwrap()
    }
}

fn to_time(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

/// Subject names of the certificates in a verified chain, target first
pub fn chain_subjects(chain: &VerifiedChain) -> Vec<String> {
    chain.certificates.iter().map(|c| c.subject_name()).collect()
}
