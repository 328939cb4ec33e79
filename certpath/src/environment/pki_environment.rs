//! PkiEnvironment aggregates a set of function pointers that supply functionality used when
//! building and validating a certification path.
//!
//! The sample below illustrates preparation of a PkiEnvironment object for use in building and
//! validating certification paths.
//! ```
//! use certpath::*;
//!
//! let mut pe = PkiEnvironment::default();
//!
//! // add signature verification and path validation capabilities
//! populate_5280_pki_environment(&mut pe);
//! ```
//!
//! Nothing is registered on a process-wide basis. Each caller prepares the environment it passes to
//! [`CertificateVerifier`](crate::CertificateVerifier), so different callers may use different
//! cryptographic implementations side by side.

use alloc::vec::Vec;

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::{
    environment::pki_environment_traits::*, path_results::*, path_settings::*,
    util::crypto::*, util::error::*, verify_path,
    CertificationPath, PDVCertificate,
};

/// [`PkiEnvironment`] provides a switchboard of callback functions that allow support to vary on
/// different platforms or to allow support to be tailored for specific use cases.
#[derive(Clone, Default)]
pub struct PkiEnvironment {
    //--------------------------------------------------------------------------
    //Crypto interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide a signature verification functionality given a message
    verify_signature_message_callbacks: Vec<VerifySignatureMessage>,

    //--------------------------------------------------------------------------
    //Certification path processing interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide certification path validation functionality
    validate_path_callbacks: Vec<ValidatePath>,
}

impl PkiEnvironment {
    /// PkiEnvironment::new returns a new [`PkiEnvironment`] with empty callback vectors for each type of callback
    pub fn new() -> PkiEnvironment {
        PkiEnvironment::default()
    }

    /// clear_all_callbacks clears the contents of all function pointer vectors.
    pub fn clear_all_callbacks(&mut self) {
        self.clear_validate_path_callbacks();
        self.clear_verify_signature_message_callbacks();
    }

    /// add_validate_path_callback adds a [`ValidatePath`] callback to the list used by validate_path.
    pub fn add_validate_path_callback(&mut self, c: ValidatePath) {
        self.validate_path_callbacks.push(c);
    }

    /// clear_validate_path_callbacks clears the list of [`ValidatePath`] callbacks used by validate_path.
    pub fn clear_validate_path_callbacks(&mut self) {
        self.validate_path_callbacks.clear();
    }

    /// validate_path iterates over validate_path_callbacks until an authoritative answer is found
    /// or all options have been exhausted
    pub fn validate_path(
        &self,
        cps: &CertificationPathSettings,
        cp: &CertificationPath,
        cpr: &mut CertificationPathResults,
    ) -> Result<()> {
        let mut err = None;
        for f in &self.validate_path_callbacks {
            match f(self, cps, cp, cpr) {
                Ok(r) => {
                    return Ok(r);
                }
                Err(e) => {
                    err = Some(e);
                }
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// add_verify_signature_message_callback adds a [`VerifySignatureMessage`] callback to the list used by verify_signature_message.
    pub fn add_verify_signature_message_callback(&mut self, c: VerifySignatureMessage) {
        self.verify_signature_message_callbacks.push(c);
    }

    /// clear_verify_signature_message_callbacks clears the list of [`VerifySignatureMessage`] callbacks used by verify_signature_message.
    pub fn clear_verify_signature_message_callbacks(&mut self) {
        self.verify_signature_message_callbacks.clear();
    }

    /// verify_signature_message iterates over verify_signature_message_callbacks until an authoritative
    /// answer is found or all options have been exhausted.
    ///
    /// An `Ok` result, whether [`SignatureStatus::Valid`] or [`SignatureStatus::Invalid`], is
    /// authoritative. When no callback can evaluate the signature, the last error is returned, or
    /// [`Error::Unrecognized`] if no callbacks are registered.
    pub fn verify_signature_message(
        &self,
        message_to_verify: &[u8],                 // buffer to verify
        signature: &[u8],                         // signature
        signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
        spki: &SubjectPublicKeyInfoOwned,         // public key
    ) -> Result<SignatureStatus> {
        let mut err = None;
        for f in &self.verify_signature_message_callbacks {
            match f(self, message_to_verify, signature, signature_alg, spki) {
                Ok(r) => {
                    return Ok(r);
                }
                Err(e) => {
                    err = Some(e);
                }
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// verify_certificate_signature determines whether the public key of `issuer` verifies the
    /// signature on `cert`, computed over the TBSCertificate bytes as they appear in the original
    /// encoding of `cert`.
    pub fn verify_certificate_signature(
        &self,
        cert: &PDVCertificate,
        issuer: &PDVCertificate,
    ) -> Result<SignatureStatus> {
        let signature = match cert.signature() {
            Some(signature) => signature,
            // unused bits are not meaningful for a signature value
            None => return Ok(SignatureStatus::Invalid),
        };
        let tbs = cert.tbs_bytes()?;
        self.verify_signature_message(
            tbs,
            signature,
            &cert.decoded_cert.signature_algorithm,
            issuer.public_key(),
        )
    }

    /// is_self_signed returns Ok(true) if the public key in the certificate verifies the signature on
    /// the certificate, Ok(false) if it does not and an error if the signature cannot be evaluated.
    /// Names are not consulted.
    pub fn is_self_signed(&self, cert: &PDVCertificate) -> Result<bool> {
        Ok(self.verify_certificate_signature(cert, cert)?.is_valid())
    }
}

/// `populate_5280_pki_environment` populates a [`PkiEnvironment`] instance with a default set of
/// callback functions.
///
/// The following callbacks are added:
/// - [`verify_path`]
/// - [`verify_signature_message_rust_crypto`]
pub fn populate_5280_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_validate_path_callback(verify_path);
    populate_rust_crypto_pki_environment(pe);
}

#[cfg(test)]
fn always_invalid(
    _pe: &PkiEnvironment,
    _message: &[u8],
    _signature: &[u8],
    _signature_alg: &AlgorithmIdentifierOwned,
    _spki: &SubjectPublicKeyInfoOwned,
) -> Result<SignatureStatus> {
    Ok(SignatureStatus::Invalid)
}

#[cfg(test)]
fn never_recognized(
    _pe: &PkiEnvironment,
    _message: &[u8],
    _signature: &[u8],
    _signature_alg: &AlgorithmIdentifierOwned,
    _spki: &SubjectPublicKeyInfoOwned,
) -> Result<SignatureStatus> {
    Err(Error::ParseError)
}

#[test]
fn verify_signature_message_callbacks_test() {
    use der::asn1::BitString;

    let alg = AlgorithmIdentifierOwned {
        oid: crate::PKIXALG_ECDSA_WITH_SHA256,
        parameters: None,
    };
    let spki = SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: crate::PKIXALG_EC_PUBLIC_KEY,
            parameters: None,
        },
        subject_public_key: BitString::from_bytes(&[4, 1, 2]).unwrap(),
    };

    let mut pe = PkiEnvironment::new();
    assert_eq!(
        Err(Error::Unrecognized),
        pe.verify_signature_message(b"message", b"sig", &alg, &spki)
    );

    pe.add_verify_signature_message_callback(never_recognized);
    assert_eq!(
        Err(Error::ParseError),
        pe.verify_signature_message(b"message", b"sig", &alg, &spki)
    );

    pe.add_verify_signature_message_callback(always_invalid);
    assert_eq!(
        Ok(SignatureStatus::Invalid),
        pe.verify_signature_message(b"message", b"sig", &alg, &spki)
    );

    pe.clear_all_callbacks();
    assert_eq!(
        Err(Error::Unrecognized),
        pe.verify_signature_message(b"message", b"sig", &alg, &spki)
    );
}
