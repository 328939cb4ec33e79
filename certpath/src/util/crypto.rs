//! Provides implementations of crypto-related [`PkiEnvironment`] interfaces using libraries from the
//! [Rust Crypto](https://github.com/RustCrypto) project for support.

use alloc::vec::Vec;

use der::{asn1::ObjectIdentifier, Encode};
use p256::ecdsa::{Signature as Signature256, VerifyingKey as VerifyingKey256};
use p384::ecdsa::{Signature as Signature384, VerifyingKey as VerifyingKey384};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::environment::pki_environment_traits::SignatureStatus;
use crate::util::error::{Error, Result};
use crate::{environment::pki_environment::*, log_message, util::pdv_alg_oids::*, PeLogLevels};

/// is_rsa returns true is the presented OID is one of [`PKIXALG_SHA224_WITH_RSA_ENCRYPTION`],
/// [`PKIXALG_SHA256_WITH_RSA_ENCRYPTION`], [`PKIXALG_SHA384_WITH_RSA_ENCRYPTION`] or
/// [`PKIXALG_SHA512_WITH_RSA_ENCRYPTION`] and false otherwise.
pub(crate) fn is_rsa(oid: &ObjectIdentifier) -> bool {
    *oid == PKIXALG_SHA256_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA384_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA224_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA512_WITH_RSA_ENCRYPTION
}

/// is_ecdsa returns true is the presented OID is one of [`PKIXALG_ECDSA_WITH_SHA224`],
/// [`PKIXALG_ECDSA_WITH_SHA256`], [`PKIXALG_ECDSA_WITH_SHA384`] or [`PKIXALG_ECDSA_WITH_SHA512`] and false otherwise.
pub(crate) fn is_ecdsa(oid: &ObjectIdentifier) -> bool {
    *oid == PKIXALG_ECDSA_WITH_SHA256
        || *oid == PKIXALG_ECDSA_WITH_SHA384
        || *oid == PKIXALG_ECDSA_WITH_SHA224
        || *oid == PKIXALG_ECDSA_WITH_SHA512
}

/// `get_digest_for_sig_alg` hashes the message using the hash algorithm named by the signature
/// algorithm.
fn get_digest_for_sig_alg(sig_alg: &ObjectIdentifier, message: &[u8]) -> Result<Vec<u8>> {
    match *sig_alg {
        PKIXALG_SHA224_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA224 => {
            Ok(Sha224::digest(message).to_vec())
        }
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA256 => {
            Ok(Sha256::digest(message).to_vec())
        }
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA384 => {
            Ok(Sha384::digest(message).to_vec())
        }
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA512 => {
            Ok(Sha512::digest(message).to_vec())
        }
        _ => Err(Error::Unrecognized),
    }
}

fn get_padding_scheme(sig_alg: &ObjectIdentifier) -> Result<Pkcs1v15Sign> {
    match *sig_alg {
        PKIXALG_SHA224_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha224>()),
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha256>()),
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha384>()),
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha512>()),
        _ => Err(Error::Unrecognized),
    }
}

fn get_named_curve_parameter(alg_id: &AlgorithmIdentifierOwned) -> Result<ObjectIdentifier> {
    if let Some(params) = &alg_id.parameters {
        if let Ok(oid) = params.decode_as::<ObjectIdentifier>() {
            return Ok(oid);
        }
    }
    Err(Error::ParseError)
}

fn to_status<E>(r: core::result::Result<(), E>) -> SignatureStatus {
    match r {
        Ok(()) => SignatureStatus::Valid,
        Err(_e) => SignatureStatus::Invalid,
    }
}

fn verify_rsa(
    message_to_verify: &[u8],
    signature: &[u8],
    signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<SignatureStatus> {
    if PKIXALG_RSA_ENCRYPTION != spki.algorithm.oid {
        return Ok(SignatureStatus::Invalid);
    }

    let enc_spki = spki.to_der()?;
    let rsa = match RsaPublicKey::from_public_key_der(&enc_spki) {
        Ok(rsa) => rsa,
        Err(e) => {
            log_message(
                &PeLogLevels::PeError,
                format!("Failed to parse RSA public key: {:?}", e).as_str(),
            );
            return Err(Error::ParseError);
        }
    };
    let hash_to_verify = get_digest_for_sig_alg(&signature_alg.oid, message_to_verify)?;
    let ps = get_padding_scheme(&signature_alg.oid)?;
    Ok(to_status(rsa.verify(ps, &hash_to_verify, signature)))
}

fn verify_ecdsa(
    message_to_verify: &[u8],
    signature: &[u8],
    signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<SignatureStatus> {
    if PKIXALG_EC_PUBLIC_KEY != spki.algorithm.oid {
        return Ok(SignatureStatus::Invalid);
    }

    let named_curve = get_named_curve_parameter(&spki.algorithm)?;
    let hash_to_verify = get_digest_for_sig_alg(&signature_alg.oid, message_to_verify)?;
    let point = spki.subject_public_key.raw_bytes();

    match named_curve {
        PKIXALG_SECP256R1 => {
            let ecdsa = VerifyingKey256::from_sec1_bytes(point).map_err(|_e| Error::ParseError)?;
            match Signature256::from_der(signature) {
                Ok(s) => Ok(to_status(ecdsa.verify_prehash(&hash_to_verify, &s))),
                Err(_e) => Ok(SignatureStatus::Invalid),
            }
        }
        PKIXALG_SECP384R1 => {
            let ecdsa = VerifyingKey384::from_sec1_bytes(point).map_err(|_e| Error::ParseError)?;
            match Signature384::from_der(signature) {
                Ok(s) => Ok(to_status(ecdsa.verify_prehash(&hash_to_verify, &s))),
                Err(_e) => Ok(SignatureStatus::Invalid),
            }
        }
        _ => {
            log_message(
                &PeLogLevels::PeError,
                format!("Unsupported named curve: {}", named_curve).as_str(),
            );
            Err(Error::Unrecognized)
        }
    }
}

/// verify_signature_message_rust_crypto implements the [`VerifySignatureMessage`](crate::VerifySignatureMessage)
/// interface for [`PkiEnvironment`] using implementations from the [Rust Crypto](https://github.com/RustCrypto) project.
///
/// RSA PKCS #1 v1.5 signatures and ECDSA signatures using P256 or P384 keys are supported, each
/// with SHA-224, SHA-256, SHA-384 or SHA-512.
///
/// A public key that is not of the family named by the signature algorithm, or a signature that
/// cannot be decoded, yields [`SignatureStatus::Invalid`]. An unsupported signature algorithm or
/// curve, or a public key of the right family that cannot be parsed, yields an error.
pub fn verify_signature_message_rust_crypto(
    _pe: &PkiEnvironment,
    message_to_verify: &[u8],                 // buffer to verify
    signature: &[u8],                         // signature
    signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
    spki: &SubjectPublicKeyInfoOwned,         // public key
) -> Result<SignatureStatus> {
    if is_rsa(&signature_alg.oid) {
        verify_rsa(message_to_verify, signature, signature_alg, spki)
    } else if is_ecdsa(&signature_alg.oid) {
        verify_ecdsa(message_to_verify, signature, signature_alg, spki)
    } else {
        log_message(
            &PeLogLevels::PeDebug,
            format!("Unsupported signature algorithm: {}", signature_alg.oid).as_str(),
        );
        Err(Error::Unrecognized)
    }
}

/// `populate_rust_crypto_pki_environment` adds [`verify_signature_message_rust_crypto`] to the
/// [`PkiEnvironment`] instance.
pub fn populate_rust_crypto_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_verify_signature_message_callback(verify_signature_message_rust_crypto);
}

#[cfg(test)]
fn generate_self_signed(alg: &'static rcgen::SignatureAlgorithm) -> x509_cert::Certificate {
    use der::Decode;

    let key = rcgen::KeyPair::generate_for(alg).unwrap();
    let mut params = rcgen::CertificateParams::new(vec![]).unwrap();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "Crypto Test");
    let cert = params.self_signed(&key).unwrap();
    x509_cert::Certificate::from_der(cert.der()).unwrap()
}

#[test]
fn verify_signature_message_rust_crypto_test() {
    let pe = PkiEnvironment::new();
    for alg in [&rcgen::PKCS_ECDSA_P256_SHA256, &rcgen::PKCS_ECDSA_P384_SHA384] {
        let cert = generate_self_signed(alg);
        let tbs = cert.tbs_certificate.to_der().unwrap();
        let spki = &cert.tbs_certificate.subject_public_key_info;
        let sig = cert.signature.raw_bytes();

        assert_eq!(
            Ok(SignatureStatus::Valid),
            verify_signature_message_rust_crypto(&pe, &tbs, sig, &cert.signature_algorithm, spki)
        );

        let mut tampered = tbs.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0xFF;
        assert_eq!(
            Ok(SignatureStatus::Invalid),
            verify_signature_message_rust_crypto(
                &pe,
                &tampered,
                sig,
                &cert.signature_algorithm,
                spki
            )
        );

        // not a DER-encoded ECDSA signature
        assert_eq!(
            Ok(SignatureStatus::Invalid),
            verify_signature_message_rust_crypto(
                &pe,
                &tbs,
                &[1, 2, 3],
                &cert.signature_algorithm,
                spki
            )
        );

        // EC key presented with an RSA signature algorithm
        let rsa_alg = AlgorithmIdentifierOwned {
            oid: PKIXALG_SHA256_WITH_RSA_ENCRYPTION,
            parameters: None,
        };
        assert_eq!(
            Ok(SignatureStatus::Invalid),
            verify_signature_message_rust_crypto(&pe, &tbs, sig, &rsa_alg, spki)
        );
    }
}

#[test]
fn verify_signature_message_rust_crypto_errors_test() {
    let pe = PkiEnvironment::new();
    let cert = generate_self_signed(&rcgen::PKCS_ECDSA_P256_SHA256);
    let tbs = cert.tbs_certificate.to_der().unwrap();
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let sig = cert.signature.raw_bytes();

    // id-Ed25519 is not supported
    let unsupported = AlgorithmIdentifierOwned {
        oid: ObjectIdentifier::new_unwrap("1.3.101.112"),
        parameters: None,
    };
    assert_eq!(
        Err(Error::Unrecognized),
        verify_signature_message_rust_crypto(&pe, &tbs, sig, &unsupported, spki)
    );

    // EC key without a named curve
    let mut no_curve = spki.clone();
    no_curve.algorithm.parameters = None;
    assert_eq!(
        Err(Error::ParseError),
        verify_signature_message_rust_crypto(&pe, &tbs, sig, &cert.signature_algorithm, &no_curve)
    );

    // EC key that is not a valid point
    let mut bad_point = spki.clone();
    bad_point.subject_public_key = der::asn1::BitString::from_bytes(&[4, 1, 2, 3]).unwrap();
    assert_eq!(
        Err(Error::ParseError),
        verify_signature_message_rust_crypto(&pe, &tbs, sig, &cert.signature_algorithm, &bad_point)
    );
}
