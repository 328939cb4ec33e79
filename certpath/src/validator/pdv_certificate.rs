//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use alloc::{string::String, vec::Vec};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS;
use der::{asn1::ObjectIdentifier, Decode, Encode, Header, Reader, SliceReader};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::name::Name;
use x509_cert::time::Validity;
use x509_cert::Certificate;

use crate::pdv_extension::*;
use crate::util::error::*;
use crate::util::pdv_utilities::name_to_string;

/// `EXTS_OF_INTEREST` lists the extensions that are parsed when a [`PDVCertificate`] is instantiated.
pub const EXTS_OF_INTEREST: &[ObjectIdentifier] = &[ID_CE_BASIC_CONSTRAINTS];

/// [`PDVCertificate`] is used to aggregate a binary, DER-encoded Certificate, a parsed Certificate
/// and parsed extensions in support of certification path development and validation operations.
///
/// Equality, ordering and hashing consider the encoded certificate only, so two instances decoded
/// from the same bytes are the same certificate for purposes of set membership.
#[derive(Clone)]
pub struct PDVCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Parsed extensions from the Certificate
    pub parsed_extensions: ParsedExtensions,
}

impl TryFrom<&[u8]> for PDVCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        let mut pdv_cert = PDVCertificate {
            encoded_cert: enc_cert.to_vec(),
            decoded_cert: cert,
            parsed_extensions: Default::default(),
        };
        pdv_cert.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_cert)
    }
}

impl TryFrom<Certificate> for PDVCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        let mut pdv_cert = PDVCertificate {
            encoded_cert: enc_cert,
            decoded_cert: cert,
            parsed_extensions: Default::default(),
        };
        pdv_cert.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_cert)
    }
}

impl PDVCertificate {
    /// `subject` returns the subject name of the certificate
    pub fn subject(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.subject
    }

    /// `issuer` returns the issuer name of the certificate
    pub fn issuer(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.issuer
    }

    /// `subject_name` returns the subject name as an RFC 4514 string for diagnostic purposes
    pub fn subject_name(&self) -> String {
        name_to_string(self.subject())
    }

    /// `public_key` returns the subject public key info of the certificate
    pub fn public_key(&self) -> &SubjectPublicKeyInfoOwned {
        &self.decoded_cert.tbs_certificate.subject_public_key_info
    }

    /// `signature` returns the signature value or None if the BIT STRING has unused bits
    pub fn signature(&self) -> Option<&[u8]> {
        self.decoded_cert.signature.as_bytes()
    }

    /// `validity` returns the validity period of the certificate
    pub fn validity(&self) -> &Validity {
        &self.decoded_cert.tbs_certificate.validity
    }

    /// `basic_constraints` returns the basicConstraints extension, if present and well-formed
    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        match self.get_extension(&ID_CE_BASIC_CONSTRAINTS) {
            Ok(Some(PDVExtension::BasicConstraints(bc))) => Some(bc),
            _ => None,
        }
    }

    /// `tbs_bytes` returns the signed portion of the encoded certificate
    pub fn tbs_bytes(&self) -> Result<&[u8]> {
        get_tbs_bytes(&self.encoded_cert)
    }
}

/// `get_tbs_bytes` returns the TBSCertificate as it appears within an encoded Certificate.
///
/// The slice is taken from the original encoding, not from a re-encoding of the decoded structure,
/// so that the bytes verified are exactly the bytes that were signed.
pub fn get_tbs_bytes(encoded_cert: &[u8]) -> Result<&[u8]> {
    let mut reader = SliceReader::new(encoded_cert)?;
    // outer Certificate SEQUENCE
    let _outer = Header::decode(&mut reader)?;
    let tbs_header = reader.peek_header()?;
    let tbs_len = (tbs_header.encoded_len()? + tbs_header.length)?;
    Ok(reader.read_slice(tbs_len)?)
}

impl ExtensionProcessing for PDVCertificate {
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>> {
        Ok(self.parsed_extensions.get(oid))
    }

    fn parse_extension(&mut self, oid: &ObjectIdentifier) -> Result<Option<&PDVExtension>> {
        if self.parsed_extensions.contains_key(oid) {
            return Ok(self.parsed_extensions.get(oid));
        }

        let exts = match &self.decoded_cert.tbs_certificate.extensions {
            Some(exts) => exts,
            None => return Ok(None),
        };

        let ext = match exts.iter().find(|ext| ext.extn_id == *oid) {
            Some(ext) => ext,
            None => return Ok(None),
        };

        let parsed = match *oid {
            ID_CE_BASIC_CONSTRAINTS => PDVExtension::BasicConstraints(BasicConstraints::from_der(
                ext.extn_value.as_bytes(),
            )?),
            _ => return Err(Error::Unrecognized),
        };
        self.parsed_extensions.insert(*oid, parsed);
        Ok(self.parsed_extensions.get(oid))
    }

    fn parse_extensions(&'_ mut self, oids: &[ObjectIdentifier]) {
        for oid in oids {
            let _r = self.parse_extension(oid);
        }
    }
}

impl PartialEq for PDVCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_cert == other.encoded_cert
    }
}

impl Eq for PDVCertificate {}

impl PartialOrd for PDVCertificate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PDVCertificate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded_cert.cmp(&other.encoded_cert)
    }
}

impl Hash for PDVCertificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded_cert.hash(state);
    }
}

impl fmt::Debug for PDVCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PDVCertificate")
            .field("subject", &self.subject_name())
            .field("issuer", &name_to_string(self.issuer()))
            .field("len", &self.encoded_cert.len())
            .finish()
    }
}

#[test]
fn get_tbs_bytes_test() {
    let key = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::new(vec![]).unwrap();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "TBS Test");
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Constrained(2));
    let cert = params.self_signed(&key).unwrap();

    let pdv = PDVCertificate::try_from(cert.der().as_ref()).unwrap();
    let tbs = pdv.tbs_bytes().unwrap();
    assert_eq!(
        pdv.decoded_cert.tbs_certificate.to_der().unwrap().as_slice(),
        tbs
    );
    assert_eq!("CN=TBS Test", pdv.subject_name());

    let bc = pdv.basic_constraints().unwrap();
    assert!(bc.ca);
    assert_eq!(Some(2), bc.path_len_constraint);

    let copy = PDVCertificate::try_from(pdv.decoded_cert.clone()).unwrap();
    assert_eq!(pdv, copy);

    assert!(get_tbs_bytes(&[0x30, 0x03, 0x02, 0x01]).is_err());
}
