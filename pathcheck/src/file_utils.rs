//! Contains utility functions related to interactions with the filesystem

use std::error;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;
use x509_cert::Certificate;

use certpath::PDVCertificate;

type Result<T> = std::result::Result<T, Box<dyn error::Error>>;

/// `parse_certificates` accepts a buffer containing either a single binary DER-encoded certificate or
/// one or more PEM-encoded certificates.
pub fn parse_certificates(buffer: &[u8]) -> Result<Vec<PDVCertificate>> {
    if buffer.starts_with(b"-----BEGIN") {
        let mut certs = vec![];
        for cert in Certificate::load_pem_chain(buffer)? {
            certs.push(PDVCertificate::try_from(cert)?);
        }
        Ok(certs)
    } else {
        Ok(vec![PDVCertificate::try_from(buffer)?])
    }
}

/// `read_certificates_from_file` returns the certificates read from the named file
pub fn read_certificates_from_file(filename: &Path) -> Result<Vec<PDVCertificate>> {
    let buffer = fs::read(filename)?;
    parse_certificates(&buffer)
        .map_err(|e| format!("failed to parse {}: {}", filename.display(), e).into())
}

/// `load_certificates` appends certificates read from `path` to `pool` and returns the number added.
///
/// When `path` names a folder, it is traversed recursively in file name order and files that do not
/// contain certificates are skipped. When `path` names a file, failure to parse it is an error.
pub fn load_certificates(path: &str, pool: &mut Vec<PDVCertificate>) -> Result<usize> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("{} does not exist", path).into());
    }

    let initial_count = pool.len();
    if p.is_file() {
        pool.append(&mut read_certificates_from_file(p)?);
        return Ok(pool.len() - initial_count);
    }

    for entry in WalkDir::new(p).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        match read_certificates_from_file(entry.path()) {
            Ok(mut certs) => {
                debug!(
                    "Read {} certificate(s) from {}",
                    certs.len(),
                    entry.path().display()
                );
                pool.append(&mut certs);
            }
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
            }
        }
    }
    Ok(pool.len() - initial_count)
}

#[test]
fn parse_certificates_test() {
    let key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
    let mut params = rcgen::CertificateParams::new(vec![]).unwrap();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "File Test");
    let cert = params.self_signed(&key).unwrap();

    let from_der = parse_certificates(cert.der()).unwrap();
    assert_eq!(1, from_der.len());
    assert_eq!("CN=File Test", from_der[0].subject_name());

    let bundle = format!("{}{}", cert.pem(), cert.pem());
    let from_pem = parse_certificates(bundle.as_bytes()).unwrap();
    assert_eq!(2, from_pem.len());
    assert_eq!(from_der[0], from_pem[1]);

    assert!(parse_certificates(b"not a certificate").is_err());
}
