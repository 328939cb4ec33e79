mod utils;

use certpath::*;
use utils::*;

fn subjects(certs: &[PDVCertificate]) -> Vec<String> {
    certs.iter().map(|c| c.subject_name()).collect()
}

fn path_subjects(cp: &CertificationPath) -> Vec<String> {
    cp.certificates().iter().map(|c| c.subject_name()).collect()
}

#[test]
fn classify_partitions_pool() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let other = TestCert::root("CN=Other Root", 5).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();
    // self-issued but signed by a different key, so not self-signed
    let rollover = TestCert::intermediate("CN=Root CA", "CN=Root CA", 6, 1).build();

    let pool = vec![
        leaf.clone(),
        root.clone(),
        ca.clone(),
        rollover.clone(),
        other.clone(),
    ];
    let classified = classify(&pe, &pool).unwrap();
    assert_eq!(pool.len(), classified.len());
    assert_eq!(vec![root, other], classified.trust_anchors);
    assert_eq!(vec![leaf, ca, rollover], classified.intermediates);
}

#[test]
fn classify_empty_pool() {
    let classified = classify(&mock_pki_environment(), &[]).unwrap();
    assert!(classified.is_empty());
    assert_eq!(0, classified.len());
}

#[test]
fn classify_collapses_duplicates() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();

    let classified = classify(
        &pe,
        &[root.clone(), ca.clone(), root.clone(), ca.clone(), root],
    )
    .unwrap();
    assert_eq!(vec!["CN=Root CA"], subjects(&classified.trust_anchors));
    assert_eq!(vec!["CN=Intermediate CA"], subjects(&classified.intermediates));
}

#[test]
fn classify_propagates_crypto_errors() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let malformed = TestCert::root("CN=Malformed", MALFORMED_KEY).build();
    assert_eq!(Err(Error::ParseError), classify(&pe, &[root.clone(), malformed]));

    let unsupported = TestCert::root("CN=Unsupported", 7)
        .sig_alg(UNSUPPORTED_SIG_ALG)
        .build();
    assert_eq!(Err(Error::Unrecognized), classify(&pe, &[unsupported, root]));
}

#[test]
fn build_path_requires_target() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let classified = classify(&pe, &[root]).unwrap();
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::MissingCertificate)),
        build_path(&pe, &settings(), None, &classified)
    );
}

#[test]
fn build_path_rejects_self_signed_target() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let classified = classify(&pe, &[root.clone()]).unwrap();
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::SelfSignedTarget)),
        build_path(&pe, &settings(), Some(&root), &classified)
    );
}

#[test]
fn build_path_orders_intermediates_from_target() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca1 = TestCert::intermediate("CN=CA 1", "CN=Root CA", 3, 1).build();
    let ca2 = TestCert::intermediate("CN=CA 2", "CN=CA 1", 4, 3).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA 2", 2, 4).build();

    let classified = classify(&pe, &[ca1, root, ca2]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(
        vec!["CN=Leaf", "CN=CA 2", "CN=CA 1", "CN=Root CA"],
        path_subjects(&cp)
    );
    assert_eq!(4, cp.len());
    assert_eq!(vec!["CN=CA 2", "CN=CA 1"], subjects(&cp.intermediates));
}

#[test]
fn build_path_matches_names_without_regard_to_case() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=root  ca", 2, 1).build();

    let classified = classify(&pe, &[root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!("CN=Root CA", cp.trust_anchor.subject_name());

    // the validator applies the same comparison
    assert!(mock_verifier()
        .verify_certificate(&settings(), Some(&leaf), &[cp.trust_anchor.clone()])
        .is_ok());
}

#[test]
fn build_path_prefers_trust_anchors() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    // a cross-certificate with the same subject, issued by another root
    let other = TestCert::root("CN=Other Root", 5).build();
    let cross = TestCert::intermediate("CN=Root CA", "CN=Other Root", 1, 5).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Root CA", 2, 1).build();

    let classified = classify(&pe, &[other, cross, root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec!["CN=Leaf", "CN=Root CA"], path_subjects(&cp));
    assert!(cp.intermediates.is_empty());
}

#[test]
fn build_path_tries_candidates_in_pool_order() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    // two CAs with the same name and key
    let first = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1)
        .serial(1)
        .build();
    let second = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1)
        .serial(2)
        .build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let classified = classify(&pe, &[second.clone(), root.clone(), first.clone()]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![second.clone()], cp.intermediates);

    let classified = classify(&pe, &[first.clone(), root, second]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![first], cp.intermediates);
}

#[test]
fn build_path_backtracks_from_dead_ends() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    // same name as the good CA, but issued by a CA that is not in the pool
    let orphan = TestCert::intermediate("CN=Intermediate CA", "CN=Missing CA", 3, 9).build();
    let good = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let classified = classify(&pe, &[orphan, good.clone(), root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![good], cp.intermediates);
}

#[test]
fn build_path_filter_skips_wrong_key() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let wrong_key = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 8, 1).build();
    let right_key = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let classified = classify(&pe, &[wrong_key.clone(), right_key.clone(), root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![right_key], cp.intermediates);

    // without the filter the first name match is taken
    let mut cps = settings();
    cps.set_use_validator_filter_when_building(false);
    let cp = build_path(&pe, &cps, Some(&leaf), &classified).unwrap();
    assert_eq!(vec![wrong_key], cp.intermediates);
}

#[test]
fn build_path_survives_cross_certified_cycle() {
    let pe = mock_pki_environment();
    let a = TestCert::intermediate("CN=CA A", "CN=CA B", 3, 4).build();
    let b = TestCert::intermediate("CN=CA B", "CN=CA A", 4, 3).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA A", 2, 3).build();
    let classified = classify(&pe, &[a, b]).unwrap();

    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NoPathsFound)),
        build_path(&pe, &settings(), Some(&leaf), &classified)
    );

    let mut cps = settings();
    cps.set_use_validator_filter_when_building(false);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NoPathsFound)),
        build_path(&pe, &cps, Some(&leaf), &classified)
    );
}

#[test]
fn build_path_escapes_cycle_to_anchor() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let a = TestCert::intermediate("CN=CA A", "CN=CA B", 3, 4).build();
    let b = TestCert::intermediate("CN=CA B", "CN=CA A", 4, 3).build();
    let b_from_root = TestCert::intermediate("CN=CA B", "CN=Root CA", 4, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA A", 2, 3).build();

    let classified = classify(&pe, &[a, b, b_from_root.clone(), root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(
        vec!["CN=Leaf", "CN=CA A", "CN=CA B", "CN=Root CA"],
        path_subjects(&cp)
    );
    assert_eq!(&b_from_root, &cp.intermediates[1]);
}

/// Eight certificates each for two CAs that certify one another, issued to the same keys under
/// different serial numbers
fn cross_certified_mesh() -> Vec<PDVCertificate> {
    let mut pool = Vec::new();
    for serial in 1..=8 {
        pool.push(
            TestCert::intermediate("CN=CA A", "CN=CA B", 3, 4)
                .serial(serial)
                .build(),
        );
        pool.push(
            TestCert::intermediate("CN=CA B", "CN=CA A", 4, 3)
                .serial(serial)
                .build(),
        );
    }
    pool
}

#[test]
fn build_path_exhausts_cross_certified_mesh_quickly() {
    let pe = mock_pki_environment();
    let leaf = TestCert::new("CN=Leaf", "CN=CA A", 2, 3).build();
    let classified = classify(&pe, &cross_certified_mesh()).unwrap();
    assert_eq!(16, classified.intermediates.len());

    for use_filter in [true, false] {
        let mut cps = settings();
        cps.set_use_validator_filter_when_building(use_filter);

        let start = std::time::Instant::now();
        assert_eq!(
            Err(Error::PathValidation(PathValidationStatus::NoPathsFound)),
            build_path(&pe, &cps, Some(&leaf), &classified)
        );
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
    }
}

#[test]
fn build_path_escapes_cross_certified_mesh_to_anchor() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let b_from_root = TestCert::intermediate("CN=CA B", "CN=Root CA", 4, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA A", 2, 3).build();

    let mut pool = cross_certified_mesh();
    pool.push(b_from_root.clone());
    pool.push(root.clone());
    let classified = classify(&pe, &pool).unwrap();

    let start = std::time::Instant::now();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(&root, &cp.trust_anchor);
    assert_eq!(Some(&b_from_root), cp.intermediates.last());
    assert_eq!("CN=CA A", cp.intermediates[0].subject_name());
}

#[test]
fn build_path_reports_crypto_error_when_exhausted() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    // RSA key that cannot be parsed, certified by the root with ECDSA
    let bad_ca = TestCert::intermediate("CN=Bad CA", "CN=Root CA", MALFORMED_KEY, 1)
        .rsa_key()
        .build();
    let leaf = TestCert::new("CN=Leaf", "CN=Bad CA", 2, 4)
        .sig_alg(PKIXALG_SHA256_WITH_RSA_ENCRYPTION)
        .build();

    let classified = classify(&pe, &[root.clone(), bad_ca.clone()]).unwrap();
    assert_eq!(vec![bad_ca.clone()], classified.intermediates);
    assert_eq!(
        Err(Error::ParseError),
        build_path(&pe, &settings(), Some(&leaf), &classified)
    );

    let err = mock_verifier()
        .verify_certificate(&settings(), Some(&leaf), &[root.clone(), bad_ca.clone()])
        .unwrap_err();
    assert_eq!(ErrorKind::CryptoEvaluationFailure, err.kind);
    assert_eq!(Error::ParseError, err.cause);
    assert_eq!(Some("CN=Leaf".to_string()), err.subject);
    assert_eq!(Some("CN=Bad CA".to_string()), err.issuer_subject);

    // an alternative issuer with a usable key still yields a path
    let good_ca = TestCert::intermediate("CN=Bad CA", "CN=Root CA", 4, 1)
        .rsa_key()
        .build();
    let classified = classify(&pe, &[root, bad_ca, good_ca.clone()]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![good_ca], cp.intermediates);
}

#[test]
fn build_path_does_not_filter_on_validity() {
    let pe = mock_pki_environment();
    let root = TestCert::root("CN=Root CA", 1).build();
    let expired = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1)
        .validity(TOI - 2 * YEAR, TOI - YEAR)
        .build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let classified = classify(&pe, &[expired.clone(), root]).unwrap();
    let cp = build_path(&pe, &settings(), Some(&leaf), &classified).unwrap();
    assert_eq!(vec![expired], cp.intermediates);
}
