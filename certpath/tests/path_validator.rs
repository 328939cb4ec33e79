mod utils;

use certpath::*;
use utils::*;

fn validate(
    cps: &CertificationPathSettings,
    trust_anchor: &PDVCertificate,
    intermediates: &[&PDVCertificate],
    target: &PDVCertificate,
) -> (Result<()>, CertificationPathResults) {
    let pe = mock_pki_environment();
    let cp = CertificationPath::new(
        trust_anchor.clone(),
        intermediates.iter().map(|c| (*c).clone()).collect(),
        target.clone(),
    );
    let mut cpr = CertificationPathResults::new();
    let r = verify_path(&pe, cps, &cp, &mut cpr);
    (r, cpr)
}

fn pv_err(pvs: PathValidationStatus) -> Result<()> {
    Err(Error::PathValidation(pvs))
}

#[test]
fn valid_path() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca1 = TestCert::intermediate("CN=CA 1", "CN=Root CA", 3, 1).build();
    let ca2 = TestCert::intermediate("CN=CA 2", "CN=CA 1", 4, 3).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA 2", 2, 4).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca2, &ca1], &leaf);
    assert_eq!(Ok(()), r);
    assert_eq!(Some(PathValidationStatus::Valid), cpr.get_validation_status());
    assert_eq!(None, cpr.get_failed_certificate_index());
}

#[test]
fn name_chaining_failure() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Other CA", 2, 3).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::NameChainingFailure), r);
    assert_eq!(Some(0), cpr.get_failed_certificate_index());
}

#[test]
fn signature_failure_index() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 9).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::SignatureVerificationFailure), r);
    assert_eq!(
        Some(PathValidationStatus::SignatureVerificationFailure),
        cpr.get_validation_status()
    );
    assert_eq!(Some(1), cpr.get_failed_certificate_index());
}

#[test]
fn signature_evaluation_error() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Root CA", 2, 1)
        .sig_alg(UNSUPPORTED_SIG_ALG)
        .build();

    let (r, cpr) = validate(&settings(), &root, &[], &leaf);
    assert_eq!(Err(Error::Unrecognized), r);
    assert_eq!(
        Some(PathValidationStatus::CryptoEvaluationFailure),
        cpr.get_validation_status()
    );
    assert_eq!(Some(0), cpr.get_failed_certificate_index());
}

#[test]
fn expired_trust_anchor_index() {
    let root = TestCert::root("CN=Root CA", 1)
        .validity(TOI - 2 * YEAR, TOI - YEAR)
        .build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidNotAfterDate), r);
    assert_eq!(Some(2), cpr.get_failed_certificate_index());

    let mut cps = settings();
    cps.set_enforce_trust_anchor_validity(false);
    let (r, _) = validate(&cps, &root, &[&ca], &leaf);
    assert_eq!(Ok(()), r);
}

#[test]
fn missing_basic_constraints() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca1 = TestCert::intermediate("CN=CA 1", "CN=Root CA", 3, 1)
        .without_basic_constraints()
        .build();
    let ca2 = TestCert::intermediate("CN=CA 2", "CN=CA 1", 4, 3).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA 2", 2, 4).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca2, &ca1], &leaf);
    assert_eq!(pv_err(PathValidationStatus::MissingBasicConstraints), r);
    assert_eq!(Some(2), cpr.get_failed_certificate_index());

    let mut cps = settings();
    cps.set_enforce_basic_constraints(false);
    let (r, _) = validate(&cps, &root, &[&ca2, &ca1], &leaf);
    assert_eq!(Ok(()), r);
}

#[test]
fn intermediate_not_a_ca() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1)
        .not_ca()
        .build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidBasicConstraints), r);
    assert_eq!(Some(1), cpr.get_failed_certificate_index());

    let err = mock_verifier()
        .verify_certificate(&settings(), Some(&leaf), &[root, ca])
        .unwrap_err();
    assert_eq!(ErrorKind::ConstraintViolation, err.kind);
    assert_eq!(Some("CN=Intermediate CA".to_string()), err.subject);
}

#[test]
fn path_length_violation() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca1 = TestCert::intermediate("CN=CA 1", "CN=Root CA", 3, 1)
        .ca(Some(0))
        .build();
    let ca2 = TestCert::intermediate("CN=CA 2", "CN=CA 1", 4, 3).build();
    let leaf = TestCert::new("CN=Leaf", "CN=CA 2", 2, 4).build();
    let leaf_of_ca1 = TestCert::new("CN=Leaf", "CN=CA 1", 2, 3).build();

    let (r, cpr) = validate(&settings(), &root, &[&ca2, &ca1], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidPathLength), r);
    assert_eq!(Some(1), cpr.get_failed_certificate_index());

    // a CA with a path length of zero may still issue end entity certificates
    let (r, _) = validate(&settings(), &root, &[&ca1], &leaf_of_ca1);
    assert_eq!(Ok(()), r);

    let err = mock_verifier()
        .verify_certificate(&settings(), Some(&leaf), &[root, ca1, ca2])
        .unwrap_err();
    assert_eq!(ErrorKind::ConstraintViolation, err.kind);
    assert_eq!(Some(PathValidationStatus::InvalidPathLength), err.status);
    assert_eq!(Some("CN=CA 2".to_string()), err.subject);
}

#[test]
fn initial_path_length_constraint() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();
    let direct = TestCert::new("CN=Leaf", "CN=Root CA", 2, 1).build();

    let mut cps = settings();
    cps.set_initial_path_length_constraint(0);
    let (r, cpr) = validate(&cps, &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidPathLength), r);
    assert_eq!(Some(1), cpr.get_failed_certificate_index());

    let (r, _) = validate(&cps, &root, &[], &direct);
    assert_eq!(Ok(()), r);
}

#[test]
fn trust_anchor_path_length() {
    let root = TestCert::root("CN=Root CA", 1).ca(Some(0)).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    // the trust anchor's constraint is ignored by default
    let (r, _) = validate(&settings(), &root, &[&ca], &leaf);
    assert_eq!(Ok(()), r);

    let mut cps = settings();
    cps.set_enforce_trust_anchor_constraints(true);
    let (r, cpr) = validate(&cps, &root, &[&ca], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidPathLength), r);
    assert_eq!(Some(1), cpr.get_failed_certificate_index());
}

#[test]
fn self_issued_does_not_consume_path_length() {
    let root = TestCert::root("CN=Root CA", 1).build();
    // key rollover certificate: new root key certified by the old one
    let rollover = TestCert::intermediate("CN=Root CA", "CN=Root CA", 6, 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Root CA", 3, 6).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Intermediate CA", 2, 3).build();

    let mut cps = settings();
    cps.set_initial_path_length_constraint(1);
    let (r, _) = validate(&cps, &root, &[&ca, &rollover], &leaf);
    assert_eq!(Ok(()), r);

    let bridge = TestCert::intermediate("CN=Bridge CA", "CN=Root CA", 6, 1).build();
    let ca = TestCert::intermediate("CN=Intermediate CA", "CN=Bridge CA", 3, 6).build();
    let (r, cpr) = validate(&cps, &root, &[&ca, &bridge], &leaf);
    assert_eq!(pv_err(PathValidationStatus::InvalidPathLength), r);
    assert_eq!(Some(1), cpr.get_failed_certificate_index());
}

#[test]
fn environment_without_validators() {
    let root = TestCert::root("CN=Root CA", 1).build();
    let leaf = TestCert::new("CN=Leaf", "CN=Root CA", 2, 1).build();
    let cp = CertificationPath::new(root, vec![], leaf);

    let mut pe = PkiEnvironment::new();
    pe.add_verify_signature_message_callback(mock_verify_signature_message);
    let mut cpr = CertificationPathResults::new();
    assert_eq!(
        Err(Error::Unrecognized),
        pe.validate_path(&settings(), &cp, &mut cpr)
    );

    pe.add_validate_path_callback(verify_path);
    assert_eq!(Ok(()), pe.validate_path(&settings(), &cp, &mut cpr));
}
