use std::fs;

use certsync::{dhparams, run};
use certsync_test_support::{gen_cert, paths, test_config, TestAcme, TestPrinter, TestToolkit};
use time::Duration;

fn setup() {
    certsync_test_support::setup_color_eyre();
    certsync_test_support::setup_tracing();
}

#[test]
fn missing_certificate_is_renewed() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);
    let toolkit = TestToolkit::default();
    let acme = TestAcme::new(gen_cert::valid());

    let mut output = Vec::new();
    let renewed = run(&config, &toolkit, &acme, &mut output).unwrap();

    assert_eq!(renewed, ["example.org"]);
    assert_eq!(acme.attempts(), ["example.org"]);
    assert_eq!(toolkit.expiry_queries.get(), 0, "no certificate to inspect");
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Renewing Domains"), "{output}");
    assert!(output.contains("Checking example.org..."), "{output}");
    assert!(!output.contains("No need to regenerate"), "{output}");
}

#[test]
fn renewal_window_is_inclusive() {
    setup();
    let (_dir, config) = test_config(&["due.example.org", "current.example.org"]);
    // half a day of slack so the test does not depend on how long it runs
    let due = gen_cert::in_days(28) + Duration::hours(12);
    let current = gen_cert::in_days(29) + Duration::hours(12);
    gen_cert::place_live(&config, "due.example.org", due);
    gen_cert::place_live(&config, "current.example.org", current);

    let toolkit = TestToolkit::default();
    let acme = TestAcme::new(gen_cert::valid());
    let renewed = run(&config, &toolkit, &acme, &mut TestPrinter).unwrap();

    assert_eq!(renewed, ["due.example.org"]);
    assert_eq!(acme.attempts(), ["due.example.org"]);
    assert_eq!(toolkit.expiry_queries.get(), 2);
}

#[test]
fn expired_certificate_is_renewed() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);
    gen_cert::place_live(&config, "example.org", gen_cert::expired());

    let acme = TestAcme::new(gen_cert::valid());
    let mut output = Vec::new();
    let renewed = run(&config, &TestToolkit::default(), &acme, &mut output).unwrap();

    assert_eq!(renewed, ["example.org"]);
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Certificate expired"), "{output}");
}

#[test]
fn force_renews_current_certificate() {
    setup();
    let (_dir, mut config) = test_config(&["example.org"]);
    config.force = true;
    gen_cert::place_live(&config, "example.org", gen_cert::valid());

    let toolkit = TestToolkit::default();
    let acme = TestAcme::new(gen_cert::valid());
    let renewed = run(&config, &toolkit, &acme, &mut TestPrinter).unwrap();

    assert_eq!(renewed, ["example.org"]);
    assert_eq!(toolkit.expiry_queries.get(), 0);
}

#[test]
fn merged_is_chain_followed_by_key() {
    setup();
    let (_dir, mut config) = test_config(&["example.org"]);
    config.merge_key_with_certificate = true;

    let acme = TestAcme::new(gen_cert::valid());
    run(&config, &TestToolkit::default(), &acme, &mut TestPrinter).unwrap();

    let paths = paths(&config, "example.org");
    let mut expected = fs::read(&paths.cert).unwrap();
    expected.extend(fs::read(&paths.key).unwrap());
    assert_eq!(fs::read(&paths.cert_copy).unwrap(), expected);
    assert!(!paths.key_copy.exists(), "merged output has no separate key");

    let items = pem::parse_many(fs::read(&paths.cert_copy).unwrap()).unwrap();
    let tags: Vec<_> = items.iter().map(pem::Pem::tag).collect();
    assert_eq!(tags, ["CERTIFICATE", "CERTIFICATE", "PRIVATE KEY"]);
}

#[test]
fn split_copies_are_identical() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);

    let acme = TestAcme::new(gen_cert::valid());
    run(&config, &TestToolkit::default(), &acme, &mut TestPrinter).unwrap();

    let paths = paths(&config, "example.org");
    assert_eq!(
        fs::read(&paths.cert_copy).unwrap(),
        fs::read(&paths.cert).unwrap()
    );
    assert_eq!(
        fs::read(&paths.key_copy).unwrap(),
        fs::read(&paths.key).unwrap()
    );
}

#[test]
fn renewal_overwrites_stale_publication() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);
    let paths = paths(&config, "example.org");
    fs::create_dir_all(&config.cert_copy_dir).unwrap();
    fs::write(&paths.cert_copy, "stale certificate with a long tail").unwrap();
    fs::write(&paths.key_copy, "stale key").unwrap();

    let acme = TestAcme::new(gen_cert::valid());
    run(&config, &TestToolkit::default(), &acme, &mut TestPrinter).unwrap();

    assert_eq!(
        fs::read(&paths.cert_copy).unwrap(),
        fs::read(&paths.cert).unwrap()
    );
    assert_eq!(
        fs::read(&paths.key_copy).unwrap(),
        fs::read(&paths.key).unwrap()
    );
}

#[test]
fn failure_stops_remaining_domains() {
    setup();
    let (_dir, config) = test_config(&["a.example.org", "b.example.org", "c.example.org"]);

    let acme = TestAcme::new(gen_cert::valid()).failing_for("b.example.org");
    let mut output = Vec::new();
    let err = run(&config, &TestToolkit::default(), &acme, &mut output).unwrap_err();

    assert!(
        err.to_string().contains("b.example.org"),
        "error does not name failing domain: {err:?}"
    );
    assert_eq!(acme.attempts(), ["a.example.org", "b.example.org"]);

    let a = paths(&config, "a.example.org");
    assert!(a.cert_copy.exists() && a.key_copy.exists());
    let c = paths(&config, "c.example.org");
    assert!(!c.cert_copy.exists());

    let output = String::from_utf8(output).unwrap();
    assert!(!output.contains("Checking c.example.org"), "{output}");
    assert!(output.contains("refusing to sign for b.example.org"), "{output}");
}

#[test]
fn nothing_to_renew() {
    setup();
    let (_dir, config) = test_config(&["a.example.org", "b.example.org"]);
    gen_cert::place_live(&config, "a.example.org", gen_cert::valid());
    gen_cert::place_live(&config, "b.example.org", gen_cert::valid());

    let acme = TestAcme::new(gen_cert::valid());
    let mut output = Vec::new();
    let renewed = run(&config, &TestToolkit::default(), &acme, &mut output).unwrap();

    assert!(renewed.is_empty());
    assert!(acme.attempts().is_empty());
    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("No need to regenerate").count(), 1, "{output}");
    assert!(output.contains("not yet due for renewal"), "{output}");
}

#[test]
fn corrupt_certificate_is_reported() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);
    let paths = paths(&config, "example.org");
    fs::create_dir_all(paths.cert.parent().unwrap()).unwrap();
    fs::write(&paths.cert, "-----BEGIN CERTIFisrtens-----\r\n 128972184ienst\r\n-----END").unwrap();

    let acme = TestAcme::new(gen_cert::valid());
    let err = run(&config, &TestToolkit::default(), &acme, &mut TestPrinter).unwrap_err();

    assert!(
        err.to_string().contains("needs renewal"),
        "unexpected error: {err:?}"
    );
    assert!(acme.attempts().is_empty());
}

#[test]
fn dh_params_generated_once() {
    setup();
    let (_dir, mut config) = test_config(&["example.org"]);
    config.dh_parameters = true;
    gen_cert::place_live(&config, "example.org", gen_cert::valid());

    let toolkit = TestToolkit::default();
    let acme = TestAcme::new(gen_cert::valid());
    let mut output = Vec::new();
    run(&config, &toolkit, &acme, &mut output).unwrap();
    run(&config, &toolkit, &acme, &mut output).unwrap();

    assert_eq!(toolkit.dh_generations.get(), 1);
    let output = String::from_utf8(output).unwrap();
    assert_eq!(output.matches("Generating DH parameters").count(), 1);
    let params = fs::read_to_string(config.cert_copy_dir.join("dhparams.pem")).unwrap();
    assert!(params.contains("BEGIN DH PARAMETERS"));
}

#[test]
fn dh_params_skipped_when_disabled() {
    setup();
    let (_dir, config) = test_config(&["example.org"]);
    gen_cert::place_live(&config, "example.org", gen_cert::valid());

    let toolkit = TestToolkit::default();
    run(&config, &toolkit, &TestAcme::new(gen_cert::valid()), &mut TestPrinter).unwrap();

    assert_eq!(toolkit.dh_generations.get(), 0);
    assert!(!config.cert_copy_dir.join("dhparams.pem").exists());
}

#[test]
fn empty_dh_params_are_an_error() {
    use certsync::Toolkit;
    use color_eyre::eyre;
    use std::path::Path;

    struct EmptyDh;
    impl Toolkit for EmptyDh {
        fn not_after(&self, _: &Path) -> eyre::Result<time::OffsetDateTime> {
            unreachable!()
        }
        fn generate_dh_params(&self, out: &Path, _: u32) -> eyre::Result<()> {
            fs::write(out, "").map_err(Into::into)
        }
    }

    setup();
    let (_dir, config) = test_config(&["example.org"]);
    let err = dhparams::ensure_dh_params(&config, &EmptyDh, &mut TestPrinter).unwrap_err();
    assert!(err.to_string().contains("empty"), "{err:?}");
    assert!(!config.cert_copy_dir.join("dhparams.pem").exists());
}
