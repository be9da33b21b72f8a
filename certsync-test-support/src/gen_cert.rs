use std::fs;

use certsync::config::DomainPaths;
use certsync::Config;
use rcgen::{Certificate, CertificateParams, IsCa};
use time::{Duration, OffsetDateTime};

fn ca_cert() -> Certificate {
    let subject_alt_names = vec!["letsencrypt.org".to_string()];
    let mut params = CertificateParams::new(subject_alt_names);
    params.not_after = year2500();
    params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    Certificate::from_params(params).unwrap()
}

fn client_cert(domain: &str, valid_till: OffsetDateTime) -> Certificate {
    let subject_alt_names = vec![domain.to_string()];
    let mut params = CertificateParams::new(subject_alt_names);
    params.not_after = valid_till;
    Certificate::from_params(params).unwrap()
}

/// returns a PEM encoded full chain (signed certificate followed by the
/// issuer) and the PEM encoded private key, like certbot leaves them
#[must_use]
pub fn generate(domain: &str, valid_till: OffsetDateTime) -> (String, String) {
    let ca = ca_cert();
    let client = client_cert(domain, valid_till);

    let signed = client.serialize_pem_with_signer(&ca).unwrap();
    let issuer = ca.serialize_pem().unwrap();
    let key = client.serialize_private_key_pem();
    (signed + &issuer, key)
}

/// Writes `fullchain.pem` and `privkey.pem` into the certbot live dir
pub fn place_live(config: &Config, domain: &str, valid_till: OffsetDateTime) -> DomainPaths {
    let paths = DomainPaths::new(config, domain);
    let (full_chain, key) = generate(domain, valid_till);
    let live = paths.cert.parent().unwrap();
    fs::create_dir_all(live).unwrap();
    fs::write(&paths.cert, full_chain).unwrap();
    fs::write(&paths.key, key).unwrap();
    paths
}

#[must_use]
pub fn in_days(days: i64) -> OffsetDateTime {
    OffsetDateTime::now_utc() + Duration::days(days)
}

#[must_use]
pub fn valid() -> OffsetDateTime {
    in_days(90)
}

#[must_use]
pub fn expired() -> OffsetDateTime {
    in_days(-2)
}

#[must_use]
pub fn year2500() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(16_734_790_789).unwrap()
}
