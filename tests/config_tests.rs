use ec2rm::config;
use ec2rm::Error;
use std::io::Write;
use std::time::Duration;

const SAMPLE: &str = r#"
env:
  test:
    s3:
      bucket: inventory-test
      key: ec2/running.csv
    azure_ad:
      tenant_id: tenant-test
      client_id: client-test
      redirect_url: http://localhost:8080/auth/callback
      group_id: group-test
      secret_name: platform/ec2-restart-manager
      secret_key: AZURE_AD_CLIENT_SECRET_TEST
  prod:
    s3:
      bucket: inventory-prod
      key: ec2/running.csv
    azure_ad:
      tenant_id: tenant-prod
      client_id: client-prod
      redirect_url: https://ec2rm.example.com/auth/callback
      group_id: group-prod
    region: eu-central-1
    role_name: custom-restarter
    schedule_parameter: /ops/schedule
    public_base_url: https://ec2rm.example.com/
    inventory_refresh_secs: 60
"#;

#[test]
fn test_sanitize_base_url_removes_trailing_slash() {
    assert_eq!(
        config::sanitize_base_url("https://ec2rm.example.com/"),
        "https://ec2rm.example.com"
    );
}

#[test]
fn test_sanitize_base_url_with_whitespace() {
    assert_eq!(
        config::sanitize_base_url("  https://ec2rm.example.com//  "),
        "https://ec2rm.example.com"
    );
}

#[test]
fn test_sanitize_base_url_empty_string() {
    assert_eq!(config::sanitize_base_url("   "), "http://localhost:8080");
}

#[test]
fn test_test_section_uses_defaults() {
    let cfg = config::parse_config(SAMPLE, "test").unwrap();
    assert_eq!(cfg.environment, "test");
    assert_eq!(cfg.s3.bucket, "inventory-test");
    assert_eq!(cfg.region, config::DEFAULT_HOME_REGION);
    assert_eq!(cfg.role_name, config::DEFAULT_ROLE_NAME);
    assert_eq!(cfg.schedule_parameter_name(), "/ec2-restart-manager/test/schedule");
    assert_eq!(cfg.public_base_url(), config::DEFAULT_PUBLIC_BASE_URL);
    assert_eq!(
        cfg.inventory_refresh_interval(),
        Duration::from_secs(config::DEFAULT_INVENTORY_REFRESH_SECS)
    );
    assert_eq!(cfg.azure_ad.secret_key.as_deref(), Some("AZURE_AD_CLIENT_SECRET_TEST"));
}

#[test]
fn test_prod_section_overrides() {
    let cfg = config::parse_config(SAMPLE, "prod").unwrap();
    assert_eq!(cfg.region, "eu-central-1");
    assert_eq!(cfg.role_name, "custom-restarter");
    assert_eq!(cfg.schedule_parameter_name(), "/ops/schedule");
    assert_eq!(cfg.public_base_url(), "https://ec2rm.example.com");
    assert_eq!(cfg.inventory_refresh_interval(), Duration::from_secs(60));
    assert!(cfg.azure_ad.secret_name.is_none());
}

#[test]
fn test_unknown_environment_is_an_error() {
    let err = config::parse_config(SAMPLE, "staging").unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("staging")));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    assert!(matches!(config::parse_config("env: [", "test"), Err(Error::Config(_))));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    let cfg = config::load_config(file.path(), "prod").unwrap();
    assert_eq!(cfg.s3.bucket, "inventory-prod");
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load_config(&dir.path().join("absent.yaml"), "test").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
