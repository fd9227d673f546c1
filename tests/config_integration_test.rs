use anyhow::Result;
use cep_race::app::lookup_command::{self, EXIT_SUCCESS, EXIT_TIMEOUT};
use cep_race::app::presenter::OutputFormat;
use cep_race::utils::validation::Validate;
use cep_race::{PostalCode, RacePolicy, Resolver, TomlConfig};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

/// Providers and host mappings from a TOML file drive the whole lookup.
#[tokio::test]
async fn test_toml_config_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let brasil_api = MockServer::start();
    let via_cep = MockServer::start();

    let brasil_mock = brasil_api.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/01001000");
        then.status(200)
            .delay(Duration::from_millis(20))
            .json_body(serde_json::json!({
                "cep": "01001000",
                "state": "SP",
                "city": "São Paulo",
                "neighborhood": "Sé",
                "street": "Praça da Sé",
                "service": "open-cep"
            }));
    });
    via_cep.mock(|when, then| {
        when.method(GET).path("/ws/01001000/json/");
        then.status(200)
            .delay(Duration::from_secs(2))
            .json_body(serde_json::json!({ "logradouro": "too late" }));
    });

    let config_content = format!(
        r#"
[resolver]
timeout_ms = 1000
policy = "first-success"

[hosts]
"127.0.0.1:{brasil_port}" = "brasilapi"
"127.0.0.1:{via_port}" = "viacep"

[[providers]]
name = "brasilapi"
endpoint = "{brasil_base}/api/cep/v1/{{cep}}"

[[providers]]
name = "viacep"
endpoint = "{via_base}/ws/{{cep}}/json/"
"#,
        brasil_port = brasil_api.port(),
        via_port = via_cep.port(),
        brasil_base = brasil_api.base_url(),
        via_base = via_cep.base_url(),
    );

    let config_path = temp_dir.path().join("cep-race.toml");
    tokio::fs::write(&config_path, config_content).await?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;

    let resolver = Resolver::from_config(&config);
    let report = lookup_command::run(&resolver, &PostalCode::from("01001000"), OutputFormat::Json).await?;

    brasil_mock.assert();
    assert_eq!(report.exit_code, EXIT_SUCCESS);

    let value: serde_json::Value = serde_json::from_str(&report.rendered)?;
    assert_eq!(value["api"], format!("127.0.0.1:{}", brasil_api.port()));
    assert_eq!(value["street"], "Praça da Sé");
    assert_eq!(value["complement"], "");

    Ok(())
}

#[tokio::test]
async fn test_cli_overrides_shorten_timeout() -> Result<()> {
    let via_cep = MockServer::start();
    via_cep.mock(|when, then| {
        when.method(GET).path("/ws/01001000/json/");
        then.status(200)
            .delay(Duration::from_millis(500))
            .json_body(serde_json::json!({ "logradouro": "Praça da Sé" }));
    });

    let mut config = TomlConfig::from_toml_str(&format!(
        r#"
[resolver]
timeout_ms = 5000

[[providers]]
name = "viacep"
endpoint = "{}/ws/{{cep}}/json/"
schema = "viacep"
"#,
        via_cep.base_url()
    ))?;
    config.apply_overrides(Some(100), Some(RacePolicy::FirstOutcome));
    config.validate()?;

    let resolver = Resolver::from_config(&config);
    assert_eq!(resolver.timeout(), Duration::from_millis(100));

    let report = lookup_command::run(&resolver, &PostalCode::from("01001000"), OutputFormat::Text).await?;

    assert_eq!(report.exit_code, EXIT_TIMEOUT);
    assert_eq!(report.rendered, "request timeout");
    Ok(())
}

#[tokio::test]
async fn test_legacy_fallback_schema_for_unmapped_host() -> Result<()> {
    let mirror = MockServer::start();
    mirror.mock(|when, then| {
        when.method(GET).path("/ws/01001000/json/");
        then.status(200).json_body(serde_json::json!({
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP"
        }));
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[resolver]
fallback_schema = "viacep"

[[providers]]
name = "mirror"
endpoint = "{}/ws/{{cep}}/json/"
"#,
        mirror.base_url()
    ))?;
    config.validate()?;

    let address = Resolver::from_config(&config)
        .resolve(&PostalCode::from("01001000"))
        .await?;

    assert_eq!(address.complement, "lado ímpar");
    assert_eq!(address.state, "SP");
    Ok(())
}
