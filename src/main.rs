use anyhow::Result;
use cep_race::app::lookup_command::{self, exit_code_for};
use cep_race::app::prompt::read_postal_code;
use cep_race::utils::{logger, validation::Validate};
use cep_race::{CepError, CliConfig, PostalCode, Resolver, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    let resolver = match build_resolver(&config) {
        Ok(resolver) => resolver,
        Err(e) => fail(&e),
    };

    let cep = match &config.cep {
        Some(code) => PostalCode::from(code.trim()),
        None => {
            let stdin = std::io::stdin();
            match read_postal_code(stdin.lock(), std::io::stdout()) {
                Ok(code) => code,
                Err(e) => fail(&e),
            }
        }
    };

    let report = lookup_command::run(&resolver, &cep, config.format).await?;
    println!("{}", report.rendered);

    if report.exit_code != lookup_command::EXIT_SUCCESS {
        std::process::exit(report.exit_code);
    }
    Ok(())
}

/// CLI flags alone, or a TOML file with the flags layered on top.
fn build_resolver(config: &CliConfig) -> cep_race::Result<Resolver> {
    config.validate()?;

    let Some(path) = &config.config else {
        return Ok(Resolver::from_config(config));
    };

    tracing::info!("📁 Loading configuration from: {}", path);
    let mut file_config = TomlConfig::from_file(path)?;
    file_config.apply_overrides(config.timeout_ms, config.policy);
    file_config.validate()?;

    Ok(Resolver::from_config(&file_config))
}

fn fail(e: &CepError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(exit_code_for(e));
}
