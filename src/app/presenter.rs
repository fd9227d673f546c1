use crate::domain::model::NormalizedAddress;
use crate::utils::error::{CepError, FetchError, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CepError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CepError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, json".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "<[FetchError]>::is_empty")]
    failures: &'a [FetchError],
}

pub fn render(outcome: &Result<NormalizedAddress>, format: OutputFormat) -> Result<String> {
    match (outcome, format) {
        (Ok(address), OutputFormat::Text) => Ok(render_text(address)),
        (Ok(address), OutputFormat::Json) => Ok(serde_json::to_string_pretty(address)?),
        (Err(e), OutputFormat::Text) => Ok(e.user_friendly_message()),
        (Err(e), OutputFormat::Json) => {
            let failures: &[FetchError] = match e {
                CepError::AllProvidersFailed(failures) => failures.as_slice(),
                CepError::Provider(failure) => std::slice::from_ref(failure),
                _ => &[],
            };
            let body = ErrorBody {
                error: ErrorDetail {
                    kind: e.kind_label(),
                    message: e.to_string(),
                    failures,
                },
            };
            Ok(serde_json::to_string_pretty(&body)?)
        }
    }
}

fn render_text(address: &NormalizedAddress) -> String {
    format!(
        "Api: {}\nStreet: {}\nComplement: {}\nNeighborhood: {}\nCity: {}\nState: {}",
        address.api,
        address.street,
        address.complement,
        address.neighborhood,
        address.city,
        address.state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use std::time::Duration;

    fn address() -> NormalizedAddress {
        NormalizedAddress {
            api: "brasilapi.com.br".to_string(),
            street: "Praça da Sé".to_string(),
            neighborhood: "Sé".to_string(),
            complement: String::new(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[test]
    fn test_render_text_lists_all_six_fields_in_order() {
        let rendered = render(&Ok(address()), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Api: brasilapi.com.br",
                "Street: Praça da Sé",
                "Complement: ",
                "Neighborhood: Sé",
                "City: São Paulo",
                "State: SP",
            ]
        );
    }

    #[test]
    fn test_render_json_address() {
        let rendered = render(&Ok(address()), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["state"], "SP");
        assert_eq!(value["complement"], "");
    }

    #[test]
    fn test_render_timeout() {
        let outcome = Err(CepError::Timeout(Duration::from_secs(1)));
        assert_eq!(render(&outcome, OutputFormat::Text).unwrap(), "request timeout");

        let rendered = render(&outcome, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["error"]["kind"], "timeout");
        assert!(value["error"].get("failures").is_none());
    }

    #[test]
    fn test_render_provider_failure() {
        let failure = FetchError::new("viacep", ErrorKind::ParseError, "expected value at line 1 column 1");
        let outcome = Err(CepError::Provider(failure));

        let text = render(&outcome, OutputFormat::Text).unwrap();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("parse_error"));

        let rendered = render(&outcome, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["error"]["kind"], "parse_error");
        assert_eq!(value["error"]["failures"][0]["provider"], "viacep");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
