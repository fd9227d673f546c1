use super::{null_as_empty, Normalize};
use crate::domain::model::NormalizedAddress;
use serde::Deserialize;

/// Body of `GET /api/cep/v1/{cep}` on BrasilAPI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrasilApiRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub cep: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub neighborhood: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub street: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub service: String,
}

impl Normalize for BrasilApiRecord {
    fn normalize(self, api: &str) -> NormalizedAddress {
        NormalizedAddress {
            api: api.to_string(),
            street: self.street,
            neighborhood: self.neighborhood,
            complement: String::new(),
            city: self.city,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_has_empty_complement() {
        let record: BrasilApiRecord = serde_json::from_value(serde_json::json!({
            "cep": "01001000",
            "state": "SP",
            "city": "São Paulo",
            "neighborhood": "Sé",
            "street": "Praça da Sé",
            "service": "open-cep"
        }))
        .unwrap();

        let address = record.normalize("brasilapi.com.br");

        assert_eq!(address.api, "brasilapi.com.br");
        assert_eq!(address.street, "Praça da Sé");
        assert_eq!(address.neighborhood, "Sé");
        assert_eq!(address.complement, "");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");
    }

    #[test]
    fn test_missing_and_null_fields_become_empty() {
        let record: BrasilApiRecord = serde_json::from_value(serde_json::json!({
            "cep": "69900000",
            "state": "AC",
            "city": "Rio Branco",
            "neighborhood": null
        }))
        .unwrap();

        assert_eq!(record.neighborhood, "");
        assert_eq!(record.street, "");
        assert_eq!(record.service, "");
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let record: BrasilApiRecord =
            serde_json::from_str(r#"{"street": "  Rua A ", "city": "santos"}"#).unwrap();
        let address = record.normalize("brasilapi.com.br");
        assert_eq!(address.street, "  Rua A ");
        assert_eq!(address.city, "santos");
    }
}
