use super::{null_as_empty, Normalize};
use crate::domain::model::NormalizedAddress;
use serde::Deserialize;

/// Body of `GET /ws/{cep}/json/` on ViaCEP. The region codes (`ibge`,
/// `gia`, `ddd`, `siafi`) are decoded but never surfaced.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViaCepRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub cep: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub logradouro: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub complemento: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub bairro: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub localidade: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub uf: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub ibge: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub gia: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub ddd: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub siafi: String,
    /// Set by ViaCEP (as `true` or `"true"`) for codes it does not know
    pub erro: Option<serde_json::Value>,
}

impl ViaCepRecord {
    pub fn is_not_found(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => !s.eq_ignore_ascii_case("false"),
            Some(_) => true,
        }
    }
}

impl Normalize for ViaCepRecord {
    fn normalize(self, api: &str) -> NormalizedAddress {
        NormalizedAddress {
            api: api.to_string(),
            street: self.logradouro,
            neighborhood: self.bairro,
            complement: self.complemento,
            city: self.localidade,
            state: self.uf,
        }
    }
}
