use crate::secret::SecretString;
use std::fmt;

/// An (endpoint, model) pair tried by the fallback chain, plus the bearer
/// credential of the provider it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    provider: String,
    endpoint: String,
    model: String,
    credential: SecretString,
}

impl Candidate {
    pub fn new(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        credential: SecretString,
    ) -> Self {
        Self {
            provider: provider.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            credential,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credential(&self) -> &SecretString {
        &self.credential
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
