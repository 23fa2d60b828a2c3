use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::GatewayError;

const OPENFDA_API: &str = "openfda";
const LABEL_ENDPOINT: &str = "drug/label.json";

/// The two OpenFDA label fields a medication name is matched against, in
/// lookup order.
const SEARCH_FIELDS: [&str; 2] = ["openfda.generic_name", "openfda.brand_name"];

pub(crate) struct OpenFdaClient {
    client: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl OpenFdaClient {
    pub(crate) fn new(config: &Config) -> Result<Self, GatewayError> {
        Ok(Self {
            client: crate::sources::build_client(config.timeout)?,
            base: config.openfda_base.clone(),
            api_key: config.openfda_api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Looks up a drug label by medication name.
    ///
    /// Queries the generic-name field first and falls back to the brand-name
    /// field only when the first query succeeds with zero matches. A
    /// transport-level failure on either query aborts the lookup; the
    /// fallback is never used to paper over an unhealthy upstream.
    pub(crate) async fn lookup(
        &self,
        name: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::EmptyMedication);
        }

        for field in SEARCH_FIELDS {
            debug!(field, name, "OpenFDA label query");
            if let Some(record) = self.label_search(field, name).await? {
                return Ok(record);
            }
        }

        Err(GatewayError::MedicationNotFound)
    }

    /// Runs a single label query, returning the first matching record.
    ///
    /// OpenFDA reports "no matches" as HTTP 404 with an error body, so 404
    /// maps to `None` rather than an upstream error.
    async fn label_search(
        &self,
        field: &str,
        name: &str,
    ) -> Result<Option<serde_json::Value>, GatewayError> {
        let escaped = crate::utils::query::escape_lucene_value(name);
        let search = format!("{field}:\"{escaped}\"");

        let url = self.endpoint(LABEL_ENDPOINT);
        let mut req = self
            .client
            .get(&url)
            .query(&[("search", search.as_str()), ("limit", "1")]);
        if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("api_key", key)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|err| crate::sources::classify_send_error(OPENFDA_API, err))?;
        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp, OPENFDA_API).await?;

        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(GatewayError::Api {
                api: OPENFDA_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        crate::sources::ensure_json_content_type(OPENFDA_API, content_type.as_ref(), &bytes)?;

        let parsed: LabelResponse =
            serde_json::from_slice(&bytes).map_err(|source| GatewayError::ApiJson {
                api: OPENFDA_API.to_string(),
                source,
            })?;

        Ok(parsed.results.into_iter().next())
    }
}
