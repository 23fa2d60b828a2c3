use tracing::debug;

use crate::config::Config;
use crate::error::GatewayError;

const INTERACTIONS_API: &str = "interactions";
const INTERACTIONS_KEY_ENV: &str = "INTERACTIONS_API_KEY";

pub(crate) struct InteractionClient {
    client: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl InteractionClient {
    pub(crate) fn new(config: &Config) -> Result<Self, GatewayError> {
        Ok(Self {
            client: crate::sources::build_client(config.timeout)?,
            base: config.interactions_base.clone(),
            api_key: config.interactions_api_key.clone(),
        })
    }

    fn require_key(&self) -> Result<&str, GatewayError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::ApiKeyRequired {
                api: INTERACTIONS_API.to_string(),
                env_var: INTERACTIONS_KEY_ENV.to_string(),
            })
    }

    /// Checks a batch of medication names for known interactions.
    ///
    /// The whole list goes upstream in one POST; the upstream's JSON body is
    /// returned verbatim. No outbound call is made for an empty list or a
    /// missing API key.
    pub(crate) async fn check(
        &self,
        medications: &[String],
    ) -> Result<serde_json::Value, GatewayError> {
        if medications.is_empty() {
            return Err(GatewayError::InvalidMedicationList);
        }
        let key = self.require_key()?;

        debug!(count = medications.len(), "interaction check");

        let resp = self
            .client
            .post(&self.base)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {key}"),
            )
            .json(&serde_json::json!({ "medications": medications }))
            .send()
            .await
            .map_err(|err| crate::sources::classify_send_error(INTERACTIONS_API, err))?;

        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp, INTERACTIONS_API).await?;

        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(GatewayError::Api {
                api: INTERACTIONS_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        crate::sources::ensure_json_content_type(INTERACTIONS_API, content_type.as_ref(), &bytes)?;

        serde_json::from_slice(&bytes).map_err(|source| GatewayError::ApiJson {
            api: INTERACTIONS_API.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> InteractionClient {
        let mut config = Config::for_test(server.uri());
        config.interactions_base = format!("{}/v1/check", server.uri());
        InteractionClient::new(&config).unwrap()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn posts_full_list_with_bearer_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/check"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "medications": ["aspirin", "ibuprofen"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "interactions": [
                    { "pair": ["aspirin", "ibuprofen"], "severity": "moderate" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .check(&names(&["aspirin", "ibuprofen"]))
            .await
            .unwrap();
        assert_eq!(result["interactions"][0]["severity"], "moderate");
    }

    #[tokio::test]
    async fn empty_list_fails_with_zero_outbound_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server).check(&[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidMedicationList));
        assert_eq!(
            err.to_string(),
            "Invalid input format. Expected a list of medication names."
        );
    }

    #[tokio::test]
    async fn missing_key_fails_with_zero_outbound_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = Config::for_test(server.uri());
        config.interactions_api_key = None;
        let client = InteractionClient::new(&config).unwrap();

        let err = client.check(&names(&["aspirin"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::ApiKeyRequired { .. }));
        assert!(err.to_string().contains("INTERACTIONS_API_KEY"));
    }

    #[tokio::test]
    async fn surfaces_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/check"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .check(&names(&["aspirin"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Api { .. }));
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/check"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{truncated", "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .check(&names(&["aspirin"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ApiJson { .. }));
    }
}
