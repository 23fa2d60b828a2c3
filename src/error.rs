#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("No medication provided or incorrect JSON format")]
    MissingMedication,

    #[error("Medication name cannot be empty")]
    EmptyMedication,

    #[error("Invalid input format. Expected a list of medication names.")]
    InvalidMedicationList,

    #[error("Medication not found in OpenFDA database")]
    MedicationNotFound,

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("Invalid response from {api}: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Connection to {api} failed: {source}")]
    Connect {
        api: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {api} timed out")]
    Timeout { api: String },

    #[error("API key required: {api} requires {env_var} environment variable")]
    ApiKeyRequired { api: String, env_var: String },
}

impl GatewayError {
    /// Renders the wire shape all failures take: `{"error": <message>}`.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}
