use serde::{Deserialize, Deserializer, Serialize};

/// One stored job offer as listed by the backend. Missing or `null` fields
/// read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRecord {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company_logo: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publication_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub candidate_required_location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub salary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartJobResponse {
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// A message delivered on a subscribed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub destination: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("broker error: {0}")]
    Broker(String),
    #[error("protocol error: {0}")]
    Protocol(#[from] crate::stomp::FrameError),
    #[error("channel is not connected")]
    NotConnected,
    #[error("channel closed: {0}")]
    Closed(String),
}
