use reqwest::{Method, RequestBuilder};
use serde_json::Value;

/// Normalized answer of the tabular store: success flag plus rows.
#[derive(Debug, Clone)]
pub struct PostgrestResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Vec<Value>,
}

impl PostgrestResponse {
    /// Rows of a successful response, or an error carrying the status.
    pub fn into_rows(self, what: &str) -> anyhow::Result<Vec<Value>> {
        if !self.ok {
            anyhow::bail!(
                "{what}: metadata store returned status {} ({:?})",
                self.status,
                self.data
            );
        }
        Ok(self.data)
    }
}

/// Equality filter value, `eq.<value>`.
pub fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[derive(Clone)]
pub struct PostgrestClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PostgrestClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, relation: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, relation);
        let req = self.client.request(method, url);
        match self.token.as_deref() {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    pub async fn select(
        &self,
        relation: &str,
        filters: &[(&str, String)],
        columns: &str,
    ) -> anyhow::Result<PostgrestResponse> {
        let req = self
            .request(Method::GET, relation)
            .query(filters)
            .query(&[("select", columns)]);
        self.send(req).await
    }

    pub async fn insert(&self, relation: &str, body: &Value) -> anyhow::Result<PostgrestResponse> {
        let req = self
            .request(Method::POST, relation)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(req).await
    }

    pub async fn delete(
        &self,
        relation: &str,
        filters: &[(&str, String)],
    ) -> anyhow::Result<PostgrestResponse> {
        let req = self.request(Method::DELETE, relation).query(filters);
        self.send(req).await
    }

    async fn send(&self, req: RequestBuilder) -> anyhow::Result<PostgrestResponse> {
        let resp = req
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("metadata store request failed: {e}"))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read metadata store body: {e}"))?;
        Ok(PostgrestResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            data: normalize_body(&text),
        })
    }
}

fn normalize_body(text: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(rows)) => rows,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => vec![other],
        Err(_) => vec![Value::String(text.to_string())],
    }
}
