use anyhow::Context;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// HTTP basic credentials for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

/// Thin request layer beneath the store client. An `Err` means no response
/// was received at all.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, auth: &BasicAuth) -> anyhow::Result<HttpReply>;

    async fn put_json(&self, url: &str, auth: &BasicAuth, body: &Value) -> anyhow::Result<HttpReply>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build wellness http client")?;
        Ok(Self { http })
    }

    async fn reply(res: reqwest::Response) -> anyhow::Result<HttpReply> {
        let status = res.status();
        let body = res
            .text()
            .await
            .context("failed to read wellness response body")?;
        Ok(HttpReply { status, body })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, auth: &BasicAuth) -> anyhow::Result<HttpReply> {
        let res = self
            .http
            .get(url)
            .basic_auth(&auth.username, Some(&auth.password))
            .send()
            .await
            .context("wellness GET request failed")?;
        Self::reply(res).await
    }

    async fn put_json(&self, url: &str, auth: &BasicAuth, body: &Value) -> anyhow::Result<HttpReply> {
        let res = self
            .http
            .put(url)
            .basic_auth(&auth.username, Some(&auth.password))
            .json(body)
            .send()
            .await
            .context("wellness PUT request failed")?;
        Self::reply(res).await
    }
}
