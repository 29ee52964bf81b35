//! HTTP transport for the town service, built on `reqwest`.
//!
//! Session and CSRF cookies live in a shared cookie jar. The CSRF token is
//! read back out of the jar on every POST and echoed in the
//! [`routes::CSRF_HEADER`] header.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::client::TownTransport;
use crate::config::ClientConfig;
use crate::content::{DialogPack, UiStrings};
use crate::error::ClientError;
use crate::protocol::{routes, EventRequest, RawReply, TownSnapshot};

#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    jar: Arc<Jar>,
    api_base: Url,
    content_base: Url,
    csrf_cookie: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(jar.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(transport_error)?;

        Ok(Self {
            http,
            jar,
            api_base: parse_url(&config.api_base())?,
            content_base: parse_url(&config.content_base())?,
            csrf_cookie: config.csrf_cookie(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, ClientError> {
        self.api_base
            .join(path)
            .map_err(|e| ClientError::Url(e.to_string()))
    }

    fn content_url(&self, path: &str) -> Result<Url, ClientError> {
        self.content_base
            .join(path)
            .map_err(|e| ClientError::Url(e.to_string()))
    }

    /// Current CSRF token, or empty when the server has not set one yet.
    pub fn csrf_token(&self) -> String {
        self.jar
            .cookies(&self.api_base)
            .and_then(|header| {
                header
                    .to_str()
                    .ok()
                    .and_then(|cookies| cookie_value(cookies, &self.csrf_cookie))
            })
            .unwrap_or_default()
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        url: Url,
        context: &'static str,
    ) -> Result<D, ClientError> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { context, source })
    }
}

impl TownTransport for HttpTransport {
    async fn fetch_ui(&self) -> Result<UiStrings, ClientError> {
        self.get_json(self.content_url(routes::UI_STRINGS)?, "ui strings")
            .await
    }

    async fn fetch_dialog(&self, pack: &str) -> Result<DialogPack, ClientError> {
        self.get_json(self.content_url(&routes::dialog_pack(pack))?, "dialog pack")
            .await
    }

    async fn fetch_town(&self) -> Result<TownSnapshot, ClientError> {
        self.get_json(self.api_url(routes::TOWN)?, "town snapshot")
            .await
    }

    async fn post_event(&self, request: &EventRequest) -> Result<RawReply, ClientError> {
        let url = self.api_url(routes::TOWN_EVENT)?;
        log::debug!("POST {} event_id={}", url, request.event_id);

        let response = self
            .http
            .post(url)
            .header(routes::CSRF_HEADER, self.csrf_token())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(RawReply::new(status, body.to_vec()))
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| ClientError::Url(format!("{raw}: {e}")))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

/// Value of cookie `name` in a `Cookie:` header string (`a=1; b=2`).
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
