//! Directory REST client
//!
//! Talks to the directory backend: public business search and detail,
//! categories, sign-in and the signed-in user's favorites. Authenticated
//! calls carry the bearer token of the [`Session`] the client was built with.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::model::{Business, BusinessPage, Category};
use crate::search::SearchParams;
use crate::session::{Session, User};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Anything that can answer a business search
pub trait BusinessSource: Send + Sync {
    fn search(&self, params: &SearchParams) -> impl Future<Output = Result<BusinessPage>> + Send;
}

impl<T: BusinessSource> BusinessSource for Arc<T> {
    fn search(&self, params: &SearchParams) -> impl Future<Output = Result<BusinessPage>> + Send {
        (**self).search(params)
    }
}

/// Successful `POST /auth/login` body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Collections may come bare or wrapped in `{"data": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Wrapped<T> {
    Data { data: T },
    Bare(T),
}

impl<T> Wrapped<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Data { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the directory backend
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DirectoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.url, config.timeout())
    }

    /// Use the session's token for authenticated calls
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = session.bearer_token().map(str::to_string);
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "directory request");
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(Error::Unauthorized(
                "Sign in to use favorites".to_string(),
            ));
        }
        Ok(())
    }

    /// Map error statuses to [`Error::Unauthorized`] or [`Error::Api`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                if text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                } else {
                    text
                }
            });

        warn!(status = status.as_u16(), %message, "directory request failed");
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized(message));
        }
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// `GET /public/businesses`
    pub async fn businesses(&self, params: &SearchParams) -> Result<BusinessPage> {
        self.send_json(self.request(Method::GET, "/public/businesses").query(params))
            .await
    }

    /// `GET /public/categories`
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let wrapped: Wrapped<Vec<Category>> = self
            .send_json(self.request(Method::GET, "/public/categories"))
            .await?;
        Ok(wrapped.into_inner())
    }

    /// `GET /public/businesses/{id}`
    pub async fn business(&self, id: &str) -> Result<Business> {
        let path = format!("/public/businesses/{}", urlencoding::encode(id));
        let wrapped: Wrapped<Business> = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(wrapped.into_inner())
    }

    /// `POST /auth/login`; the caller stores the token in its session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let builder = self
            .request(Method::POST, "/auth/login")
            .json(&Credentials { email, password });
        let login: LoginResponse = self.send_json(builder).await?;
        if login.token.is_empty() {
            return Err(Error::Unauthorized("Login returned no token".to_string()));
        }
        Ok(login)
    }

    /// `POST /auth/logout`
    pub async fn logout(&self) -> Result<()> {
        self.require_token()?;
        Self::check(self.request(Method::POST, "/auth/logout").send().await?).await?;
        Ok(())
    }

    /// `GET /favorites`
    pub async fn favorites(&self) -> Result<Vec<Business>> {
        self.require_token()?;
        let wrapped: Wrapped<Vec<Business>> = self
            .send_json(self.request(Method::GET, "/favorites"))
            .await?;
        Ok(wrapped.into_inner())
    }

    /// `POST /favorites/{id}`
    pub async fn add_favorite(&self, id: u64) -> Result<()> {
        self.require_token()?;
        let path = format!("/favorites/{}", id);
        Self::check(self.request(Method::POST, &path).send().await?).await?;
        Ok(())
    }

    /// `DELETE /favorites/{id}`
    pub async fn remove_favorite(&self, id: u64) -> Result<()> {
        self.require_token()?;
        let path = format!("/favorites/{}", id);
        Self::check(self.request(Method::DELETE, &path).send().await?).await?;
        Ok(())
    }
}

impl BusinessSource for DirectoryClient {
    async fn search(&self, params: &SearchParams) -> Result<BusinessPage> {
        self.businesses(params).await
    }
}
