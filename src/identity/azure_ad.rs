use serde::Deserialize;

use crate::config::AzureAdConfig;
use crate::error::{Error, Result};

pub const LOGIN_HOST: &str = "https://login.microsoftonline.com";
pub const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const SCOPES: &str = "openid profile User.Read GroupMember.Read.All";
const LOGOUT_URL: &str = "https://login.microsoftonline.com/common/oauth2/logout";
/// Fallback session lifetime when the token response has no `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Access token returned by the token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub fn lifetime_secs(&self) -> i64 {
        self.expires_in.filter(|s| *s > 0).unwrap_or(DEFAULT_EXPIRES_IN)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryObject {
    #[serde(default)]
    pub id: String,
}

/// One page of `GET /me/memberOf`.
#[derive(Debug, Default, Deserialize)]
pub struct MemberOfPage {
    #[serde(default)]
    pub value: Vec<DirectoryObject>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(rename = "displayName", default)]
    display_name: String,
}

/// Result of checking one membership page.
#[derive(Debug, PartialEq, Eq)]
pub enum PageCheck {
    Member,
    Next(String),
    NotMember,
}

/// Decides whether `group_id` is on this page or where to look next.
pub fn check_page(page: &MemberOfPage, group_id: &str) -> PageCheck {
    if page.value.iter().any(|g| g.id == group_id) {
        return PageCheck::Member;
    }
    match page.next_link.as_deref().filter(|l| !l.is_empty()) {
        Some(link) => PageCheck::Next(link.to_string()),
        None => PageCheck::NotMember,
    }
}

/// Authorization-code client for one Azure AD tenant.
#[derive(Clone)]
pub struct AzureAdClient {
    config: AzureAdConfig,
    client_secret: String,
    http: reqwest::Client,
}

impl AzureAdClient {
    pub fn new(config: AzureAdConfig, client_secret: String, http: reqwest::Client) -> Self {
        Self {
            config,
            client_secret,
            http,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.config.group_id
    }

    fn endpoint(&self, leaf: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", LOGIN_HOST, self.config.tenant_id, leaf)
    }

    /// URL the browser is sent to for sign-in.
    pub fn authorize_url(&self, state: &str) -> String {
        let query = crate::utils::build_query_string(&[
            ("client_id", self.config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("response_mode", "query"),
            ("scope", SCOPES),
            ("state", state),
        ]);
        format!("{}?{}", self.endpoint("authorize"), query)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("scope", SCOPES),
        ];
        let resp = self
            .http
            .post(self.endpoint("token"))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("token exchange returned {status}: {body}")));
        }
        resp.json::<TokenResponse>()
            .await
            .map_err(|e| Error::Auth(format!("failed to decode token response: {e}")))
    }

    async fn graph_get<T: serde::de::DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("graph request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::Auth(format!("graph request {url} returned {}", resp.status())));
        }
        resp.json::<T>()
            .await
            .map_err(|e| Error::Auth(format!("failed to decode graph response: {e}")))
    }

    /// Walks `/me/memberOf` until the configured group is found or the pages
    /// run out.
    pub async fn is_member(&self, token: &str) -> Result<bool> {
        let mut url = format!("{GRAPH_BASE}/me/memberOf");
        loop {
            let page: MemberOfPage = self.graph_get(&url, token).await?;
            tracing::debug!(groups = page.value.len(), "Fetched group membership page");
            match check_page(&page, &self.config.group_id) {
                PageCheck::Member => return Ok(true),
                PageCheck::NotMember => return Ok(false),
                PageCheck::Next(next) => url = next,
            }
        }
    }

    pub async fn display_name(&self, token: &str) -> Result<String> {
        let profile: Profile = self.graph_get(&format!("{GRAPH_BASE}/me"), token).await?;
        Ok(profile.display_name)
    }
}

/// Azure AD sign-out URL that returns the browser to `public_base_url`.
pub fn logout_url(public_base_url: &str) -> String {
    format!(
        "{}?post_logout_redirect_uri={}",
        LOGOUT_URL,
        urlencoding::encode(public_base_url)
    )
}
