//! Feedly channel — pages through the user's saved entries.
//!
//! The client authenticates with the OAuth access token stored in the token
//! directory (`access.token`), resolves the user id once via `/v3/profile`,
//! then walks `/v3/streams/contents` for the `global.saved` tag using the
//! continuation token Feedly hands back with each page.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::Stream;
use futures::stream;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::FeedError;
use crate::pipeline::types::{Entry, StreamContents};

/// Default Feedly API base URL.
pub const DEFAULT_FEEDLY_API_BASE: &str = "https://cloud.feedly.com";

/// Name of the access-token file inside the token directory.
pub const ACCESS_TOKEN_FILE: &str = "access.token";

/// Entries requested per page (Feedly's maximum).
const PAGE_SIZE: &str = "1000";

/// Source of saved-entry pages, keyed by an opaque continuation token.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page. `None` requests the first page.
    async fn fetch_page(&self, continuation: Option<&str>) -> Result<StreamContents, FeedError>;
}

/// Default token directory: `~/.config/feedly`.
pub fn default_token_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("feedly"))
}

/// Read the Feedly access token from `token_dir`.
pub fn read_access_token(token_dir: &Path) -> Result<SecretString, FeedError> {
    let path = token_dir.join(ACCESS_TOKEN_FILE);
    let token = std::fs::read_to_string(&path)
        .map_err(|e| FeedError::Auth(format!("cannot read {}: {e}", path.display())))?;
    let token = token.trim();
    if token.is_empty() {
        return Err(FeedError::Auth(format!("{} is empty", path.display())));
    }
    Ok(SecretString::from(token.to_string()))
}

#[derive(Debug, Deserialize)]
struct Profile {
    id: String,
}

/// HTTP client for the Feedly cloud API.
pub struct FeedlyClient {
    access_token: SecretString,
    base_url: String,
    saved_stream_id: String,
    client: reqwest::Client,
}

impl FeedlyClient {
    /// Connect using the token stored in `token_dir`.
    pub async fn from_token_dir(token_dir: &Path, base_url: &str) -> Result<Self, FeedError> {
        let access_token = read_access_token(token_dir)?;
        Self::connect(access_token, base_url).await
    }

    /// Resolve the user's profile and build a client for their saved stream.
    pub async fn connect(access_token: SecretString, base_url: &str) -> Result<Self, FeedError> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let resp = client
            .get(format!("{base_url}/v3/profile"))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        let profile: Profile = decode(resp, "/v3/profile").await?;
        debug!(user_id = %profile.id, "Resolved Feedly profile");

        Ok(Self {
            access_token,
            base_url,
            saved_stream_id: saved_stream_id(&profile.id),
            client,
        })
    }

    /// Stream id of the user's saved-for-later tag.
    pub fn saved_stream_id(&self) -> &str {
        &self.saved_stream_id
    }
}

/// Stream id of a user's saved-for-later tag.
pub fn saved_stream_id(user_id: &str) -> String {
    format!("user/{user_id}/tag/global.saved")
}

#[async_trait]
impl FeedSource for FeedlyClient {
    async fn fetch_page(&self, continuation: Option<&str>) -> Result<StreamContents, FeedError> {
        let mut query = vec![
            ("streamId", self.saved_stream_id.as_str()),
            ("count", PAGE_SIZE),
            ("ranked", "oldest"),
        ];
        if let Some(token) = continuation {
            query.push(("continuation", token));
        }

        let resp = self
            .client
            .get(format!("{}/v3/streams/contents", self.base_url))
            .bearer_auth(self.access_token.expose_secret())
            .query(&query)
            .send()
            .await?;
        decode(resp, "/v3/streams/contents").await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, FeedError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(FeedError::Auth(format!(
            "{endpoint} rejected the access token"
        )));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| FeedError::Decode(format!("{endpoint}: {e}")))
}

// ── Pagination ──────────────────────────────────────────────────────

enum Cursor {
    Start,
    Continue(String),
    Exhausted,
}

struct Pager<'a, S: ?Sized> {
    source: &'a S,
    buffered: VecDeque<Entry>,
    cursor: Cursor,
}

/// Flatten the paginated saved stream into entries, fetching lazily.
///
/// A page is only requested once the previous one has been consumed. The
/// stream ends after a page with no continuation token or no items. A fetch
/// error is yielded once and ends the stream.
pub fn saved_entries<S>(source: &S) -> impl Stream<Item = Result<Entry, FeedError>> + '_
where
    S: FeedSource + ?Sized,
{
    let pager = Pager {
        source,
        buffered: VecDeque::new(),
        cursor: Cursor::Start,
    };

    stream::unfold(pager, |mut pager| async move {
        loop {
            if let Some(entry) = pager.buffered.pop_front() {
                return Some((Ok(entry), pager));
            }

            let continuation = match std::mem::replace(&mut pager.cursor, Cursor::Exhausted) {
                Cursor::Exhausted => return None,
                Cursor::Start => None,
                Cursor::Continue(token) => Some(token),
            };

            debug!(continuation = ?continuation, "Fetching saved entries");
            let page = match pager.source.fetch_page(continuation.as_deref()).await {
                Ok(page) => page,
                Err(e) => return Some((Err(e), pager)),
            };
            debug!(count = page.items.len(), "Fetched saved entries");

            match page.continuation {
                Some(token) if !token.is_empty() && !page.items.is_empty() => {
                    pager.cursor = Cursor::Continue(token);
                }
                _ => debug!("No more saved entries to fetch"),
            }
            pager.buffered.extend(page.items);
        }
    })
}
