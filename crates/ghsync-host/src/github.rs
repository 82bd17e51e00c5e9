use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use ghsync_core::error::GhSyncError;
use ghsync_core::models::source::{
    split_full_name, OwnerKind, SourceRepoRef, SourceRepository, WikiDetection,
};

use crate::pagination::PageCursor;
use crate::transport::{ApiRequest, ApiResponse, Transport};

const PER_PAGE: u32 = 100;

/// Authenticated GitHub API handle. Built by [`GitHubClient::connect`].
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    api_url: String,
    token: String,
    wiki_detection: WikiDetection,
}

#[derive(Deserialize)]
struct GhRepo {
    id: u64,
    name: String,
    full_name: String,
    clone_url: String,
    ssh_url: String,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    has_pages: bool,
}

impl GhRepo {
    fn into_source(self, detection: WikiDetection) -> SourceRepository {
        let has_wiki = detection.has_wiki(self.has_wiki, self.has_pages);
        SourceRepository::new(
            self.id,
            self.name,
            self.full_name,
            self.clone_url,
            self.ssh_url,
            has_wiki,
        )
    }
}

impl GitHubClient {
    /// Check `token` against the API root; a non-2xx answer means the token
    /// was rejected.
    pub async fn connect(
        api_url: &url::Url,
        token: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GhSyncError> {
        let client = Self {
            transport,
            api_url: api_url.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
            wiki_detection: WikiDetection::default(),
        };

        let resp = client.send(client.request(ApiRequest::get(client.url("/")))).await?;
        if !resp.is_success() {
            return Err(GhSyncError::AuthFailed {
                service: "github".into(),
                message: format!("Invalid token (status {})", resp.status),
            });
        }
        tracing::debug!("authenticated against {}", client.api_url);
        Ok(client)
    }

    /// Change how listed repositories decide whether they have a wiki.
    pub fn with_wiki_detection(mut self, detection: WikiDetection) -> Self {
        self.wiki_detection = detection;
        self
    }

    /// Token the client authenticates with. Handed to GitLab for imports.
    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".into(), "application/vnd.github+json".into()),
            ("X-GitHub-Api-Version".into(), "2022-11-28".into()),
            ("Authorization".into(), format!("Bearer {}", self.token)),
        ]
    }

    fn request(&self, mut request: ApiRequest) -> ApiRequest {
        for (name, value) in self.auth_headers() {
            request = request.header(&name, value);
        }
        request
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GhSyncError> {
        tracing::debug!("{} {}", request.method, request.url);
        self.transport.send(request).await
    }

    /// All repositories of `owner`, across every page, in listing order.
    pub async fn list_repositories(
        &self,
        owner: &str,
        kind: OwnerKind,
    ) -> Result<Vec<SourceRepository>, GhSyncError> {
        let first = self.url(&format!(
            "/{}/{owner}/repos?per_page={PER_PAGE}",
            kind.api_segment()
        ));
        let mut cursor = PageCursor::new(first, self.auth_headers());
        let mut all = Vec::new();

        while let Some(page) = cursor
            .next_page::<GhRepo, _>(self.transport.as_ref(), |url, _| {
                GhSyncError::not_found(format!("URL: {url}"))
            })
            .await?
        {
            all.extend(page.into_iter().map(|r| r.into_source(self.wiki_detection)));
        }

        tracing::info!(
            "listed {} repositories for {kind} {owner} ({} pages)",
            all.len(),
            cursor.pages_fetched()
        );
        Ok(all)
    }

    /// Resolve a single `OWNER/REPO`.
    pub async fn get_repository(&self, full_name: &str) -> Result<SourceRepository, GhSyncError> {
        let (owner, name) = split_full_name(full_name)?;
        let url = self.url(&format!("/repos/{owner}/{name}"));
        let resp = self.send(self.request(ApiRequest::get(url.clone()))).await?;
        if !resp.is_success() {
            return Err(GhSyncError::not_found(format!(
                "GitHub repository {full_name} ({})",
                resp.status
            )));
        }
        let repo: GhRepo = resp.parse()?;
        Ok(repo.into_source(self.wiki_detection))
    }

    /// Turn a name-or-handle into a resolved repository.
    pub async fn resolve(&self, repo: SourceRepoRef) -> Result<SourceRepository, GhSyncError> {
        match repo {
            SourceRepoRef::Resolved(r) => Ok(r),
            SourceRepoRef::ByName(name) => self.get_repository(&name).await,
        }
    }

    /// Register a push webhook on `OWNER/REPO`. The answer is logged only.
    pub async fn add_webhook(&self, full_name: &str, hook_url: &str) -> Result<(), GhSyncError> {
        let (owner, name) = split_full_name(full_name)?;
        let body = json!({
            "name": "web",
            "active": true,
            "events": ["push"],
            "config": {
                "url": hook_url,
                "content_type": "json",
            },
        });
        let request = self.request(
            ApiRequest::post(self.url(&format!("/repos/{owner}/{name}/hooks"))).json(body),
        );
        let resp = self.send(request).await?;
        tracing::debug!("webhook registration on {full_name} answered {}", resp.status);
        Ok(())
    }
}
