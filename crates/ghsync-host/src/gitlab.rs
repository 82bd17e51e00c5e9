use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use ghsync_core::error::GhSyncError;
use ghsync_core::models::dest::{DestGroup, DestProject, GroupRef, ProjectRef};
use ghsync_core::models::import::{ImportOutcome, ImportStatus};
use ghsync_core::models::mirror::{normalize_mirror_url, MirrorChange, MirrorConfig};
use ghsync_core::models::source::SourceRepoRef;

use crate::github::GitHubClient;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Authenticated GitLab (API v4) handle. Built by [`GitLabClient::connect`].
pub struct GitLabClient {
    transport: Arc<dyn Transport>,
    api_url: String,
    token: String,
}

#[derive(Deserialize)]
struct GlImport {
    import_status: ImportStatus,
}

#[derive(Deserialize)]
struct GlPullMirror {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    enabled: bool,
}

/// Percent-encode a path segment (`/` included) the way GitLab expects ids.
fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

fn api_error(resp: &ApiResponse) -> GhSyncError {
    GhSyncError::Api {
        status: resp.status,
        message: resp.body.clone(),
    }
}

impl GitLabClient {
    /// Check `token` with `GET /projects`. 401 means the token was rejected;
    /// any other failure is reported as a connection problem.
    pub async fn connect(
        base_url: &url::Url,
        token: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GhSyncError> {
        let client = Self {
            transport,
            api_url: format!("{}/api/v4", base_url.as_str().trim_end_matches('/')),
            token: token.to_string(),
        };

        let resp = client.send(ApiRequest::get(client.url("/projects"))).await?;
        match resp.status {
            s if (200..300).contains(&s) => {
                tracing::debug!("authenticated against {}", client.api_url);
                Ok(client)
            }
            401 => Err(GhSyncError::AuthFailed {
                service: "gitlab".into(),
                message: "Invalid token".into(),
            }),
            other => Err(GhSyncError::connection(format!(
                "unexpected status {other} from {}",
                client.api_url
            ))),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GhSyncError> {
        tracing::debug!("{} {}", request.method, request.url);
        let request = request.header("PRIVATE-TOKEN", self.token.clone());
        self.transport.send(request).await
    }

    // ── Groups ──

    /// Exact, case-sensitive lookup of a group by name.
    pub async fn find_group(&self, name: &str) -> Result<Option<DestGroup>, GhSyncError> {
        let resp = self
            .send(ApiRequest::get(self.url(&format!("/groups/{}", encode(name)))))
            .await?;
        if !resp.is_success() {
            return Ok(None);
        }
        let group: DestGroup = resp.parse()?;
        if group.name != name {
            tracing::debug!("group lookup for '{name}' returned '{}'", group.name);
            return Ok(None);
        }
        Ok(Some(group))
    }

    /// Return the group called `name`, creating it if it does not exist.
    pub async fn create_group(&self, name: &str) -> Result<DestGroup, GhSyncError> {
        if let Some(group) = self.find_group(name).await? {
            return Ok(group);
        }

        let body = json!({ "name": name, "path": name });
        let resp = self
            .send(ApiRequest::post(self.url("/groups")).json(body))
            .await?;
        if resp.status != 201 {
            return Err(api_error(&resp));
        }
        let group: DestGroup = resp.parse()?;
        tracing::info!("created group {} (id {})", group.name, group.id);
        Ok(group)
    }

    async fn ensure_group(&self, group: &GroupRef) -> Result<DestGroup, GhSyncError> {
        match group {
            GroupRef::Resolved(g) => Ok(g.clone()),
            GroupRef::ByName(name) => self.create_group(name).await,
        }
    }

    // ── Projects ──

    /// Look a project up by `GROUP/NAME`. Without a group there is nothing
    /// to resolve a bare name against, so the answer is `None`.
    pub async fn find_project(
        &self,
        name: &str,
        group: Option<&GroupRef>,
    ) -> Result<Option<DestProject>, GhSyncError> {
        let Some(group) = group else {
            tracing::debug!("project '{name}' looked up without a group");
            return Ok(None);
        };

        let path = format!("{}/{name}", group.namespace());
        // A renamed project answers with a redirect, which must not count as a hit.
        let request = ApiRequest::get(self.url(&format!("/projects/{}", encode(&path)))).no_redirects();
        let resp = self.send(request).await?;
        if !resp.is_success() {
            return Ok(None);
        }
        Ok(Some(resp.parse()?))
    }

    /// Resolve a path-or-handle to a project that must exist.
    pub async fn resolve_project(&self, project: &ProjectRef) -> Result<DestProject, GhSyncError> {
        match project {
            ProjectRef::Resolved(p) => Ok(p.clone()),
            ProjectRef::ByPath(path) => {
                let (group, name) = ProjectRef::split_path(path)?;
                self.find_project(name, Some(&GroupRef::from(group)))
                    .await?
                    .ok_or_else(|| GhSyncError::not_found(format!("GitLab project {path}")))
            }
        }
    }

    /// Return project `name` under `group`, creating the group and the
    /// project as needed. `wiki_enabled` only sets the flag; see
    /// [`GitLabClient::touch_project_wiki`].
    pub async fn create_project(
        &self,
        name: &str,
        group: &GroupRef,
        wiki_enabled: bool,
    ) -> Result<DestProject, GhSyncError> {
        let group = self.ensure_group(group).await?;
        let namespace_id = group.id;
        if let Some(project) = self.find_project(name, Some(&GroupRef::Resolved(group))).await? {
            return Ok(project);
        }

        let body = json!({
            "name": name,
            "namespace_id": namespace_id,
            "wiki_enabled": wiki_enabled,
        });
        let resp = self
            .send(ApiRequest::post(self.url("/projects")).json(body))
            .await?;
        if resp.status != 201 {
            return Err(api_error(&resp));
        }
        let project: DestProject = resp.parse()?;
        tracing::info!("created project {} (id {})", project.path_with_namespace, project.id);
        Ok(project)
    }

    /// Request the wiki page so GitLab provisions the wiki repository.
    pub async fn touch_project_wiki(&self, project: &DestProject) -> Result<(), GhSyncError> {
        let Some(wiki_url) = project.wiki_url() else {
            tracing::debug!("{} has wikis disabled", project.path_with_namespace);
            return Ok(());
        };
        let resp = self.send(ApiRequest::get(wiki_url)).await?;
        tracing::debug!("wiki touch on {} answered {}", project.path_with_namespace, resp.status);
        Ok(())
    }

    // ── Import ──

    /// Start a GitLab import of a GitHub repository into `group`.
    ///
    /// Returns the existing project untouched if one is already there.
    /// Does not wait for the import to complete.
    pub async fn import_from_source(
        &self,
        source: &GitHubClient,
        repo: SourceRepoRef,
        group: &GroupRef,
    ) -> Result<ImportOutcome, GhSyncError> {
        let repo = source.resolve(repo).await?;
        let group = self.ensure_group(group).await?;
        let namespace = group.namespace_path().to_string();
        let group = GroupRef::Resolved(group);

        if let Some(project) = self.find_project(&repo.name, Some(&group)).await? {
            tracing::info!("{} already present as {}", repo.full_name, project.path_with_namespace);
            return Ok(ImportOutcome::AlreadyExists(project));
        }

        let body = json!({
            "personal_access_token": source.token(),
            "repo_id": repo.id,
            "target_namespace": namespace,
            "new_name": repo.name,
        });
        let resp = self
            .send(ApiRequest::post(self.url("/import/github")).json(body))
            .await?;
        if !matches!(resp.status, 200 | 201) {
            return Err(api_error(&resp));
        }

        let project = self
            .find_project(&repo.name, Some(&group))
            .await?
            .ok_or_else(|| {
                GhSyncError::not_found(format!("GitLab project {namespace}/{} after import", repo.name))
            })?;
        tracing::info!("import of {} into {} started", repo.full_name, project.path_with_namespace);
        Ok(ImportOutcome::Started(project))
    }

    /// Current import status of `project`.
    ///
    /// `None` means the status endpoint itself failed; that is logged, not
    /// raised, since callers poll this repeatedly.
    pub async fn import_status(
        &self,
        project: &ProjectRef,
    ) -> Result<Option<ImportStatus>, GhSyncError> {
        let project = self.resolve_project(project).await?;
        let url = self.url(&format!("/projects/{}/import", project.id));

        let resp = match self.send(ApiRequest::get(url)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("import status of {} unavailable: {e}", project.path_with_namespace);
                return Ok(None);
            }
        };
        if !resp.is_success() {
            tracing::warn!(
                "import status of {} unavailable (status {})",
                project.path_with_namespace,
                resp.status
            );
            return Ok(None);
        }
        match resp.parse::<GlImport>() {
            Ok(import) => Ok(Some(import.import_status)),
            Err(e) => {
                tracing::warn!("import status of {}: {e}", project.path_with_namespace);
                Ok(None)
            }
        }
    }

    // ── Pull mirrors ──

    /// Current pull-mirror configuration. 200 means configured, 400 means
    /// not configured, anything else is an inconsistent state.
    pub async fn get_pull_mirror(
        &self,
        project: &DestProject,
    ) -> Result<Option<MirrorConfig>, GhSyncError> {
        let url = self.url(&format!("/projects/{}/mirror/pull", project.id));
        let resp = self.send(ApiRequest::get(url)).await?;
        match resp.status {
            200 => {
                let mirror: GlPullMirror = resp.parse()?;
                Ok(Some(MirrorConfig {
                    source_url: mirror.url.unwrap_or_default(),
                    project_id: project.id,
                    enabled: mirror.enabled,
                }))
            }
            400 => Ok(None),
            status => Err(GhSyncError::MirrorState {
                project_id: project.id,
                status,
            }),
        }
    }

    /// Make `project` pull-mirror `source_url`. No write is issued when the
    /// mirror already points there.
    ///
    /// Read-then-write without locking: a concurrent change between the two
    /// calls is not detected.
    pub async fn set_pull_mirror(
        &self,
        project: &ProjectRef,
        source_url: &str,
    ) -> Result<MirrorChange, GhSyncError> {
        let project = self.resolve_project(project).await?;
        let source_url = normalize_mirror_url(source_url);

        if let Some(current) = self.get_pull_mirror(&project).await? {
            if current.points_at(&source_url) {
                tracing::info!("{} already mirrors {source_url}", project.path_with_namespace);
                return Ok(MirrorChange::Unchanged);
            }
        }

        let body = json!({
            "enabled": true,
            "url": source_url,
            "mirror_trigger_builds": false,
            "only_mirror_protected_branches": false,
            "mirror_overwrites_diverged_branches": true,
        });
        let url = self.url(&format!("/projects/{}/mirror/pull", project.id));
        let resp = self.send(ApiRequest::put(url).json(body)).await?;
        if !resp.is_success() {
            return Err(api_error(&resp));
        }
        tracing::info!("{} now mirrors {source_url}", project.path_with_namespace);
        Ok(MirrorChange::Configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use crate::transport::Method;

    const BASE: &str = "https://gitlab.test";
    const API: &str = "https://gitlab.test/api/v4";
    const GH_API: &str = "https://api.github.test";

    fn group_json() -> serde_json::Value {
        json!({ "id": 5, "name": "NOAA-GFDL", "path": "NOAA-GFDL", "full_path": "NOAA-GFDL" })
    }

    fn project_json(id: u64, name: &str, wiki: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "path": name,
            "path_with_namespace": format!("NOAA-GFDL/{name}"),
            "web_url": format!("{BASE}/NOAA-GFDL/{name}"),
            "wiki_enabled": wiki,
        })
    }

    fn group_url() -> String {
        format!("{API}/groups/NOAA-GFDL")
    }

    fn project_url(name: &str) -> String {
        format!("{API}/projects/NOAA-GFDL%2F{name}")
    }

    async fn connected(t: Arc<MemoryTransport>) -> GitLabClient {
        t.on(Method::Get, &format!("{API}/projects"), ApiResponse::json(200, json!([])));
        let base = url::Url::parse(BASE).unwrap();
        GitLabClient::connect(&base, "glpat-test", t).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_statuses() {
        let base = url::Url::parse(BASE).unwrap();

        let t = Arc::new(MemoryTransport::new());
        t.on(Method::Get, &format!("{API}/projects"), ApiResponse::new(401, ""));
        let err = GitLabClient::connect(&base, "bad", t).await.err().unwrap();
        assert!(matches!(err, GhSyncError::AuthFailed { .. }));

        let t = Arc::new(MemoryTransport::new());
        t.on(Method::Get, &format!("{API}/projects"), ApiResponse::new(502, ""));
        let err = GitLabClient::connect(&base, "tok", t).await.err().unwrap();
        assert!(matches!(err, GhSyncError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_connect_unreachable_host() {
        let base = url::Url::parse(BASE).unwrap();
        let t = Arc::new(MemoryTransport::new());
        t.fail(Method::Get, &format!("{API}/projects"), "dns error: no such host");
        let err = GitLabClient::connect(&base, "tok", t).await.err().unwrap();
        assert!(matches!(err, GhSyncError::Connection { .. }));
        assert!(err.to_string().contains("no such host"));
    }

    #[tokio::test]
    async fn test_token_header_is_sent() {
        let t = Arc::new(MemoryTransport::new());
        connected(t.clone()).await;
        let requests = t.requests();
        assert!(requests[0]
            .headers
            .iter()
            .any(|(k, v)| k == "PRIVATE-TOKEN" && v == "glpat-test"));
    }

    #[tokio::test]
    async fn test_find_group() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));

        let first = gl.find_group("NOAA-GFDL").await.unwrap();
        let second = gl.find_group("NOAA-GFDL").await.unwrap();
        assert_eq!(first, second);
        let group = first.unwrap();
        assert_eq!(group.id, 5);
        assert_eq!(group.path, "NOAA-GFDL");

        assert!(gl.find_group("no_group").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_group_requires_exact_name() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(
            Method::Get,
            &format!("{API}/groups/noaa-gfdl"),
            ApiResponse::json(200, group_json()),
        );
        assert!(gl.find_group("noaa-gfdl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_group_is_idempotent() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &group_url(), ApiResponse::new(404, ""))
            .on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(Method::Post, &format!("{API}/groups"), ApiResponse::json(201, group_json()));

        let a = gl.create_group("NOAA-GFDL").await.unwrap();
        let b = gl.create_group("NOAA-GFDL").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(t.count(Method::Post, &format!("{API}/groups")), 1);
    }

    #[tokio::test]
    async fn test_find_project_without_group() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let before = t.requests().len();
        assert!(gl.find_project("FMS", None).await.unwrap().is_none());
        assert_eq!(t.requests().len(), before);
    }

    #[tokio::test]
    async fn test_find_project_by_name_or_handle() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(Method::Get, &project_url("FMS"), ApiResponse::json(200, project_json(12, "FMS", true)));

        let by_name = gl
            .find_project("FMS", Some(&GroupRef::from("NOAA-GFDL")))
            .await
            .unwrap()
            .unwrap();
        let group = gl.find_group("NOAA-GFDL").await.unwrap().unwrap();
        let by_handle = gl
            .find_project("FMS", Some(&GroupRef::from(group)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name, by_handle);
        assert_eq!(by_name.id, 12);
        assert!(by_name.wiki_url().is_some());

        let lookup = t
            .requests()
            .into_iter()
            .find(|r| r.url == project_url("FMS"))
            .unwrap();
        assert!(!lookup.follow_redirects);
    }

    #[tokio::test]
    async fn test_find_project_redirect_is_a_miss() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(
            Method::Get,
            &project_url("Old"),
            ApiResponse::new(301, "").with_header("Location", format!("{API}/projects/99")),
        );
        let found = gl
            .find_project("Old", Some(&GroupRef::from("NOAA-GFDL")))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_project_is_idempotent() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(Method::Get, &project_url("test_project"), ApiResponse::new(404, ""))
            .on(
                Method::Get,
                &project_url("test_project"),
                ApiResponse::json(200, project_json(40, "test_project", true)),
            );
        t.on(
            Method::Post,
            &format!("{API}/projects"),
            ApiResponse::json(201, project_json(40, "test_project", true)),
        );

        let group = GroupRef::from("NOAA-GFDL");
        let a = gl.create_project("test_project", &group, true).await.unwrap();
        let b = gl.create_project("test_project", &group, true).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(t.count(Method::Post, &format!("{API}/projects")), 1);

        let post = t
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .unwrap();
        let body = post.body.unwrap();
        assert_eq!(body["namespace_id"], 5);
        assert_eq!(body["wiki_enabled"], true);
    }

    #[tokio::test]
    async fn test_create_project_creates_missing_group() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let new_group = json!({ "id": 77, "name": "new_group", "path": "new_group" });
        t.on(Method::Post, &format!("{API}/groups"), ApiResponse::json(201, new_group));
        t.on(
            Method::Post,
            &format!("{API}/projects"),
            ApiResponse::json(201, project_json(41, "test_project3", false)),
        );

        let project = gl
            .create_project("test_project3", &GroupRef::from("new_group"), false)
            .await
            .unwrap();
        assert_eq!(project.id, 41);
        assert!(project.wiki_url().is_none());
        let post = t
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post && r.url.ends_with("/projects"))
            .unwrap();
        assert_eq!(post.body.unwrap()["namespace_id"], 77);
    }

    #[tokio::test]
    async fn test_create_project_failure_is_raised() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(
            Method::Post,
            &format!("{API}/projects"),
            ApiResponse::json(400, json!({ "message": "has already been taken" })),
        );
        let err = gl
            .create_project("taken", &GroupRef::from("NOAA-GFDL"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, GhSyncError::Api { status: 400, .. }));
    }

    async fn github(t: Arc<MemoryTransport>) -> GitHubClient {
        t.on(Method::Get, &format!("{GH_API}/"), ApiResponse::json(200, json!({})));
        let api = url::Url::parse(GH_API).unwrap();
        GitHubClient::connect(&api, "ghp_source", t).await.unwrap()
    }

    #[tokio::test]
    async fn test_import_from_source() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let gh = github(t.clone()).await;

        t.on(
            Method::Get,
            &format!("{GH_API}/repos/NOAA-GFDL/FMS"),
            ApiResponse::json(
                200,
                json!({
                    "id": 1001,
                    "name": "FMS",
                    "full_name": "NOAA-GFDL/FMS",
                    "clone_url": "https://github.com/NOAA-GFDL/FMS.git",
                    "ssh_url": "git@github.com:NOAA-GFDL/FMS.git",
                }),
            ),
        );
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(Method::Get, &project_url("FMS"), ApiResponse::new(404, ""))
            .on(Method::Get, &project_url("FMS"), ApiResponse::json(200, project_json(12, "FMS", false)));
        t.on(
            Method::Post,
            &format!("{API}/import/github"),
            ApiResponse::json(201, json!({ "id": 12, "name": "FMS" })),
        );

        let group = GroupRef::from("NOAA-GFDL");
        let first = gl
            .import_from_source(&gh, SourceRepoRef::from("NOAA-GFDL/FMS"), &group)
            .await
            .unwrap();
        assert!(matches!(first, ImportOutcome::Started(ref p) if p.id == 12));

        let second = gl
            .import_from_source(&gh, SourceRepoRef::from("NOAA-GFDL/FMS"), &group)
            .await
            .unwrap();
        assert!(matches!(second, ImportOutcome::AlreadyExists(ref p) if p.id == 12));
        assert_eq!(t.count(Method::Post, &format!("{API}/import/github")), 1);

        let import = t
            .requests()
            .into_iter()
            .find(|r| r.url.ends_with("/import/github"))
            .unwrap();
        let body = import.body.unwrap();
        assert_eq!(body["personal_access_token"], "ghp_source");
        assert_eq!(body["repo_id"], 1001);
        assert_eq!(body["target_namespace"], "NOAA-GFDL");
    }

    #[tokio::test]
    async fn test_import_rejected() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let gh = github(t.clone()).await;
        let repo = ghsync_core::models::source::SourceRepository::new(
            9,
            "MOM6".into(),
            "NOAA-GFDL/MOM6".into(),
            "https://github.com/NOAA-GFDL/MOM6.git".into(),
            "git@github.com:NOAA-GFDL/MOM6.git".into(),
            false,
        );
        t.on(Method::Get, &group_url(), ApiResponse::json(200, group_json()));
        t.on(
            Method::Post,
            &format!("{API}/import/github"),
            ApiResponse::json(422, json!({ "error": "Access denied" })),
        );
        let err = gl
            .import_from_source(&gh, SourceRepoRef::from(repo), &GroupRef::from("NOAA-GFDL"))
            .await
            .unwrap_err();
        assert!(matches!(err, GhSyncError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_import_status_path_and_handle_agree() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &project_url("FMS"), ApiResponse::json(200, project_json(12, "FMS", false)));
        t.on(
            Method::Get,
            &format!("{API}/projects/12/import"),
            ApiResponse::json(200, json!({ "id": 12, "import_status": "finished" })),
        );

        let by_path = gl.import_status(&ProjectRef::from("NOAA-GFDL/FMS")).await.unwrap();
        let project = gl
            .find_project("FMS", Some(&GroupRef::from("NOAA-GFDL")))
            .await
            .unwrap()
            .unwrap();
        let by_handle = gl.import_status(&ProjectRef::from(project)).await.unwrap();
        assert_eq!(by_path, Some(ImportStatus::Finished));
        assert_eq!(by_path, by_handle);
    }

    #[tokio::test]
    async fn test_import_status_soft_failure() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &project_url("FMS"), ApiResponse::json(200, project_json(12, "FMS", false)));
        t.on(Method::Get, &format!("{API}/projects/12/import"), ApiResponse::new(500, ""));
        let status = gl.import_status(&ProjectRef::from("NOAA-GFDL/FMS")).await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn test_import_status_dropped_connection_is_soft() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let status_url = format!("{API}/projects/12/import");
        t.fail(Method::Get, &status_url, "connection reset by peer")
            .on(Method::Get, &status_url, ApiResponse::json(200, json!({ "import_status": "started" })));

        let project = ProjectRef::Resolved(serde_json::from_value(project_json(12, "FMS", false)).unwrap());
        assert_eq!(gl.import_status(&project).await.unwrap(), None);
        assert_eq!(
            gl.import_status(&project).await.unwrap(),
            Some(ImportStatus::Started)
        );
        assert_eq!(t.count(Method::Get, &status_url), 2);
    }

    #[tokio::test]
    async fn test_import_status_bad_path() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t).await;
        let err = gl.import_status(&ProjectRef::from("FMS")).await.unwrap_err();
        assert!(matches!(err, GhSyncError::InvalidProjectPath { .. }));
        let err = gl
            .import_status(&ProjectRef::from("a/b/c"))
            .await
            .unwrap_err();
        assert!(matches!(err, GhSyncError::InvalidProjectPath { .. }));
        let err = gl
            .import_status(&ProjectRef::from("NOAA-GFDL/ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, GhSyncError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_pull_mirror_writes_once() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let mirror_url = format!("{API}/projects/12/mirror/pull");
        t.on(Method::Get, &mirror_url, ApiResponse::json(400, json!({ "message": "not configured" })))
            .on(
                Method::Get,
                &mirror_url,
                ApiResponse::json(
                    200,
                    json!({ "url": "https://github.com/NOAA-GFDL/FMS.git", "enabled": true }),
                ),
            );
        t.on(Method::Put, &mirror_url, ApiResponse::json(200, json!({})));

        let project = ProjectRef::from(serde_json::from_value::<DestProject>(project_json(12, "FMS", false)).unwrap());
        let first = gl
            .set_pull_mirror(&project, "https://github.com/NOAA-GFDL/FMS")
            .await
            .unwrap();
        let second = gl
            .set_pull_mirror(&project, "https://github.com/NOAA-GFDL/FMS")
            .await
            .unwrap();
        assert_eq!(first, MirrorChange::Configured);
        assert_eq!(second, MirrorChange::Unchanged);
        assert_eq!(t.count(Method::Put, &mirror_url), 1);

        let put = t
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Put)
            .unwrap();
        assert_eq!(put.body.unwrap()["url"], "https://github.com/NOAA-GFDL/FMS.git");
    }

    #[tokio::test]
    async fn test_set_pull_mirror_repoints() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        let mirror_url = format!("{API}/projects/12/mirror/pull");
        t.on(
            Method::Get,
            &mirror_url,
            ApiResponse::json(200, json!({ "url": "https://github.com/old/FMS.git", "enabled": true })),
        );
        t.on(Method::Put, &mirror_url, ApiResponse::json(200, json!({})));
        t.on(Method::Get, &project_url("FMS"), ApiResponse::json(200, project_json(12, "FMS", false)));

        let change = gl
            .set_pull_mirror(&ProjectRef::from("NOAA-GFDL/FMS"), "https://github.com/NOAA-GFDL/FMS.git")
            .await
            .unwrap();
        assert_eq!(change, MirrorChange::Configured);
    }

    #[tokio::test]
    async fn test_mirror_lookup_inconsistent_state() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;
        t.on(Method::Get, &format!("{API}/projects/12/mirror/pull"), ApiResponse::new(500, ""));
        let project = ProjectRef::from(serde_json::from_value::<DestProject>(project_json(12, "FMS", false)).unwrap());
        let err = gl
            .set_pull_mirror(&project, "https://github.com/NOAA-GFDL/FMS")
            .await
            .unwrap_err();
        assert!(matches!(err, GhSyncError::MirrorState { project_id: 12, status: 500 }));
        assert_eq!(t.count_method(Method::Put), 0);
    }

    #[tokio::test]
    async fn test_touch_project_wiki() {
        let t = Arc::new(MemoryTransport::new());
        let gl = connected(t.clone()).await;

        let with_wiki: DestProject = serde_json::from_value(project_json(12, "FMS", true)).unwrap();
        gl.touch_project_wiki(&with_wiki).await.unwrap();
        assert_eq!(t.count(Method::Get, &format!("{BASE}/NOAA-GFDL/FMS/wikis/home")), 1);

        let before = t.requests().len();
        let without: DestProject = serde_json::from_value(project_json(13, "AM4", false)).unwrap();
        gl.touch_project_wiki(&without).await.unwrap();
        assert_eq!(t.requests().len(), before);
    }
}
