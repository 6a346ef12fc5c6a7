//! In-process fake of the hosting API, served by wiremock.
//!
//! A single catch-all mock routes every request into [`ForgeState`], so
//! repositories, branches, commits, files and pull requests persist across
//! calls the way they do on the real host.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use forge_api::AuthScheme;
use forgeflow::config::FlowConfig;

pub const LOGIN: &str = "alice";
pub const TOKEN: &str = "ghp_fake_token";
pub const INITIAL_MESSAGE: &str = "Initial commit";

#[derive(Debug, Default)]
struct FakeRepository {
    /// Branch name to head commit sha.
    branches: BTreeMap<String, String>,
    /// File path to (branch, blob sha).
    files: HashMap<String, (String, String)>,
    /// Pull request number to title.
    pulls: BTreeMap<u64, String>,
}

#[derive(Debug)]
pub struct ForgeState {
    base: String,
    name: Option<String>,
    bio: Option<String>,
    repositories: HashMap<String, FakeRepository>,
    /// Commit sha to message.
    commits: HashMap<String, String>,
    next_sha: u64,
    next_pull: u64,
    /// Ref listings that still answer empty before the refs show up.
    pending_ref_polls: u32,
    /// Status used for those listings: 200 with `[]`, or e.g. 409.
    pending_ref_status: u16,
    /// Commits the content endpoint writes instead of the requested message.
    message_override: Option<String>,
}

impl ForgeState {
    fn sha(&mut self) -> String {
        self.next_sha += 1;
        format!("{:040x}", self.next_sha)
    }

    fn repo_url(&self, repo: &str) -> String {
        format!("{}/repos/{LOGIN}/{repo}", self.base)
    }

    fn commit(&mut self, message: &str) -> String {
        let sha = self.sha();
        self.commits.insert(sha.clone(), message.to_string());
        sha
    }
}

/// Handle on a running fake host.
pub struct FakeForge {
    pub server: MockServer,
    state: Arc<Mutex<ForgeState>>,
}

#[derive(Clone)]
struct Router {
    state: Arc<Mutex<ForgeState>>,
}

impl FakeForge {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(ForgeState {
            base: server.uri(),
            name: None,
            bio: None,
            repositories: HashMap::new(),
            commits: HashMap::new(),
            next_sha: 0,
            next_pull: 0,
            pending_ref_polls: 0,
            pending_ref_status: 200,
            message_override: None,
        }));

        Mock::given(any())
            .respond_with(Router {
                state: Arc::clone(&state),
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn state(&self) -> MutexGuard<'_, ForgeState> {
        self.state.lock().unwrap()
    }

    pub fn set_profile(&self, name: Option<&str>, bio: Option<&str>) {
        let mut state = self.state();
        state.name = name.map(str::to_string);
        state.bio = bio.map(str::to_string);
    }

    /// Make the next `polls` head-ref listings answer `status` with no refs.
    pub fn delay_refs(&self, polls: u32, status: u16) {
        let mut state = self.state();
        state.pending_ref_polls = polls;
        state.pending_ref_status = status;
    }

    /// Record `message` for every file commit instead of the requested one.
    pub fn override_commit_message(&self, message: &str) {
        self.state().message_override = Some(message.to_string());
    }

    /// Add a branch whose head commit carries `message`.
    pub fn add_branch(&self, repo: &str, branch: &str, message: &str) {
        let mut state = self.state();
        let sha = state.commit(message);
        if let Some(r) = state.repositories.get_mut(repo) {
            r.branches.insert(branch.to_string(), sha);
        }
    }

    pub fn has_repository(&self, repo: &str) -> bool {
        self.state().repositories.contains_key(repo)
    }

    pub fn branch_names(&self, repo: &str) -> Vec<String> {
        self.state()
            .repositories
            .get(repo)
            .map(|r| r.branches.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn pull_titles(&self, repo: &str) -> Vec<String> {
        self.state()
            .repositories
            .get(repo)
            .map(|r| r.pulls.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Configuration document pointing at this fake with `resources_dir` as scratch area.
    pub fn config_yaml(&self, resources_dir: &Path) -> String {
        format!(
            "github_user: {LOGIN}\n\
             github_token: {TOKEN}\n\
             base_api_url: {}\n\
             resources_dir: {}\n\
             char_limit: \"10\"\n",
            self.uri(),
            resources_dir.display()
        )
    }

    pub fn config(&self, resources_dir: &Path) -> FlowConfig {
        let yaml = self.config_yaml(resources_dir);
        FlowConfig::from_yaml(&yaml, Path::new("config.yaml"), None).unwrap()
    }
}

fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

fn not_found() -> ResponseTemplate {
    json_response(404, json!({ "message": "Not Found" }))
}

fn authorized(request: &Request) -> bool {
    let Some(value) = request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let basic = format!("Basic {}", STANDARD.encode(format!("{LOGIN}:{TOKEN}")));
    let token = format!("token {TOKEN}");
    value == basic || value == token
}

impl Respond for Router {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request) {
            return json_response(401, json!({ "message": "Bad credentials" }));
        }
        let mut state = self.state.lock().unwrap();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let segments: Vec<&str> = request
            .url
            .path()
            .trim_start_matches('/')
            .split('/')
            .collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["users", login]) if *login == LOGIN => json_response(
                200,
                json!({ "login": LOGIN, "name": state.name, "bio": state.bio }),
            ),
            ("POST", ["user", "repos"]) => create_repository(&mut state, &body),
            ("GET", ["repos", LOGIN, repo]) => match state.repositories.get(*repo) {
                Some(_) => json_response(
                    200,
                    json!({ "name": repo, "url": state.repo_url(repo), "default_branch": "main" }),
                ),
                None => not_found(),
            },
            ("DELETE", ["repos", LOGIN, repo]) => match state.repositories.remove(*repo) {
                Some(_) => ResponseTemplate::new(204),
                None => not_found(),
            },
            ("GET", ["repos", LOGIN, repo, "git", "refs", "heads"]) => list_refs(&mut state, repo),
            ("POST", ["repos", LOGIN, repo, "git", "refs"]) => create_ref(&mut state, repo, &body),
            ("GET", ["repos", LOGIN, repo, "branches"]) => list_branches(&state, repo),
            ("GET", ["repos", LOGIN, _, "commits", sha]) => match state.commits.get(*sha) {
                Some(message) => {
                    json_response(200, json!({ "sha": sha, "commit": { "message": message } }))
                }
                None => not_found(),
            },
            ("PUT", ["repos", LOGIN, repo, "contents", path]) => {
                put_contents(&mut state, repo, path, &body)
            }
            ("GET", ["repos", LOGIN, repo, "contents", path]) => {
                let found = state
                    .repositories
                    .get(*repo)
                    .and_then(|r| r.files.get(*path))
                    .map(|(_, sha)| sha.clone());
                match found {
                    Some(sha) => json_response(200, content_json(&state, repo, path, &sha)),
                    None => not_found(),
                }
            }
            ("POST", ["repos", LOGIN, repo, "pulls"]) => create_pull(&mut state, repo, &body),
            ("GET", ["repos", LOGIN, repo, "pulls", number]) => {
                let Ok(number) = number.parse::<u64>() else {
                    return not_found();
                };
                match state.repositories.get(*repo).and_then(|r| r.pulls.get(&number)) {
                    Some(title) => json_response(200, json!({ "number": number, "title": title })),
                    None => not_found(),
                }
            }
            _ => not_found(),
        }
    }
}

fn create_repository(state: &mut ForgeState, body: &Value) -> ResponseTemplate {
    let Some(name) = body["name"].as_str().map(str::to_string) else {
        return json_response(422, json!({ "message": "name is missing" }));
    };
    if state.repositories.contains_key(&name) {
        return json_response(422, json!({ "message": "name already exists on this account" }));
    }

    let mut repo = FakeRepository::default();
    if body["auto_init"].as_bool().unwrap_or(false) {
        let sha = state.commit(INITIAL_MESSAGE);
        repo.branches.insert("main".to_string(), sha);
    }
    state.repositories.insert(name.clone(), repo);

    json_response(
        201,
        json!({ "name": name, "url": state.repo_url(&name), "default_branch": "main" }),
    )
}

fn list_refs(state: &mut ForgeState, repo: &str) -> ResponseTemplate {
    if !state.repositories.contains_key(repo) {
        return not_found();
    }
    if state.pending_ref_polls > 0 {
        state.pending_ref_polls -= 1;
        return match state.pending_ref_status {
            200 => json_response(200, json!([])),
            status => json_response(status, json!({ "message": "Git Repository is empty." })),
        };
    }

    let refs: Vec<Value> = state.repositories[repo]
        .branches
        .iter()
        .map(|(name, sha)| {
            json!({ "ref": format!("refs/heads/{name}"), "object": { "sha": sha, "type": "commit" } })
        })
        .collect();
    json_response(200, Value::Array(refs))
}

fn create_ref(state: &mut ForgeState, repo: &str, body: &Value) -> ResponseTemplate {
    let (Some(reference), Some(sha)) = (body["ref"].as_str(), body["sha"].as_str()) else {
        return json_response(422, json!({ "message": "ref and sha are required" }));
    };
    let Some(branch) = reference.strip_prefix("refs/heads/") else {
        return json_response(422, json!({ "message": "ref must start with refs/heads/" }));
    };
    if !state.commits.contains_key(sha) {
        return json_response(422, json!({ "message": "Object does not exist" }));
    }
    let Some(r) = state.repositories.get_mut(repo) else {
        return not_found();
    };
    if r.branches.contains_key(branch) {
        return json_response(422, json!({ "message": "Reference already exists" }));
    }
    r.branches.insert(branch.to_string(), sha.to_string());

    json_response(
        201,
        json!({ "ref": reference, "object": { "sha": sha, "type": "commit" } }),
    )
}

fn list_branches(state: &ForgeState, repo: &str) -> ResponseTemplate {
    let Some(r) = state.repositories.get(repo) else {
        return not_found();
    };
    let branches: Vec<Value> = r
        .branches
        .iter()
        .map(|(name, sha)| {
            json!({
                "name": name,
                "commit": { "sha": sha, "url": format!("{}/commits/{sha}", state.repo_url(repo)) },
            })
        })
        .collect();
    json_response(200, Value::Array(branches))
}

fn content_json(state: &ForgeState, repo: &str, path: &str, sha: &str) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap_or(path),
        "path": path,
        "sha": sha,
        "url": format!("{}/contents/{path}", state.repo_url(repo)),
    })
}

fn put_contents(state: &mut ForgeState, repo: &str, path: &str, body: &Value) -> ResponseTemplate {
    let (Some(message), Some(content), Some(branch)) = (
        body["message"].as_str(),
        body["content"].as_str(),
        body["branch"].as_str(),
    ) else {
        return json_response(422, json!({ "message": "message, content and branch are required" }));
    };
    if STANDARD.decode(content).is_err() {
        return json_response(422, json!({ "message": "content is not valid Base64" }));
    }
    let known_branch = state
        .repositories
        .get(repo)
        .map(|r| r.branches.contains_key(branch));
    match known_branch {
        None => return not_found(),
        Some(false) => return json_response(422, json!({ "message": "Branch not found" })),
        Some(true) => {}
    }

    let message = state
        .message_override
        .clone()
        .unwrap_or_else(|| message.to_string());
    let commit_sha = state.commit(&message);
    let blob_sha = state.sha();
    if let Some(r) = state.repositories.get_mut(repo) {
        r.branches.insert(branch.to_string(), commit_sha.clone());
        r.files
            .insert(path.to_string(), (branch.to_string(), blob_sha.clone()));
    }

    json_response(
        201,
        json!({
            "content": content_json(state, repo, path, &blob_sha),
            "commit": { "sha": commit_sha, "message": message },
        }),
    )
}

fn create_pull(state: &mut ForgeState, repo: &str, body: &Value) -> ResponseTemplate {
    let (Some(title), Some(head), Some(base)) = (
        body["title"].as_str(),
        body["head"].as_str(),
        body["base"].as_str(),
    ) else {
        return json_response(422, json!({ "message": "title, head and base are required" }));
    };
    let head_branch = head
        .strip_prefix(&format!("{LOGIN}:"))
        .unwrap_or(head)
        .to_string();
    let Some(r) = state.repositories.get_mut(repo) else {
        return not_found();
    };
    if !r.branches.contains_key(&head_branch) || !r.branches.contains_key(base) {
        return json_response(422, json!({ "message": "Validation Failed" }));
    }
    state.next_pull += 1;
    let number = state.next_pull;
    r.pulls.insert(number, title.to_string());

    json_response(201, json!({ "number": number, "title": title }))
}

/// Same configuration, but authenticating with a token header.
pub fn with_token_scheme(mut config: FlowConfig) -> FlowConfig {
    config.auth_scheme = AuthScheme::Token;
    config
}
