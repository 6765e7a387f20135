//! External collaborators
//!
//! The viewer never talks to a concrete backend. Persistence, blob storage,
//! identity and comments are reached through these traits, injected when a
//! session is built. Implementations report failures as
//! [`Error::Collaborator`](jewelviz_core::Error::Collaborator).

pub mod memory;

use jewelviz_core::Result;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Active,
    Completed,
    InReview,
    Approved,
    Revision,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::InReview => "in_review",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Revision => "revision",
        })
    }
}

/// Fields supplied when creating a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub category: String,
    pub client_id: Option<String>,
    /// Email of the designer the project is assigned to
    pub assigned_to: Option<String>,
    pub delivery_date: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub client_id: Option<String>,
    pub assigned_to: Option<String>,
    pub status: ProjectStatus,
    pub delivery_date: Option<String>,
    pub remarks: Option<String>,
    /// Email of the owner
    pub created_by: String,
}

/// Fields supplied when recording a file set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileSet {
    pub project_id: String,
    pub design_image_url: Option<String>,
    pub stl_file_url: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSetRecord {
    pub id: String,
    pub project_id: String,
    pub design_image_url: Option<String>,
    pub stl_file_url: Option<String>,
    pub status: ProjectStatus,
    pub comments: Option<String>,
}

/// Which projects to list for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    CreatedBy(String),
    AssignedTo(String),
    /// Created by or assigned to
    Involving(String),
}

impl OwnerFilter {
    pub fn matches(&self, project: &ProjectRecord) -> bool {
        let assigned = |email: &str| project.assigned_to.as_deref() == Some(email);
        match self {
            OwnerFilter::CreatedBy(email) => project.created_by == *email,
            OwnerFilter::AssignedTo(email) => assigned(email),
            OwnerFilter::Involving(email) => project.created_by == *email || assigned(email),
        }
    }
}

/// Project and file-set persistence
pub trait ProjectStore: Send + Sync {
    fn create_project(&self, project: NewProject, owner_email: &str) -> Result<ProjectRecord>;
    fn list_projects(&self, filter: &OwnerFilter) -> Result<Vec<ProjectRecord>>;
    fn update_project_status(&self, project_id: &str, status: ProjectStatus) -> Result<ProjectRecord>;
    fn create_file_set(&self, file_set: NewFileSet) -> Result<FileSetRecord>;
    fn list_file_sets(&self, project_id: &str) -> Result<Vec<FileSetRecord>>;
}

/// Progress of an upload in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.sent as f32 * 100.0 / self.total as f32
        }
    }
}

/// Blob storage
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, reporting progress, and return a URL
    fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<String>;

    fn url(&self, key: &str) -> Result<String>;
}

/// Authentication state
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
    fn sign_out(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Monotonic id, doubles as the read cursor
    pub id: u64,
    pub file_set_id: String,
    pub author: String,
    pub body: String,
    pub read: bool,
}

/// Comment and notification feed
pub trait CommentFeed: Send + Sync {
    /// Comments on a file set with ids greater than `cursor`
    fn read_since(&self, file_set_id: &str, cursor: u64) -> Result<Vec<Comment>>;
    fn append(&self, file_set_id: &str, author: &str, body: &str) -> Result<Comment>;
    fn mark_read(&self, comment_id: u64) -> Result<()>;
}

/// The full set of collaborators a session needs
#[derive(Clone)]
pub struct Collaborators {
    pub projects: Arc<dyn ProjectStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub comments: Arc<dyn CommentFeed>,
}

impl Collaborators {
    /// Collaborators backed by process memory
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(memory::MemoryProjectStore::default()),
            blobs: Arc::new(memory::MemoryBlobStore::default()),
            identity: Arc::new(memory::MemoryIdentity::default()),
            comments: Arc::new(memory::MemoryCommentFeed::default()),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Storage key for an uploaded file: `projects/<user>/<millis>-<random>.<ext>`
pub fn storage_key<R: Rng>(user_id: &str, file_name: &str, rng: &mut R) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(11)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    let ext = jewelviz_io::media::extension(file_name).unwrap_or_else(|| "bin".to_string());
    format!("projects/{}/{}-{}.{}", user_id, millis, suffix, ext)
}
