//! In-memory collaborators for tests and demos

use super::{
    BlobStore, Comment, CommentFeed, FileSetRecord, IdentityProvider, NewFileSet, NewProject,
    OwnerFilter, ProjectRecord, ProjectStatus, ProjectStore, UploadProgress, UserIdentity,
};
use jewelviz_core::{Error, Result};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};

/// Chunk size used to report upload progress
pub const UPLOAD_CHUNK: usize = 64 * 1024;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Collaborator("in-memory store poisoned".to_string()))
}

#[derive(Debug, Default)]
struct ProjectTables {
    next_id: u64,
    projects: Vec<ProjectRecord>,
    file_sets: Vec<FileSetRecord>,
}

impl ProjectTables {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    tables: Mutex<ProjectTables>,
}

impl ProjectStore for MemoryProjectStore {
    fn create_project(&self, project: NewProject, owner_email: &str) -> Result<ProjectRecord> {
        let mut tables = lock(&self.tables)?;
        let record = ProjectRecord {
            id: tables.mint("project"),
            name: project.name,
            description: project.description,
            category: project.category,
            client_id: project.client_id,
            assigned_to: project.assigned_to,
            status: ProjectStatus::Pending,
            delivery_date: project.delivery_date,
            remarks: project.remarks,
            created_by: owner_email.to_string(),
        };
        tables.projects.push(record.clone());
        Ok(record)
    }

    fn list_projects(&self, filter: &OwnerFilter) -> Result<Vec<ProjectRecord>> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    fn update_project_status(&self, project_id: &str, status: ProjectStatus) -> Result<ProjectRecord> {
        let mut tables = lock(&self.tables)?;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| Error::Collaborator(format!("no project {}", project_id)))?;
        project.status = status;
        Ok(project.clone())
    }

    fn create_file_set(&self, file_set: NewFileSet) -> Result<FileSetRecord> {
        let mut tables = lock(&self.tables)?;
        if !tables.projects.iter().any(|p| p.id == file_set.project_id) {
            return Err(Error::Collaborator(format!("no project {}", file_set.project_id)));
        }
        let record = FileSetRecord {
            id: tables.mint("fileset"),
            project_id: file_set.project_id,
            design_image_url: file_set.design_image_url,
            stl_file_url: file_set.stl_file_url,
            status: ProjectStatus::Pending,
            comments: file_set.comments,
        };
        tables.file_sets.push(record.clone());
        Ok(record)
    }

    fn list_file_sets(&self, project_id: &str) -> Result<Vec<FileSetRecord>> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .file_sets
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (String, Vec<u8>)>>,
    offline: AtomicBool,
}

impl MemoryBlobStore {
    /// Make every following upload fail, as if the network were down
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Stored bytes and content type for a key
    pub fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        lock(&self.blobs).ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.blobs).map(|b| b.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<String> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(Error::Collaborator("blob storage unreachable".to_string()));
        }

        let total = bytes.len() as u64;
        let mut sent = 0u64;
        for chunk in bytes.chunks(UPLOAD_CHUNK) {
            sent += chunk.len() as u64;
            progress(UploadProgress { sent, total });
        }
        if bytes.is_empty() {
            progress(UploadProgress { sent: 0, total: 0 });
        }

        lock(&self.blobs)?.insert(key.to_string(), (content_type.to_string(), bytes.to_vec()));
        self.url(key)
    }

    fn url(&self, key: &str) -> Result<String> {
        if !lock(&self.blobs)?.contains_key(key) {
            return Err(Error::Collaborator(format!("no blob at {}", key)));
        }
        Ok(format!("memory://{}", key))
    }
}

#[derive(Debug, Default)]
pub struct MemoryIdentity {
    user: Mutex<Option<UserIdentity>>,
}

impl MemoryIdentity {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserIdentity) {
        if let Ok(mut current) = lock(&self.user) {
            *current = Some(user);
        }
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        lock(&self.user).ok()?.clone()
    }

    fn sign_out(&self) -> Result<()> {
        *lock(&self.user)? = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCommentFeed {
    comments: Mutex<Vec<Comment>>,
}

impl CommentFeed for MemoryCommentFeed {
    fn read_since(&self, file_set_id: &str, cursor: u64) -> Result<Vec<Comment>> {
        Ok(lock(&self.comments)?
            .iter()
            .filter(|c| c.file_set_id == file_set_id && c.id > cursor)
            .cloned()
            .collect())
    }

    fn append(&self, file_set_id: &str, author: &str, body: &str) -> Result<Comment> {
        let mut comments = lock(&self.comments)?;
        let comment = Comment {
            id: comments.len() as u64 + 1,
            file_set_id: file_set_id.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            read: false,
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    fn mark_read(&self, comment_id: u64) -> Result<()> {
        let mut comments = lock(&self.comments)?;
        let comment = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Error::Collaborator(format!("no comment {}", comment_id)))?;
        comment.read = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_lifecycle() {
        let store = MemoryProjectStore::default();
        let project = store
            .create_project(
                NewProject {
                    name: "Halo ring".into(),
                    assigned_to: Some("designer@example.com".into()),
                    ..NewProject::default()
                },
                "owner@example.com",
            )
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Pending);

        let mine = store
            .list_projects(&OwnerFilter::AssignedTo("designer@example.com".into()))
            .unwrap();
        assert_eq!(mine.len(), 1);

        let updated = store
            .update_project_status(&project.id, ProjectStatus::InReview)
            .unwrap();
        assert_eq!(updated.status, ProjectStatus::InReview);
        assert!(store.update_project_status("missing", ProjectStatus::Active).is_err());
    }

    #[test]
    fn test_file_set_requires_project() {
        let store = MemoryProjectStore::default();
        let result = store.create_file_set(NewFileSet {
            project_id: "project-404".into(),
            ..NewFileSet::default()
        });
        assert!(matches!(result, Err(Error::Collaborator(_))));
    }

    #[test]
    fn test_upload_reports_progress() {
        let store = MemoryBlobStore::default();
        let bytes = vec![7u8; UPLOAD_CHUNK * 2 + 10];
        let mut reports = Vec::new();
        let url = store
            .upload("projects/u/ring.stl", &bytes, "model/stl", &mut |p| reports.push(p))
            .unwrap();

        assert_eq!(url, "memory://projects/u/ring.stl");
        assert_eq!(reports.len(), 3);
        assert_eq!(reports.last().unwrap().percent(), 100.0);
        assert_eq!(store.get("projects/u/ring.stl").unwrap().1.len(), bytes.len());
    }

    #[test]
    fn test_offline_upload_fails() {
        let store = MemoryBlobStore::default();
        store.set_offline(true);
        let result = store.upload("k", b"x", "text/plain", &mut |_| {});
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_identity_sign_out() {
        let identity = MemoryIdentity::signed_in(UserIdentity {
            id: "u1".into(),
            email: "owner@example.com".into(),
            display_name: None,
        });
        assert!(identity.current_user().is_some());
        identity.sign_out().unwrap();
        assert!(identity.current_user().is_none());
    }

    #[test]
    fn test_comment_cursor_and_read() {
        let feed = MemoryCommentFeed::default();
        let first = feed.append("fileset-1", "a@example.com", "Looks good").unwrap();
        feed.append("fileset-1", "b@example.com", "Thicker shank?").unwrap();
        feed.append("fileset-2", "a@example.com", "Other set").unwrap();

        let newer = feed.read_since("fileset-1", first.id).unwrap();
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].body, "Thicker shank?");

        feed.mark_read(first.id).unwrap();
        assert!(feed.read_since("fileset-1", 0).unwrap()[0].read);
    }
}
