//! The viewer session
//!
//! A [`ViewerSession`] owns both document sets, the layout controller, one
//! pane per viewport, the geometry and metadata caches, preview resources,
//! banners and the injected collaborators. Every user action is a `&mut self`
//! method, so actions apply atomically and in event order.
//!
//! Loads are split into `begin_*` (capture a ticket), `run` (the future the
//! host polls) and `finish_*` (apply or discard). Failures never escape as
//! errors from the viewport path: they become entry status, banners and
//! inline viewport messages.

use crate::{
    banner::{Banner, Banners, Severity},
    collab::{storage_key, Collaborators, FileSetRecord, NewFileSet, OwnerFilter, ProjectRecord, Comment},
    config::ViewerConfig,
    document::{DocumentHandle, DocumentId, DocumentKind, GeometryStatus, IdAllocator},
    document_set::{DocumentEntry, DocumentSet},
    intake::{AcceptedFile, IncomingFile, IntakeReport, UploadIntake},
    layout::{LayoutController, LayoutMode, LayoutState, Tab, TabRejected, ViewportId, ViewportKind},
    loader::{
        wants_metadata, DocumentMetadata, LoadStatus, LoadTicket, LoadedMesh, MeshLoadOutcome,
        MeshLoadRequest, MetadataLoadOutcome, MetadataLoadRequest,
    },
    resource::PreviewResources,
    viewport::{DesignPane, MeshPane, Pane, ViewportFrame, ViewportStatus},
};
use jewelviz_core::{CanonicalFrame, Error, NormalizedGeometry, Result};
use jewelviz_visualization::{DocumentView, Framing, LightingRig, MaterialPreset, MeshScene};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

pub struct ViewerSession {
    config: ViewerConfig,
    intake: UploadIntake,
    ids: IdAllocator,
    resources: PreviewResources,
    designs: DocumentSet,
    meshes: DocumentSet,
    layout: LayoutController,
    panes: BTreeMap<ViewportId, Pane>,
    geometry: HashMap<DocumentId, Arc<LoadedMesh>>,
    metadata: HashMap<DocumentId, DocumentMetadata>,
    pending_mesh: Option<LoadTicket>,
    pending_metadata: Option<LoadTicket>,
    /// Last mesh whose geometry was shown, restored when a newer one fails
    last_valid_mesh: Option<DocumentId>,
    banners: Banners,
    collaborators: Collaborators,
}

impl ViewerSession {
    pub fn new(config: ViewerConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let panes = ViewportId::ALL
            .iter()
            .map(|&id| (id, Pane::for_viewport(id)))
            .collect();

        Ok(Self {
            intake: UploadIntake::new(&config),
            layout: LayoutController::new(config.default_layout),
            config,
            ids: IdAllocator::default(),
            resources: PreviewResources::new(),
            designs: DocumentSet::new(DocumentKind::DesignReference),
            meshes: DocumentSet::new(DocumentKind::Mesh),
            panes,
            geometry: HashMap::new(),
            metadata: HashMap::new(),
            pending_mesh: None,
            pending_metadata: None,
            last_valid_mesh: None,
            banners: Banners::new(),
            collaborators,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn layout(&self) -> LayoutState {
        self.layout.state()
    }

    pub fn designs(&self) -> &DocumentSet {
        &self.designs
    }

    pub fn meshes(&self) -> &DocumentSet {
        &self.meshes
    }

    pub fn set(&self, kind: DocumentKind) -> &DocumentSet {
        match kind {
            DocumentKind::DesignReference => &self.designs,
            DocumentKind::Mesh => &self.meshes,
        }
    }

    pub fn resources(&self) -> &PreviewResources {
        &self.resources
    }

    pub fn banners(&self) -> &[Banner] {
        self.banners.active()
    }

    pub fn dismiss_banner(&mut self, id: u64) -> bool {
        self.banners.dismiss(id)
    }

    pub fn pane(&self, id: ViewportId) -> Option<&Pane> {
        self.panes.get(&id)
    }

    // ---------------------------------------------------------------------
    // Document sets
    // ---------------------------------------------------------------------

    /// Screen files and append the accepted ones. The last appended document
    /// becomes active.
    pub fn add_documents(&mut self, kind: DocumentKind, files: Vec<IncomingFile>) -> IntakeReport {
        let report = self.intake.screen(kind, files);
        self.report_skipped(&report);

        if !report.accepted.is_empty() {
            let entries = self.entries_for(kind, &report.accepted);
            self.mutate(kind, |set| {
                for entry in entries {
                    set.add(entry);
                }
            });
            self.layout.focus(kind);
        }
        report
    }

    /// Replace the mesh set with a single file
    pub fn replace_mesh(&mut self, file: IncomingFile) -> IntakeReport {
        let report = self.intake.screen(DocumentKind::Mesh, vec![file]);
        self.report_skipped(&report);

        if !report.accepted.is_empty() {
            let entries = self.entries_for(DocumentKind::Mesh, &report.accepted);
            let replaced = self.mutate(DocumentKind::Mesh, |set| set.replace_all(entries));
            for handle in &replaced {
                self.evict(handle.id);
            }
            self.sync_panes();
            self.layout.focus(DocumentKind::Mesh);
        }
        report
    }

    pub fn select(&mut self, kind: DocumentKind, index: usize) {
        self.mutate(kind, |set| set.select(index));
    }

    pub fn select_next(&mut self, kind: DocumentKind) {
        self.mutate(kind, DocumentSet::select_next);
    }

    pub fn select_previous(&mut self, kind: DocumentKind) {
        self.mutate(kind, DocumentSet::select_previous);
    }

    pub fn remove(&mut self, kind: DocumentKind, index: usize) -> Option<DocumentHandle> {
        let removed = self.mutate(kind, |set| set.remove(index));
        if let Some(handle) = &removed {
            self.evict(handle.id);
        }
        removed
    }

    /// Whether derived geometry or metadata is still held for `id`
    pub fn is_cached(&self, id: DocumentId) -> bool {
        self.geometry.contains_key(&id) || self.metadata.contains_key(&id)
    }

    /// Number of meshes with cached geometry
    pub fn cached_mesh_count(&self) -> usize {
        self.geometry.len()
    }

    fn evict(&mut self, id: DocumentId) {
        self.geometry.remove(&id);
        self.metadata.remove(&id);
        if self.last_valid_mesh == Some(id) {
            self.last_valid_mesh = None;
        }
    }

    fn entries_for(&mut self, kind: DocumentKind, files: &[AcceptedFile]) -> Vec<DocumentEntry> {
        files
            .iter()
            .map(|file| {
                let handle = DocumentHandle {
                    id: self.ids.next(),
                    kind,
                    name: file.name.clone(),
                    media: file.media.clone(),
                    bytes: Arc::clone(&file.bytes),
                };
                tracing::info!(document = %handle.id, name = %handle.name, %kind, "Added document");
                DocumentEntry::new(handle, self.resources.acquire())
            })
            .collect()
    }

    fn report_skipped(&mut self, report: &IntakeReport) {
        if let Some(warning) = report.warning() {
            self.banners.push(Severity::Warning, warning);
        }
    }

    /// Apply a mutation to one set, then react to a change of its active document
    fn mutate<T>(&mut self, kind: DocumentKind, f: impl FnOnce(&mut DocumentSet) -> T) -> T {
        let set = match kind {
            DocumentKind::DesignReference => &mut self.designs,
            DocumentKind::Mesh => &mut self.meshes,
        };
        let before = set.generation();
        let out = f(set);
        let changed = set.generation() != before;

        if changed && kind == DocumentKind::Mesh {
            self.layout.on_active_mesh_changed();
        }
        self.sync_panes();
        out
    }

    // ---------------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------------

    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.layout.set_mode(mode);
    }

    pub fn set_active_tab(&mut self, tab: Tab) -> std::result::Result<(), TabRejected> {
        self.layout.set_active_tab(tab)
    }

    /// Enable the rendered-material view for the active mesh
    pub fn request_render(&mut self) {
        let renderable = self
            .meshes
            .active()
            .is_some_and(|entry| !entry.status.is_rejected());
        self.layout.request_render(renderable);
    }

    // ---------------------------------------------------------------------
    // Loads
    // ---------------------------------------------------------------------

    /// Start loading the active mesh, unless it is already loaded or loading
    pub fn begin_mesh_load(&mut self) -> Option<MeshLoadRequest> {
        let entry = self.meshes.active()?;
        if self.geometry.contains_key(&entry.id()) || entry.status.is_rejected() {
            return None;
        }

        let ticket = LoadTicket {
            kind: DocumentKind::Mesh,
            document: entry.id(),
            generation: self.meshes.generation(),
        };
        if self.pending_mesh == Some(ticket) {
            return None;
        }

        let request = MeshLoadRequest {
            ticket,
            bytes: Arc::clone(&entry.handle.bytes),
            preview_size: self.config.preview_canonical_size,
            showcase_size: self.config.render_canonical_size,
        };
        tracing::debug!(document = %ticket.document, generation = ticket.generation, "Mesh load started");
        self.pending_mesh = Some(ticket);
        Some(request)
    }

    /// Apply a finished mesh load, discarding it if the selection moved on
    pub fn finish_mesh_load(&mut self, outcome: MeshLoadOutcome) -> LoadStatus {
        let ticket = outcome.ticket;
        if self.pending_mesh == Some(ticket) {
            self.pending_mesh = None;
        }
        if !self.is_current(&ticket) {
            tracing::warn!(document = %ticket.document, "Discarding stale mesh load");
            return LoadStatus::Stale;
        }

        match outcome.result {
            Ok(loaded) => {
                tracing::info!(
                    document = %ticket.document,
                    triangles = loaded.triangle_count(),
                    "Mesh loaded"
                );
                self.meshes.set_status(ticket.document, GeometryStatus::Valid);
                self.geometry.insert(ticket.document, Arc::new(loaded));
                self.last_valid_mesh = Some(ticket.document);
                self.sync_panes();
                LoadStatus::Applied
            }
            Err(err) => self.reject_mesh(ticket.document, err),
        }
    }

    /// Mark a mesh rejected, tell the user and fall back to the last good mesh
    fn reject_mesh(&mut self, document: DocumentId, err: Error) -> LoadStatus {
        let name = self
            .meshes
            .entry(document)
            .map(|e| e.handle.name.clone())
            .unwrap_or_else(|| document.to_string());
        let reason = err.to_string();
        self.meshes
            .set_status(document, GeometryStatus::Rejected(reason.clone()));
        self.banners.push(
            Severity::Error,
            format!("Could not load {}: {}. Please re-upload the file.", name, reason),
        );

        if let Some(previous) = self.last_valid_mesh.filter(|id| self.geometry.contains_key(id)) {
            self.mutate(DocumentKind::Mesh, |set| set.select_id(previous));
        } else {
            self.sync_panes();
        }
        LoadStatus::Rejected(reason)
    }

    /// Start resolving metadata for the active design document
    pub fn begin_metadata_load(&mut self) -> Option<MetadataLoadRequest> {
        let entry = self.designs.active()?;
        if !wants_metadata(&entry.handle.media) || self.metadata.contains_key(&entry.id()) {
            return None;
        }

        let ticket = LoadTicket {
            kind: DocumentKind::DesignReference,
            document: entry.id(),
            generation: self.designs.generation(),
        };
        if self.pending_metadata == Some(ticket) {
            return None;
        }

        let request = MetadataLoadRequest {
            ticket,
            media: entry.handle.media.clone(),
            bytes: Arc::clone(&entry.handle.bytes),
        };
        self.pending_metadata = Some(ticket);
        Some(request)
    }

    /// Apply resolved metadata, discarding it if the selection moved on
    pub fn finish_metadata_load(&mut self, outcome: MetadataLoadOutcome) -> LoadStatus {
        let ticket = outcome.ticket;
        if self.pending_metadata == Some(ticket) {
            self.pending_metadata = None;
        }
        if !self.is_current(&ticket) {
            tracing::warn!(document = %ticket.document, "Discarding stale metadata load");
            return LoadStatus::Stale;
        }

        let status = match outcome.result {
            Ok(metadata) => {
                self.metadata.insert(ticket.document, metadata);
                LoadStatus::Applied
            }
            Err(err) => {
                let name = self
                    .designs
                    .entry(ticket.document)
                    .map(|e| e.handle.name.clone())
                    .unwrap_or_default();
                let message = format!("{}: {}. Showing the first page only.", name, err);
                self.banners.push(Severity::Warning, message.clone());
                self.metadata.insert(ticket.document, DocumentMetadata::Unresolved);
                LoadStatus::Degraded(message)
            }
        };
        self.sync_panes();
        status
    }

    /// Load whatever the active documents still need
    pub async fn load_pending(&mut self) -> Vec<LoadStatus> {
        let mut statuses = Vec::new();
        if let Some(request) = self.begin_metadata_load() {
            let outcome = request.run().await;
            statuses.push(self.finish_metadata_load(outcome));
        }
        if let Some(request) = self.begin_mesh_load() {
            let outcome = request.run().await;
            statuses.push(self.finish_mesh_load(outcome));
        }
        statuses
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        let set = self.set(ticket.kind);
        set.generation() == ticket.generation && set.active_id() == Some(ticket.document)
    }

    // ---------------------------------------------------------------------
    // Viewports
    // ---------------------------------------------------------------------

    fn framing(&self, frame: CanonicalFrame) -> Framing {
        Framing::for_frame(frame, Some(self.config.canonical_size(frame)))
    }

    fn displayed_geometry(&self) -> Option<(DocumentId, &Arc<LoadedMesh>)> {
        let id = self.meshes.active_id()?;
        self.geometry.get(&id).map(|g| (id, g))
    }

    /// Bring every pane in line with the active documents and caches
    fn sync_panes(&mut self) {
        let design = self
            .designs
            .active()
            .map(|e| (e.id(), DocumentView::for_media(&e.handle.name, &e.handle.media)));
        let design_metadata = design.as_ref().and_then(|(id, _)| self.metadata.get(id).copied());
        let mesh = self.displayed_geometry().map(|(id, g)| (id, Arc::clone(g)));
        let mesh_active = self.meshes.active_id().is_some();
        let preview = self.framing(CanonicalFrame::Preview);
        let showcase = self.framing(CanonicalFrame::Showcase);
        let cached = &self.geometry;

        for pane in self.panes.values_mut() {
            match pane {
                Pane::Design(pane) => {
                    pane.show(design.clone());
                    if let Some(metadata) = &design_metadata {
                        pane.apply_metadata(metadata);
                    }
                }
                Pane::Mesh(pane) => {
                    let framing = match pane.frame {
                        CanonicalFrame::Preview => &preview,
                        CanonicalFrame::Showcase => &showcase,
                    };
                    match &mesh {
                        Some((id, g)) => {
                            pane.show(Some((*id, geometry_for(g, pane.frame).bounds())), framing);
                        }
                        // While the active mesh loads the pane keeps its last
                        // mesh, as long as that mesh is still cached
                        None if mesh_active
                            && pane.document.is_some_and(|d| cached.contains_key(&d)) => {}
                        None => pane.show(None, framing),
                    }
                }
            }
        }
    }

    fn design_pane_mut(&mut self, id: ViewportId) -> Option<&mut DesignPane> {
        match self.panes.get_mut(&id)? {
            Pane::Design(pane) => Some(pane),
            Pane::Mesh(_) => None,
        }
    }

    fn mesh_pane_mut(&mut self, id: ViewportId) -> Option<&mut MeshPane> {
        match self.panes.get_mut(&id)? {
            Pane::Mesh(pane) => Some(pane),
            Pane::Design(_) => None,
        }
    }

    fn with_view(&mut self, id: ViewportId, f: impl FnOnce(&mut DocumentView)) {
        if let Some(view) = self.design_pane_mut(id).and_then(|p| p.view.as_mut()) {
            f(view);
        }
    }

    pub fn zoom_in(&mut self, id: ViewportId) {
        self.with_view(id, DocumentView::zoom_in);
    }

    pub fn zoom_out(&mut self, id: ViewportId) {
        self.with_view(id, DocumentView::zoom_out);
    }

    pub fn set_zoom(&mut self, id: ViewportId, factor: f32) {
        self.with_view(id, |view| view.set_zoom(factor));
    }

    pub fn next_page(&mut self, id: ViewportId) {
        self.with_view(id, DocumentView::next_page);
    }

    pub fn previous_page(&mut self, id: ViewportId) {
        self.with_view(id, DocumentView::previous_page);
    }

    pub fn go_to_page(&mut self, id: ViewportId, page: u32) {
        self.with_view(id, |view| view.go_to_page(page));
    }

    /// Dolly a mesh viewport's camera
    pub fn zoom_camera(&mut self, id: ViewportId, factor: f32) {
        if let Some(camera) = self.mesh_pane_mut(id).and_then(|p| p.camera.as_mut()) {
            camera.zoom(factor);
        }
    }

    pub fn orbit_camera(&mut self, id: ViewportId, yaw: f32, pitch: f32) {
        if let Some(camera) = self.mesh_pane_mut(id).and_then(|p| p.camera.as_mut()) {
            camera.orbit(yaw, pitch);
        }
    }

    pub fn set_aspect_ratio(&mut self, id: ViewportId, aspect_ratio: f32) {
        if let Some(pane) = self.mesh_pane_mut(id) {
            pane.set_aspect_ratio(aspect_ratio);
        }
    }

    /// Choose a material for a mesh viewport. Unknown labels fall back to
    /// the viewport's default material.
    pub fn select_material(&mut self, id: ViewportId, label: &str) -> Option<&'static MaterialPreset> {
        self.mesh_pane_mut(id).map(|pane| pane.select_material(label))
    }

    fn mesh_status(&self, pane: &MeshPane) -> ViewportStatus {
        let Some(entry) = self.meshes.active() else {
            return ViewportStatus::Idle;
        };
        if pane.document == Some(entry.id()) && pane.camera.is_some() {
            return ViewportStatus::Ready;
        }
        match &entry.status {
            GeometryStatus::Rejected(reason) => ViewportStatus::Failed(reason.clone()),
            _ => ViewportStatus::Loading,
        }
    }

    fn design_status(&self) -> ViewportStatus {
        let Some(entry) = self.designs.active() else {
            return ViewportStatus::Idle;
        };
        let resolved = !wants_metadata(&entry.handle.media) || self.metadata.contains_key(&entry.id());
        if resolved {
            ViewportStatus::Ready
        } else {
            ViewportStatus::Loading
        }
    }

    /// Describe every visible viewport
    pub fn frames(&self) -> Vec<ViewportFrame> {
        self.layout
            .visible_viewports()
            .into_iter()
            .filter_map(|slot| {
                let pane = self.panes.get(&slot.id)?;
                let frame = match pane {
                    Pane::Design(pane) => ViewportFrame {
                        id: slot.id,
                        inert: slot.inert,
                        status: self.design_status(),
                        document: pane.document,
                        name: self.designs.active().map(|e| e.handle.name.clone()),
                        view: pane.view.clone(),
                        material: None,
                    },
                    Pane::Mesh(pane) => ViewportFrame {
                        id: slot.id,
                        inert: slot.inert,
                        status: if slot.inert {
                            ViewportStatus::Idle
                        } else {
                            self.mesh_status(pane)
                        },
                        document: self.meshes.active_id(),
                        name: self.meshes.active().map(|e| e.handle.name.clone()),
                        view: None,
                        material: Some(pane.preset.label),
                    },
                };
                Some(frame)
            })
            .collect()
    }

    /// Compose the GPU-ready scene for a visible, ready mesh viewport
    pub fn mesh_scene(&self, id: ViewportId) -> Result<Option<MeshScene>> {
        if id.kind() == ViewportKind::Render && !self.layout.render_enabled() {
            return Ok(None);
        }
        let Some(pane) = self.panes.get(&id).and_then(Pane::as_mesh) else {
            return Ok(None);
        };
        let (Some(document), Some(camera)) = (pane.document, pane.camera.as_ref()) else {
            return Ok(None);
        };
        if self.meshes.active_id() != Some(document) {
            return Ok(None);
        }
        let Some(loaded) = self.geometry.get(&document) else {
            return Ok(None);
        };

        let scene = MeshScene::compose(
            geometry_for(loaded, pane.frame),
            camera,
            pane.preset,
            &LightingRig::for_frame(pane.frame),
        )?;
        Ok(Some(scene))
    }

    // ---------------------------------------------------------------------
    // Collaborators
    // ---------------------------------------------------------------------

    /// Upload the active design and mesh and record them as a file set
    pub fn publish_file_set(&mut self, project_id: &str, comments: Option<&str>) -> Result<FileSetRecord> {
        let result = self.try_publish(project_id, comments);
        match &result {
            Ok(record) => {
                self.banners
                    .push(Severity::Info, format!("Files uploaded to project {}", record.project_id));
            }
            Err(err) => {
                self.banners.push(Severity::Error, format!("Upload failed: {}", err));
            }
        }
        result
    }

    fn try_publish(&self, project_id: &str, comments: Option<&str>) -> Result<FileSetRecord> {
        let owner = match self.collaborators.identity.current_user() {
            Some(user) => user.id,
            None => self
                .config
                .owner_email
                .clone()
                .ok_or_else(|| Error::Collaborator("no signed-in user".to_string()))?,
        };

        let design = self.designs.active();
        let mesh = self.meshes.active();
        if design.is_none() && mesh.is_none() {
            return Err(Error::InvalidData("nothing to upload".to_string()));
        }

        let mut rng = rand::thread_rng();
        let mut upload = |entry: &DocumentEntry| -> Result<String> {
            let key = storage_key(&owner, &entry.handle.name, &mut rng);
            let name = entry.handle.name.as_str();
            self.collaborators.blobs.upload(
                &key,
                &entry.handle.bytes,
                entry.handle.media.mime(),
                &mut |p| tracing::debug!(file = name, percent = p.percent(), "Upload progress"),
            )
        };

        let design_image_url = design.map(&mut upload).transpose()?;
        let stl_file_url = mesh.map(&mut upload).transpose()?;

        self.collaborators.projects.create_file_set(NewFileSet {
            project_id: project_id.to_string(),
            design_image_url,
            stl_file_url,
            comments: comments.map(str::to_string),
        })
    }

    /// Projects created by or assigned to the signed-in user
    pub fn my_projects(&mut self) -> Result<Vec<ProjectRecord>> {
        let result = match self.collaborators.identity.current_user() {
            Some(user) => self
                .collaborators
                .projects
                .list_projects(&OwnerFilter::Involving(user.email)),
            None => Err(Error::Collaborator("no signed-in user".to_string())),
        };
        if let Err(err) = &result {
            self.banners
                .push(Severity::Error, format!("Could not load projects: {}", err));
        }
        result
    }

    /// Post a comment on a file set as the signed-in user
    pub fn post_comment(&mut self, file_set_id: &str, body: &str) -> Result<Comment> {
        let result = match self.collaborators.identity.current_user() {
            Some(user) => self
                .collaborators
                .comments
                .append(file_set_id, &user.email, body),
            None => Err(Error::Collaborator("no signed-in user".to_string())),
        };
        if let Err(err) = &result {
            self.banners
                .push(Severity::Error, format!("Could not post comment: {}", err));
        }
        result
    }

    /// Comments newer than `cursor`, marking them read
    pub fn read_comments(&mut self, file_set_id: &str, cursor: u64) -> Result<Vec<Comment>> {
        let feed = Arc::clone(&self.collaborators.comments);
        let result = feed.read_since(file_set_id, cursor).and_then(|comments| {
            for comment in comments.iter().filter(|c| !c.read) {
                feed.mark_read(comment.id)?;
            }
            Ok(comments)
        });
        if let Err(err) = &result {
            self.banners
                .push(Severity::Error, format!("Could not load comments: {}", err));
        }
        result
    }
}

fn geometry_for(loaded: &LoadedMesh, frame: CanonicalFrame) -> &NormalizedGeometry {
    match frame {
        CanonicalFrame::Preview => &loaded.preview,
        CanonicalFrame::Showcase => &loaded.showcase,
    }
}

impl std::fmt::Debug for ViewerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("layout", &self.layout.state())
            .field("designs", &self.designs.len())
            .field("meshes", &self.meshes.len())
            .field("banners", &self.banners.active().len())
            .finish_non_exhaustive()
    }
}
