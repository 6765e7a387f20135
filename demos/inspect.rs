//! Load design references and meshes into a headless viewer session and
//! print what every viewport would show.
//!
//! ```text
//! jewelviz-inspect ring.stl --design sketch.png --layout triple --material Platinum --render
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use jewelviz_io::StlReader;
use jewelviz_session::{
    Collaborators, DocumentKind, IncomingFile, LayoutMode, Severity, ViewerConfig, ViewerSession,
    ViewportKind,
};
use jewelviz_visualization::{PREVIEW_FINISHES, RENDER_METALS};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect jewelry design files the way the viewer sees them")]
struct Args {
    /// STL files to load as meshes
    meshes: Vec<PathBuf>,

    /// Design reference files (images, PDFs, office documents)
    #[arg(long = "design")]
    designs: Vec<PathBuf>,

    /// Layout mode: tabs, split or triple
    #[arg(long)]
    layout: Option<LayoutMode>,

    /// Material label applied to the rendered-material viewports
    #[arg(long)]
    material: Option<String>,

    /// Enable the rendered-material view
    #[arg(long)]
    render: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the material catalogs and exit
    #[arg(long)]
    list_materials: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.list_materials {
        for catalog in [&PREVIEW_FINISHES, &RENDER_METALS] {
            println!("{} (v{})", catalog.name, catalog.version);
            for preset in catalog.presets() {
                println!(
                    "  {:<12} base {}  metalness {:.2}  roughness {:.2}",
                    preset.label, preset.base_color, preset.metalness, preset.roughness
                );
            }
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ViewerConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    }
    .with_env_overrides();

    let mut session = ViewerSession::new(config, Collaborators::in_memory())?;
    if let Some(mode) = args.layout {
        session.set_mode(mode);
    }

    let designs = args.designs.iter().map(|p| read_file(p)).collect::<Result<Vec<_>>>()?;
    if !designs.is_empty() {
        session.add_documents(DocumentKind::DesignReference, designs);
    }

    let meshes = args.meshes.iter().map(|p| read_file(p)).collect::<Result<Vec<_>>>()?;
    for file in &meshes {
        match StlReader::declared_triangle_count(&file.bytes) {
            Some(count) => println!(
                "{}: {} bytes, {} triangles declared",
                file.name,
                file.bytes.len(),
                count
            ),
            None => println!("{}: {} bytes, no STL header", file.name, file.bytes.len()),
        }
    }
    if !meshes.is_empty() {
        session.add_documents(DocumentKind::Mesh, meshes);
    }

    for status in pollster::block_on(session.load_pending()) {
        tracing::info!(?status, "Load finished");
    }

    if args.render {
        session.request_render();
    }
    if let Some(label) = &args.material {
        let render_ids: Vec<_> = session
            .frames()
            .iter()
            .map(|f| f.id)
            .filter(|id| id.kind() == ViewportKind::Render)
            .collect();
        for id in render_ids {
            session.select_material(id, label);
        }
    }

    println!("layout: {:?}", session.layout());
    for frame in session.frames() {
        println!("{}", serde_json::to_string_pretty(&frame)?);
        if let Some(scene) = session.mesh_scene(frame.id)? {
            let eye = scene.eye();
            println!(
                "  scene: {} triangles, {} vertex bytes, material {}, eye ({:.1}, {:.1}, {:.1})",
                scene.triangle_count(),
                scene.vertex_bytes().len(),
                scene.preset_label,
                eye.x,
                eye.y,
                eye.z
            );
        }
    }

    for banner in session.banners() {
        let tag = match banner.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        println!("[{}] {}", tag, banner.message);
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<IncomingFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(IncomingFile::new(name, None, bytes))
}
