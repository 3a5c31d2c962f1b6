//! Command implementations

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use glam::EulerRot;
use parking_lot::Mutex;
use rugo_core::interaction::PlanePointer;
use rugo_core::world::{SaveFile, SaveLayout};
use rugo_core::{GameMode, PointerFrame, Session, TablePlane, TemplateRegistry, WorldStore};

use crate::config::AppConfig;

/// Outcome of a replayed draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSummary {
    pub world: String,
    pub placed: usize,
    pub total: usize,
}

fn open_store(save_dir: &Path, config: &AppConfig) -> WorldStore {
    WorldStore::new(
        save_dir,
        Arc::new(TemplateRegistry::with_builtins()),
        config.store.clone(),
    )
}

pub fn new_world(save_dir: &Path, config: &AppConfig) -> anyhow::Result<String> {
    let mut store = open_store(save_dir, config);
    let name = store
        .create_new_world()
        .context("Failed to create world")?;
    Ok(name.to_string())
}

pub fn list_worlds(save_dir: &Path, config: &AppConfig) -> anyhow::Result<Vec<String>> {
    Ok(open_store(save_dir, config).saved_worlds()?)
}

/// Human-readable listing of a world's primary save
pub fn show_world(save_dir: &Path, name: &str) -> anyhow::Result<String> {
    if !SaveLayout::is_valid_name(name) {
        bail!("Invalid world name {:?}", name);
    }
    let path = SaveLayout::new(save_dir).primary_file(name);
    let file = SaveFile::read(&path).with_context(|| format!("Cannot show world {name:?}"))?;

    let mut out = String::new();
    writeln!(out, "{name} ({} gadgets)", file.gadgets.len())?;
    for (i, record) in file.gadgets.iter().enumerate() {
        let (yaw, _, _) = record.rotation.to_euler(EulerRot::YXZ);
        write!(
            out,
            "{i:>4}  {:<10} ({:.3}, {:.3}, {:.3})  yaw {:.1}",
            record.name,
            record.position.x,
            record.position.y,
            record.position.z,
            yaw.to_degrees()
        )?;
        for (key, value) in record.state.iter() {
            write!(out, "  {key}={value:?}")?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

/// Parse a pointer script: a RON list of frames
pub fn read_script(path: &Path) -> anyhow::Result<Vec<PointerFrame>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pointer script {:?}", path))?;
    let frames: Vec<PointerFrame> = ron::from_str(&content)
        .with_context(|| format!("Malformed pointer script {:?}", path))?;
    Ok(frames)
}

/// Replay a pointer script through a draw session and save the world
pub fn draw(
    save_dir: &Path,
    config: &AppConfig,
    script: &Path,
    world: Option<&str>,
    table_height: f32,
) -> anyhow::Result<DrawSummary> {
    let frames = read_script(script)?;

    let mut store = open_store(save_dir, config);
    match world {
        Some(name) => store
            .load_world(name)
            .with_context(|| format!("Cannot draw into world {name:?}"))?,
        None => {
            store.create_new_world().context("Failed to create world")?;
        }
    }
    let before = store.len();
    let name = store.name().unwrap_or_default().to_string();

    let shared = Arc::new(Mutex::new(store));
    let mut session = Session::new(shared.clone(), config.session.clone(), config.capture);
    session.enable_draw_mode();

    let plane = TablePlane::new(table_height);
    for frame in frames {
        session.tick(&PlanePointer::new(frame, plane))?;
    }

    if session.mode() == GameMode::Draw {
        bail!("Pointer script ended before a stroke was completed");
    }

    let mut store = shared.lock();
    store.save()?;

    Ok(DrawSummary {
        world: name,
        placed: store.len() - before,
        total: store.len(),
    })
}
