use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{Brush, EditSession, Layer, Result, undo_stack::DEFAULT_UNDO_LIMIT};

fn default_undo_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

fn default_brush_sizes() -> Vec<i32> {
    vec![1, 2, 3, 4, 5, 7, 9]
}

fn default_frame_duration() -> u32 {
    100
}

fn default_fps() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,

    #[serde(default)]
    pub data_path: Option<PathBuf>,

    #[serde(default = "default_brush_sizes")]
    pub standard_brush_sizes: Vec<i32>,

    #[serde(default = "default_frame_duration")]
    pub default_frame_duration_ms: u32,

    #[serde(default = "default_fps")]
    pub default_fps: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: default_undo_limit(),
            data_path: None,
            standard_brush_sizes: default_brush_sizes(),
            default_frame_duration_ms: default_frame_duration(),
            default_fps: default_fps(),
        }
    }
}

impl EditorConfig {
    /// # Errors
    ///
    /// Fails on malformed TOML or values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the configuration file. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration next to `path` first and then moves it over,
    /// so a crash never leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let toml_string = toml::to_string_pretty(self)?;
        let mut write_name = path.to_path_buf();
        write_name.set_extension("new");
        fs::write(&write_name, toml_string)?;
        fs::rename(&write_name, path)?;
        Ok(())
    }
}

/// Application wide editing state: configuration and the standard brushes.
#[derive(Debug, Clone)]
pub struct EditingContext {
    config: EditorConfig,
    brushes: Vec<Brush>,
}

impl EditingContext {
    /// # Errors
    ///
    /// Fails if a brush mask can't be allocated.
    ///
    /// # Panics
    ///
    /// Panics if a configured brush size is less than 1.
    pub fn new(config: EditorConfig) -> Result<Self> {
        let brushes = config.standard_brush_sizes.iter().map(|&size| Brush::round(size)).collect::<Result<Vec<_>>>()?;
        Ok(Self { config, brushes })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.config.data_path.as_deref()
    }

    pub fn standard_brushes(&self) -> &[Brush] {
        &self.brushes
    }

    /// The standard brush with exactly `size` pixels across.
    pub fn brush(&self, size: i32) -> Option<&Brush> {
        self.brushes.iter().find(|b| b.size() == size)
    }

    pub fn new_session(&self) -> EditSession {
        EditSession::new(self.config.undo_limit)
    }

    /// Decodes an image file into a layer named after the file.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be decoded or its frames disagree in shape.
    pub fn load_layer(&self, path: &Path) -> Result<Layer> {
        let frames = pix_engine::import::load_image(path)?;
        let name = path.file_stem().map_or_else(|| "layer".to_string(), |s| s.to_string_lossy().into_owned());
        Layer::from_decoded(name, frames, self.config.default_fps, self.config.default_frame_duration_ms)
    }
}
