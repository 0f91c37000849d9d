//! Font selection for chart text.
//!
//! Chart labels are Chinese, so the renderer needs a CJK-capable family.
//! The lookup order is: the explicit `--font` / `CHINESE_FONT_PATH` value
//! (a font file or an installed family), a `NotoSansCJK-Regular.otf` in the
//! working directory, then a list of well-known CJK families. When none is
//! usable the system sans-serif face is used and a warning is logged.
//!
//! plotters draws only fonts registered with [`register_font`], so the
//! chosen face's bytes are loaded and registered under [`FontConfig::family`]
//! by [`FontConfig::resolve`].

use std::path::{Path, PathBuf};

use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use plotters::style::{register_font, FontDesc, FontFamily, FontStyle};
use tracing::{debug, info, warn};

/// Bundled font file looked up in the working directory.
pub const LOCAL_FONT_FILE: &str = "NotoSansCJK-Regular.otf";

/// Installed families tried in order.
pub const CANDIDATE_FAMILIES: &[&str] = &[
    "Noto Sans CJK SC",
    "Noto Sans SC",
    "Source Han Sans SC",
    "WenQuanYi Zen Hei",
    "WenQuanYi Micro Hei",
    "Microsoft YaHei",
    "PingFang SC",
    "Hiragino Sans GB",
    "STHeiti",
    "SimHei",
    "Arial Unicode MS",
];

/// Family used when nothing else is available.
pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Where the chosen family came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Family read from a font file.
    File(PathBuf),
    /// Installed family named explicitly or found among the candidates.
    Installed,
    /// Nothing CJK-capable was found.
    Fallback,
}

/// The font family every chart is drawn with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub family: String,
    pub source: FontSource,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: FALLBACK_FAMILY.to_string(),
            source: FontSource::Fallback,
        }
    }
}

impl FontConfig {
    /// Walk the lookup chain against the system font database and register
    /// the chosen face with plotters.
    pub fn resolve(explicit: Option<&str>, working_dir: &Path) -> Self {
        Self::resolve_with(explicit, working_dir, is_installed).activate()
    }

    /// Pick a family without loading it; `available` answers whether an
    /// installed family exists.
    pub fn resolve_with(
        explicit: Option<&str>,
        working_dir: &Path,
        available: impl Fn(&str) -> bool,
    ) -> Self {
        if let Some(value) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
            if let Some(path) = locate_font_file(value) {
                if let Some(family) = family_from_file(&path) {
                    info!("Using font {} from {}", family, path.display());
                    return Self {
                        family,
                        source: FontSource::File(path),
                    };
                }
                warn!("Could not read a family name from {}", path.display());
            } else if available(value) {
                info!("Using font family {}", value);
                return Self {
                    family: value.to_string(),
                    source: FontSource::Installed,
                };
            } else {
                warn!("Font {} is neither a readable file nor an installed family", value);
            }
        }

        let local = working_dir.join(LOCAL_FONT_FILE);
        if local.is_file() {
            if let Some(family) = family_from_file(&local) {
                info!("Using bundled font {} from {}", family, local.display());
                return Self {
                    family,
                    source: FontSource::File(local),
                };
            }
        }

        if let Some(name) = CANDIDATE_FAMILIES.iter().find(|name| available(name)) {
            info!("Using font family {}", name);
            return Self {
                family: (*name).to_string(),
                source: FontSource::Installed,
            };
        }

        warn!(
            "No Chinese font found; chart text may not render. Install a CJK font \
             (e.g. fonts-noto-cjk or fonts-wqy-zenhei) or set CHINESE_FONT_PATH"
        );
        Self::default()
    }

    /// Load the chosen face and register it under `family`. A face that
    /// cannot be loaded degrades to the sans-serif fallback.
    pub fn activate(self) -> Self {
        match self.load_bytes().and_then(|bytes| install(&self.family, bytes)) {
            Ok(()) => self,
            Err(reason) if !self.is_fallback() => {
                warn!("Cannot load font {}: {}; using {}", self.family, reason, FALLBACK_FAMILY);
                Self::default().activate()
            }
            Err(reason) => {
                warn!("Cannot load the {} fallback font: {}", FALLBACK_FAMILY, reason);
                self
            }
        }
    }

    /// `true` when no CJK-capable family was found.
    pub fn is_fallback(&self) -> bool {
        self.source == FontSource::Fallback
    }

    /// A plotters font of this family at `size` pixels.
    pub fn font(&self, size: f64) -> FontDesc<'_> {
        FontDesc::new(FontFamily::Name(&self.family), size, FontStyle::Normal)
    }

    fn load_bytes(&self) -> Result<Vec<u8>, String> {
        match &self.source {
            FontSource::File(path) => std::fs::read(path).map_err(|e| e.to_string()),
            FontSource::Installed => {
                let family = SystemSource::new()
                    .select_family_by_name(&self.family)
                    .map_err(|e| e.to_string())?;
                let handle = family
                    .fonts()
                    .first()
                    .ok_or_else(|| "family has no faces".to_string())?;
                handle_bytes(handle)
            }
            FontSource::Fallback => {
                let handle = SystemSource::new()
                    .select_best_match(&[FamilyName::SansSerif], &Properties::new())
                    .map_err(|e| e.to_string())?;
                handle_bytes(&handle)
            }
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `true` when the system font database lists `family`.
fn is_installed(family: &str) -> bool {
    let found = SystemSource::new()
        .select_family_by_name(family)
        .map(|handle| !handle.fonts().is_empty())
        .unwrap_or(false);
    debug!("Font lookup {}: {}", family, found);
    found
}

fn handle_bytes(handle: &Handle) -> Result<Vec<u8>, String> {
    match handle {
        // Collections register their first face.
        Handle::Path { path, .. } => std::fs::read(path).map_err(|e| e.to_string()),
        Handle::Memory { bytes, .. } => Ok(bytes.to_vec()),
    }
}

/// Register `bytes` with plotters. Registered faces live for the whole
/// process.
fn install(family: &str, bytes: Vec<u8>) -> Result<(), String> {
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(family, FontStyle::Normal, bytes)
        .map_err(|_| "not a usable OpenType font".to_string())?;
    debug!("Registered font {} ({} bytes)", family, bytes.len());
    Ok(())
}

/// Resolve `value` to an existing font file: as given (with `~` expanded),
/// then inside the user font directory.
fn locate_font_file(value: &str) -> Option<PathBuf> {
    let path = match Path::new(value).strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest))?,
        Err(_) => PathBuf::from(value),
    };
    if path.is_file() {
        return Some(path);
    }
    if !looks_like_font_file(&path) {
        return None;
    }
    dirs::font_dir()
        .map(|dir| dir.join(&path))
        .filter(|p| p.is_file())
}

fn looks_like_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ["otf", "ttf", "ttc", "otc"].iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Family name stored in the font's `name` table, preferring the US English
/// record.
fn family_from_file(path: &Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    let face = ttf_parser::Face::parse(&data, 0).ok()?;

    let families: Vec<(bool, String)> = face
        .names()
        .into_iter()
        .filter(|name| {
            name.name_id == ttf_parser::name_id::TYPOGRAPHIC_FAMILY
                || name.name_id == ttf_parser::name_id::FAMILY
        })
        .filter_map(|name| {
            let english = name.language() == ttf_parser::Language::English_UnitedStates;
            name.to_string().map(|s| (english, s))
        })
        .collect();

    families
        .iter()
        .find(|(english, _)| *english)
        .or_else(|| families.first())
        .map(|(_, family)| family.clone())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
