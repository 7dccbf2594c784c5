use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use plotters::style::{register_font, FontStyle};

use crate::error::RnaError;

/// Font family every chart asks for.
pub const FAMILY: &str = "sans-serif";
/// Overrides the font file.
pub const FONT_ENV: &str = "RNA_FONT";

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceCell<PathBuf> = OnceCell::new();

/// Register a TrueType font under [`FAMILY`] for every style, once per
/// process. Lookup order: `configured`, `RNA_FONT`, then common system
/// locations.
pub fn ensure_registered(configured: Option<&Path>) -> Result<&'static Path, RnaError> {
    REGISTERED
        .get_or_try_init(|| {
            let path = locate(configured).ok_or_else(|| {
                RnaError::Font("aucun fichier .ttf trouvé".to_string())
            })?;
            register(&path)?;
            log::debug!("chart font: {}", path.display());
            Ok(path)
        })
        .map(PathBuf::as_path)
}

/// Load `path` and register it under [`FAMILY`]. Nothing is registered
/// when the file is not a usable TrueType font.
fn register(path: &Path) -> Result<(), RnaError> {
    let bytes =
        std::fs::read(path).map_err(|e| RnaError::Font(format!("{}: {e}", path.display())))?;
    // plotters keeps a reference for the whole process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    for style in [
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::Oblique,
    ] {
        register_font(FAMILY, style, bytes).map_err(|_| {
            RnaError::Font(format!("{}: police TrueType invalide", path.display()))
        })?;
    }
    Ok(())
}

fn locate(configured: Option<&Path>) -> Option<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(FONT_ENV).map(PathBuf::from))
        .into_iter()
        .chain(CANDIDATES.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}
