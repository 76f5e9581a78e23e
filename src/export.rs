//! Raster and PDF conversion of rendered timeline SVG.

use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};

const LOCAL_FONT_DIR: &str = "fonts";

/// Output formats selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Usage("Output file has no extension".to_string()))?
            .to_ascii_lowercase();

        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(Error::Usage(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                ext
            ))),
        }
    }
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Usage(format!("Invalid --png-scale value: {}", scale)));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONT_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        let families = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str()));
        if let Some(family) = pick_sans_family(families) {
            fontdb.set_sans_serif_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Export("Failed to create pixmap".to_string()))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::Export(format!("Failed to encode PNG: {}", e)))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new(LOCAL_FONT_DIR);
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    let family = pick_sans_family(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
    );
    if let Some(family) = family {
        fontdb.set_sans_serif_family(family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    // Text as paths keeps labels visible when font embedding fails.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::Export(format!("Failed to convert SVG to PDF: {}", e)))
}

/// First installed family whose name mentions "sans", else the first family.
fn pick_sans_family<'a>(families: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut first: Option<&str> = None;
    for family in families {
        if family.to_ascii_lowercase().contains("sans") {
            return Some(family.to_string());
        }
        first.get_or_insert(family);
    }
    first.map(str::to_string)
}
