use std::{
    fs,
    path::{Path, PathBuf},
};

use askama::Template;
use chrono::DateTime;
use chrono_tz::Tz;
use tiny_skia::{Pixmap, Rect, Transform};

use crate::theme::Theme;

pub const CANVAS_WIDTH: u32 = 500;
pub const CANVAS_HEIGHT: u32 = 500;

pub const FONT_SIZE: f32 = 120.0;

/// Pixels the text is lifted above the true center. Tuned by eye for the
/// padding most fonts leave below the baseline.
pub const TEXT_RAISE: i32 = 50;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to load font {}: {}", .path.display(), .reason)]
    FontLoad { path: PathBuf, reason: String },

    #[error("Failed to build SVG: {0}")]
    Svg(#[from] usvg::Error),

    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),

    #[error("Text {0:?} produced no glyphs")]
    EmptyText(String),

    #[error("Failed to allocate a {0}x{1} canvas")]
    Canvas(u32, u32),

    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

pub fn time_text(time: &DateTime<Tz>) -> String {
    time.format("%H:%M").to_string()
}

/// Top-left corner of the text's ink box, centered horizontally and raised
/// by [`TEXT_RAISE`] from the vertical center.
pub fn text_position(canvas_width: i32, canvas_height: i32, text_width: i32, text_height: i32) -> Coordinates {
    Coordinates {
        x: (canvas_width - text_width).div_euclid(2),
        y: (canvas_height - text_height).div_euclid(2) - TEXT_RAISE,
    }
}

#[derive(Template)]
#[template(
    source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}">
{%- if let Some(background) = background %}
<rect x="0" y="0" width="{{ width }}" height="{{ height }}" fill="{{ background }}"/>
{%- endif %}
<text x="{{ x }}" y="{{ y }}" font-family="'{{ font_family }}'" font-size="{{ font_size }}" fill="{{ fill }}">{{ text }}</text>
</svg>"#,
    ext = "svg"
)]
struct AvatarSvgTemplate<'a> {
    width: u32,
    height: u32,
    background: Option<&'a str>,
    x: f32,
    y: f32,
    font_family: &'a str,
    font_size: f32,
    fill: &'a str,
    text: &'a str,
}

/// Ink box of the first text node, taken from its glyph outlines rather than
/// the line box.
fn text_ink_box(group: &usvg::Group) -> Option<Rect> {
    group.children().iter().find_map(|node| match node {
        usvg::Node::Text(text) => Some(text.flattened().abs_bounding_box()),
        usvg::Node::Group(group) => text_ink_box(group),
        _ => None,
    })
}

pub struct AvatarRenderer {
    fontdb: fontdb::Database,
    font_family: String,
}

impl AvatarRenderer {
    pub fn new(font_path: impl AsRef<Path>) -> Result<Self> {
        let font_path = font_path.as_ref();
        let font_load_error = |reason: String| Error::FontLoad {
            path: font_path.to_path_buf(),
            reason,
        };

        let mut fontdb = fontdb::Database::new();
        fontdb
            .load_font_file(font_path)
            .map_err(|err| font_load_error(err.to_string()))?;

        let font_family = fontdb
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(family, _)| family.clone())
            .ok_or_else(|| font_load_error("no usable font face".into()))?;

        log::debug!("Loaded font family {:?} from {}", font_family, font_path.display());

        Ok(Self { fontdb, font_family })
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    fn build_tree(&self, svg: &AvatarSvgTemplate) -> Result<usvg::Tree> {
        let svg_data = svg.render()?;
        log::debug!("SVG data: {}", svg_data);

        let opt = usvg::Options {
            font_family: self.font_family.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg_data.as_bytes(), &opt, &self.fontdb)?;
        Ok(tree)
    }

    /// Ink bounding box of `text` when laid out with its baseline origin at (0, 0).
    pub fn measure(&self, text: &str) -> Result<Rect> {
        let tree = self.build_tree(&AvatarSvgTemplate {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: None,
            x: 0.0,
            y: 0.0,
            font_family: &self.font_family,
            font_size: FONT_SIZE,
            fill: "black",
            text,
        })?;

        text_ink_box(tree.root())
            .filter(|bbox| bbox.width() > 0.0 && bbox.height() > 0.0)
            .ok_or_else(|| Error::EmptyText(text.to_string()))
    }

    /// Where the ink box of `text` starts on the canvas.
    pub fn layout(&self, text: &str) -> Result<(Coordinates, Rect)> {
        let bbox = self.measure(text)?;
        let position = text_position(
            CANVAS_WIDTH as i32,
            CANVAS_HEIGHT as i32,
            bbox.width().round() as i32,
            bbox.height().round() as i32,
        );
        Ok((position, bbox))
    }

    pub fn render(&self, time: &DateTime<Tz>, theme: &Theme) -> Result<Pixmap> {
        let text = time_text(time);
        let (position, bbox) = self.layout(&text)?;

        log::debug!("Placing {:?} at ({}, {})", text, position.x, position.y);

        // shift the baseline origin so the ink box lands on `position`
        let tree = self.build_tree(&AvatarSvgTemplate {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: Some(theme.background_color),
            x: position.x as f32 - bbox.x(),
            y: position.y as f32 - bbox.y(),
            font_family: &self.font_family,
            font_size: FONT_SIZE,
            fill: theme.font_color,
            text: &text,
        })?;

        let mut pixmap =
            Pixmap::new(CANVAS_WIDTH, CANVAS_HEIGHT).ok_or(Error::Canvas(CANVAS_WIDTH, CANVAS_HEIGHT))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// Renders and writes a PNG to `path`, replacing whatever was there.
    pub fn render_to_file(&self, time: &DateTime<Tz>, theme: &Theme, path: impl AsRef<Path>) -> Result<()> {
        let pixmap = self.render(time, theme)?;
        let png = pixmap
            .encode_png()
            .map_err(|err| Error::Encode(err.to_string()))?;

        fs::write(path.as_ref(), png)?;
        log::info!("Wrote avatar to {}", path.as_ref().display());

        Ok(())
    }
}
