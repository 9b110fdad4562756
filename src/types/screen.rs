use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (i64, i64) {
        (
            self.x as i64 + self.width as i64 / 2,
            self.y as i64 + self.height as i64 / 2,
        )
    }

    pub fn contains(&self, px: i64, py: i64) -> bool {
        let (x, y) = (self.x as i64, self.y as i64);
        px >= x && py >= y && px < x + self.width as i64 && py < y + self.height as i64
    }
}

/// A physical display as reported by the OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub id: String,
    pub label: String,
    pub bounds: Rect,
    pub scale_factor: f64,
    pub primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

/// A shareable source as returned by the capture enumerator, before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCaptureSource {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    /// Set for screen sources; window sources usually only carry bounds.
    pub display_id: Option<String>,
    pub bounds: Option<Rect>,
    pub thumbnail_png: Vec<u8>,
}

/// A shareable source as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSource {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    /// `data:image/png;base64,...` URL, empty when the source had no thumbnail.
    pub thumbnail: String,
    pub display: Option<DisplayInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenList {
    pub displays: Vec<DisplayInfo>,
    pub sources: Vec<ScreenSource>,
}

/// Capture constraints in the shape `getUserMedia` expects for desktop capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStreamConstraints {
    pub audio: bool,
    pub video: VideoConstraints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub mandatory: DesktopCapture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopCapture {
    pub chrome_media_source: String,
    pub chrome_media_source_id: String,
}
