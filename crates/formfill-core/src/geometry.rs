//! Coordinate transformation between overlay (screen) space and PDF space
//!
//! Stored field geometry is always PDF space: bottom-left origin, Y up,
//! unscaled points. The overlay works in screen space: top-left origin,
//! Y down, multiplied by the zoom factor. Conversion happens only at
//! render time and both directions are pure.

use crate::config::{FieldConfig, ZoomConfig};
use formfill_types::{FieldType, PageSize, PdfRect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

/// Box in screen space, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a screen-space point to PDF space
pub fn point_to_pdf(point: ScreenPoint, page_height: f64, scale: f64) -> PdfPoint {
    PdfPoint {
        x: point.x / scale,
        y: page_height - point.y / scale,
    }
}

/// Convert a PDF-space point to screen space
pub fn point_to_screen(point: PdfPoint, page_height: f64, scale: f64) -> ScreenPoint {
    ScreenPoint {
        x: point.x * scale,
        y: (page_height - point.y) * scale,
    }
}

/// Convert a field box from the overlay into canonical PDF space.
///
/// The screen anchor is the top-left corner, the PDF anchor is the
/// bottom-left one, so the field height is subtracted after the flip.
pub fn to_pdf_space(rect: ScreenRect, page_height: f64, scale: f64) -> PdfRect {
    let width = rect.width / scale;
    let height = rect.height / scale;
    PdfRect {
        x: rect.x / scale,
        y: page_height - rect.y / scale - height,
        width,
        height,
    }
}

/// Convert a stored field box into overlay coordinates
pub fn to_screen_space(rect: PdfRect, page_height: f64, scale: f64) -> ScreenRect {
    ScreenRect {
        x: rect.x * scale,
        y: (page_height - rect.y - rect.height) * scale,
        width: rect.width * scale,
        height: rect.height * scale,
    }
}

/// Clamp a requested zoom factor into the configured range
pub fn clamp_zoom(scale: f64, zoom: &ZoomConfig) -> f64 {
    if scale.is_nan() {
        return 1.0_f64.clamp(zoom.min, zoom.max);
    }
    scale.clamp(zoom.min, zoom.max)
}

pub fn zoom_in(scale: f64, zoom: &ZoomConfig) -> f64 {
    clamp_zoom(round_zoom(scale + zoom.step), zoom)
}

pub fn zoom_out(scale: f64, zoom: &ZoomConfig) -> f64 {
    clamp_zoom(round_zoom(scale - zoom.step), zoom)
}

// Keeps repeated 0.1 steps from drifting (1.0 + 0.1 + 0.1 != 1.2)
fn round_zoom(scale: f64) -> f64 {
    (scale * 100.0).round() / 100.0
}

/// Keep a dragged field fully inside its page
pub fn clamp_to_page(rect: PdfRect, page: PageSize) -> PdfRect {
    let max_x = (page.width - rect.width).max(0.0);
    let max_y = (page.height - rect.height).max(0.0);
    PdfRect {
        x: sanitize(rect.x).clamp(0.0, max_x),
        y: sanitize(rect.y).clamp(0.0, max_y),
        ..rect
    }
}

/// Enforce minimum dimensions before a field enters the store
pub fn clamp_size(field_type: FieldType, width: f64, height: f64, limits: &FieldConfig) -> (f64, f64) {
    let (min_w, min_h) = match field_type {
        FieldType::Checkbox => (limits.checkbox_min_size, limits.checkbox_min_size),
        _ => (limits.min_width, limits.min_height),
    };
    (sanitize(width).max(min_w), sanitize(height).max(min_h))
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// A page as currently displayed: its size in points plus the zoom factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub page: PageSize,
    pub scale: f64,
}

impl Viewport {
    /// Create a viewport; the scale is clamped into the zoom range
    pub fn new(page: PageSize, scale: f64, zoom: &ZoomConfig) -> Self {
        Self {
            page,
            scale: clamp_zoom(scale, zoom),
        }
    }

    pub fn to_pdf(&self, rect: ScreenRect) -> PdfRect {
        to_pdf_space(rect, self.page.height, self.scale)
    }

    pub fn to_screen(&self, rect: PdfRect) -> ScreenRect {
        to_screen_space(rect, self.page.height, self.scale)
    }

    /// Pixel size of the rendered page surface
    pub fn surface_size(&self) -> (f64, f64) {
        (self.page.width * self.scale, self.page.height * self.scale)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scale() -> impl Strategy<Value = f64> {
        0.5f64..=2.0
    }

    proptest! {
        /// PDF -> screen -> PDF returns the original box
        #[test]
        fn roundtrip_pdf_screen_pdf(
            x in 0.0f64..2000.0,
            y in 0.0f64..2000.0,
            w in 1.0f64..600.0,
            h in 1.0f64..600.0,
            page_height in 1.0f64..2000.0,
            scale in scale(),
        ) {
            let rect = PdfRect::new(x, y, w, h);
            let back = to_pdf_space(to_screen_space(rect, page_height, scale), page_height, scale);
            prop_assert!((back.x - x).abs() < 1e-6, "x: {} vs {}", back.x, x);
            prop_assert!((back.y - y).abs() < 1e-6, "y: {} vs {}", back.y, y);
            prop_assert!((back.width - w).abs() < 1e-6);
            prop_assert!((back.height - h).abs() < 1e-6);
        }

        /// screen -> PDF -> screen returns the original box
        #[test]
        fn roundtrip_screen_pdf_screen(
            x in 0.0f64..3000.0,
            y in 0.0f64..3000.0,
            w in 1.0f64..600.0,
            h in 1.0f64..600.0,
            page_height in 1.0f64..2000.0,
            scale in scale(),
        ) {
            let rect = ScreenRect { x, y, width: w, height: h };
            let back = to_screen_space(to_pdf_space(rect, page_height, scale), page_height, scale);
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
            prop_assert!((back.width - w).abs() < 1e-6);
            prop_assert!((back.height - h).abs() < 1e-6);
        }

        #[test]
        fn roundtrip_points(
            x in 0.0f64..2000.0,
            y in 0.0f64..2000.0,
            page_height in 1.0f64..2000.0,
            scale in scale(),
        ) {
            let p = PdfPoint { x, y };
            let back = point_to_pdf(point_to_screen(p, page_height, scale), page_height, scale);
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
        }

        #[test]
        fn clamped_zoom_stays_in_range(requested in -10.0f64..10.0) {
            let zoom = ZoomConfig::default();
            let s = clamp_zoom(requested, &zoom);
            prop_assert!((0.5..=2.0).contains(&s));
        }
    }
}
