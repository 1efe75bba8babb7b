//! WASM bindings for the PDF form editor
//!
//! All editor state lives in Rust inside a `FormFillSession`. JavaScript
//! renders pages, forwards pointer events in screen coordinates and reads
//! files; geometry, detection, validation and export happen here.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { FormFillSession } from './pkg/formfill_wasm.js';
//!
//! await init();
//! const session = new FormFillSession();
//!
//! // Guard against the user picking another file while this one loads
//! const generation = session.beginLoad();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const info = session.finishLoad(generation, file.name, file.type, bytes);
//! if (info === null) return; // superseded
//!
//! const candidates = session.detectFields();
//! session.acceptCandidate(1, 0);
//! const id = session.addFieldAtScreen("signature", 1, event.offsetX, event.offsetY, scale);
//! session.updateField(id, JSON.stringify({ value: "Jane Doe" }));
//!
//! const report = session.validate();
//! if (report.isValid) session.exportAndDownload("filled.pdf");
//! ```

pub mod download;
pub mod session;

use formfill_core::config::ZoomConfig;
use formfill_core::geometry;
use wasm_bindgen::prelude::*;

pub use session::{DocumentInfo, FormFillSession, ScreenField};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[wasm_bindgen(js_name = clampZoom)]
pub fn clamp_zoom(scale: f64) -> f64 {
    geometry::clamp_zoom(scale, &ZoomConfig::default())
}

#[wasm_bindgen(js_name = zoomIn)]
pub fn zoom_in(scale: f64) -> f64 {
    geometry::zoom_in(scale, &ZoomConfig::default())
}

#[wasm_bindgen(js_name = zoomOut)]
pub fn zoom_out(scale: f64) -> f64 {
    geometry::zoom_out(scale, &ZoomConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_helpers_stay_in_range() {
        assert_eq!(zoom_in(1.0), 1.1);
        assert_eq!(zoom_in(2.0), 2.0);
        assert_eq!(zoom_out(0.5), 0.5);
        assert_eq!(clamp_zoom(5.0), 2.0);
    }
}
