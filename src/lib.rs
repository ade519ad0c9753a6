//! scorelayout: print layout engine for multi-track MIDI sequences.
//!
//! Folds repeated measures and riffs into repeat markers, spaces the
//! remaining measures in proportion to their note density, and packs the
//! result into fixed-width lines and fixed-height pages. Sizes are abstract
//! units; drawing is left to the caller.
//!
//! # Example
//! ```
//! use scorelayout::{layout_piece, LayoutConfig, Notation, Piece, Track};
//!
//! let mut piece = Piece::new(96);
//! piece.add_measures(4, 4, 4);
//! let mut lead = Track::new("Lead", Notation::default());
//! for m in 0..4 {
//!     lead.add_note(m * 384, m * 384 + 96, 60);
//! }
//! piece.add_track(lead);
//!
//! let run = layout_piece(&piece, &LayoutConfig::default()).unwrap();
//! println!("Pages: {}", run.pages.len());
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod notation;

#[cfg(target_os = "android")]
pub mod android;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use export::{layout_to_json, LayoutSummary};
pub use layout::{
    compute_layout, ElementKind, LayoutElement, LayoutLine, LayoutPage, LayoutRun,
};
pub use model::*;
pub use notation::{renderer_for, NotationRenderer};

/// Lay out an in-memory piece, picking each track's renderer from its notation.
pub fn layout_piece(piece: &Piece, config: &LayoutConfig) -> Result<LayoutRun, LayoutError> {
    let renderers: Vec<Box<dyn NotationRenderer>> = piece
        .tracks
        .iter()
        .map(|track| renderer_for(&track.notation))
        .collect();
    let renderers: Vec<&dyn NotationRenderer> = renderers.iter().map(|r| r.as_ref()).collect();
    compute_layout(piece, &renderers, config)
}

/// Parse a piece and a configuration from JSON, lay the piece out and
/// return the layout summary as JSON.
///
/// An empty `config_json` uses the default configuration.
pub fn layout_json(piece_json: &str, config_json: &str) -> Result<String, LayoutError> {
    let piece = Piece::from_json(piece_json)?;
    let config = if config_json.trim().is_empty() {
        LayoutConfig::default()
    } else {
        LayoutConfig::from_json(config_json)?
    };

    let run = layout_piece(&piece, &config)?;
    Ok(layout_to_json(&LayoutSummary::from_run(&run)))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Lay out a piece given as JSON and return the layout summary as a JSON C
/// string, or null on any error.
/// The caller must free the returned string with `scorelayout_free_string`.
///
/// # Safety
/// `piece_json` must be a valid null-terminated UTF-8 C string.
/// `config_json` may be null, which selects the default configuration.
#[no_mangle]
pub unsafe extern "C" fn scorelayout_layout_json(
    piece_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    if piece_json.is_null() {
        return std::ptr::null_mut();
    }
    let piece = match unsafe { CStr::from_ptr(piece_json) }.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };
    let config = if config_json.is_null() {
        ""
    } else {
        match unsafe { CStr::from_ptr(config_json) }.to_str() {
            Ok(s) => s,
            Err(_) => return std::ptr::null_mut(),
        }
    };

    match layout_json(piece, config) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(e) => {
            log::warn!("layout failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by scorelayout functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scorelayout function, or null.
#[no_mangle]
pub unsafe extern "C" fn scorelayout_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
