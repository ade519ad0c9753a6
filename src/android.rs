//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::layout_json;

/// Lay out a piece given as JSON and return the layout summary as JSON.
///
/// Called from Kotlin as:
///   external fun layoutJson(pieceJson: String, configJson: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_scorelayout_app_ScoreLayout_layoutJson(
    mut env: JNIEnv,
    _class: JClass,
    piece_json: JString,
    config_json: JString,
) -> jstring {
    let piece: String = match env.get_string(&piece_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let config: String = if config_json.is_null() {
        String::new()
    } else {
        match env.get_string(&config_json) {
            Ok(s) => s.into(),
            Err(_) => return std::ptr::null_mut(),
        }
    };

    match layout_json(&piece, &config) {
        Ok(json) => match env.new_string(&json) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::warn!("layout failed: {e}");
            std::ptr::null_mut()
        }
    }
}
