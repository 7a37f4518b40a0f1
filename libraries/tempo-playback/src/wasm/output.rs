//! Media output backed by a JavaScript object

use crate::error::{PlaybackError, Result};
use crate::output::MediaOutput;
use crate::types::LoadToken;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// Forwards output commands to a JS object
///
/// The object is expected to have `load(token, url)`, `play()`, `pause()`,
/// `seek(seconds)` and `setVolume(level)` methods. Missing methods are
/// treated as no-ops for `pause`/`seek`/`setVolume` and as errors for
/// `load`/`play`.
pub struct JsMediaOutput {
    target: JsValue,
}

impl JsMediaOutput {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> {
        let method = Reflect::get(&self.target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| PlaybackError::Output(format!("output has no `{name}` method")))?;

        let args: Array = args.iter().collect();
        method
            .apply(&self.target, &args)
            .map_err(|e| PlaybackError::Output(describe(&e)))
    }

    fn notify(&self, name: &str, args: &[JsValue]) {
        if let Err(e) = self.call(name, args) {
            tracing::debug!(method = name, error = %e, "output call failed");
        }
    }
}

impl MediaOutput for JsMediaOutput {
    fn load(&mut self, token: LoadToken, url: &str) -> Result<()> {
        self.call("load", &[JsValue::from(token.value()), JsValue::from_str(url)])?;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.call("play", &[])?;
        Ok(())
    }

    fn pause(&mut self) {
        self.notify("pause", &[]);
    }

    fn seek(&mut self, seconds: f64) {
        self.notify("seek", &[JsValue::from_f64(seconds)]);
    }

    fn set_volume(&mut self, level: f32) {
        self.notify("setVolume", &[JsValue::from_f64(f64::from(level))]);
    }
}

fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            error
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{error:?}"))
}
