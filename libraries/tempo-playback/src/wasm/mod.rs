//! WASM bindings for tempo-playback
//!
//! Exposes the playback session to the browser. The page supplies an object
//! wrapping its `<audio>` element and forwards the element's events back
//! into the session.

mod output;
mod session;

pub use output::JsMediaOutput;
pub use session::WasmSession;
