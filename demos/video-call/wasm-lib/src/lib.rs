use tandem::client::{CallEngine, EngineConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct VideoCallClient {
    engine: CallEngine,
}

#[wasm_bindgen]
impl VideoCallClient {
    #[wasm_bindgen(constructor)]
    pub fn new(url: String, display_name: String) -> Result<VideoCallClient, JsValue> {
        let config = EngineConfig {
            url,
            display_name,
            ice_servers: None,
        };
        Ok(Self {
            engine: CallEngine::new(config)?,
        })
    }

    pub fn join(&self, room: String) {
        self.engine.join_room(&room);
    }

    pub fn hang_up(&self) {
        self.engine.hang_up();
    }

    pub fn rejoin(&self) {
        self.engine.rejoin();
    }

    pub fn leave(&self) {
        self.engine.leave();
    }

    pub fn switch_camera(&self) {
        self.engine.switch_camera();
    }

    pub fn set_muted(&self, muted: bool) {
        self.engine.set_muted(muted);
    }

    /// `cb` receives the remote MediaStream, ready for a video element.
    pub fn on_remote_stream(&self, cb: js_sys::Function) {
        self.engine.set_on_remote_stream(cb);
    }

    /// `cb` receives the phase name on every transition.
    pub fn on_phase_change(&self, cb: js_sys::Function) {
        self.engine.set_on_phase_change(cb);
    }
}
