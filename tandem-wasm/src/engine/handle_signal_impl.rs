use std::rc::Rc;
use tandem_client::call::CallLifecycle;
use tandem_core::{IceServerConfig, SignalMessage};
use wasm_bindgen::JsValue;

use crate::engine::{CallEngine, phase_name};
use crate::link::WebPeerLink;
use crate::logger::Logger;
use crate::media::WebMediaSource;

impl CallEngine {
    /// One inbound text frame from the relay. The ICE config is consumed
    /// here; everything else is handed to the call lifecycle.
    pub(super) fn handle_signal(&self, text: String) {
        let msg: SignalMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                Logger::warn(&format!("JSON Error: {}. Text: {}", e, text));
                return;
            }
        };

        match msg {
            SignalMessage::IceConfig { ice_servers } => {
                Logger::info(&format!(
                    "Received ICE config: {} server(s)",
                    ice_servers.len()
                ));
                self.ensure_call(ice_servers);
            }
            msg => {
                let call = self.inner.borrow().call.clone();
                let Some(call) = call else {
                    Logger::warn("Envelope before ICE config; dropping");
                    return;
                };
                wasm_bindgen_futures::spawn_local(async move {
                    call.handle_signal(msg).await;
                });
            }
        }
    }

    /// Builds the call lifecycle over a peer link configured with the
    /// relay-provided servers, then joins any room requested meanwhile.
    fn ensure_call(&self, ice_servers: Vec<IceServerConfig>) {
        let (override_servers, display_name, exists) = {
            let inner = self.inner.borrow();
            (
                inner.config.ice_servers.clone(),
                inner.config.display_name.clone(),
                inner.call.is_some(),
            )
        };
        if exists {
            return;
        }

        let servers = override_servers.unwrap_or(ice_servers);
        let link = match WebPeerLink::new(Some(&servers)) {
            Ok(link) => link,
            Err(e) => {
                Logger::error(&e);
                return;
            }
        };
        let call = CallLifecycle::new(link, WebMediaSource::new(), self.sink.clone(), display_name);

        let handle = Rc::clone(&self.inner);
        call.on_remote_feed(move |feed| {
            if let Some(cb) = &handle.borrow().on_remote_stream {
                let _ = cb.call1(&JsValue::NULL, feed.media_stream().as_ref());
            }
        });

        let handle = Rc::clone(&self.inner);
        call.on_phase_change(move |phase| {
            if let Some(cb) = &handle.borrow().on_phase_change {
                let _ = cb.call1(&JsValue::NULL, &JsValue::from_str(phase_name(phase)));
            }
        });

        let pending = {
            let mut inner = self.inner.borrow_mut();
            inner.call = Some(call.clone());
            inner.pending_room.take()
        };
        if let Some(room) = pending {
            if let Err(e) = call.join_room(&room) {
                Logger::warn(&format!("Join refused: {}", e));
            }
        }
    }
}
