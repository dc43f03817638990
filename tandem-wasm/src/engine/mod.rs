use crate::link::WebPeerLink;
use crate::logger::Logger;
use crate::media::WebMediaSource;
use std::cell::RefCell;
use std::rc::Rc;
use tandem_client::call::{CallLifecycle, CallPhase};
use tandem_client::signal_sink::SignalSink;
use tandem_core::{IceServerConfig, SignalMessage};
use wasm_bindgen::prelude::*;

mod handle_signal_impl;
mod ws_setup_impl;

pub type WebCall = CallLifecycle<WebPeerLink, WebMediaSource, WebSocketSink>;

#[derive(Clone)]
pub struct EngineConfig {
    /// Relay WebSocket endpoint, e.g. `ws://host:8001/ws`.
    pub url: String,
    pub display_name: String,
    /// Overrides the relay-provided ICE servers when set.
    pub ice_servers: Option<Vec<IceServerConfig>>,
}

/// Outgoing half of the relay transport: serializes envelopes onto the
/// engine's WebSocket. Envelopes sent before the socket exists are dropped,
/// matching the relay's own fire-and-forget semantics.
#[derive(Clone, Default)]
pub struct WebSocketSink {
    ws: Rc<RefCell<Option<web_sys::WebSocket>>>,
}

impl WebSocketSink {
    fn set(&self, ws: web_sys::WebSocket) {
        *self.ws.borrow_mut() = Some(ws);
    }
}

impl SignalSink for WebSocketSink {
    fn send(&self, msg: SignalMessage) {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                Logger::warn(&format!("Failed to serialize envelope: {}", e));
                return;
            }
        };

        match &*self.ws.borrow() {
            Some(ws) => {
                if let Err(e) = ws.send_with_str(&json) {
                    Logger::error(&e);
                }
            }
            None => Logger::warn("WS not connected; dropping envelope"),
        }
    }
}

struct EngineInner {
    config: EngineConfig,
    call: Option<WebCall>,
    /// Room requested before the relay handshake finished; joined as soon as
    /// the ICE config arrives.
    pending_room: Option<String>,
    on_remote_stream: Option<js_sys::Function>,
    on_phase_change: Option<js_sys::Function>,
}

/// Browser-side entry point: owns the relay WebSocket and the call
/// lifecycle built over it.
///
/// The lifecycle is created once the relay's ICE config arrives, so the
/// underlying peer connection is always configured with live servers.
#[derive(Clone)]
pub struct CallEngine {
    inner: Rc<RefCell<EngineInner>>,
    sink: WebSocketSink,
}

impl CallEngine {
    pub fn new(config: EngineConfig) -> Result<Self, JsValue> {
        let engine = CallEngine {
            inner: Rc::new(RefCell::new(EngineInner {
                config: config.clone(),
                call: None,
                pending_room: None,
                on_remote_stream: None,
                on_phase_change: None,
            })),
            sink: WebSocketSink::default(),
        };

        engine.ws_setup(&config.url)?;
        Ok(engine)
    }

    pub fn call(&self) -> Option<WebCall> {
        self.inner.borrow().call.clone()
    }

    pub fn phase(&self) -> CallPhase {
        self.inner
            .borrow()
            .call
            .as_ref()
            .map(|call| call.phase())
            .unwrap_or(CallPhase::Idle)
    }

    /// Invoked with the remote `MediaStream` when the peer's feed arrives;
    /// the UI attaches it to a video element.
    pub fn set_on_remote_stream(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_remote_stream = Some(callback);
    }

    /// Invoked with the phase name on every transition.
    pub fn set_on_phase_change(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_phase_change = Some(callback);
    }

    /// Joins `room` once the relay handshake has delivered an ICE config;
    /// until then the room is remembered and joined on arrival.
    pub fn join_room(&self, room: &str) {
        let call = self.inner.borrow().call.clone();
        match call {
            Some(call) => {
                if let Err(e) = call.join_room(room) {
                    Logger::warn(&format!("Join refused: {}", e));
                }
            }
            None => {
                self.inner.borrow_mut().pending_room = Some(room.to_string());
            }
        }
    }

    pub fn hang_up(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            call.hang_up();
        }
    }

    pub fn switch_camera(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = call.switch_camera().await {
                    Logger::warn(&format!("Camera switch failed: {}", e));
                }
            });
        }
    }

    pub fn rejoin(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = call.rejoin().await {
                    Logger::warn(&format!("Rejoin refused: {}", e));
                }
            });
        }
    }

    pub fn leave(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            if let Err(e) = call.leave() {
                Logger::warn(&format!("Leave refused: {}", e));
            }
        }
    }

    pub fn reset(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            if let Err(e) = call.reset() {
                Logger::warn(&format!("Reset refused: {}", e));
            }
        }
    }

    pub fn set_muted(&self, muted: bool) {
        if let Some(call) = self.inner.borrow().call.clone() {
            call.set_muted(muted);
        }
    }

    /// Manual retry for attaching the local capture.
    pub fn send_streams(&self) {
        if let Some(call) = self.inner.borrow().call.clone() {
            wasm_bindgen_futures::spawn_local(async move {
                call.send_streams().await;
            });
        }
    }
}

fn phase_name(phase: CallPhase) -> &'static str {
    match phase {
        CallPhase::Idle => "idle",
        CallPhase::WaitingForPeer => "waiting-for-peer",
        CallPhase::OutgoingRinging => "outgoing-ringing",
        CallPhase::IncomingOffered => "incoming-offered",
        CallPhase::Connected => "connected",
        CallPhase::PeerLeft(_) => "peer-left",
        CallPhase::TornDown => "torn-down",
    }
}
