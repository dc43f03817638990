use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::WebSocket;

use crate::engine::CallEngine;
use crate::logger::Logger;

impl CallEngine {
    pub(super) fn ws_setup(&self, url: &str) -> Result<(), JsValue> {
        let ws: WebSocket = web_sys::WebSocket::new(url)?;

        let onopen_callback = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
            Logger::info("WS open");
        }));
        ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
        onopen_callback.forget();

        let onmessage_callback = {
            let engine = self.clone();
            Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(
                move |e: web_sys::MessageEvent| {
                    if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                        let text: String = text.into();
                        engine.handle_signal(text);
                    }
                },
            ))
        };
        ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
        onmessage_callback.forget();

        let onerror_callback = Closure::<dyn FnMut(web_sys::ErrorEvent)>::wrap(Box::new(
            move |e: web_sys::ErrorEvent| {
                Logger::error(&e.into());
            },
        ));
        ws.set_onerror(Some(onerror_callback.as_ref().unchecked_ref()));
        onerror_callback.forget();

        let onclose_callback = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| {
            Logger::info("WS closed");
        }));
        ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
        onclose_callback.forget();

        self.sink.set(ws);
        Ok(())
    }
}
