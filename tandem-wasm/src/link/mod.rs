use async_trait::async_trait;
use tandem_client::media::{LocalTrack, MediaKind, RemoteFeed};
use tandem_client::session::{NegotiationError, PeerLink};
use tandem_core::util::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use tandem_core::{IceServerConfig, SdpKind, SessionDescription};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

fn link_err(e: JsValue) -> NegotiationError {
    NegotiationError::Link(format!("{:?}", e))
}

/// A local `MediaStreamTrack` handle.
#[derive(Clone)]
pub struct WebTrack {
    inner: web_sys::MediaStreamTrack,
}

impl WebTrack {
    pub fn new(inner: web_sys::MediaStreamTrack) -> Self {
        Self { inner }
    }

    pub fn raw(&self) -> &web_sys::MediaStreamTrack {
        &self.inner
    }
}

impl LocalTrack for WebTrack {
    fn kind(&self) -> MediaKind {
        if self.inner.kind() == "audio" {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }

    fn stop(&self) {
        self.inner.stop();
    }

    fn set_enabled(&self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }
}

/// The remote participant's `MediaStream`, handed to the UI for rendering.
#[derive(Clone)]
pub struct WebFeed {
    inner: web_sys::MediaStream,
}

impl WebFeed {
    pub fn media_stream(&self) -> &web_sys::MediaStream {
        &self.inner
    }
}

impl RemoteFeed for WebFeed {
    fn stop(&self) {
        for track in self.inner.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// [`PeerLink`] over the browser's `RtcPeerConnection`.
pub struct WebPeerLink {
    pc: web_sys::RtcPeerConnection,
    outgoing: web_sys::MediaStream,
}

impl WebPeerLink {
    pub fn new(ice_servers: Option<&[IceServerConfig]>) -> Result<Self, JsValue> {
        let rtc_config = web_sys::RtcConfiguration::new();
        let ice_servers_arr = js_sys::Array::new();

        if let Some(servers) = ice_servers {
            for server_config in servers {
                let rtc_ice_server = web_sys::RtcIceServer::new();

                let urls = js_sys::Array::new();
                for url in &server_config.urls {
                    urls.push(&JsValue::from_str(url));
                }
                rtc_ice_server.set_urls(&urls);

                if let Some(username) = &server_config.username {
                    rtc_ice_server.set_username(username);
                }
                if let Some(credential) = &server_config.credential {
                    rtc_ice_server.set_credential(credential);
                }

                ice_servers_arr.push(&rtc_ice_server);
            }
        } else {
            let stun_urls = js_sys::Array::new();
            stun_urls.push(&JsValue::from_str(DEFAULT_STUN_ADDR));
            stun_urls.push(&JsValue::from_str(DEFAULT_STUN_ADDR_2));

            let stun_server = web_sys::RtcIceServer::new();
            stun_server.set_urls(&stun_urls);
            ice_servers_arr.push(&stun_server);
        }

        rtc_config.set_ice_servers(&ice_servers_arr);

        let pc = web_sys::RtcPeerConnection::new_with_configuration(&rtc_config)?;
        let outgoing = web_sys::MediaStream::new()?;

        Ok(Self { pc, outgoing })
    }

    fn description_init(desc: &SessionDescription) -> web_sys::RtcSessionDescriptionInit {
        let kind = match desc.kind {
            SdpKind::Offer => web_sys::RtcSdpType::Offer,
            SdpKind::Answer => web_sys::RtcSdpType::Answer,
        };
        let init = web_sys::RtcSessionDescriptionInit::new(kind);
        init.set_sdp(&desc.sdp);
        init
    }

    async fn sdp_from_promise(
        promise: js_sys::Promise,
        kind: SdpKind,
    ) -> Result<SessionDescription, NegotiationError> {
        let value = JsFuture::from(promise).await.map_err(link_err)?;
        let sdp = js_sys::Reflect::get(&value, &"sdp".into())
            .map_err(link_err)?
            .as_string()
            .ok_or_else(|| NegotiationError::Link("description without sdp".to_string()))?;
        Ok(SessionDescription { kind, sdp })
    }
}

#[async_trait(?Send)]
impl PeerLink for WebPeerLink {
    type Track = WebTrack;
    type Remote = WebFeed;

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        Self::sdp_from_promise(self.pc.create_offer(), SdpKind::Offer).await
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        Self::sdp_from_promise(self.pc.create_answer(), SdpKind::Answer).await
    }

    async fn set_local_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), NegotiationError> {
        let init = Self::description_init(desc);
        JsFuture::from(self.pc.set_local_description(&init))
            .await
            .map_err(link_err)?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), NegotiationError> {
        let init = Self::description_init(desc);
        JsFuture::from(self.pc.set_remote_description(&init))
            .await
            .map_err(link_err)?;
        Ok(())
    }

    async fn replace_track(&self, track: &WebTrack) -> Result<bool, NegotiationError> {
        let wanted = track.kind();
        for sender in self.pc.get_senders().iter() {
            let Ok(sender) = sender.dyn_into::<web_sys::RtcRtpSender>() else {
                continue;
            };
            let Some(current) = sender.track() else {
                continue;
            };
            if WebTrack::new(current).kind() == wanted {
                JsFuture::from(sender.replace_track(Some(track.raw())))
                    .await
                    .map_err(link_err)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn add_track(&self, track: &WebTrack) -> Result<(), NegotiationError> {
        self.pc
            .add_track(track.raw(), &self.outgoing, &js_sys::Array::new());
        Ok(())
    }

    fn set_on_negotiation_needed(&self, callback: Box<dyn Fn()>) {
        let closure = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |_| callback()));
        self.pc
            .set_onnegotiationneeded(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn set_on_track(&self, callback: Box<dyn Fn(WebFeed)>) {
        let closure = Closure::<dyn FnMut(web_sys::RtcTrackEvent)>::wrap(Box::new(
            move |ev: web_sys::RtcTrackEvent| {
                if let Some(stream) = ev.streams().get(0).dyn_into::<web_sys::MediaStream>().ok() {
                    callback(WebFeed { inner: stream });
                }
            },
        ));
        self.pc.set_ontrack(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn close(&self) {
        self.pc.close();
    }
}
