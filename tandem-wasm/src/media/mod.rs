use crate::link::WebTrack;
use async_trait::async_trait;
use tandem_client::media::{CaptureConstraints, DeviceError, MediaSource};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

fn device_err(context: &str, e: JsValue) -> DeviceError {
    DeviceError::Unavailable(format!("{}: {:?}", context, e))
}

/// [`MediaSource`] over `navigator.mediaDevices.getUserMedia`.
#[derive(Default)]
pub struct WebMediaSource;

impl WebMediaSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl MediaSource for WebMediaSource {
    type Track = WebTrack;

    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Vec<WebTrack>, DeviceError> {
        let window = web_sys::window()
            .ok_or_else(|| DeviceError::Unavailable("no window".to_string()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| device_err("media devices", e))?;

        let ms_constraints = web_sys::MediaStreamConstraints::new();
        ms_constraints.set_audio(&JsValue::from_bool(constraints.audio));

        let video = js_sys::Object::new();
        let _ = js_sys::Reflect::set(
            &video,
            &"facingMode".into(),
            &constraints.facing.as_constraint().into(),
        );
        ms_constraints.set_video(&video.into());

        let promise = devices
            .get_user_media_with_constraints(&ms_constraints)
            .map_err(|e| device_err("getUserMedia", e))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| device_err("capture denied", e))?;
        let stream: web_sys::MediaStream = stream
            .dyn_into()
            .map_err(|e| device_err("unexpected capture result", e))?;

        let mut tracks = Vec::new();
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
                tracks.push(WebTrack::new(track));
            }
        }
        Ok(tracks)
    }
}
