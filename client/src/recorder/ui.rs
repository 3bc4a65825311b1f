use common::{ContainerFormat, OutputArtifact, OutputSettings, Presenter, Status};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::{ClientConfig, ElementIds};
use crate::recorder::host::BrowserBlob;
use crate::recorder::media_streams::BrowserStream;
use crate::recorder::state;

/// Drives the recorder page through the element ids in [`ElementIds`].
pub struct DomPresenter {
    document: Document,
    elements: ElementIds,
    download_label: String,
}

impl DomPresenter {
    pub fn new(config: &ClientConfig) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;

        Ok(Self {
            document,
            elements: config.elements.clone(),
            download_label: config.download_label.clone(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            log::warn!("Element #{} not found", id);
        }
        element
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.element(id).and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn set_display(&self, id: &str, value: &str) {
        if let Some(element) = self.html_element(id) {
            element.style().set_property("display", value).ok();
        }
    }

    fn set_button_disabled(&self, id: &str, disabled: bool) {
        if let Some(button) = self
            .element(id)
            .and_then(|e| e.dyn_into::<web_sys::HtmlButtonElement>().ok())
        {
            button.set_disabled(disabled);
        }
    }

    fn selected_format(&self) -> Option<ContainerFormat> {
        let selector = format!("input[name={}]:checked", self.elements.format_input);
        let input = self
            .document
            .query_selector(&selector)
            .ok()
            .flatten()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;

        match input.value().parse() {
            Ok(format) => Some(format),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    fn file_name_field(&self) -> String {
        self.element(&self.elements.file_name_input)
            .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn render_artifact(&self, artifact: &OutputArtifact<BrowserBlob>) -> Result<(), JsValue> {
        let container = self
            .element(&self.elements.recordings_container)
            .ok_or("Recordings container not found")?;

        let video: web_sys::HtmlVideoElement = self.document.create_element("video")?.dyn_into()?;
        video.set_controls(true);
        video.set_src(artifact.playback_url.as_str());

        let link: web_sys::HtmlAnchorElement = self.document.create_element("a")?.dyn_into()?;
        link.set_href(artifact.download_url.as_str());
        link.set_download(&artifact.file_name);
        link.set_text_content(Some(&self.download_label));

        container.append_child(&video)?;
        container.append_child(&link)?;
        Ok(())
    }
}

impl Presenter for DomPresenter {
    type Stream = BrowserStream;
    type Blob = BrowserBlob;

    fn show_status(&self, status: &Status) {
        let Some(badge) = self.html_element(&self.elements.status) else {
            return;
        };

        // Label may carry a browser message; keep it out of the markup.
        badge.set_inner_html("<b>Status:</b> ");
        let text = self.document.create_text_node(status.label());
        if let Err(e) = badge.append_child(&text) {
            log::warn!("Failed to render status: {:?}", e);
        }
        badge.style().set_property("color", status.color()).ok();
    }

    fn set_recording_controls(&self, recording: bool) {
        self.set_button_disabled(&self.elements.start_button, recording);
        self.set_button_disabled(&self.elements.stop_button, !recording);
    }

    fn bind_preview(&self, stream: Option<&BrowserStream>) {
        let Some(preview) = self
            .element(&self.elements.preview)
            .and_then(|e| e.dyn_into::<web_sys::HtmlMediaElement>().ok())
        else {
            return;
        };

        match stream.map(BrowserStream::to_media_stream).transpose() {
            Ok(media_stream) => preview.set_src_object(media_stream.as_ref()),
            Err(e) => log::warn!("Failed to bind preview: {:?}", e),
        }
    }

    fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            format: self.selected_format(),
            file_name: self.file_name_field(),
        }
    }

    fn publish(&self, artifact: &OutputArtifact<BrowserBlob>) {
        if let Err(e) = self.render_artifact(artifact) {
            log::error!("Failed to show recording {}: {:?}", artifact.file_name, e);
        }
    }

    fn reveal_recordings(&self) {
        self.set_display(&self.elements.recordings_section, "block");
    }

    fn clear_recordings(&self) {
        if let Some(container) = self.element(&self.elements.recordings_container) {
            container.set_inner_html("");
        }
        self.set_display(&self.elements.recordings_section, "none");
    }
}

pub fn setup_recording_buttons(document: &Document, elements: &ElementIds) {
    // Start recording button
    if let Some(button) = document.get_element_by_id(&elements.start_button) {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            wasm_bindgen_futures::spawn_local(async {
                match state::start_recording().await {
                    Ok(()) => log::info!("[Recorder] Started successfully"),
                    Err(e) => log::error!("[Recorder] Start failed: {:?}", e),
                }
            });
        }) as Box<dyn FnMut(_)>);

        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("Start button #{} not found", elements.start_button);
    }

    // Stop recording button
    if let Some(button) = document.get_element_by_id(&elements.stop_button) {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            wasm_bindgen_futures::spawn_local(async {
                match state::stop_recording().await {
                    Ok(recording) => log::info!("[Recorder] Saved {}", recording.file_name),
                    Err(e) => log::error!("[Recorder] Stop failed: {:?}", e),
                }
            });
        }) as Box<dyn FnMut(_)>);

        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("Stop button #{} not found", elements.stop_button);
    }
}
