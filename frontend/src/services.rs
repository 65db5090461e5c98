use gloo_console::error;
use gloo_utils::{document, window};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Reflect;
use web_sys::{Element, Node};
use workout_tracker_lib::codec::KeyValueStore;
use workout_tracker_lib::projector::SummaryList;
use workout_tracker_lib::workout::Coordinate;
use yew::Callback;

/// `localStorage` adapter. Storage failures are logged, never fatal; a
/// missing value is indistinguishable from an unavailable store.
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        window().local_storage().ok().flatten()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        match window().local_storage() {
            Ok(Some(storage)) => {
                if storage.set_item(key, value).is_err() {
                    error!("failed to persist workouts");
                }
            }
            _ => error!("local storage is unavailable"),
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(Some(storage)) = window().local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Summary list rendered into an imperatively owned `<ul>`; entries are the
/// inserted elements themselves, newest first.
pub struct DomSummaryList {
    container: Element,
}

impl DomSummaryList {
    pub fn new() -> Self {
        let container = document().create_element("ul").unwrap();
        container.set_class_name("workouts");
        Self { container }
    }

    pub fn node(&self) -> Node {
        self.container.clone().into()
    }
}

impl SummaryList for DomSummaryList {
    type Entry = Element;

    fn append(&self, _id: &str, html: &str) -> Element {
        self.container
            .insert_adjacent_html("afterbegin", html)
            .unwrap();
        self.container.first_element_child().unwrap()
    }

    fn remove(&self, entry: Element) {
        entry.remove();
    }
}

/// Blocking user notification.
pub fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

/// One-shot geolocation request. Exactly one of the callbacks fires; if the
/// browser never answers, neither does (creation stays disabled).
pub fn request_position(on_resolved: Callback<Coordinate>, on_failed: Callback<()>) {
    let Ok(geolocation) = window().navigator().geolocation() else {
        on_failed.emit(());
        return;
    };

    let failed = on_failed.clone();
    let success = Closure::<dyn FnMut(JsValue)>::new(move |position: JsValue| {
        let coords =
            Reflect::get(&position, &JsValue::from_str("coords")).unwrap_or(JsValue::UNDEFINED);
        let lat = Reflect::get(&coords, &JsValue::from_str("latitude"))
            .ok()
            .and_then(|v| v.as_f64());
        let lng = Reflect::get(&coords, &JsValue::from_str("longitude"))
            .ok()
            .and_then(|v| v.as_f64());

        match (lat, lng) {
            (Some(lat), Some(lng)) => on_resolved.emit(Coordinate::new(lat, lng)),
            _ => failed.emit(()),
        }
    });
    let failure = Closure::<dyn FnMut(JsValue)>::new(move |_error: JsValue| {
        on_failed.emit(());
    });

    let _ = geolocation.get_current_position_with_error_callback(
        success.as_ref().unchecked_ref(),
        Some(failure.as_ref().unchecked_ref()),
    );
    success.forget();
    failure.forget();
}
