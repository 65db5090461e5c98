use std::rc::Rc;

use gloo_utils::document;
use leaflet::{LatLng, Map, MapOptions, Marker, Popup, PopupOptions, TileLayer, TileLayerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Reflect;
use web_sys::{Element, HtmlElement, Node};
use workout_tracker_lib::projector::MapService;
use workout_tracker_lib::workout::{Coordinate, WorkoutKind};
use yew::Callback;

const TILE_URL: &str = "https://tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
const ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Leaflet-backed map service. Owns its container element; the root
/// component renders it through `Html::VRef`.
pub struct LeafletMap {
    map: Map,
    container: HtmlElement,
}

impl LeafletMap {
    pub fn new() -> Self {
        let container: Element = document().create_element("div").unwrap();
        let container: HtmlElement = container.dyn_into().unwrap();
        container.set_class_name("map");

        let map = Map::new_with_element(&container, &MapOptions::default());

        Self { map, container }
    }

    pub fn node(&self) -> Node {
        self.container.clone().into()
    }

    pub fn add_tile_layer(&self) {
        let opts = TileLayerOptions::new();
        opts.set_attribution(ATTRIBUTION.into());
        opts.set_update_when_idle(true);
        TileLayer::new_options(TILE_URL, &opts).add_to(&self.map);
    }

    pub fn invalidate_size(&self) {
        self.map.invalidate_size(false);
    }

    /// Forwards leaflet `click` events as clicked coordinates. The closure
    /// lives for the rest of the session.
    pub fn on_click(&self, callback: Callback<Coordinate>) {
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let latlng =
                Reflect::get(&event, &JsValue::from_str("latlng")).unwrap_or(JsValue::UNDEFINED);
            if latlng.is_undefined() {
                return;
            }
            let latlng: LatLng = latlng.unchecked_into();
            callback.emit(Coordinate::new(latlng.lat(), latlng.lng()));
        });
        self.map.on("click", closure.as_ref());
        closure.forget();
    }
}

/// Local newtype over the shared handle; the orphan rule forbids
/// implementing the foreign `MapService` trait directly on `Rc<LeafletMap>`.
#[derive(Clone)]
pub struct SharedMap(pub Rc<LeafletMap>);

impl MapService for SharedMap {
    type Marker = Marker;

    fn render_at(&self, coordinate: Coordinate, zoom: f64) {
        self.0
            .map
            .set_view(&LatLng::new(coordinate.lat, coordinate.lng), zoom);
    }

    fn place_marker(
        &self,
        coordinate: Coordinate,
        kind: WorkoutKind,
        popup_html: &str,
    ) -> Marker {
        let marker = Marker::new(&LatLng::new(coordinate.lat, coordinate.lng));
        marker.add_to(&self.0.map);

        let opts = PopupOptions::default();
        opts.set_max_width(250.0);
        opts.set_min_width(100.0);
        opts.set_auto_close(false);
        opts.set_close_on_click(false);
        opts.set_class_name(format!("{kind}-popup"));

        let popup = Popup::new(&opts, None);
        popup.set_content(&JsValue::from_str(popup_html));
        marker.bind_popup(&popup);
        marker.open_popup();

        marker
    }

    fn remove_marker(&self, marker: Marker) {
        marker.remove();
    }

    fn pan_to(&self, coordinate: Coordinate, zoom: f64) {
        self.0
            .map
            .set_view(&LatLng::new(coordinate.lat, coordinate.lng), zoom);
    }
}
