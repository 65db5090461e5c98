use std::rc::Rc;

use gloo_console::info;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, Node};
use workout_tracker_lib::codec::PersistenceCodec;
use workout_tracker_lib::controller::{MapState, SessionController, WorkoutDraft};
use workout_tracker_lib::projector::ViewProjector;
use workout_tracker_lib::workout::{Coordinate, WorkoutKind};
use yew::events::{MouseEvent, SubmitEvent};
use yew::prelude::*;

use crate::map::{LeafletMap, SharedMap};
use crate::services::{alert, request_position, BrowserStore, DomSummaryList};

type Controller = SessionController<SharedMap, DomSummaryList, BrowserStore>;

pub enum Msg {
    LocationResolved(Coordinate),
    LocationFailed,
    MapClicked(Coordinate),
    KindChanged,
    Submit(SubmitEvent),
    ListClicked(MouseEvent),
    DeleteAll,
}

pub struct App {
    controller: Controller,
    map: Rc<LeafletMap>,
    list_node: Node,
    show_form: bool,
    kind: WorkoutKind,
    type_input: NodeRef,
    distance_input: NodeRef,
    duration_input: NodeRef,
    cadence_input: NodeRef,
    elevation_input: NodeRef,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let list = DomSummaryList::new();
        let list_node = list.node();

        // Load flow runs here: stored workouts land in the repository and
        // the summary list before the first render.
        let controller = SessionController::new(
            PersistenceCodec::new(BrowserStore),
            ViewProjector::new(list),
        );
        info!(format!("loaded {} stored workouts", controller.workouts().len()));

        let map = Rc::new(LeafletMap::new());
        map.on_click(ctx.link().callback(Msg::MapClicked));

        request_position(
            ctx.link().callback(Msg::LocationResolved),
            ctx.link().callback(|()| Msg::LocationFailed),
        );

        Self {
            controller,
            map,
            list_node,
            show_form: false,
            kind: WorkoutKind::Running,
            type_input: NodeRef::default(),
            distance_input: NodeRef::default(),
            duration_input: NodeRef::default(),
            cadence_input: NodeRef::default(),
            elevation_input: NodeRef::default(),
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, first_render: bool) {
        if first_render {
            self.map.add_tile_layer();
        }
        self.map.invalidate_size();
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::LocationResolved(position) => {
                info!("position resolved, map ready");
                self.controller
                    .location_resolved(SharedMap(self.map.clone()), position);
                true
            }
            Msg::LocationFailed => {
                alert("Could not get your position");
                false
            }
            Msg::MapClicked(position) => {
                if !self.controller.map_clicked(position) {
                    return false;
                }
                self.show_form = true;
                if let Some(input) = self.distance_input.cast::<HtmlInputElement>() {
                    let _ = input.focus();
                }
                true
            }
            Msg::KindChanged => {
                if let Some(select) = self.type_input.cast::<HtmlSelectElement>() {
                    self.kind = match select.value().as_str() {
                        "cycling" => WorkoutKind::Cycling,
                        _ => WorkoutKind::Running,
                    };
                }
                true
            }
            Msg::Submit(event) => {
                event.prevent_default();
                let draft = self.read_draft();
                match self.controller.submit(draft) {
                    Ok(()) => {
                        self.clear_inputs();
                        self.show_form = false;
                        true
                    }
                    Err(err) => {
                        alert(&err.to_string());
                        false
                    }
                }
            }
            Msg::ListClicked(event) => {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return false;
                };
                let Some(item) = target.closest(".workout").ok().flatten() else {
                    return false;
                };
                let Some(id) = item.get_attribute("data-id") else {
                    return false;
                };

                if target.closest(".workout__delete").ok().flatten().is_some() {
                    self.controller.delete(&id);
                    true
                } else {
                    self.controller.focus(&id);
                    false
                }
            }
            Msg::DeleteAll => {
                self.controller.delete_all();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let running = self.kind == WorkoutKind::Running;
        let awaiting = self.controller.state() == MapState::AwaitingLocation;

        html! {
            <div class="app">
                <div class="sidebar">
                    if awaiting {
                        <p class="hint">{"Waiting for your position…"}</p>
                    }
                    <form
                        class={classes!("form", (!self.show_form).then_some("hidden"))}
                        onsubmit={link.callback(Msg::Submit)}
                    >
                        <div class="form__row">
                            <label class="form__label">{"Type"}</label>
                            <select
                                class="form__input form__input--type"
                                ref={self.type_input.clone()}
                                onchange={link.callback(|_| Msg::KindChanged)}
                            >
                                <option value="running" selected={running}>{"Running"}</option>
                                <option value="cycling" selected={!running}>{"Cycling"}</option>
                            </select>
                        </div>
                        <div class="form__row">
                            <label class="form__label">{"Distance"}</label>
                            <input
                                class="form__input form__input--distance"
                                placeholder="km"
                                ref={self.distance_input.clone()}
                            />
                        </div>
                        <div class="form__row">
                            <label class="form__label">{"Duration"}</label>
                            <input
                                class="form__input form__input--duration"
                                placeholder="min"
                                ref={self.duration_input.clone()}
                            />
                        </div>
                        <div class={classes!("form__row", (!running).then_some("form__row--hidden"))}>
                            <label class="form__label">{"Cadence"}</label>
                            <input
                                class="form__input form__input--cadence"
                                placeholder="step/min"
                                ref={self.cadence_input.clone()}
                            />
                        </div>
                        <div class={classes!("form__row", running.then_some("form__row--hidden"))}>
                            <label class="form__label">{"Elev Gain"}</label>
                            <input
                                class="form__input form__input--elevation"
                                placeholder="meters"
                                ref={self.elevation_input.clone()}
                            />
                        </div>
                        <button type="submit" class="form__btn">{"OK"}</button>
                    </form>
                    <div class="workouts-container" onclick={link.callback(Msg::ListClicked)}>
                        { Html::VRef(self.list_node.clone()) }
                    </div>
                    if self.controller.has_workouts() {
                        <button
                            class="btn_delete-all"
                            onclick={link.callback(|_| Msg::DeleteAll)}
                        >
                            {"Delete all workouts"}
                        </button>
                    }
                </div>
                { Html::VRef(self.map.node()) }
            </div>
        }
    }
}

impl App {
    /// Reads the form fields. Anything that is not a number becomes NaN and
    /// is rejected by validation, blank fields included.
    fn read_draft(&self) -> WorkoutDraft {
        let distance_km = parse_input(&self.distance_input);
        let duration_min = parse_input(&self.duration_input);

        match self.kind {
            WorkoutKind::Running => WorkoutDraft::Running {
                distance_km,
                duration_min,
                cadence_spm: parse_input(&self.cadence_input),
            },
            WorkoutKind::Cycling => WorkoutDraft::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m: parse_input(&self.elevation_input),
            },
        }
    }

    fn clear_inputs(&self) {
        for input in [
            &self.distance_input,
            &self.duration_input,
            &self.cadence_input,
            &self.elevation_input,
        ] {
            if let Some(input) = input.cast::<HtmlInputElement>() {
                input.set_value("");
            }
        }
    }
}

fn parse_input(input: &NodeRef) -> f64 {
    input
        .cast::<HtmlInputElement>()
        .map(|input| input.value())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
