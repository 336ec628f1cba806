use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::case::{CaseGraph, NodeType, load_case_graph, sample_case};

mod camera;
mod graph;
mod intel;
mod physics;
mod render_utils;
mod ui;

use camera::Camera;
use graph::GraphFilter;
use intel::IntelState;
use physics::SimulationClock;

pub struct CasevizApp {
    case_file: Option<String>,
    state: AppState,
    reload_rx: Option<Receiver<Result<CaseGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<CaseGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    case: CaseGraph,
    filter: GraphFilter,
    search: String,
    selected: Option<String>,
    // Last selection the camera reacted to; fly-to fires once per change.
    flyto_acknowledged: Option<String>,
    camera: Camera,
    drag_node: Option<String>,
    show_alerts: bool,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    last_canvas_size: Option<Vec2>,
    intel: IntelState,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// The simulation's private working copy: display fields deep-copied from
/// the case, kinematic state owned here and nowhere else.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    degrees: Vec<u32>,
    index_by_id: HashMap<String, usize>,
    clock: SimulationClock,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct RenderNode {
    id: String,
    label: String,
    node_type: NodeType,
    risk_score: f32,
    world_pos: Vec2,
    velocity: Vec2,
    // Set exactly while the node is being dragged.
    pinned: Option<Vec2>,
    radius: f32,
}

struct RenderEdge {
    source: usize,
    target: usize,
    relation: String,
    strength: f32,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

impl CasevizApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, case_file: Option<String>) -> Self {
        let state = Self::start_load(case_file.clone());
        Self {
            case_file,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(case_file: Option<String>) -> Receiver<Result<CaseGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match &case_file {
                Some(path) => load_case_graph(path).map_err(|error| format!("{error:#}")),
                None => Ok(sample_case()),
            };
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(case_file: Option<String>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(case_file),
        }
    }
}

impl eframe::App for CasevizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(case) => AppState::Ready(Box::new(ViewModel::new(case))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading case data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load case data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.case_file.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, self.case_file.as_deref(), &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.case_file.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(case) => AppState::Ready(Box::new(ViewModel::new(case))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
