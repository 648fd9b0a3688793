use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

use geo::Polygon;

use crate::api::{Job, Outcome};
use crate::canvas::{Gesture, MapCanvas, Tool};
use crate::config::Command;
use crate::editor::{BoundaryWorkflow, RequestGate, StopPlacement, ViewQuery};
use crate::map::{MapRenderer, Overlay};
use crate::model::{Importance, LandmarkStatus, NewBusStop, NewLandmark};

/// Frames a status message stays up (~3 s at 60 fps)
const TOAST_FRAMES: u32 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// Transient status line message
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    frames_left: u32,
}

/// What the operator is doing this run
pub enum Session {
    /// Redraw an existing landmark's boundary, or draw a new landmark
    Boundary {
        workflow: BoundaryWorkflow,
        /// Landmark id when editing; `None` when creating
        editing: Option<i64>,
    },
    PlaceStop(StopPlacement),
}

/// Application state
pub struct App {
    pub canvas: MapCanvas,
    pub map_renderer: MapRenderer,
    pub session: Session,
    pub should_quit: bool,
    /// Location search being typed, `None` when the prompt is closed
    pub search: Option<String>,
    pub toast: Option<Toast>,
    gate: RequestGate,
    jobs_tx: Sender<Job>,
    jobs_rx: Receiver<Job>,
}

impl App {
    pub fn new(command: &Command, canvas: MapCanvas, map_renderer: MapRenderer) -> Self {
        let (jobs_tx, jobs_rx) = channel();

        let session = match command {
            Command::Edit { id } => {
                let id = *id;
                let tx = jobs_tx.clone();
                let workflow = BoundaryWorkflow::new(Box::new(move |boundary| {
                    let _ = tx.send(Job::SaveBoundary { id, boundary });
                }));
                let _ = jobs_tx.send(Job::Target(id));
                Session::Boundary {
                    workflow,
                    editing: Some(id),
                }
            }
            Command::Create { name, importance } => {
                let name = name.clone();
                let importance: Importance = *importance;
                let tx = jobs_tx.clone();
                let workflow = BoundaryWorkflow::new(Box::new(move |boundary| {
                    let _ = tx.send(Job::CreateLandmark(NewLandmark {
                        name: name.clone(),
                        boundary,
                        importance,
                        status: LandmarkStatus::Validating,
                    }));
                }));
                Session::Boundary {
                    workflow,
                    editing: None,
                }
            }
            Command::PlaceStop { landmark_id, name } => {
                let landmark_id = *landmark_id;
                let name = name.clone();
                let tx = jobs_tx.clone();
                let placement = StopPlacement::new(Box::new(move |location| {
                    let _ = tx.send(Job::CreateBusStop(NewBusStop {
                        name: name.clone(),
                        landmark_id,
                        location,
                    }));
                }));
                let _ = jobs_tx.send(Job::Target(landmark_id));
                Session::PlaceStop(placement)
            }
        };

        let mut app = Self {
            canvas,
            map_renderer,
            session,
            should_quit: false,
            search: None,
            toast: None,
            gate: RequestGate::default(),
            jobs_tx,
            jobs_rx,
        };
        // Creating starts where the map is; fetch what is around it
        if matches!(app.session, Session::Boundary { editing: None, .. }) {
            app.request_view();
        }
        app
    }

    /// Requests queued since the last call, for the network worker
    pub fn take_jobs(&mut self) -> Vec<Job> {
        self.jobs_rx.try_iter().collect()
    }

    fn submit(&self, job: Job) {
        let _ = self.jobs_tx.send(job);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(text.into(), ToastLevel::Info);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::warn!("{text}");
        self.show(text, ToastLevel::Error);
    }

    fn show(&mut self, text: String, level: ToastLevel) {
        self.toast = Some(Toast {
            text,
            level,
            frames_left: TOAST_FRAMES,
        });
    }

    /// Per-frame update: animation, toast expiry, settled-view queries
    pub fn tick(&mut self, now: Instant) {
        if self.canvas.tick(now) {
            self.request_view();
        }
        if let Some(toast) = self.toast.as_mut() {
            toast.frames_left = toast.frames_left.saturating_sub(1);
            if toast.frames_left == 0 {
                self.toast = None;
            }
        }
    }

    /// Fetch the landmarks around the current view. Only boundary
    /// sessions check overlaps, so placement sessions skip it.
    pub fn request_view(&mut self) {
        if !matches!(self.session, Session::Boundary { .. }) {
            return;
        }
        let request = self.gate.issue();
        let query = ViewQuery::for_viewport(&self.canvas.viewport);
        log::debug!("view query #{request}: {} limit {}", query.location(), query.limit);
        self.submit(Job::LandmarksInView { request, query });
    }

    /// Apply a finished network request
    pub fn apply(&mut self, outcome: Outcome) {
        let now = Instant::now();
        match outcome {
            Outcome::LandmarksInView { request, result } => {
                if !self.gate.accept(request) {
                    log::debug!("discarding stale view response #{request}");
                    return;
                }
                match result {
                    Ok(landmarks) => {
                        let Session::Boundary { workflow, .. } = &mut self.session else {
                            return;
                        };
                        let skipped = workflow.set_in_view(landmarks);
                        if skipped > 0 {
                            log::warn!("{skipped} landmarks in view have unreadable boundaries");
                        }
                        // A pending candidate must still clear the landmarks now in view
                        let rejection = workflow.recheck(&mut self.canvas.draft);
                        if let Some(rejection) = rejection {
                            self.error(format!("{rejection}, candidate discarded"));
                        }
                    }
                    Err(e) => self.error(format!("could not load landmarks: {e}")),
                }
            }
            Outcome::Target(Ok(landmark)) => {
                let name = landmark.name.clone();
                let boundary = match &mut self.session {
                    Session::Boundary { workflow, .. } => workflow.load_target(landmark).cloned(),
                    Session::PlaceStop(placement) => {
                        let id = landmark.id;
                        let boundary = placement.select_landmark(landmark).cloned();
                        let _ = self.jobs_tx.send(Job::BusStops(id));
                        boundary
                    }
                };
                match boundary {
                    Some(boundary) => {
                        self.canvas.fit_to(&boundary, now);
                        self.info(format!("loaded '{name}'"));
                    }
                    None => self.error(format!("landmark '{name}' has no readable boundary")),
                }
            }
            Outcome::Target(Err(e)) => self.error(format!("could not load landmark: {e}")),
            Outcome::BusStops(result) => match result {
                Ok(stops) => {
                    if let Session::PlaceStop(placement) = &mut self.session {
                        placement.set_existing(stops);
                    }
                }
                Err(e) => self.error(format!("could not load bus stops: {e}")),
            },
            Outcome::Located { query, result } => match result {
                Ok(Some(place)) => {
                    self.canvas.fly_to(place.lon, place.lat);
                    self.info(place.name);
                }
                Ok(None) => self.error(format!("no match for '{query}'")),
                Err(e) => self.error(format!("search failed: {e}")),
            },
            Outcome::Saved { boundary, result } => match result {
                Ok(()) => {
                    if let Session::Boundary { workflow, .. } = &mut self.session {
                        workflow.commit_saved(&boundary);
                    }
                    self.info("boundary saved");
                }
                Err(e) => self.error(format!("save failed: {e}")),
            },
            Outcome::LandmarkCreated { name, result } => match result {
                Ok(()) => {
                    self.info(format!("created landmark '{name}'"));
                    self.request_view();
                }
                Err(e) => self.error(format!("could not create '{name}': {e}")),
            },
            Outcome::BusStopCreated { name, result } => match result {
                Ok(()) => {
                    self.info(format!("created bus stop '{name}'"));
                    if let Session::PlaceStop(placement) = &self.session {
                        if let Some(landmark) = placement.landmark() {
                            self.submit(Job::BusStops(landmark.id));
                        }
                    }
                }
                Err(e) => self.error(format!("could not create '{name}': {e}")),
            },
        }
    }

    pub fn pointer_down(&mut self, col: u16, row: u16) {
        if let Session::Boundary {
            editing: Some(_),
            workflow,
        } = &self.session
        {
            if workflow.target().is_none() && matches!(self.canvas.tool, Tool::Draw(_)) {
                self.error("landmark not loaded yet");
                return;
            }
        }
        self.canvas.pointer_down(col, row);
    }

    pub fn pointer_drag(&mut self, col: u16, row: u16, now: Instant) {
        self.canvas.pointer_drag(col, row, now);
    }

    pub fn pointer_up(&mut self, col: u16, row: u16) {
        match self.canvas.pointer_up(col, row) {
            Some(Gesture::DrawEnded) => self.finish_draw(),
            Some(Gesture::Click(point)) => self.select_point(point),
            None => {}
        }
    }

    fn finish_draw(&mut self) {
        let Session::Boundary { workflow, .. } = &self.session else {
            self.canvas.draft.cancel();
            return;
        };
        match workflow.finish_draw(&mut self.canvas.draft) {
            Some(Ok(area_m2)) => self.info(format!(
                "{} - Enter to save, x to discard",
                format_area(area_m2)
            )),
            Some(Err(rejection)) => self.error(rejection.to_string()),
            None => {}
        }
    }

    fn select_point(&mut self, point: (f64, f64)) {
        let Session::PlaceStop(placement) = &mut self.session else {
            return;
        };
        match placement.select(point) {
            Ok(()) => self.info(format!(
                "stop at {:.6}, {:.6} - Enter to save",
                point.1, point.0
            )),
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Hand the pending candidate or chosen point to the session's callback.
    /// Boundaries wait until the landmarks in view have loaded, and are
    /// checked against them once more first.
    pub fn confirm(&mut self) {
        let handed = match &mut self.session {
            Session::Boundary { workflow, editing } => {
                if editing.is_some() && workflow.target().is_none() {
                    Err("landmark not loaded yet".to_string())
                } else if !self.gate.is_answered() {
                    Err("landmarks in view are still loading".to_string())
                } else {
                    workflow
                        .confirm(&mut self.canvas.draft)
                        .transpose()
                        .map_err(|rejection| format!("{rejection}, candidate discarded"))
                }
            }
            Session::PlaceStop(placement) => Ok(placement.confirm()),
        };
        match handed {
            Ok(Some(wkt)) => {
                log::info!("submitting {wkt}");
                self.info("saving...");
            }
            Ok(None) => self.error("nothing to confirm"),
            Err(text) => self.error(text),
        }
    }

    /// Drop the pending candidate or chosen point
    pub fn discard(&mut self) -> bool {
        let discarded = match &mut self.session {
            Session::Boundary { .. } => self.canvas.draft.cancel(),
            Session::PlaceStop(placement) => placement.clear(),
        };
        if discarded {
            self.info("discarded");
        }
        discarded
    }

    /// Esc: close the search prompt, else drop the candidate, else quit
    pub fn cancel(&mut self) {
        if self.search.take().is_some() {
            return;
        }
        if !self.discard() {
            self.quit();
        }
    }

    pub fn toggle_neighbours(&mut self) {
        if let Session::Boundary { workflow, .. } = &mut self.session {
            let shown = workflow.toggle_neighbours();
            self.info(if shown {
                "showing other landmarks"
            } else {
                "hiding other landmarks"
            });
        }
    }

    /// Frame the landmark being edited or placed into
    pub fn fit_target(&mut self) {
        let boundary = match &self.session {
            Session::Boundary { workflow, .. } => workflow.target_boundary().cloned(),
            Session::PlaceStop(placement) => placement.boundary().cloned(),
        };
        match boundary {
            Some(boundary) => {
                self.canvas.fit_to(&boundary, Instant::now());
            }
            None => self.error("no landmark to fit"),
        }
    }

    pub fn cycle_basemap(&mut self) {
        let basemap = self.canvas.cycle_basemap();
        self.info(format!("basemap: {basemap}"));
    }

    pub fn cycle_tool(&mut self) {
        let tool = self.canvas.cycle_tool();
        self.info(format!("tool: {}", tool.label()));
    }

    pub fn open_search(&mut self) {
        self.search = Some(String::new());
    }

    pub fn search_input(&mut self, c: char) {
        if let Some(query) = self.search.as_mut() {
            query.push(c);
        }
    }

    pub fn search_backspace(&mut self) {
        if let Some(query) = self.search.as_mut() {
            query.pop();
        }
    }

    /// Send the typed query to the geocoder
    pub fn submit_search(&mut self) {
        let Some(query) = self.search.take() else {
            return;
        };
        let query = query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.info(format!("searching '{query}'..."));
        self.submit(Job::Locate(query));
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Everything drawn above the basemap
    pub fn overlay(&self) -> Overlay<'_> {
        let mut overlay = Overlay {
            candidate: self.canvas.candidate(),
            ..Default::default()
        };
        match &self.session {
            Session::Boundary { workflow, .. } => {
                overlay.neighbours = workflow
                    .visible_neighbours()
                    .iter()
                    .map(|n| (n.landmark.name.as_str(), &n.boundary))
                    .collect();
                overlay.target = workflow
                    .target()
                    .zip(workflow.target_boundary())
                    .map(|(l, boundary)| (l.name.as_str(), boundary));
            }
            Session::PlaceStop(placement) => {
                overlay.target = placement
                    .landmark()
                    .zip(placement.boundary())
                    .map(|(l, boundary)| (l.name.as_str(), boundary));
                overlay.stops = placement
                    .existing()
                    .iter()
                    .map(|(name, at)| (name.as_str(), *at))
                    .collect();
                overlay.chosen = placement.chosen();
            }
        }
        overlay
    }

    /// Session title for the status bar
    pub fn mode(&self) -> String {
        match &self.session {
            Session::Boundary { workflow, editing } => {
                let title = match (editing, workflow.target()) {
                    (Some(_), Some(target)) => format!("EDIT {}", target.name),
                    (Some(id), None) => format!("EDIT #{id}"),
                    (None, _) => "NEW LANDMARK".to_string(),
                };
                if workflow.shows_neighbours() {
                    title
                } else {
                    format!("{title} (others hidden)")
                }
            }
            Session::PlaceStop(placement) => match placement.landmark() {
                Some(landmark) => format!("STOP IN {}", landmark.name),
                None => "STOP".to_string(),
            },
        }
    }

    /// Pending candidate boundary, if any
    pub fn pending(&self) -> Option<&Polygon<f64>> {
        self.canvas.draft.pending()
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.canvas.viewport.level())
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let viewport = &self.canvas.viewport;
        format!(
            "{:.4}°{}, {:.4}°{}",
            viewport.center_lat.abs(),
            if viewport.center_lat >= 0.0 { "N" } else { "S" },
            viewport.center_lon.abs(),
            if viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

/// m² below one hectare, km² above
pub fn format_area(m2: f64) -> String {
    if m2 < 10_000.0 {
        format!("{m2:.0} m²")
    } else {
        format!("{:.3} km²", m2 / 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Located;
    use crate::editor::DrawShape;
    use crate::error::ApiError;
    use crate::geometry::Extent;
    use crate::model::Landmark;
    use crate::wkt::format_polygon;

    fn landmark(id: i64, name: &str, min: (f64, f64), max: (f64, f64)) -> Landmark {
        Landmark {
            id,
            name: name.to_string(),
            boundary: format_polygon(Extent::from_corners(min, max).to_polygon().exterior()),
            status: LandmarkStatus::Verified,
            importance: Importance::Medium,
        }
    }

    fn app(command: Command) -> App {
        let drawing = !matches!(command, Command::PlaceStop { .. });
        let canvas = MapCanvas::new((76.905, 8.505), 14.0, 82, 33, drawing);
        App::new(&command, canvas, MapRenderer::new())
    }

    /// Issue a fresh view query and return its request id
    fn view_request(app: &mut App) -> u64 {
        app.take_jobs();
        app.request_view();
        match app.take_jobs().as_slice() {
            [Job::LandmarksInView { request, .. }] => *request,
            other => panic!("expected one view query, got {other:?}"),
        }
    }

    /// Answer a fresh view query with the given landmarks
    fn answer_view(app: &mut App, landmarks: Vec<Landmark>) {
        let request = view_request(app);
        app.apply(Outcome::LandmarksInView {
            request,
            result: Ok(landmarks),
        });
    }

    fn drag_box(app: &mut App, from: (u16, u16), to: (u16, u16)) {
        app.canvas.tool = Tool::Draw(DrawShape::Box);
        app.pointer_down(from.0, from.1);
        app.pointer_drag(to.0, to.1, Instant::now());
        app.pointer_up(to.0, to.1);
    }

    #[test]
    fn test_edit_session_fetches_target_then_saves() {
        let mut app = app(Command::Edit { id: 5 });
        assert_eq!(app.take_jobs(), vec![Job::Target(5)]);

        app.apply(Outcome::Target(Ok(landmark(5, "East Fort", (76.90, 8.50), (76.91, 8.51)))));
        assert_eq!(app.mode(), "EDIT East Fort");
        assert!(app.canvas.is_moving());

        app.toggle_neighbours();
        assert_eq!(app.mode(), "EDIT East Fort (others hidden)");
        app.toggle_neighbours();
        answer_view(&mut app, vec![]);

        drag_box(&mut app, (20, 10), (40, 20));
        assert!(app.pending().is_some(), "toast: {:?}", app.toast);

        app.confirm();
        let jobs = app.take_jobs();
        let [Job::SaveBoundary { id: 5, boundary }] = jobs.as_slice() else {
            panic!("expected a save, got {jobs:?}");
        };
        assert!(boundary.starts_with("POLYGON(("));
        assert!(app.pending().is_none());

        app.apply(Outcome::Saved {
            boundary: boundary.clone(),
            result: Ok(()),
        });
        if let Session::Boundary { workflow, .. } = &app.session {
            assert_eq!(workflow.target().map(|t| t.boundary.as_str()), Some(boundary.as_str()));
        }
    }

    #[test]
    fn test_stale_view_response_is_discarded() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Low,
        });
        let old = view_request(&mut app);
        let new = view_request(&mut app);

        app.apply(Outcome::LandmarksInView {
            request: old,
            result: Ok(vec![landmark(1, "Old", (76.90, 8.50), (76.91, 8.51))]),
        });
        assert!(app.overlay().neighbours.is_empty());

        app.apply(Outcome::LandmarksInView {
            request: new,
            result: Ok(vec![landmark(2, "New", (76.90, 8.50), (76.91, 8.51))]),
        });
        assert_eq!(app.overlay().neighbours.len(), 1);
        assert_eq!(app.overlay().neighbours[0].0, "New");
    }

    #[test]
    fn test_create_rejects_overlap_and_keeps_neighbour() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::High,
        });
        let request = view_request(&mut app);
        // Neighbour covering the whole visible area
        app.apply(Outcome::LandmarksInView {
            request,
            result: Ok(vec![landmark(9, "Market", (76.80, 8.40), (77.00, 8.60))]),
        });

        drag_box(&mut app, (20, 10), (40, 20));
        assert!(app.pending().is_none());
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.text.contains("Market"));
        assert_eq!(app.overlay().neighbours.len(), 1);
        assert!(app.overlay().candidate.is_none());
    }

    #[test]
    fn test_create_confirm_queues_new_landmark() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::High,
        });
        answer_view(&mut app, vec![]);
        drag_box(&mut app, (20, 10), (40, 20));
        app.confirm();

        let jobs = app.take_jobs();
        let [Job::CreateLandmark(new)] = jobs.as_slice() else {
            panic!("expected a create, got {jobs:?}");
        };
        assert_eq!(new.name, "Depot");
        assert_eq!(new.importance, Importance::High);
        assert_eq!(new.status, LandmarkStatus::Validating);
    }

    #[test]
    fn test_neighbour_arriving_after_draw_blocks_confirm() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::High,
        });
        let request = view_request(&mut app);
        drag_box(&mut app, (20, 10), (40, 20));
        assert!(app.pending().is_some(), "toast: {:?}", app.toast);

        app.apply(Outcome::LandmarksInView {
            request,
            result: Ok(vec![landmark(9, "Market", (76.80, 8.40), (77.00, 8.60))]),
        });
        assert!(app.pending().is_none());
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.text.contains("Market"));

        app.confirm();
        assert!(app.take_jobs().is_empty());
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
    }

    #[test]
    fn test_confirm_waits_for_landmarks_in_view() {
        let mut app = app(Command::Edit { id: 5 });
        app.apply(Outcome::Target(Ok(landmark(5, "East Fort", (76.90, 8.50), (76.91, 8.51)))));
        let request = view_request(&mut app);
        drag_box(&mut app, (20, 10), (40, 20));
        assert!(app.pending().is_some(), "toast: {:?}", app.toast);

        app.confirm();
        assert!(app.take_jobs().is_empty());
        assert!(app.pending().is_some());
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.text.contains("still loading"));

        app.apply(Outcome::LandmarksInView {
            request,
            result: Ok(vec![]),
        });
        app.confirm();
        assert!(matches!(app.take_jobs().as_slice(), [Job::SaveBoundary { id: 5, .. }]));
    }

    #[test]
    fn test_failed_view_fetch_keeps_neighbours() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Low,
        });
        answer_view(&mut app, vec![landmark(1, "Market", (76.90, 8.50), (76.91, 8.51))]);
        assert_eq!(app.overlay().neighbours.len(), 1);

        let request = view_request(&mut app);
        app.apply(Outcome::LandmarksInView {
            request,
            result: Err(ApiError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        });
        assert_eq!(app.overlay().neighbours.len(), 1);
        assert_eq!(app.overlay().neighbours[0].0, "Market");
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
    }

    #[test]
    fn test_geocoder_error_leaves_viewport() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Medium,
        });
        let before = (app.canvas.viewport.center_lon, app.canvas.viewport.center_lat);

        app.apply(Outcome::Located {
            query: "thampanoor".to_string(),
            result: Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        });
        assert!(!app.canvas.is_flying());
        app.tick(Instant::now());
        let after = (app.canvas.viewport.center_lon, app.canvas.viewport.center_lat);
        assert_eq!(after, before);
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.text.starts_with("search failed"));
    }

    #[test]
    fn test_cycle_basemap_keeps_view_and_candidate() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Medium,
        });
        drag_box(&mut app, (20, 10), (40, 20));
        let pending = app.pending().cloned();
        assert!(pending.is_some());
        let viewport = &app.canvas.viewport;
        let before = (viewport.center_lon, viewport.center_lat, viewport.level());
        let basemap = app.canvas.basemap;

        app.cycle_basemap();
        assert_ne!(app.canvas.basemap, basemap);
        let viewport = &app.canvas.viewport;
        assert_eq!((viewport.center_lon, viewport.center_lat, viewport.level()), before);
        assert_eq!(app.pending().cloned(), pending);
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Info));
    }

    #[test]
    fn test_place_stop_flow() {
        let mut app = app(Command::PlaceStop {
            landmark_id: 7,
            name: "Fort Gate".to_string(),
        });
        assert_eq!(app.take_jobs(), vec![Job::Target(7)]);
        app.apply(Outcome::Target(Ok(landmark(7, "East Fort", (76.90, 8.50), (76.91, 8.51)))));
        assert_eq!(app.take_jobs(), vec![Job::BusStops(7)]);

        // Far outside the landmark after fitting
        app.select_point((10.0, 10.0));
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));

        app.select_point((76.905, 8.505));
        app.confirm();
        assert_eq!(
            app.take_jobs(),
            vec![Job::CreateBusStop(NewBusStop {
                name: "Fort Gate".to_string(),
                landmark_id: 7,
                location: "POINT(76.905 8.505)".to_string(),
            })]
        );
    }

    #[test]
    fn test_search_flow() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Medium,
        });
        app.take_jobs();
        app.open_search();
        for c in "thampanoor".chars() {
            app.search_input(c);
        }
        app.submit_search();
        assert_eq!(app.take_jobs(), vec![Job::Locate("thampanoor".to_string())]);

        app.apply(Outcome::Located {
            query: "nowhere".to_string(),
            result: Ok(None),
        });
        assert!(!app.canvas.is_flying());
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));

        app.apply(Outcome::Located {
            query: "thampanoor".to_string(),
            result: Ok(Some(Located {
                lon: 76.9525,
                lat: 8.4875,
                name: "Thampanoor".to_string(),
            })),
        });
        assert!(app.canvas.is_flying());
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut app = app(Command::Edit { id: 5 });
        app.apply(Outcome::Target(Ok(landmark(5, "East Fort", (76.90, 8.50), (76.91, 8.51)))));
        let before = app.overlay().target.map(|(_, boundary)| boundary.clone());

        app.apply(Outcome::Saved {
            boundary: "POLYGON((0 0, 1 0, 1 1, 0 0))".to_string(),
            result: Err(ApiError::NotFound(5)),
        });
        assert_eq!(app.overlay().target.map(|(_, boundary)| boundary.clone()), before);
        assert_eq!(app.toast.as_ref().map(|t| t.level), Some(ToastLevel::Error));
    }

    #[test]
    fn test_escape_order() {
        let mut app = app(Command::Create {
            name: "Depot".to_string(),
            importance: Importance::Medium,
        });
        drag_box(&mut app, (20, 10), (40, 20));
        app.open_search();

        app.cancel();
        assert!(app.search.is_none());
        assert!(app.pending().is_some());
        app.cancel();
        assert!(app.pending().is_none());
        assert!(!app.should_quit);
        app.cancel();
        assert!(app.should_quit);
    }

    #[test]
    fn test_toast_expires() {
        let mut app = app(Command::Edit { id: 1 });
        app.info("hello");
        let now = Instant::now();
        for _ in 0..TOAST_FRAMES {
            app.tick(now);
        }
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(250.4), "250 m²");
        assert_eq!(format_area(1_225_575.0), "1.226 km²");
    }
}
