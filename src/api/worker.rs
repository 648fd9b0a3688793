use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use anyhow::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::api::{ApiClient, Geocoder, Located};
use crate::editor::ViewQuery;
use crate::error::ApiError;
use crate::model::{BusStop, Landmark, NewBusStop, NewLandmark};

/// Network request queued by the UI
#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    /// Landmarks for the settled viewport, tagged with the request id
    LandmarksInView { request: u64, query: ViewQuery },
    Target(i64),
    BusStops(i64),
    Locate(String),
    SaveBoundary { id: i64, boundary: String },
    CreateLandmark(NewLandmark),
    CreateBusStop(NewBusStop),
}

/// Result of a [`Job`], delivered back on the UI thread
#[derive(Debug)]
pub enum Outcome {
    LandmarksInView {
        request: u64,
        result: Result<Vec<Landmark>, ApiError>,
    },
    Target(Result<Landmark, ApiError>),
    BusStops(Result<Vec<BusStop>, ApiError>),
    Located {
        query: String,
        result: Result<Option<Located>, ApiError>,
    },
    Saved {
        boundary: String,
        result: Result<(), ApiError>,
    },
    LandmarkCreated {
        name: String,
        result: Result<(), ApiError>,
    },
    BusStopCreated {
        name: String,
        result: Result<(), ApiError>,
    },
}

/// Runs jobs on a small thread pool and queues their outcomes.
/// Dropping the worker drops the receiver; outcomes still in flight are lost.
pub struct Worker {
    pool: ThreadPool,
    client: Arc<ApiClient>,
    geocoder: Arc<Geocoder>,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
}

impl Worker {
    pub fn new(client: ApiClient, geocoder: Geocoder) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|i| format!("landmark-net-{i}"))
            .build()?;
        let (tx, rx) = channel();
        Ok(Self {
            pool,
            client: Arc::new(client),
            geocoder: Arc::new(geocoder),
            tx,
            rx,
        })
    }

    pub fn submit(&self, job: Job) {
        log::debug!("submitting {job:?}");
        let client = Arc::clone(&self.client);
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            let outcome = run(&client, &geocoder, job);
            // Receiver gone means the session ended
            let _ = tx.send(outcome);
        });
    }

    /// Outcomes that arrived since the last call, in arrival order
    pub fn drain(&self) -> Vec<Outcome> {
        self.rx.try_iter().collect()
    }
}

fn run(client: &ApiClient, geocoder: &Geocoder, job: Job) -> Outcome {
    match job {
        Job::LandmarksInView { request, query } => Outcome::LandmarksInView {
            request,
            result: client.landmarks_near(&query),
        },
        Job::Target(id) => Outcome::Target(client.landmark(id)),
        Job::BusStops(landmark_id) => Outcome::BusStops(client.bus_stops(landmark_id)),
        Job::Locate(query) => {
            let result = geocoder.search(&query);
            Outcome::Located { query, result }
        }
        Job::SaveBoundary { id, boundary } => {
            let result = client.update_boundary(id, &boundary);
            Outcome::Saved { boundary, result }
        }
        Job::CreateLandmark(landmark) => Outcome::LandmarkCreated {
            result: client.create_landmark(&landmark),
            name: landmark.name,
        },
        Job::CreateBusStop(stop) => Outcome::BusStopCreated {
            result: client.create_bus_stop(&stop),
            name: stop.name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_unreachable_backend_reports_transport_error() {
        // Port 9 on localhost is the discard service; nothing should answer HTTP there
        let client = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        let geocoder = Geocoder::new("http://127.0.0.1:9/search").unwrap();
        let worker = Worker::new(client, geocoder).unwrap();
        worker.submit(Job::Target(42));

        let deadline = Instant::now() + Duration::from_secs(20);
        let mut outcomes = Vec::new();
        while outcomes.is_empty() && Instant::now() < deadline {
            outcomes = worker.drain();
            std::thread::sleep(Duration::from_millis(20));
        }

        assert!(matches!(outcomes.as_slice(), [Outcome::Target(Err(_))]));
    }
}
