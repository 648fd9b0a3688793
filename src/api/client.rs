use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::editor::ViewQuery;
use crate::error::ApiError;
use crate::model::{BusStop, Landmark, NewBusStop, NewLandmark};

const TIMEOUT: Duration = Duration::from_secs(15);

/// List endpoints wrap their records in `{"data": [...]}`
#[derive(Deserialize)]
struct ListResponse<T> {
    data: Option<Vec<T>>,
}

/// Decode a `{"data": [...]}` body. A missing or null `data` is an empty list.
pub fn parse_list<T: DeserializeOwned>(mut body: Vec<u8>) -> Result<Vec<T>, ApiError> {
    let response: ListResponse<T> = simd_json::serde::from_slice(&mut body)?;
    Ok(response.data.unwrap_or_default())
}

/// Blocking client for the back office REST API
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send with the bearer token, returning the body of a 2xx response
    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    /// Landmarks around the viewport centre, newest first
    pub fn landmarks_near(&self, query: &ViewQuery) -> Result<Vec<Landmark>, ApiError> {
        let limit = query.limit.to_string();
        let request = self.http.get(self.url("landmark")).query(&[
            ("location", query.location().as_str()),
            ("limit", limit.as_str()),
            ("order_by", "id"),
            ("order_in", "desc"),
        ]);
        let landmarks = parse_list(self.send(request)?)?;
        log::debug!(
            "{} landmarks near {} (limit {})",
            landmarks.len(),
            query.location(),
            query.limit
        );
        Ok(landmarks)
    }

    pub fn landmark(&self, id: i64) -> Result<Landmark, ApiError> {
        let request = self.http.get(self.url("landmark")).query(&[("id", id)]);
        parse_list(self.send(request)?)?
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound(id))
    }

    pub fn bus_stops(&self, landmark_id: i64) -> Result<Vec<BusStop>, ApiError> {
        let request = self
            .http
            .get(self.url("bus_stop"))
            .query(&[("landmark_id", landmark_id)]);
        parse_list(self.send(request)?)
    }

    pub fn update_boundary(&self, id: i64, boundary: &str) -> Result<(), ApiError> {
        let id = id.to_string();
        let request = self
            .http
            .patch(self.url("landmark"))
            .form(&[("id", id.as_str()), ("boundary", boundary)]);
        self.send(request)?;
        log::info!("saved boundary of landmark #{id}");
        Ok(())
    }

    pub fn create_landmark(&self, landmark: &NewLandmark) -> Result<(), ApiError> {
        let request = self.http.post(self.url("landmark")).form(landmark);
        self.send(request)?;
        log::info!("created landmark '{}'", landmark.name);
        Ok(())
    }

    pub fn create_bus_stop(&self, stop: &NewBusStop) -> Result<(), ApiError> {
        let request = self.http.post(self.url("bus_stop")).form(stop);
        self.send(request)?;
        log::info!("created bus stop '{}' in landmark #{}", stop.name, stop.landmark_id);
        Ok(())
    }
}
