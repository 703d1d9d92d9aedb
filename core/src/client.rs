//! Request builder, response parsers and typed accessors for the
//! leaderboard API.
//!
//! # Design
//! `MmrtaClient` holds an immutable base URL and a `Transport`, nothing
//! else. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`;
//! the `get_*` accessors chain the two through the transport. Callers that
//! do their own I/O can use the build/parse halves directly.

use std::collections::BTreeMap;

use url::Url;

use crate::envelope::{decode_envelope, Envelope};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{Game, Run, Series};

/// Base address of the public leaderboard API.
pub const DEFAULT_BASE_URL: &str = "https://megamanleaderboards.net/api/";

const USER_AGENT: &str = concat!("mmrta/", env!("CARGO_PKG_VERSION"));

/// The API resources, each served as `<name>.php` under the base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Series,
    Games,
    Runs,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Series => "series",
            Endpoint::Games => "games",
            Endpoint::Runs => "runs",
        }
    }
}

/// Synchronous, stateless client for the leaderboard API.
///
/// Safe to share between threads when the transport is: there is no
/// mutable state to race on.
#[derive(Debug, Clone)]
pub struct MmrtaClient<T = UreqTransport> {
    base_url: Url,
    transport: T,
}

impl MmrtaClient<UreqTransport> {
    /// Client for the public API using a blocking `ureq` transport.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::with_transport(base_url, UreqTransport::new())
    }
}

impl<T: Transport> MmrtaClient<T> {
    /// Client with a custom transport. Fails if `base_url` cannot be used
    /// to build endpoint URLs.
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self, ApiError> {
        let malformed = |reason: String| ApiError::MalformedBaseAddress {
            address: base_url.to_string(),
            reason,
        };

        let base_url = Url::parse(base_url).map_err(|e| malformed(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(malformed("address has no hierarchical path".to_string()));
        }

        Ok(Self {
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a GET request for `endpoint` with the given query parameters.
    ///
    /// The endpoint file is appended to the base path. Parameters are
    /// form-encoded in key order; an empty map produces no query string.
    pub fn build_request(
        &self,
        endpoint: Endpoint,
        params: &BTreeMap<&str, String>,
    ) -> Result<HttpRequest, ApiError> {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        url.set_query(None);

        url.path_segments_mut()
            .map_err(|()| ApiError::MalformedBaseAddress {
                address: self.base_url.to_string(),
                reason: "address has no hierarchical path".to_string(),
            })?
            .pop_if_empty()
            .push(&format!("{}.php", endpoint.as_str()));

        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(HttpRequest {
            url: url.into(),
            headers: vec![("user-agent".to_string(), USER_AGENT.to_string())],
        })
    }

    pub fn build_series(&self) -> Result<HttpRequest, ApiError> {
        self.build_request(Endpoint::Series, &BTreeMap::new())
    }

    pub fn build_games(&self) -> Result<HttpRequest, ApiError> {
        self.build_request(Endpoint::Games, &BTreeMap::new())
    }

    pub fn build_game_by_id(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.build_request(Endpoint::Games, &BTreeMap::from([("game", id.to_string())]))
    }

    pub fn build_games_by_series(&self, series: i64) -> Result<HttpRequest, ApiError> {
        self.build_request(
            Endpoint::Games,
            &BTreeMap::from([("series", series.to_string())]),
        )
    }

    /// `expanded` asks the API to inline each run's game and user.
    pub fn build_unverified_runs(&self, expanded: bool) -> Result<HttpRequest, ApiError> {
        let mut params = BTreeMap::new();
        if expanded {
            params.insert("ex", "1".to_string());
        }
        self.build_request(Endpoint::Runs, &params)
    }

    pub fn parse_series(&self, response: HttpResponse) -> Result<Vec<Series>, ApiError> {
        Ok(decode(&response)?.series)
    }

    pub fn parse_games(&self, response: HttpResponse) -> Result<Vec<Game>, ApiError> {
        Ok(decode(&response)?.games)
    }

    /// Expects exactly one game; any other count is a contract violation.
    pub fn parse_game_by_id(&self, id: i64, response: HttpResponse) -> Result<Game, ApiError> {
        let mut games = decode(&response)?.games;
        if games.len() != 1 {
            return Err(ApiError::UnexpectedResultCount {
                count: games.len(),
                id,
            });
        }
        Ok(games.remove(0))
    }

    pub fn parse_unverified_runs(&self, response: HttpResponse) -> Result<Vec<Run>, ApiError> {
        Ok(decode(&response)?.runs)
    }

    /// List every series.
    pub fn get_series(&self) -> Result<Vec<Series>, ApiError> {
        let response = self.send(self.build_series()?)?;
        self.parse_series(response)
    }

    /// List every game.
    pub fn get_games(&self) -> Result<Vec<Game>, ApiError> {
        let response = self.send(self.build_games()?)?;
        self.parse_games(response)
    }

    /// Fetch a single game. Fails with `UnexpectedResultCount` unless the
    /// API returns exactly one.
    pub fn get_game_by_id(&self, id: i64) -> Result<Game, ApiError> {
        let response = self.send(self.build_game_by_id(id)?)?;
        self.parse_game_by_id(id, response)
    }

    /// List the games belonging to a series. An empty list is not an error.
    pub fn get_games_by_series(&self, series: i64) -> Result<Vec<Game>, ApiError> {
        let response = self.send(self.build_games_by_series(series)?)?;
        self.parse_games(response)
    }

    /// List runs awaiting verification, optionally with inline game and user
    /// details.
    pub fn get_unverified_runs(&self, expanded: bool) -> Result<Vec<Run>, ApiError> {
        let response = self.send(self.build_unverified_runs(expanded)?)?;
        self.parse_unverified_runs(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(url = %request.url, "GET");
        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            tracing::warn!(
                url = %request.url,
                status = response.status,
                "non-success status, decoding body anyway"
            );
        }
        Ok(response)
    }
}

/// Status codes are not checked; the body alone decides success.
fn decode(response: &HttpResponse) -> Result<Envelope, ApiError> {
    decode_envelope(&response.body)
}
