use crate::error::LookupError;
use crate::lookup::{ArtistLookup, RawArtist};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// MusicBrainz asks every client to identify itself as `app/version ( contact )`.
pub fn default_user_agent() -> String {
    format!(
        "bandmap/{} ( https://github.com/bandmap/bandmap )",
        env!("CARGO_PKG_VERSION")
    )
}

/// Connection settings for the MusicBrainz web service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// MusicBrainz artist lookups over HTTP.
///
/// The client does no pacing of its own; the crawler owns the request delay.
pub struct MusicBrainzClient {
    client: Client,
    base_url: Url,
}

impl MusicBrainzClient {
    pub fn new(config: &ClientConfig) -> Result<Self, LookupError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| LookupError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.div_ceil(2)))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn artist_url(&self, id: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("artist")
            .push(id);
        url.query_pairs_mut()
            .clear()
            .append_pair("inc", "artist-rels")
            .append_pair("fmt", "json");
        Ok(url)
    }
}

impl ArtistLookup for MusicBrainzClient {
    async fn lookup_artist(&self, id: &str) -> Result<RawArtist, LookupError> {
        let url = self.artist_url(id)?;
        debug!(mbid = %id, url = %url, "Querying MusicBrainz");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(id.to_string()));
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(LookupError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn client_for(server: &MockServer) -> MusicBrainzClient {
        let config = ClientConfig {
            base_url: format!("{}/ws/2/", server.uri()),
            user_agent: "bandmap-test/0.0 ( test@example.com )".to_string(),
            timeout_secs: 5,
        };
        MusicBrainzClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_artist_requests_relations() {
        let server = MockServer::start().await;

        let body = r#"{
            "id": "mlb",
            "name": "Mother Love Bone",
            "relations": [
                {"type": "member of band", "direction": "backward",
                 "artist": {"id": "jeff", "name": "Jeff Ament"}}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/ws/2/artist/mlb"))
            .and(query_param("inc", "artist-rels"))
            .and(query_param("fmt", "json"))
            .and(header("user-agent", "bandmap-test/0.0 ( test@example.com )"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let artist = client_for(&server).lookup_artist("mlb").await.unwrap();
        assert_eq!(artist.name.as_deref(), Some("Mother Love Bone"));
        assert_eq!(artist.relations.len(), 1);
        assert_eq!(
            artist.relations[0].artist.as_ref().unwrap().id.as_deref(),
            Some("jeff")
        );
    }

    #[tokio::test]
    async fn test_lookup_artist_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws/2/artist/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup_artist("missing").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(ref id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_lookup_artist_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup_artist("any").await.unwrap_err();
        assert!(matches!(err, LookupError::RateLimited));
    }

    #[tokio::test]
    async fn test_lookup_artist_server_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup_artist("any").await.unwrap_err();
        assert!(matches!(err, LookupError::ApiError(500, ref body) if body == "boom"));
    }

    #[tokio::test]
    async fn test_lookup_artist_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup_artist("any").await.unwrap_err();
        assert!(matches!(err, LookupError::ParseError(_)));
    }

    #[test]
    fn test_artist_url_encodes_id() {
        let client = MusicBrainzClient::new(&ClientConfig::default()).unwrap();
        let url = client.artist_url("a b/c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://musicbrainz.org/ws/2/artist/a%20b%2Fc?inc=artist-rels&fmt=json"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let config = ClientConfig {
            base_url: "http://localhost:5000/ws/2".to_string(),
            ..ClientConfig::default()
        };
        let client = MusicBrainzClient::new(&config).unwrap();
        let url = client.artist_url("x").unwrap();
        assert_eq!(url.path(), "/ws/2/artist/x");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            MusicBrainzClient::new(&config),
            Err(LookupError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_default_user_agent_names_the_tool() {
        assert!(default_user_agent().starts_with("bandmap/"));
    }
}
