use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use async_trait::async_trait;

use crate::error::{FlickError, Result};
use crate::source::MovieSource;
use crate::types::{CastMember, Movie, MovieDetail, SearchPage, Video};

const API_HOST: &str = "api.themoviedb.org";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

pub struct Tmdb {
    client: Client,
    api_key: String,
    language: Option<String>,
}

impl std::fmt::Debug for Tmdb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tmdb").finish_non_exhaustive()
    }
}

impl Tmdb {
    pub fn new(api_key: String, language: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            language,
        }
    }

    fn api_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("https://{}/3{}?api_key={}", API_HOST, path, self.api_key);
        if let Some(lang) = &self.language {
            url.push_str("&language=");
            url.push_str(&urlencoding::encode(lang));
        }
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FlickError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FlickError::Api(format!("TMDB API {}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| FlickError::Api(e.to_string()))
    }
}

// TMDB API response types

#[derive(Deserialize)]
struct TmPage {
    page: Option<u32>,
    results: Option<Vec<TmMovie>>,
    total_pages: Option<u32>,
    total_results: Option<u64>,
}

#[derive(Deserialize)]
struct TmMovie {
    id: Option<u64>,
    title: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
    release_date: Option<String>,
    overview: Option<String>,
}

#[derive(Deserialize)]
struct TmDetail {
    id: Option<u64>,
    title: Option<String>,
    overview: Option<String>,
    runtime: Option<u32>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
    release_date: Option<String>,
}

#[derive(Deserialize)]
struct TmCredits {
    cast: Option<Vec<TmCast>>,
}

#[derive(Deserialize)]
struct TmCast {
    name: Option<String>,
    character: Option<String>,
    profile_path: Option<String>,
}

#[derive(Deserialize)]
struct TmVideos {
    results: Option<Vec<TmVideo>>,
}

#[derive(Deserialize)]
struct TmVideo {
    key: Option<String>,
    name: Option<String>,
    site: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// TMDB dates are "YYYY-MM-DD", with the empty string standing in for unknown.
fn parse_release_date(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn map_movie(raw: TmMovie) -> Option<Movie> {
    Some(Movie {
        id: raw.id?,
        title: raw.title.unwrap_or_default(),
        poster_path: raw.poster_path,
        vote_average: raw.vote_average,
        release_date: parse_release_date(raw.release_date.as_deref()),
        overview: raw.overview.filter(|o| !o.is_empty()),
    })
}

fn map_page(raw: TmPage) -> SearchPage {
    let results: Vec<Movie> = raw
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(map_movie)
        .collect();
    let total_results = raw.total_results.unwrap_or(results.len() as u64);

    SearchPage {
        page: raw.page.unwrap_or(1),
        results,
        total_pages: raw.total_pages.unwrap_or(1),
        total_results,
    }
}

fn map_cast(raw: TmCredits) -> Vec<CastMember> {
    raw.cast
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| {
            Some(CastMember {
                name: c.name?,
                character: c.character.filter(|ch| !ch.is_empty()),
                profile_path: c.profile_path,
            })
        })
        .collect()
}

fn map_videos(raw: TmVideos) -> Vec<Video> {
    raw.results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| {
            Some(Video {
                key: v.key?,
                name: v.name.unwrap_or_default(),
                site: v.site.unwrap_or_default(),
                kind: v.kind.unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl MovieSource for Tmdb {
    async fn now_playing(&self) -> Result<Vec<Movie>> {
        let url = self.api_url("/movie/now_playing", &[]);
        let page: TmPage = self.get_json(&url).await?;
        Ok(map_page(page).results)
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        let page_param = page.to_string();
        let url = self.api_url(
            "/search/movie",
            &[("query", query), ("page", &page_param)],
        );
        let raw: TmPage = self.get_json(&url).await?;
        Ok(map_page(raw))
    }

    async fn discover_by_genre(&self, genre_id: u32, page: u32) -> Result<SearchPage> {
        let genre_param = genre_id.to_string();
        let page_param = page.to_string();
        let url = self.api_url(
            "/discover/movie",
            &[("with_genres", &genre_param), ("page", &page_param)],
        );
        let raw: TmPage = self.get_json(&url).await?;
        Ok(map_page(raw))
    }

    async fn movie_detail(&self, movie_id: u64) -> Result<MovieDetail> {
        let url = self.api_url(&format!("/movie/{}", movie_id), &[]);
        let detail: TmDetail = self.get_json(&url).await?;

        Ok(MovieDetail {
            id: detail.id.unwrap_or(movie_id),
            title: detail.title.unwrap_or_default(),
            overview: detail.overview.filter(|o| !o.is_empty()),
            runtime: detail.runtime,
            poster_path: detail.poster_path,
            vote_average: detail.vote_average,
            release_date: parse_release_date(detail.release_date.as_deref()),
        })
    }

    async fn credits(&self, movie_id: u64) -> Result<Vec<CastMember>> {
        let url = self.api_url(&format!("/movie/{}/casts", movie_id), &[]);
        let credits: TmCredits = self.get_json(&url).await?;
        Ok(map_cast(credits))
    }

    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>> {
        let url = self.api_url(&format!("/movie/{}/videos", movie_id), &[]);
        let videos: TmVideos = self.get_json(&url).await?;
        Ok(map_videos(videos))
    }

    async fn poster(&self, poster_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", IMAGE_BASE, poster_path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FlickError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlickError::Api(format!(
                "Failed to fetch poster: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FlickError::Api(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Tmdb {
        Tmdb::new("testkey".to_string(), None)
    }

    #[test]
    fn api_url_carries_key_and_params() {
        let url = client().api_url("/search/movie", &[("query", "batman"), ("page", "2")]);
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/search/movie?api_key=testkey&query=batman&page=2"
        );
    }

    #[test]
    fn api_url_percent_encodes_query() {
        let url = client().api_url("/search/movie", &[("query", "the dark knight")]);
        assert!(url.ends_with("query=the%20dark%20knight"));
    }

    #[test]
    fn api_url_includes_language_when_set() {
        let tmdb = Tmdb::new("k".to_string(), Some("de-DE".to_string()));
        let url = tmdb.api_url("/movie/now_playing", &[]);
        assert_eq!(
            url,
            "https://api.themoviedb.org/3/movie/now_playing?api_key=k&language=de-DE"
        );
    }

    #[test]
    fn decode_and_map_search_page() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 268, "title": "Batman", "poster_path": "/p1.jpg",
                 "vote_average": 7.2, "release_date": "1989-06-23",
                 "overview": "The Dark Knight of Gotham City."},
                {"id": 272, "title": "Batman Begins", "poster_path": null,
                 "vote_average": null, "release_date": "", "overview": ""}
            ],
            "total_pages": 3,
            "total_results": 57
        }"#;
        let raw: TmPage = serde_json::from_str(body).unwrap();
        let page = map_page(raw);

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 57);
        assert_eq!(page.results.len(), 2);

        let first = &page.results[0];
        assert_eq!(first.id, 268);
        assert_eq!(first.vote_average, Some(7.2));
        assert_eq!(
            first.release_date,
            Some(NaiveDate::from_ymd_opt(1989, 6, 23).unwrap())
        );

        let second = &page.results[1];
        assert_eq!(second.vote_average, None);
        assert_eq!(second.release_date, None);
        assert_eq!(second.overview, None);
    }

    #[test]
    fn movies_without_id_are_dropped() {
        let body = r#"{"results": [{"title": "No Id"}, {"id": 5, "title": "Kept"}]}"#;
        let raw: TmPage = serde_json::from_str(body).unwrap();
        let page = map_page(raw);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].title, "Kept");
    }

    #[test]
    fn empty_page_defaults() {
        let raw: TmPage = serde_json::from_str("{}").unwrap();
        let page = map_page(raw);
        assert_eq!(page.page, 1);
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_results, 0);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = serde_json::from_str::<TmPage>("<html>Bad Gateway</html>");
        assert!(err.is_err());
    }

    #[test]
    fn decode_videos_maps_type_to_kind() {
        let body = r#"{
            "id": 268,
            "results": [
                {"key": "dgC9Q0uhX70", "name": "Official Teaser", "site": "YouTube", "type": "Teaser"},
                {"key": "EXeTwQWrcwY", "name": "Official Trailer", "site": "YouTube", "type": "Trailer"},
                {"name": "Keyless entry is dropped"}
            ]
        }"#;
        let raw: TmVideos = serde_json::from_str(body).unwrap();
        let videos = map_videos(raw);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[1].kind, "Trailer");
    }

    #[test]
    fn decode_credits_keeps_named_cast_only() {
        let body = r#"{
            "id": 268,
            "cast": [
                {"name": "Michael Keaton", "character": "Batman", "profile_path": "/mk.jpg"},
                {"character": "Uncredited"},
                {"name": "Jack Nicholson", "character": ""}
            ]
        }"#;
        let raw: TmCredits = serde_json::from_str(body).unwrap();
        let cast = map_cast(raw);
        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].name, "Michael Keaton");
        assert_eq!(cast[0].character.as_deref(), Some("Batman"));
        assert_eq!(cast[1].character, None);
    }

    #[test]
    fn parse_release_date_handles_blank() {
        assert_eq!(parse_release_date(None), None);
        assert_eq!(parse_release_date(Some("")), None);
        assert_eq!(
            parse_release_date(Some("2010-07-16")),
            Some(NaiveDate::from_ymd_opt(2010, 7, 16).unwrap())
        );
    }
}
