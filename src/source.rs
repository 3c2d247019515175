use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CastMember, Movie, MovieDetail, SearchPage, Video};

/// Movie metadata backend. `App` only ever talks to this trait, so tests can
/// substitute a scripted implementation for the real TMDB client.
#[async_trait]
pub trait MovieSource: Send + Sync + std::fmt::Debug {
    async fn now_playing(&self) -> Result<Vec<Movie>>;
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage>;
    async fn discover_by_genre(&self, genre_id: u32, page: u32) -> Result<SearchPage>;
    async fn movie_detail(&self, movie_id: u64) -> Result<MovieDetail>;
    async fn credits(&self, movie_id: u64) -> Result<Vec<CastMember>>;
    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>>;
    async fn poster(&self, poster_path: &str) -> Result<Vec<u8>>;
}
