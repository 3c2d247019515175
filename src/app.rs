use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::source::MovieSource;
use crate::tui::Event;
use crate::types::{
    pick_trailer, CastMember, Movie, MovieDetail, SortOrder, Video, GENRES,
};

/// Selection this close to the end of the working set triggers the next page.
const NEAR_BOTTOM: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,    // Now-playing rail + genre catalog
    Results, // Search or genre results
    Detail,  // Single movie with cast and videos
}

/// Section of the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeSection {
    #[default]
    NowPlaying,
    Genres,
}

pub struct App {
    pub screen: Screen,

    // Home screen data
    pub now_playing: Vec<Movie>,
    pub home_section: HomeSection,
    pub now_playing_index: usize,
    pub genre_index: usize,

    // Results state (the working set and its cursor)
    pub movies: Vec<Movie>,
    pub selected: usize,
    pub sort_order: SortOrder,
    pub query: String,
    pub genre: Option<u32>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub loading: bool,

    // Search input mode
    pub search_mode: bool,
    pub search_input: String,

    // Sort popup
    pub sort_popup: bool,
    pub popup_index: usize,

    // Detail screen data
    pub detail: Option<MovieDetail>,
    pub cast: Vec<CastMember>,
    pub videos: Vec<Video>,
    pub detail_scroll: usize,

    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,

    load_seq: u64,
    source: Arc<dyn MovieSource>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(source: Arc<dyn MovieSource>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            screen: Screen::Home,

            now_playing: Vec::new(),
            home_section: HomeSection::default(),
            now_playing_index: 0,
            genre_index: 0,

            movies: Vec::new(),
            selected: 0,
            sort_order: SortOrder::None,
            query: String::new(),
            genre: None,
            current_page: 1,
            total_pages: 1,
            total_results: 0,
            loading: false,

            search_mode: false,
            search_input: String::new(),

            sort_popup: false,
            popup_index: 0,

            detail: None,
            cast: Vec::new(),
            videos: Vec::new(),
            detail_scroll: 0,

            error: None,
            notice: None,
            should_quit: false,

            load_seq: 0,
            source,
            action_tx,
        }
    }

    /// The video presented as the current movie's trailer, if any loaded.
    pub fn trailer(&self) -> Option<&Video> {
        pick_trailer(&self.videos)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadNowPlaying,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.search_mode {
            return match key.code {
                KeyCode::Esc => Action::ExitSearchMode,
                KeyCode::Enter => Action::SearchConfirm,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char(c) => Action::SearchInput(c),
                _ => Action::None,
            };
        }

        if self.sort_popup {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Action::PopupDown,
                KeyCode::Char('k') | KeyCode::Up => Action::PopupUp,
                KeyCode::Enter => Action::PopupSelect,
                KeyCode::Esc | KeyCode::Char('q') => Action::PopupCancel,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.screen == Screen::Home {
                    Action::Quit
                } else {
                    Action::Back
                }
            }
            KeyCode::Char('/') => Action::EnterSearchMode,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Enter => Action::Select,
            KeyCode::Tab => {
                if self.screen == Screen::Home {
                    Action::SwitchHomeSection
                } else {
                    Action::None
                }
            }
            KeyCode::Char('s') => {
                if self.screen == Screen::Results && !self.movies.is_empty() {
                    Action::ShowSortSelect
                } else {
                    Action::None
                }
            }
            KeyCode::Char('o') => {
                if self.screen == Screen::Detail {
                    Action::OpenTrailer
                } else {
                    Action::None
                }
            }
            KeyCode::Char('y') => {
                if self.screen == Screen::Detail {
                    Action::YankTrailerUrl
                } else {
                    Action::None
                }
            }
            KeyCode::Char('p') => {
                if self.screen == Screen::Detail {
                    Action::SavePoster
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::Quit) {
            self.error = None;
        }
        if self.notice.is_some()
            && !matches!(action, Action::Quit | Action::PosterSaved(_) | Action::Error(_))
        {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::Home => {
                    self.should_quit = true;
                }
                Screen::Results => {
                    self.reset_to_home();
                }
                Screen::Detail => {
                    self.screen = Screen::Results;
                    self.detail = None;
                    self.cast.clear();
                    self.videos.clear();
                    self.detail_scroll = 0;
                    self.loading = false;
                    self.load_seq += 1;
                }
            },

            Action::ScrollUp => match self.screen {
                Screen::Home => match self.home_section {
                    HomeSection::NowPlaying => {
                        self.now_playing_index = self.now_playing_index.saturating_sub(1);
                    }
                    HomeSection::Genres => {
                        self.genre_index = self.genre_index.saturating_sub(1);
                    }
                },
                Screen::Results => {
                    self.selected = self.selected.saturating_sub(1);
                }
                Screen::Detail => {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1);
                }
            },
            Action::ScrollDown => match self.screen {
                Screen::Home => match self.home_section {
                    HomeSection::NowPlaying => {
                        if !self.now_playing.is_empty()
                            && self.now_playing_index < self.now_playing.len() - 1
                        {
                            self.now_playing_index += 1;
                        }
                    }
                    HomeSection::Genres => {
                        if self.genre_index < GENRES.len() - 1 {
                            self.genre_index += 1;
                        }
                    }
                },
                Screen::Results => {
                    if !self.movies.is_empty() && self.selected < self.movies.len() - 1 {
                        self.selected += 1;
                    }
                    self.maybe_load_next_page();
                }
                Screen::Detail => {
                    self.detail_scroll += 1;
                }
            },

            Action::Select => match self.screen {
                Screen::Home => match self.home_section {
                    HomeSection::NowPlaying => {
                        if let Some(movie) = self.now_playing.get(self.now_playing_index) {
                            let id = movie.id;
                            self.open_detail(id);
                        }
                    }
                    HomeSection::Genres => {
                        if let Some(genre) = GENRES.get(self.genre_index) {
                            self.begin_genre(genre.id);
                        }
                    }
                },
                Screen::Results => {
                    if let Some(movie) = self.movies.get(self.selected) {
                        let id = movie.id;
                        self.open_detail(id);
                    }
                }
                Screen::Detail => {}
            },

            Action::SwitchHomeSection => {
                self.home_section = match self.home_section {
                    HomeSection::NowPlaying => HomeSection::Genres,
                    HomeSection::Genres => HomeSection::NowPlaying,
                };
            }

            // Search input
            Action::EnterSearchMode => {
                self.search_mode = true;
                self.search_input = self.query.clone();
            }
            Action::ExitSearchMode => {
                self.search_mode = false;
            }
            Action::SearchInput(c) => {
                self.search_input.push(c);
            }
            Action::SearchBackspace => {
                self.search_input.pop();
            }
            Action::SearchConfirm => {
                self.search_mode = false;
                let query = self.search_input.trim().to_string();
                if query.is_empty() {
                    // Clearing the query abandons the result set, in-flight
                    // responses included.
                    if self.screen == Screen::Results {
                        self.reset_to_home();
                    }
                } else {
                    self.begin_search(query);
                }
            }

            // Sort popup
            Action::ShowSortSelect => {
                self.sort_popup = true;
                self.popup_index = match self.sort_order {
                    SortOrder::Descending => 1,
                    _ => 0,
                };
            }
            Action::PopupUp => {
                self.popup_index = self.popup_index.saturating_sub(1);
            }
            Action::PopupDown => {
                if self.popup_index < 1 {
                    self.popup_index += 1;
                }
            }
            Action::PopupSelect => {
                let order = if self.popup_index == 0 {
                    SortOrder::Ascending
                } else {
                    SortOrder::Descending
                };
                self.sort_popup = false;
                self.update(Action::ApplySort(order));
            }
            Action::PopupCancel => {
                self.sort_popup = false;
            }
            Action::ApplySort(order) => {
                // Re-selecting the active order is a no-op.
                if order != self.sort_order {
                    self.sort_order = order;
                    sort_movies(&mut self.movies, order);
                }
            }

            // Loads
            Action::LoadNowPlaying => {
                self.loading = true;
                self.load_seq += 1;
                self.spawn_now_playing(self.load_seq);
            }
            Action::NowPlayingLoaded(movies, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.loading = false;
                self.now_playing = movies;
                self.now_playing_index = 0;
            }
            Action::ResultsLoaded(page, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.loading = false;
                self.movies = page.results;
                self.selected = 0;
                self.current_page = page.page;
                self.total_pages = page.total_pages;
                self.total_results = page.total_results;
                sort_movies(&mut self.movies, self.sort_order);
            }
            Action::PageAppended(page, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.loading = false;
                self.movies.extend(page.results);
                self.total_pages = page.total_pages;
                self.total_results = page.total_results;
            }
            Action::DetailLoaded(detail, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.loading = false;
                self.detail = Some(*detail);
                self.detail_scroll = 0;
                self.screen = Screen::Detail;
            }
            Action::CreditsLoaded(cast, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.cast = cast;
            }
            Action::VideosLoaded(videos, seq) => {
                if self.stale(seq) {
                    return;
                }
                self.videos = videos;
            }

            // Detail screen
            Action::OpenTrailer => {
                if let Some(url) = self.trailer().map(|v| v.url()) {
                    if let Err(e) = open::that(url) {
                        self.error = Some(format!("Failed to open trailer: {}", e));
                    }
                }
            }
            Action::YankTrailerUrl => {
                if let Some(url) = self.trailer().map(|v| v.url()) {
                    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url)) {
                        Ok(()) => self.notice = Some("Trailer URL copied".to_string()),
                        Err(e) => self.error = Some(format!("Clipboard error: {}", e)),
                    }
                }
            }
            Action::SavePoster => {
                if let Some(detail) = &self.detail {
                    if let Some(path) = detail.poster_path.clone() {
                        self.spawn_save_poster(detail.id, path);
                    }
                }
            }
            Action::PosterSaved(filename) => {
                self.notice = Some(format!("Poster saved to {}", filename));
            }

            Action::Error(msg) => {
                self.loading = false;
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    /// True when a completion message belongs to a superseded load generation.
    fn stale(&self, seq: u64) -> bool {
        if seq != self.load_seq {
            tracing::debug!(seq, current = self.load_seq, "dropping stale response");
            return true;
        }
        false
    }

    /// Back out of the result set entirely. Bumping the generation makes any
    /// in-flight response for the old set a dead letter.
    fn reset_to_home(&mut self) {
        self.screen = Screen::Home;
        self.movies.clear();
        self.selected = 0;
        self.query.clear();
        self.genre = None;
        self.sort_order = SortOrder::None;
        self.current_page = 1;
        self.total_pages = 1;
        self.total_results = 0;
        self.loading = false;
        self.search_input.clear();
        self.load_seq += 1;
    }

    fn begin_search(&mut self, query: String) {
        self.screen = Screen::Results;
        self.query = query.clone();
        self.genre = None;
        self.current_page = 1;
        self.loading = true;
        self.load_seq += 1;
        self.spawn_search(query, 1, self.load_seq, false);
    }

    fn begin_genre(&mut self, genre_id: u32) {
        self.screen = Screen::Results;
        self.genre = Some(genre_id);
        self.query.clear();
        self.current_page = 1;
        self.loading = true;
        self.load_seq += 1;
        self.spawn_discover(genre_id, 1, self.load_seq, false);
    }

    fn open_detail(&mut self, movie_id: u64) {
        self.loading = true;
        self.cast.clear();
        self.videos.clear();
        self.load_seq += 1;
        self.spawn_load_detail(movie_id, self.load_seq);
    }

    fn maybe_load_next_page(&mut self) {
        if self.loading
            || self.sort_order != SortOrder::None
            || self.screen != Screen::Results
            || self.current_page >= self.total_pages
            || self.movies.is_empty()
            || self.selected + NEAR_BOTTOM < self.movies.len()
        {
            return;
        }

        self.loading = true;
        self.current_page += 1;
        let page = self.current_page;
        let seq = self.load_seq;
        if let Some(genre_id) = self.genre {
            self.spawn_discover(genre_id, page, seq, true);
        } else {
            self.spawn_search(self.query.clone(), page, seq, true);
        }
    }

    fn spawn_now_playing(&self, seq: u64) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.now_playing().await {
                Ok(movies) => {
                    tx.send(Action::NowPlayingLoaded(movies, seq)).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_search(&self, query: String, page: u32, seq: u64, append: bool) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.search(&query, page).await {
                Ok(result) => {
                    let action = if append {
                        Action::PageAppended(result, seq)
                    } else {
                        Action::ResultsLoaded(result, seq)
                    };
                    tx.send(action).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_discover(&self, genre_id: u32, page: u32, seq: u64, append: bool) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.discover_by_genre(genre_id, page).await {
                Ok(result) => {
                    let action = if append {
                        Action::PageAppended(result, seq)
                    } else {
                        Action::ResultsLoaded(result, seq)
                    };
                    tx.send(action).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_load_detail(&self, movie_id: u64, seq: u64) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let (detail, credits, videos) = tokio::join!(
                source.movie_detail(movie_id),
                source.credits(movie_id),
                source.videos(movie_id)
            );

            match detail {
                Ok(detail) => {
                    tx.send(Action::DetailLoaded(Box::new(detail), seq)).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                    return;
                }
            }

            // Cast and videos are auxiliary; the detail screen renders
            // without them.
            match credits {
                Ok(cast) => {
                    tx.send(Action::CreditsLoaded(cast, seq)).ok();
                }
                Err(e) => tracing::warn!("credits fetch failed: {}", e),
            }
            match videos {
                Ok(videos) => {
                    tx.send(Action::VideosLoaded(videos, seq)).ok();
                }
                Err(e) => tracing::warn!("videos fetch failed: {}", e),
            }
        });
    }

    fn spawn_save_poster(&self, movie_id: u64, poster_path: String) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.poster(&poster_path).await {
                Ok(bytes) => {
                    let filename = format!("poster_{}.jpg", movie_id);
                    match tokio::fs::write(&filename, bytes).await {
                        Ok(()) => {
                            tx.send(Action::PosterSaved(filename)).ok();
                        }
                        Err(e) => {
                            tx.send(Action::Error(format!("Failed to save poster: {}", e)))
                                .ok();
                        }
                    }
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }
}

/// Stable sort of the working set by rating. Missing votes sort as 0.
fn sort_movies(movies: &mut [Movie], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::Ascending => movies.sort_by(|a, b| a.rating().total_cmp(&b.rating())),
        SortOrder::Descending => movies.sort_by(|a, b| b.rating().total_cmp(&a.rating())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FlickError, Result};
    use crate::types::SearchPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn movie(id: u64, rating: Option<f64>) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            poster_path: Some(format!("/poster{}.jpg", id)),
            vote_average: rating,
            release_date: None,
            overview: None,
        }
    }

    /// Scripted backend: serves `per_page` movies per page out of a fixed
    /// total, and records which operations were called.
    #[derive(Debug)]
    struct StubSource {
        per_page: usize,
        total_pages: u32,
        total_results: u64,
        fail_detail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn paged(per_page: usize, total_pages: u32, total_results: u64) -> Self {
            Self {
                per_page,
                total_pages,
                total_results,
                fail_detail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_detail() -> Self {
            let mut stub = Self::paged(20, 1, 20);
            stub.fail_detail = true;
            stub
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn page(&self, page: u32) -> SearchPage {
            let start = (page as u64 - 1) * self.per_page as u64;
            let results = (start..start + self.per_page as u64)
                .map(|i| movie(i + 1, Some((i % 10) as f64)))
                .collect();
            SearchPage {
                page,
                results,
                total_pages: self.total_pages,
                total_results: self.total_results,
            }
        }
    }

    #[async_trait]
    impl MovieSource for StubSource {
        async fn now_playing(&self) -> Result<Vec<Movie>> {
            self.record("now_playing");
            Ok(self.page(1).results)
        }

        async fn search(&self, _query: &str, page: u32) -> Result<SearchPage> {
            self.record("search");
            Ok(self.page(page))
        }

        async fn discover_by_genre(&self, _genre_id: u32, page: u32) -> Result<SearchPage> {
            self.record("discover");
            Ok(self.page(page))
        }

        async fn movie_detail(&self, movie_id: u64) -> Result<MovieDetail> {
            self.record("detail");
            if self.fail_detail {
                return Err(FlickError::Api("decode error".to_string()));
            }
            Ok(MovieDetail {
                id: movie_id,
                title: format!("Movie {}", movie_id),
                overview: Some("An overview.".to_string()),
                runtime: Some(120),
                poster_path: Some("/poster.jpg".to_string()),
                vote_average: Some(7.5),
                release_date: None,
            })
        }

        async fn credits(&self, _movie_id: u64) -> Result<Vec<CastMember>> {
            self.record("credits");
            Ok(vec![CastMember {
                name: "Some Actor".to_string(),
                character: Some("Lead".to_string()),
                profile_path: None,
            }])
        }

        async fn videos(&self, _movie_id: u64) -> Result<Vec<Video>> {
            self.record("videos");
            Ok(vec![Video {
                key: "abc".to_string(),
                name: "Official Trailer".to_string(),
                site: "YouTube".to_string(),
                kind: "Trailer".to_string(),
            }])
        }

        async fn poster(&self, _poster_path: &str) -> Result<Vec<u8>> {
            self.record("poster");
            Ok(vec![0xFF, 0xD8])
        }
    }

    struct Harness {
        app: App,
        rx: mpsc::UnboundedReceiver<Action>,
        source: Arc<StubSource>,
    }

    fn harness(stub: StubSource) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(stub);
        let app = App::new(source.clone() as Arc<dyn MovieSource>, tx);
        Harness { app, rx, source }
    }

    impl Harness {
        /// Receive one completion message from a spawned task and apply it.
        async fn pump(&mut self) {
            let action = self.rx.recv().await.expect("expected a task message");
            self.app.update(action);
        }

        fn no_pending_message(&mut self) {
            assert!(self.rx.try_recv().is_err());
        }

        fn type_query(&mut self, query: &str) {
            self.app.update(Action::EnterSearchMode);
            self.app.search_input.clear();
            for c in query.chars() {
                self.app.update(Action::SearchInput(c));
            }
            self.app.update(Action::SearchConfirm);
        }
    }

    #[tokio::test]
    async fn init_loads_now_playing() {
        let mut h = harness(StubSource::paged(20, 1, 20));
        let action = h.app.handle_event(Event::Init);
        h.app.update(action);
        assert!(h.app.loading);
        h.pump().await;
        assert!(!h.app.loading);
        assert_eq!(h.app.now_playing.len(), 20);
        assert_eq!(h.app.screen, Screen::Home);
    }

    #[tokio::test]
    async fn search_populates_results() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        assert_eq!(h.app.screen, Screen::Results);
        assert_eq!(h.app.query, "batman");
        assert!(h.app.loading);

        h.pump().await;
        assert!(!h.app.loading);
        assert_eq!(h.app.movies.len(), 20);
        assert_eq!(h.app.current_page, 1);
        assert_eq!(h.app.total_pages, 3);
        assert_eq!(h.app.total_results, 57);
    }

    #[tokio::test]
    async fn scroll_near_bottom_appends_next_page() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.pump().await;

        // Walk the selection toward the end of the 20-item set; crossing the
        // near-bottom threshold fires exactly one page-2 fetch.
        for _ in 0..19 {
            h.app.update(Action::ScrollDown);
        }
        assert!(h.app.loading);
        assert_eq!(h.app.current_page, 2);

        h.pump().await;
        assert_eq!(h.app.movies.len(), 40);
        assert_eq!(h.app.current_page, 2);
        h.no_pending_message();
    }

    #[tokio::test]
    async fn pagination_stops_on_last_page() {
        let mut h = harness(StubSource::paged(10, 1, 10));
        h.type_query("batman");
        h.pump().await;

        for _ in 0..9 {
            h.app.update(Action::ScrollDown);
        }
        assert!(!h.app.loading);
        assert_eq!(h.app.current_page, 1);
        h.no_pending_message();
    }

    #[tokio::test]
    async fn sorted_set_does_not_paginate() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.pump().await;

        h.app.update(Action::ApplySort(SortOrder::Descending));
        for _ in 0..19 {
            h.app.update(Action::ScrollDown);
        }
        assert!(!h.app.loading);
        assert_eq!(h.app.current_page, 1);
        assert_eq!(h.app.movies.len(), 20);
        h.no_pending_message();
    }

    #[tokio::test]
    async fn genre_selection_discovers_and_paginates_with_discover() {
        let mut h = harness(StubSource::paged(20, 2, 40));
        h.app.update(Action::SwitchHomeSection);
        assert_eq!(h.app.home_section, HomeSection::Genres);
        h.app.update(Action::Select);
        assert_eq!(h.app.screen, Screen::Results);
        assert_eq!(h.app.genre, Some(GENRES[0].id));
        assert!(h.app.query.is_empty());

        h.pump().await;
        assert_eq!(h.app.movies.len(), 20);

        for _ in 0..19 {
            h.app.update(Action::ScrollDown);
        }
        h.pump().await;
        assert_eq!(h.app.movies.len(), 40);
        assert_eq!(h.source.calls(), vec!["discover", "discover"]);
    }

    #[tokio::test]
    async fn clearing_query_resets_to_home_and_discards_in_flight() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        // The search is still in flight; clear the query before it lands.
        h.type_query("");
        assert_eq!(h.app.screen, Screen::Home);
        assert!(h.app.movies.is_empty());
        assert!(h.app.query.is_empty());

        // The in-flight response arrives under a dead generation.
        h.pump().await;
        assert_eq!(h.app.screen, Screen::Home);
        assert!(h.app.movies.is_empty());
        assert!(!h.app.loading);
    }

    #[tokio::test]
    async fn back_from_results_clears_query_genre_and_sort() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.pump().await;
        h.app.update(Action::ApplySort(SortOrder::Ascending));

        h.app.update(Action::Back);
        assert_eq!(h.app.screen, Screen::Home);
        assert!(h.app.movies.is_empty());
        assert!(h.app.query.is_empty());
        assert_eq!(h.app.genre, None);
        assert_eq!(h.app.sort_order, SortOrder::None);
        assert_eq!(h.app.current_page, 1);
    }

    #[tokio::test]
    async fn new_search_supersedes_previous_one() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.type_query("superman");
        // Two responses land in task-completion order; only the one from the
        // current generation may touch state.
        h.pump().await;
        h.pump().await;
        assert!(!h.app.loading);
        assert_eq!(h.app.query, "superman");
        assert_eq!(h.app.movies.len(), 20);
        h.no_pending_message();
    }

    #[tokio::test]
    async fn select_movie_opens_detail_with_cast_and_videos() {
        let mut h = harness(StubSource::paged(20, 1, 20));
        h.type_query("batman");
        h.pump().await;

        h.app.update(Action::Select);
        assert!(h.app.loading);
        h.pump().await; // detail
        h.pump().await; // credits
        h.pump().await; // videos

        assert_eq!(h.app.screen, Screen::Detail);
        assert_eq!(h.app.detail.as_ref().unwrap().id, 1);
        assert_eq!(h.app.cast.len(), 1);
        assert_eq!(h.app.trailer().unwrap().key, "abc");
    }

    #[tokio::test]
    async fn failed_detail_fetch_surfaces_an_error() {
        let mut h = harness(StubSource::failing_detail());
        h.type_query("batman");
        h.pump().await;

        h.app.update(Action::Select);
        h.pump().await;
        assert_eq!(h.app.screen, Screen::Results);
        assert!(h.app.detail.is_none());
        assert!(h.app.error.as_deref().unwrap().contains("decode error"));
        assert!(!h.app.loading);
        h.no_pending_message();
    }

    #[tokio::test]
    async fn error_is_cleared_by_next_input() {
        let mut h = harness(StubSource::failing_detail());
        h.type_query("batman");
        h.pump().await;
        h.app.update(Action::Select);
        h.pump().await;
        assert!(h.app.error.is_some());

        h.app.update(Action::ScrollDown);
        assert!(h.app.error.is_none());
    }

    #[test]
    fn sort_ascending_then_descending_reverses() {
        let mut asc = vec![movie(1, Some(5.0)), movie(2, Some(9.0)), movie(3, Some(1.0))];
        let mut desc = asc.clone();
        sort_movies(&mut asc, SortOrder::Ascending);
        sort_movies(&mut desc, SortOrder::Descending);

        let asc_ids: Vec<u64> = asc.iter().map(|m| m.id).collect();
        let mut desc_ids: Vec<u64> = desc.iter().map(|m| m.id).collect();
        desc_ids.reverse();
        assert_eq!(asc_ids, desc_ids);
        assert_eq!(asc_ids, vec![3, 1, 2]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut movies = vec![movie(1, Some(7.0)), movie(2, Some(7.0)), movie(3, Some(3.0))];
        sort_movies(&mut movies, SortOrder::Ascending);
        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn sort_treats_missing_rating_as_zero() {
        let mut movies = vec![movie(1, Some(4.0)), movie(2, None), movie(3, Some(8.0))];
        sort_movies(&mut movies, SortOrder::Ascending);
        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn reapplying_active_sort_is_a_no_op() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.pump().await;

        h.app.update(Action::ApplySort(SortOrder::Descending));
        let once: Vec<u64> = h.app.movies.iter().map(|m| m.id).collect();
        h.app.update(Action::ApplySort(SortOrder::Descending));
        let twice: Vec<u64> = h.app.movies.iter().map(|m| m.id).collect();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn fresh_results_inherit_active_sort() {
        let mut h = harness(StubSource::paged(20, 3, 57));
        h.type_query("batman");
        h.pump().await;
        h.app.update(Action::ApplySort(SortOrder::Descending));

        h.type_query("superman");
        h.pump().await;
        assert_eq!(h.app.sort_order, SortOrder::Descending);
        let ratings: Vec<f64> = h.app.movies.iter().map(|m| m.rating()).collect();
        let mut expected = ratings.clone();
        expected.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(ratings, expected);
    }
}
