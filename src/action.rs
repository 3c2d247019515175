use crate::error::FlickError;
use crate::types::{CastMember, Movie, MovieDetail, SearchPage, SortOrder, Video};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    Select,
    SwitchHomeSection,

    // Search input
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    SearchConfirm,

    // Sort popup
    ShowSortSelect,
    PopupUp,
    PopupDown,
    PopupSelect,
    PopupCancel,
    ApplySort(SortOrder),

    // Loads. Completion messages carry the load generation they were spawned
    // under; stale generations are dropped on arrival.
    LoadNowPlaying,
    NowPlayingLoaded(Vec<Movie>, u64),
    ResultsLoaded(SearchPage, u64),
    PageAppended(SearchPage, u64),
    DetailLoaded(Box<MovieDetail>, u64),
    CreditsLoaded(Vec<CastMember>, u64),
    VideosLoaded(Vec<Video>, u64),

    // Detail screen
    OpenTrailer,
    YankTrailerUrl,
    SavePoster,
    PosterSaved(String),

    Error(String),
    None,
}

impl From<FlickError> for Action {
    fn from(err: FlickError) -> Self {
        Action::Error(err.to_string())
    }
}
