use chrono::NaiveDate;
use std::fmt;

/// Movie summary as it appears in list views.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub overview: Option<String>,
}

impl Movie {
    /// Rating used for sorting and display. Missing votes count as 0.
    pub fn rating(&self) -> f64 {
        self.vote_average.unwrap_or(0.0)
    }
}

/// Full movie record, fetched per id for the detail screen.
#[derive(Debug, Clone)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub runtime: Option<u32>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<NaiveDate>,
}

/// One page of search or discover results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u64,
}

#[derive(Debug, Clone)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    pub kind: String,
}

impl Video {
    /// Watch URL for videos hosted on YouTube; TMDB serves almost nothing else.
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }
}

/// Pick the video to present as "the trailer": the first entry typed
/// "Trailer", falling back to whatever comes first.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.kind == "Trailer")
        .or_else(|| videos.first())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: &'static str,
}

/// The browsable genre catalog (TMDB genre ids).
pub const GENRES: &[Genre] = &[
    Genre { id: 28, name: "Action" },
    Genre { id: 12, name: "Adventure" },
    Genre { id: 16, name: "Animation" },
    Genre { id: 35, name: "Comedy" },
    Genre { id: 18, name: "Drama" },
    Genre { id: 27, name: "Horror" },
    Genre { id: 878, name: "Science Fiction" },
];

pub fn genre_name(id: u32) -> &'static str {
    GENRES
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.name)
        .unwrap_or("Genre")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::None => write!(f, "Unsorted"),
            SortOrder::Ascending => write!(f, "Rating ascending"),
            SortOrder::Descending => write!(f, "Rating descending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(kind: &str, key: &str) -> Video {
        Video {
            key: key.to_string(),
            name: format!("{} clip", kind),
            site: "YouTube".to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn trailer_preferred_over_teaser() {
        let videos = vec![video("Teaser", "t1"), video("Trailer", "t2")];
        assert_eq!(pick_trailer(&videos).unwrap().key, "t2");
    }

    #[test]
    fn first_video_when_no_trailer() {
        let videos = vec![video("Teaser", "t1"), video("Featurette", "t2")];
        assert_eq!(pick_trailer(&videos).unwrap().key, "t1");
    }

    #[test]
    fn no_videos_no_trailer() {
        assert!(pick_trailer(&[]).is_none());
    }

    #[test]
    fn youtube_url_from_key() {
        assert_eq!(
            video("Trailer", "abc123").url(),
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn missing_vote_average_rates_zero() {
        let movie = Movie {
            id: 1,
            title: "Untitled".to_string(),
            poster_path: None,
            vote_average: None,
            release_date: None,
            overview: None,
        };
        assert_eq!(movie.rating(), 0.0);
    }

    #[test]
    fn genre_name_lookup() {
        assert_eq!(genre_name(28), "Action");
        assert_eq!(genre_name(999), "Genre");
    }
}
