//! Row transformers: raw CSV rows to typed records.
//!
//! Field positions follow the column lists in [`crate::source`]. Rows
//! reaching these functions already have the right width, so only the
//! content is checked here.

use dailies_core::model::{GenomeScore, GenomeTag, Movie, Rating, Tag};

use crate::error::{LoadError, LoadResult};
use crate::lookup::Lookup;
use crate::source::RawRow;

/// Separator between genres in `movies.csv`.
pub const GENRE_SEPARATOR: char = '|';

/// External identifiers for one movie, from `links.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub movie_id: i32,
    pub imdb_id: Option<i32>,
    pub tmdb_id: Option<i32>,
}

/// Split a genre list. The `(no genres listed)` placeholder is not special
/// cased: it comes back as a one-element list.
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split(GENRE_SEPARATOR).map(str::to_owned).collect()
}

pub fn movie(row: &RawRow) -> LoadResult<Movie> {
    Ok(Movie::new(
        row.parse(0, "movie_id")?,
        row.text(1),
        split_genres(row.field(2)),
    ))
}

pub fn link(row: &RawRow) -> LoadResult<Link> {
    Ok(Link {
        movie_id: row.parse(0, "movie_id")?,
        imdb_id: row.parse_optional(1, "imdb_id")?,
        tmdb_id: row.parse_optional(2, "tmdb_id")?,
    })
}

/// Apply every links row to the already-built movie lookup.
///
/// A link for a movie id that is not in `movies` is a join-key error. Returns
/// the number of links applied.
pub fn join_links<I>(movies: &mut Lookup<Movie>, links: I) -> LoadResult<usize>
where
    I: IntoIterator<Item = LoadResult<RawRow>>,
{
    let mut applied = 0;
    for row in links {
        let row = row?;
        let link = link(&row)?;
        let lookup = movies.name();
        let movie = movies
            .get_mut(link.movie_id)
            .ok_or_else(|| LoadError::JoinKey {
                source_name: row.source_name().to_owned(),
                line: row.line(),
                lookup,
                key: link.movie_id,
            })?;
        movie.set_links(link.imdb_id, link.tmdb_id);
        applied += 1;
    }
    Ok(applied)
}

pub fn genome_tag(row: &RawRow) -> LoadResult<GenomeTag> {
    Ok(GenomeTag {
        tag_id: row.parse(0, "tag_id")?,
        tag_value: row.text(1),
    })
}

/// Build a genome score, resolving its tag name. An unknown tag id leaves
/// the name absent.
pub fn genome_score(row: &RawRow, tags: &Lookup<String>) -> LoadResult<GenomeScore> {
    let tag_id = row.parse(1, "tag_id")?;
    Ok(GenomeScore {
        movie_id: row.parse(0, "movie_id")?,
        tag_id,
        relevance: row.parse(2, "relevance")?,
        tag_name: tags.get(tag_id).cloned(),
    })
}

pub fn rating(row: &RawRow) -> LoadResult<Rating> {
    Ok(Rating {
        user_id: row.parse(0, "user_id")?,
        movie_id: row.parse(1, "movie_id")?,
        rating: row.parse(2, "rating")?,
        timestamp: row.parse(3, "timestamp")?,
    })
}

pub fn tag(row: &RawRow) -> LoadResult<Tag> {
    Ok(Tag {
        user_id: row.parse(0, "user_id")?,
        movie_id: row.parse(1, "movie_id")?,
        tag: row.text(2),
        timestamp: row.parse(3, "timestamp")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;

    fn row(source: &str, fields: &[&str]) -> RawRow {
        RawRow::new(source, 2, fields)
    }

    #[test]
    fn test_movie_splits_genres() {
        let movie = movie(&row("movies.csv", &["1", "Toy Story", "Animation|Comedy"])).unwrap();
        assert_eq!(movie.id, 1);
        assert_eq!(movie.title, "Toy Story");
        assert_eq!(movie.genres, vec!["Animation", "Comedy"]);
        assert_eq!(movie.imdb_id, None);
    }

    #[test]
    fn test_no_genres_placeholder_is_kept() {
        let movie = movie(&row("movies.csv", &["2", "Untitled", "(no genres listed)"])).unwrap();
        assert_eq!(movie.genres, vec!["(no genres listed)"]);
    }

    #[test]
    fn test_link_empty_ids_are_absent() {
        let link = link(&row("links.csv", &["5", "", "862"])).unwrap();
        assert_eq!(
            link,
            Link {
                movie_id: 5,
                imdb_id: None,
                tmdb_id: Some(862),
            }
        );
    }

    #[test]
    fn test_join_links_fills_ids() {
        let mut movies = Lookup::new("movies");
        movies.insert(1, Movie::new(1, "Toy Story", vec!["Animation".into()]));
        movies.insert(2, Movie::new(2, "Jumanji", vec!["Adventure".into()]));

        let links = vec![
            Ok(row("links.csv", &["1", "114709", "862"])),
            Ok(row("links.csv", &["2", "113497", ""])),
        ];
        assert_eq!(join_links(&mut movies, links).unwrap(), 2);

        let toy_story = movies.get(1).unwrap();
        assert_eq!(toy_story.imdb_id, Some(114_709));
        assert_eq!(toy_story.tmdb_id, Some(862));
        let jumanji = movies.get(2).unwrap();
        assert_eq!(jumanji.imdb_id, Some(113_497));
        assert_eq!(jumanji.tmdb_id, None);
    }

    #[test]
    fn test_join_links_unknown_movie_is_fatal() {
        let mut movies = Lookup::new("movies");
        movies.insert(1, Movie::new(1, "Toy Story", vec![]));

        let links = vec![Ok(RawRow::new("links.csv", 3, &["99", "1", "2"]))];
        let err = join_links(&mut movies, links).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::JoinKey);
        assert_eq!(err.to_string(), "links.csv line 3: no movies entry with id 99");
    }

    #[test]
    fn test_genome_score_resolves_tag_name() {
        let mut tags = Lookup::new("genome tags");
        tags.insert(1, "007".to_string());

        let known = genome_score(&row("genome-scores.csv", &["1", "1", "0.02875"]), &tags).unwrap();
        assert_eq!(known.tag_name.as_deref(), Some("007"));
        assert!((known.relevance - 0.02875).abs() < f32::EPSILON);

        let unknown = genome_score(&row("genome-scores.csv", &["1", "77", "0.5"]), &tags).unwrap();
        assert_eq!(unknown.tag_name, None);
        assert_eq!(unknown.tag_id, 77);
    }

    #[test]
    fn test_rating() {
        let rating = rating(&row("ratings.csv", &["1", "296", "5.0", "1147880044"])).unwrap();
        assert_eq!(rating.user_id, 1);
        assert_eq!(rating.movie_id, 296);
        assert!((rating.rating - 5.0).abs() < f32::EPSILON);
        assert_eq!(rating.timestamp, 1_147_880_044);
    }

    #[test]
    fn test_rating_rejects_negative_timestamp() {
        let err = rating(&row("ratings.csv", &["1", "296", "5.0", "-1"])).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Parse);
    }

    #[test]
    fn test_tag_keeps_text_verbatim() {
        let tag = tag(&row("tags.csv", &["3", "260", "classic sci-fi", "1439472355"])).unwrap();
        assert_eq!(tag.tag, "classic sci-fi");
        assert_eq!(tag.timestamp, 1_439_472_355);
    }

    #[test]
    fn test_non_numeric_rating_is_parse_error() {
        let err = rating(&row("ratings.csv", &["1", "296", "five", "0"])).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Parse);
        assert!(err.to_string().contains("column rating"));
    }
}
