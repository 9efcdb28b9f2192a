//! Server-rendered HTML pages.
//!
//! Pages are plain strings built with `format!`. Every value that came from a
//! user or from TMDB goes through [`escape`] before it is interpolated.

use std::fmt::Write as _;

use movieshelf_db::models::Movie;

use crate::metadata::SearchResult;
use crate::server::forms::{FieldErrors, RateMovieForm};

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query parameter value.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{BOOTSTRAP_CSS}">
</head>
<body>
<div class="container py-4">
{body}
</div>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|msg| format!(r#"<div class="invalid-feedback d-block">{}</div>"#, escape(msg)))
        .unwrap_or_default()
}

fn input_class(errors: &FieldErrors, field: &str) -> &'static str {
    if errors.get(field).is_some() {
        "form-control is-invalid"
    } else {
        "form-control"
    }
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

/// Catalog page: one card per movie, in store order.
pub fn index_page(movies: &[Movie]) -> String {
    let mut body = String::from(r#"<h1 class="mb-4">My Top Movies</h1>"#);
    body.push_str(r#"<p class="lead">These are my all-time favourite movies.</p>"#);

    if movies.is_empty() {
        body.push_str(r#"<p class="text-muted">No movies yet. Add one below.</p>"#);
    }

    body.push_str(r#"<div class="row g-4">"#);
    for movie in movies {
        let id = movie.id;
        let ranking = movie.ranking.map(|r| r.to_string()).unwrap_or_default();
        let year = movie.year.map(|y| y.to_string()).unwrap_or_default();
        let rating = movie.rating.map(|r| format!("{r:.1}")).unwrap_or_default();
        let poster = movie
            .img_url
            .as_deref()
            .map(|url| {
                format!(
                    r#"<img class="card-img-top" src="{}" alt="{}">"#,
                    escape(url),
                    escape(&movie.title)
                )
            })
            .unwrap_or_default();

        let _ = write!(
            body,
            r#"<div class="col-md-4"><div class="card h-100" id="movie-{id}">
{poster}
<div class="card-body">
<span class="badge bg-dark">{ranking}</span>
<h2 class="card-title h4">{title} <span class="text-muted">({year})</span></h2>
<p class="card-text">{description}</p>
<p><strong>{rating}</strong>/10</p>
<p class="fst-italic">"{review}"</p>
<a class="btn btn-primary" href="/edit?id={id}">Update</a>
<a class="btn btn-outline-danger" href="/delete?id={id}">Delete</a>
</div></div></div>
"#,
            title = escape(&movie.title),
            description = optional(movie.description.as_deref()),
            review = optional(movie.review.as_deref()),
        );
    }
    body.push_str("</div>");
    body.push_str(r#"<div class="mt-4">"#);
    body.push_str(r#"<a class="btn btn-success" href="/add">Add Movie</a></div>"#);

    layout("My Top Movies", &body)
}

/// Step one of adding a movie: the title search form.
pub fn add_page(csrf_token: &str, title: &str, errors: &FieldErrors) -> String {
    let body = format!(
        r#"<h1 class="mb-4">Add a Movie</h1>
<form method="post" action="/add" novalidate>
<input type="hidden" name="csrf_token" value="{csrf}">
<div class="mb-3">
<label class="form-label" for="title">Movie Title</label>
<input class="{class}" id="title" name="title" value="{title}" required>
{error}
</div>
<button class="btn btn-primary" type="submit">Add Movie</button>
</form>
"#,
        csrf = escape(csrf_token),
        class = input_class(errors, "title"),
        title = escape(title),
        error = field_error(errors, "title"),
    );
    layout("Add Movie", &body)
}

/// Step two: the TMDB candidates for a title search.
pub fn select_page(query: &str, results: &[SearchResult]) -> String {
    let mut body = format!(
        r#"<h1 class="mb-4">Select Movie</h1><p>Results for <strong>{}</strong></p>"#,
        escape(query)
    );

    if results.is_empty() {
        body.push_str(r#"<p class="text-muted">No matches found.</p>"#);
    } else {
        body.push_str(r#"<ul class="list-group">"#);
        for result in results {
            let year = result.year().map(|y| format!(" ({y})")).unwrap_or_default();
            let _ = write!(
                body,
                r#"<li class="list-group-item"><a href="/find?id={id}">{title}{year}</a></li>"#,
                id = encode_query(&result.id),
                title = escape(&result.title),
            );
        }
        body.push_str("</ul>");
    }
    body.push_str(r#"<div class="mt-4"><a href="/add">Search again</a></div>"#);

    layout("Select Movie", &body)
}

/// Rating form for one movie. `form` carries the values to show, either the
/// stored ones or a rejected submission.
pub fn edit_page(
    movie: &Movie,
    csrf_token: &str,
    form: &RateMovieForm,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        r#"<h1 class="mb-1">{title}</h1>
<p class="text-muted mb-4">Edit Movie Rating</p>
<form method="post" action="/edit?id={id}" novalidate>
<input type="hidden" name="csrf_token" value="{csrf}">
<div class="mb-3">
<label class="form-label" for="rating">Your rating out of 10 e.g 7.5</label>
<input class="{rating_class}" id="rating" name="rating" value="{rating}" required>
{rating_error}
</div>
<div class="mb-3">
<label class="form-label" for="review">Your review</label>
<input class="{review_class}" id="review" name="review" value="{review}" required>
{review_error}
</div>
<button class="btn btn-primary" type="submit">Done</button>
</form>
"#,
        title = escape(&movie.title),
        id = movie.id,
        csrf = escape(csrf_token),
        rating_class = input_class(errors, "rating"),
        rating = escape(&form.rating),
        rating_error = field_error(errors, "rating"),
        review_class = input_class(errors, "review"),
        review = escape(&form.review),
        review_error = field_error(errors, "review"),
    );
    layout("Edit Movie", &body)
}

/// Error page shown for every non-form failure.
pub fn error_page(status: u16, reason: &str, message: &str, request_id: Option<&str>) -> String {
    let request = request_id
        .map(|id| {
            format!(
                r#"<p class="small text-muted">Request ID: <code>{}</code></p>"#,
                escape(id)
            )
        })
        .unwrap_or_default();
    let body = format!(
        r#"<h1 class="mb-3">{status} {reason}</h1>
<p>{message}</p>
{request}
<a href="/">Back to my movies</a>
"#,
        reason = escape(reason),
        message = escape(message),
    );
    layout(&format!("{status} {reason}"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use movieshelf_common::MovieId;
    use movieshelf_db::models::NewMovie;

    fn movie(id: i64, title: &str) -> Movie {
        NewMovie {
            year: Some(2002),
            rating: Some(7.3),
            ranking: Some(10),
            review: Some("My favourite character was the caller.".into()),
            ..NewMovie::titled(title)
        }
        .into_movie(MovieId::new(id))
    }

    #[test]
    fn escape_special_chars() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn encode_query_reserved() {
        assert_eq!(encode_query("27205"), "27205");
        assert_eq!(encode_query("a b&c"), "a%20b%26c");
    }

    #[test]
    fn index_lists_movies_in_order() {
        let page = index_page(&[movie(1, "Phone Booth"), movie(2, "Avatar: The Way of Water")]);
        let first = page.find("Phone Booth").unwrap();
        let second = page.find("Avatar: The Way of Water").unwrap();
        assert!(first < second);
        assert!(page.contains("/edit?id=1"));
        assert!(page.contains("/delete?id=2"));
        assert!(page.contains("7.3"));
    }

    #[test]
    fn index_escapes_titles() {
        let page = index_page(&[movie(1, "<script>alert(1)</script>")]);
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_index() {
        let page = index_page(&[]);
        assert!(page.contains("No movies yet"));
    }

    #[test]
    fn add_page_shows_error_and_token() {
        let mut errors = FieldErrors::default();
        errors.push("title", "Movie title is required.");
        let page = add_page("tok.123.abc", "", &errors);
        assert!(page.contains(r#"value="tok.123.abc""#));
        assert!(page.contains("Movie title is required."));
        assert!(page.contains("is-invalid"));
    }

    #[test]
    fn select_page_links_candidates() {
        let results = vec![
            SearchResult {
                id: "27205".into(),
                title: "Inception".into(),
                release_date: Some("2010-07-15".into()),
                overview: None,
                poster_path: None,
            },
            SearchResult {
                id: "99".into(),
                title: "Untitled Project".into(),
                release_date: Some(String::new()),
                overview: None,
                poster_path: None,
            },
        ];
        let page = select_page("Inception", &results);
        assert!(page.contains(r#"href="/find?id=27205""#));
        assert!(page.contains("Inception (2010)</a>"));
        assert!(page.contains("Untitled Project</a>"));
    }

    #[test]
    fn select_page_no_results() {
        let page = select_page("zzzz", &[]);
        assert!(page.contains("No matches found."));
        assert!(!page.contains("/find?id="));
    }

    #[test]
    fn edit_page_prefills_values() {
        let form = RateMovieForm {
            rating: "7.3".into(),
            review: "Loved \"it\"".into(),
            csrf_token: String::new(),
        };
        let page = edit_page(&movie(4, "Phone Booth"), "tok", &form, &FieldErrors::default());
        assert!(page.contains(r#"action="/edit?id=4""#));
        assert!(page.contains(r#"value="7.3""#));
        assert!(page.contains("Loved &quot;it&quot;"));
    }

    #[test]
    fn error_page_contents() {
        let page = error_page(404, "Not Found", "movie not found: 9", Some("req-1"));
        assert!(page.contains("404 Not Found"));
        assert!(page.contains("movie not found: 9"));
        assert!(page.contains("req-1"));
    }
}
