//! Catalog pages: list, add (search + select), edit rating, delete.
//!
//! All pages are server-rendered HTML. Successful writes answer with a
//! `303 See Other` back to `/`; rejected forms are re-rendered with `400`.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use movieshelf_common::{Error, MovieId, Result};
use movieshelf_db::{pool::get_conn, queries::movies};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::forms::{AddMovieForm, FieldErrors, RateMovieForm};
use super::request_id::RequestId;
use super::{views, AppContext};

/// Create the catalog routes.
pub fn movie_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list))
        .route("/add", get(add_form).post(add_submit))
        .route("/find", get(find))
        .route("/edit", get(edit_form).post(edit_submit))
        .route("/delete", get(delete))
        .route("/health", get(health))
}

// ============================================================================
// Request/Response types
// ============================================================================

/// `?id=` query parameter shared by find, edit and delete.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    fn raw(&self) -> &str {
        self.id.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Catalog id; a missing or malformed id is treated as an unknown movie.
    fn movie_id(&self) -> Result<MovieId> {
        let raw = self.raw();
        raw.parse().map_err(|_| Error::not_found("movie", raw))
    }
}

/// Health check body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub movies: i64,
}

fn page_error(rid: &RequestId) -> impl FnOnce(Error) -> AppError + '_ {
    move |e| AppError::new(e).with_request_id(rid)
}

/// Malformed form bodies (wrong content type, duplicate fields) get the
/// error page instead of axum's plain-text rejection.
fn bad_form(rid: &RequestId) -> impl FnOnce(FormRejection) -> AppError + '_ {
    move |rejection| page_error(rid)(Error::Validation(rejection.body_text()))
}

fn bad_query(rid: &RequestId) -> impl FnOnce(QueryRejection) -> AppError + '_ {
    move |rejection| page_error(rid)(Error::Validation(rejection.body_text()))
}

fn invalid_token() -> Error {
    Error::Validation(
        "The form has expired or is invalid. Please reload the page and try again.".into(),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /`: every movie, ascending by id.
async fn list(
    State(ctx): State<AppContext>,
    rid: RequestId,
) -> std::result::Result<Html<String>, AppError> {
    let conn = get_conn(&ctx.db).map_err(page_error(&rid))?;
    let all = movies::list_movies(&conn).map_err(page_error(&rid))?;
    Ok(Html(views::index_page(&all)))
}

/// `GET /add`: empty title form.
async fn add_form(State(ctx): State<AppContext>) -> Html<String> {
    Html(views::add_page(&ctx.csrf.issue(), "", &FieldErrors::default()))
}

/// `POST /add`: search TMDB for the title and offer the candidates.
async fn add_submit(
    State(ctx): State<AppContext>,
    rid: RequestId,
    form: std::result::Result<Form<AddMovieForm>, FormRejection>,
) -> std::result::Result<Response, AppError> {
    let Form(form) = form.map_err(bad_form(&rid))?;
    if !ctx.csrf.verify(&form.csrf_token) {
        return Err(page_error(&rid)(invalid_token()));
    }

    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            let page = views::add_page(&ctx.csrf.issue(), &form.title, &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let results = ctx
        .metadata
        .search_movie(&title)
        .await
        .map_err(page_error(&rid))?;
    tracing::debug!(query = %title, results = results.len(), "Metadata search complete");

    Ok(Html(views::select_page(&title, &results)).into_response())
}

/// `GET /find?id=<tmdb id>`: import the selected candidate.
async fn find(
    State(ctx): State<AppContext>,
    rid: RequestId,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> std::result::Result<Redirect, AppError> {
    let Query(query) = query.map_err(bad_query(&rid))?;
    import_movie(&ctx, query.raw()).await.map_err(page_error(&rid))?;
    Ok(Redirect::to("/"))
}

async fn import_movie(ctx: &AppContext, external_id: &str) -> Result<()> {
    if external_id.is_empty() {
        return Err(Error::Validation("A TMDB id is required to import a movie.".into()));
    }

    let details = ctx.metadata.movie_details(external_id).await?;
    let new_movie = details.into_new_movie(&ctx.config.tmdb.image_base_url);

    let conn = get_conn(&ctx.db)?;
    let movie = movies::create_movie(&conn, &new_movie)?;
    tracing::info!(
        id = %movie.id,
        title = %movie.title,
        provider = ctx.metadata.name(),
        external_id,
        "Movie imported"
    );
    Ok(())
}

/// `GET /edit?id=<id>`: rating form pre-filled from the stored movie.
async fn edit_form(
    State(ctx): State<AppContext>,
    rid: RequestId,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> std::result::Result<Html<String>, AppError> {
    let Query(query) = query.map_err(bad_query(&rid))?;
    let id = query.movie_id().map_err(page_error(&rid))?;
    let conn = get_conn(&ctx.db).map_err(page_error(&rid))?;
    let movie = movies::get_movie(&conn, id).map_err(page_error(&rid))?;

    let form = RateMovieForm {
        rating: movie.rating.map(|r| r.to_string()).unwrap_or_default(),
        review: movie.review.clone().unwrap_or_default(),
        csrf_token: String::new(),
    };
    Ok(Html(views::edit_page(
        &movie,
        &ctx.csrf.issue(),
        &form,
        &FieldErrors::default(),
    )))
}

/// `POST /edit?id=<id>`: store the new rating and review.
async fn edit_submit(
    State(ctx): State<AppContext>,
    rid: RequestId,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
    form: std::result::Result<Form<RateMovieForm>, FormRejection>,
) -> std::result::Result<Response, AppError> {
    let Query(query) = query.map_err(bad_query(&rid))?;
    let Form(form) = form.map_err(bad_form(&rid))?;
    let id = query.movie_id().map_err(page_error(&rid))?;
    let conn = get_conn(&ctx.db).map_err(page_error(&rid))?;
    let movie = movies::get_movie(&conn, id).map_err(page_error(&rid))?;

    if !ctx.csrf.verify(&form.csrf_token) {
        return Err(page_error(&rid)(invalid_token()));
    }

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let page = views::edit_page(&movie, &ctx.csrf.issue(), &form, &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    movies::update_review(&conn, id, valid.rating, &valid.review).map_err(page_error(&rid))?;
    tracing::info!(id = %id, rating = valid.rating, "Movie review updated");

    Ok(Redirect::to("/").into_response())
}

/// `GET /delete?id=<id>`: remove the movie.
async fn delete(
    State(ctx): State<AppContext>,
    rid: RequestId,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> std::result::Result<Redirect, AppError> {
    let Query(query) = query.map_err(bad_query(&rid))?;
    let id = query.movie_id().map_err(page_error(&rid))?;
    let conn = get_conn(&ctx.db).map_err(page_error(&rid))?;
    movies::delete_movie(&conn, id).map_err(page_error(&rid))?;
    tracing::info!(id = %id, "Movie deleted");

    Ok(Redirect::to("/"))
}

/// `GET /health`: liveness plus catalog size.
async fn health(
    State(ctx): State<AppContext>,
    rid: RequestId,
) -> std::result::Result<Json<HealthResponse>, AppError> {
    let conn = get_conn(&ctx.db).map_err(page_error(&rid))?;
    let count = movies::count_movies(&conn).map_err(page_error(&rid))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        movies: count,
    }))
}

/// Fallback for unknown routes.
pub async fn not_found(rid: RequestId, uri: Uri) -> AppError {
    AppError::new(Error::not_found("page", uri.path())).with_request_id(&rid)
}
