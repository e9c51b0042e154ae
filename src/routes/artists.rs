use super::{
    connect, html, now, redirect_with_flash, with_form_body, FlashQuery, IdPath, SearchQuery,
};
use crate::db;
use crate::error::Error;
use crate::forms::ArtistForm;
use crate::models::Artist;
use crate::templates;
use bytes::Bytes;
use gotham::handler::HandlerFuture;
use gotham::helpers::http::response::create_response;
use gotham::state::{FromState, State};
use hyper::{Body, Response, StatusCode};
use log::{error, info};

fn list_page(state: &State) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let artists = db::artist_refs(&conn)?;
    let mut buf = Vec::new();
    templates::artists(&mut buf, &artists, &FlashQuery::messages(state))?;
    Ok(buf)
}

pub fn list(state: State) -> (State, Response<Body>) {
    let page = list_page(&state);
    let response = html(&state, page);
    (state, response)
}

fn search_page(state: &State, search_term: &str) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let results = db::search_artists(&conn, search_term)?;
    let mut buf = Vec::new();
    templates::search_results(&mut buf, "Artists", "/artists", search_term, &results, &[])?;
    Ok(buf)
}

pub fn search_get(state: State) -> (State, Response<Body>) {
    let page = search_page(&state, &SearchQuery::borrow_from(&state).search_term);
    let response = html(&state, page);
    (state, response)
}

pub fn search_post(state: State) -> Box<HandlerFuture> {
    with_form_body(state, |state, body| {
        let page = serde_urlencoded::from_bytes::<SearchQuery>(&body)
            .map_err(Error::InvalidForm)
            .and_then(|query| search_page(state, &query.search_term));
        html(state, page)
    })
}

fn detail_page(state: &State) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let detail = db::artist_detail(&conn, IdPath::parse(state)?, now())?;
    let mut buf = Vec::new();
    templates::show_artist(&mut buf, &detail, &FlashQuery::messages(state))?;
    Ok(buf)
}

pub fn show(state: State) -> (State, Response<Body>) {
    let page = detail_page(&state);
    let response = html(&state, page);
    (state, response)
}

fn form_page(
    state: &State,
    status: StatusCode,
    title: &str,
    action: &str,
    form: &ArtistForm,
    errors: &[String],
) -> Response<Body> {
    let mut buf = Vec::new();
    match templates::artist_form(&mut buf, title, action, form, errors) {
        Ok(()) => create_response(state, status, mime::TEXT_HTML_UTF_8, buf),
        Err(err) => Error::from(err).as_response(state),
    }
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let response = form_page(
        &state,
        StatusCode::OK,
        "List a new artist",
        "/artists/create",
        &ArtistForm::default(),
        &[],
    );
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_form_body(state, create_inner)
}

fn create_inner(state: &State, body: Bytes) -> Response<Body> {
    let form = ArtistForm::from_form_body(&body);
    let new_artist = match form.validate() {
        Ok(new_artist) => new_artist,
        Err(errors) => {
            return form_page(
                state,
                StatusCode::BAD_REQUEST,
                "List a new artist",
                "/artists/create",
                &form,
                &errors,
            )
        }
    };

    match connect(state).and_then(|conn| db::insert_artist(&conn, &new_artist)) {
        Ok(id) => {
            info!("Listed artist {} ({})", id, new_artist.name);
            redirect_with_flash(
                state,
                "/",
                &format!("Artist {} was successfully listed!", new_artist.name),
            )
        }
        Err(err) => {
            error!("Failed to list artist {}: {:?}", new_artist.name, err);
            redirect_with_flash(
                state,
                "/",
                &format!(
                    "An error occurred. Artist {} could not be listed.",
                    new_artist.name
                ),
            )
        }
    }
}

fn find_artist(state: &State) -> Result<Artist, Error> {
    let id = IdPath::parse(state)?;
    let conn = connect(state)?;
    db::find_artist(&conn, id)
}

pub fn edit_form(state: State) -> (State, Response<Body>) {
    let response = match find_artist(&state) {
        Ok(artist) => form_page(
            &state,
            StatusCode::OK,
            &format!("Edit artist {}", artist.name),
            &format!("/artists/{}/edit", artist.id),
            &ArtistForm::from_artist(&artist),
            &[],
        ),
        Err(err) => err.as_response(&state),
    };
    (state, response)
}

pub fn edit(state: State) -> Box<HandlerFuture> {
    with_form_body(state, |state, body| match IdPath::parse(state) {
        Ok(id) => edit_inner(state, id, &body),
        Err(err) => err.as_response(state),
    })
}

fn edit_inner(state: &State, id: i32, body: &[u8]) -> Response<Body> {
    let form = ArtistForm::from_form_body(body);
    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => {
            return form_page(
                state,
                StatusCode::BAD_REQUEST,
                &format!("Edit artist {}", form.name),
                &format!("/artists/{}/edit", id),
                &form,
                &errors,
            )
        }
    };

    let detail_path = format!("/artists/{}", id);
    match connect(state).and_then(|conn| db::update_artist(&conn, id, &changes)) {
        Ok(()) => {
            info!("Updated artist {} ({})", id, changes.name);
            redirect_with_flash(
                state,
                &detail_path,
                &format!("Artist {} was successfully updated!", changes.name),
            )
        }
        Err(err @ Error::ArtistNotFound(..)) => err.as_response(state),
        Err(err) => {
            error!("Failed to update artist {}: {:?}", id, err);
            redirect_with_flash(
                state,
                &detail_path,
                &format!(
                    "An error occurred. Artist {} could not be updated.",
                    changes.name
                ),
            )
        }
    }
}

pub fn delete(state: State) -> (State, Response<Body>) {
    let id = match IdPath::parse(&state) {
        Ok(id) => id,
        Err(err) => {
            let response = err.as_response(&state);
            return (state, response);
        }
    };
    let response = match connect(&state).and_then(|conn| db::delete_artist(&conn, id)) {
        Ok(()) => {
            info!("Deleted artist {}", id);
            redirect_with_flash(&state, "/", "Artist deleted")
        }
        Err(err) => {
            error!("Failed to delete artist {}: {:?}", id, err);
            redirect_with_flash(
                &state,
                "/artists",
                "An error occurred. Artist was not deleted.",
            )
        }
    };
    (state, response)
}
