use crate::db::Database;
use crate::error::Error;
use crate::templates;
use bytes::Bytes;
use chrono::{Local, NaiveDateTime};
use futures::{Future, Stream};
use gotham::handler::{HandlerError, HandlerFuture};
use gotham::helpers::http::response::{create_empty_response, create_response};
use gotham::state::{FromState, State};
use gotham_derive::{StateData, StaticResponseExtender};
use http::header::{HeaderValue, LOCATION};
use hyper::{Body, Response, StatusCode};
use log::error;
use serde_derive::Deserialize;
use url::form_urlencoded;

pub mod artists;
pub mod shows;
pub mod venues;

#[derive(Deserialize, StateData, StaticResponseExtender)]
pub struct IdPath {
    id: String,
}

impl IdPath {
    /// The `:id` segment as a record id. Anything that is not one gets the
    /// not-found page rather than gotham's bare 400.
    fn parse(state: &State) -> Result<i32, Error> {
        let id = &IdPath::borrow_from(state).id;
        id.parse().map_err(|_| Error::PageNotFound(id.clone()))
    }
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
pub struct FlashQuery {
    flash: Option<String>,
}

impl FlashQuery {
    fn messages(state: &State) -> Vec<String> {
        FlashQuery::try_borrow_from(state)
            .and_then(|query| query.flash.clone())
            .into_iter()
            .collect()
    }
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
pub struct SearchQuery {
    #[serde(default)]
    search_term: String,
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
pub struct StaticPath {
    name: String,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn connect(state: &State) -> Result<diesel::SqliteConnection, Error> {
    Database::borrow_from(state).connect()
}

fn html(state: &State, page: Result<Vec<u8>, Error>) -> Response<Body> {
    match page {
        Ok(body) => create_response(state, StatusCode::OK, mime::TEXT_HTML_UTF_8, body),
        Err(err) => err.as_response(state),
    }
}

fn redirect(state: &State, to: &str) -> Response<Body> {
    let mut response = create_empty_response(state, StatusCode::SEE_OTHER);
    match HeaderValue::from_str(to) {
        Ok(location) => {
            response.headers_mut().insert(LOCATION, location);
        }
        Err(err) => error!("Invalid redirect location {:?}: {:?}", to, err),
    }
    response
}

/// Redirects to `path`, carrying `message` for the next page to display.
fn redirect_with_flash(state: &State, path: &str, message: &str) -> Response<Body> {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("flash", message)
        .finish();
    redirect(state, &format!("{}?{}", path, query))
}

/// Largest form body accepted.
const MAX_FORM_BODY: usize = 256 * 1024;

/// Reads the whole request body, up to `MAX_FORM_BODY` bytes, before handing
/// it to `handle`.
fn with_form_body<F>(mut state: State, handle: F) -> Box<HandlerFuture>
where
    F: FnOnce(&State, Bytes) -> Response<Body> + Send + 'static,
{
    let body = Body::take_from(&mut state)
        .map_err(|err| Error::Inner(Box::new(err)))
        .fold(Vec::new(), |mut buf, chunk| {
            if buf.len() + chunk.len() > MAX_FORM_BODY {
                return Err(Error::BodyTooLarge(MAX_FORM_BODY));
            }
            buf.extend_from_slice(&chunk);
            Ok(buf)
        });
    let f = body.then(move |body| {
        let response = match body {
            Ok(body) => handle(&state, Bytes::from(body)),
            Err(err) => err.as_response(&state),
        };
        let result: Result<_, (State, HandlerError)> = Ok((state, response));
        result
    });
    Box::new(f)
}

pub fn home(state: State) -> (State, Response<Body>) {
    let flash = FlashQuery::messages(&state);
    let mut buf = Vec::new();
    let page = templates::home(&mut buf, &flash)
        .map(|()| buf)
        .map_err(Error::from);
    let response = html(&state, page);
    (state, response)
}

pub fn static_file(state: State) -> (State, Response<Body>) {
    let name = &StaticPath::borrow_from(&state).name;
    let response = match templates::statics::StaticFile::get(name) {
        Some(file) => {
            let content_type = if file.name.ends_with(".css") {
                mime::TEXT_CSS
            } else {
                mime::APPLICATION_OCTET_STREAM
            };
            create_response(&state, StatusCode::OK, content_type, file.content)
        }
        None => Error::StaticNotFound(name.clone()).as_response(&state),
    };
    (state, response)
}

pub fn not_found(state: State) -> (State, Response<Body>) {
    let mut buf = Vec::new();
    let response = match templates::not_found(&mut buf, "Page not found") {
        Ok(()) => create_response(&state, StatusCode::NOT_FOUND, mime::TEXT_HTML_UTF_8, buf),
        Err(err) => Error::from(err).as_response(&state),
    };
    (state, response)
}
