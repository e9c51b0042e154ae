use super::{connect, html, redirect_with_flash, with_form_body, FlashQuery};
use crate::db;
use crate::error::Error;
use crate::forms::ShowForm;
use crate::templates;
use bytes::Bytes;
use gotham::handler::HandlerFuture;
use gotham::helpers::http::response::create_response;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};
use log::{error, info};

fn list_page(state: &State) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let shows = db::show_listings(&conn)?;
    let mut buf = Vec::new();
    templates::shows(&mut buf, &shows, &FlashQuery::messages(state))?;
    Ok(buf)
}

pub fn list(state: State) -> (State, Response<Body>) {
    let page = list_page(&state);
    let response = html(&state, page);
    (state, response)
}

fn form_page(
    state: &State,
    status: StatusCode,
    form: &ShowForm,
    errors: &[String],
) -> Response<Body> {
    let page = connect(state).and_then(|conn| {
        let artists = db::artist_refs(&conn)?;
        let venues = db::venue_refs(&conn)?;
        let mut buf = Vec::new();
        templates::new_show(&mut buf, form, &artists, &venues, errors)?;
        Ok(buf)
    });
    match page {
        Ok(body) => create_response(state, status, mime::TEXT_HTML_UTF_8, body),
        Err(err) => err.as_response(state),
    }
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let response = form_page(&state, StatusCode::OK, &ShowForm::default(), &[]);
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_form_body(state, create_inner)
}

fn create_inner(state: &State, body: Bytes) -> Response<Body> {
    let form = match ShowForm::from_form_body(&body) {
        Ok(form) => form,
        Err(err) => return err.as_response(state),
    };
    let new_show = match form.validate() {
        Ok(new_show) => new_show,
        Err(errors) => return form_page(state, StatusCode::BAD_REQUEST, &form, &errors),
    };

    match connect(state).and_then(|conn| db::insert_show(&conn, &new_show)) {
        Ok(id) => {
            info!(
                "Listed show {}: artist {} at venue {} on {}",
                id, new_show.artist_id, new_show.venue_id, new_show.start_time
            );
            redirect_with_flash(state, "/", "Show was successfully listed!")
        }
        Err(err) => {
            error!("Failed to list show: {:?}", err);
            redirect_with_flash(state, "/", "An error occurred. Show could not be listed.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{form_mime, location, test_server};
    use crate::db;
    use crate::db::tests::{new_artist, new_venue};
    use hyper::StatusCode;

    #[test]
    fn create_show_then_list() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        let venue_id =
            db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        let artist_id = db::insert_artist(&conn, &new_artist("Guns N Petals")).unwrap();

        let response = server
            .client()
            .post(
                "http://localhost/shows/create",
                format!(
                    "artist_id={}&venue_id={}&start_time=2035-05-21+21%3A30%3A00",
                    artist_id, venue_id
                ),
                form_mime(),
            )
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/?flash=Show+was+successfully+listed%21"
        );

        let response = server
            .client()
            .get("http://localhost/shows")
            .perform()
            .unwrap();
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("Guns N Petals"));
        assert!(body.contains("The Musical Hop"));
        assert!(body.contains("Monday May, 21, 2035 at 9:30PM"));
    }

    #[test]
    fn unknown_artist_flashes_error() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        let venue_id =
            db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();

        let response = server
            .client()
            .post(
                "http://localhost/shows/create",
                format!("artist_id=77&venue_id={}&start_time=2035-05-21+21%3A30", venue_id),
                form_mime(),
            )
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/?flash=An+error+occurred.+Show+could+not+be+listed."
        );
        assert!(db::show_listings(&conn).unwrap().is_empty());
    }

    #[test]
    fn form_lists_artists_and_venues() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        db::insert_artist(&conn, &new_artist("The Wild Sax Band")).unwrap();

        let response = server
            .client()
            .get("http://localhost/shows/create")
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("The Wild Sax Band"));
        assert!(body.contains("The Musical Hop"));
    }

    #[test]
    fn malformed_start_time_rerenders_form() {
        let (_dir, _database, server) = test_server();
        let response = server
            .client()
            .post(
                "http://localhost/shows/create",
                "artist_id=1&venue_id=1&start_time=soon",
                form_mime(),
            )
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response
            .read_utf8_body()
            .unwrap()
            .contains("Start time must look like"));
    }
}
