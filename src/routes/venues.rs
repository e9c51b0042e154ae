use super::{
    connect, html, now, redirect_with_flash, with_form_body, FlashQuery, IdPath, SearchQuery,
};
use crate::db;
use crate::error::Error;
use crate::forms::VenueForm;
use crate::models::Venue;
use crate::templates;
use bytes::Bytes;
use gotham::handler::HandlerFuture;
use gotham::helpers::http::response::create_response;
use gotham::state::{FromState, State};
use hyper::{Body, Response, StatusCode};
use log::{error, info};

fn list_page(state: &State) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let areas = db::venue_areas(&conn, now())?;
    let mut buf = Vec::new();
    templates::venues(&mut buf, &areas, &FlashQuery::messages(state))?;
    Ok(buf)
}

pub fn list(state: State) -> (State, Response<Body>) {
    let page = list_page(&state);
    let response = html(&state, page);
    (state, response)
}

fn search_page(state: &State, search_term: &str) -> Result<Vec<u8>, Error> {
    let conn = connect(state)?;
    let results = db::search_venues(&conn, search_term)?;
    let mut buf = Vec::new();
    templates::search_results(&mut buf, "Venues", "/venues", search_term, &results, &[])?;
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
    let detail = db::venue_detail(&conn, IdPath::parse(state)?, now())?;
    let mut buf = Vec::new();
    templates::show_venue(&mut buf, &detail, &FlashQuery::messages(state))?;
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
    form: &VenueForm,
    errors: &[String],
) -> Response<Body> {
    let mut buf = Vec::new();
    match templates::venue_form(&mut buf, title, action, form, errors) {
        Ok(()) => create_response(state, status, mime::TEXT_HTML_UTF_8, buf),
        Err(err) => Error::from(err).as_response(state),
    }
}

pub fn create_form(state: State) -> (State, Response<Body>) {
    let response = form_page(
        &state,
        StatusCode::OK,
        "List a new venue",
        "/venues/create",
        &VenueForm::default(),
        &[],
    );
    (state, response)
}

pub fn create(state: State) -> Box<HandlerFuture> {
    with_form_body(state, create_inner)
}

fn create_inner(state: &State, body: Bytes) -> Response<Body> {
    let form = VenueForm::from_form_body(&body);
    let new_venue = match form.validate() {
        Ok(new_venue) => new_venue,
        Err(errors) => {
            return form_page(
                state,
                StatusCode::BAD_REQUEST,
                "List a new venue",
                "/venues/create",
                &form,
                &errors,
            )
        }
    };

    match connect(state).and_then(|conn| db::insert_venue(&conn, &new_venue)) {
        Ok(id) => {
            info!("Listed venue {} ({})", id, new_venue.name);
            redirect_with_flash(
                state,
                "/",
                &format!("Venue {} was successfully listed!", new_venue.name),
            )
        }
        Err(err) => {
            error!("Failed to list venue {}: {:?}", new_venue.name, err);
            redirect_with_flash(
                state,
                "/",
                &format!(
                    "An error occurred. Venue {} could not be listed.",
                    new_venue.name
                ),
            )
        }
    }
}

fn find_venue(state: &State) -> Result<Venue, Error> {
    let id = IdPath::parse(state)?;
    let conn = connect(state)?;
    db::find_venue(&conn, id)
}

pub fn edit_form(state: State) -> (State, Response<Body>) {
    let response = match find_venue(&state) {
        Ok(venue) => form_page(
            &state,
            StatusCode::OK,
            &format!("Edit venue {}", venue.name),
            &format!("/venues/{}/edit", venue.id),
            &VenueForm::from_venue(&venue),
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
    let form = VenueForm::from_form_body(body);
    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => {
            return form_page(
                state,
                StatusCode::BAD_REQUEST,
                &format!("Edit venue {}", form.name),
                &format!("/venues/{}/edit", id),
                &form,
                &errors,
            )
        }
    };

    let detail_path = format!("/venues/{}", id);
    match connect(state).and_then(|conn| db::update_venue(&conn, id, &changes)) {
        Ok(()) => {
            info!("Updated venue {} ({})", id, changes.name);
            redirect_with_flash(
                state,
                &detail_path,
                &format!("Venue {} was successfully updated!", changes.name),
            )
        }
        Err(err @ Error::VenueNotFound(..)) => err.as_response(state),
        Err(err) => {
            error!("Failed to update venue {}: {:?}", id, err);
            redirect_with_flash(
                state,
                &detail_path,
                &format!(
                    "An error occurred. Venue {} could not be updated.",
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
    let response = match connect(&state).and_then(|conn| db::delete_venue(&conn, id)) {
        Ok(()) => {
            info!("Deleted venue {}", id);
            redirect_with_flash(&state, "/", "Venue deleted")
        }
        Err(err) => {
            error!("Failed to delete venue {}: {:?}", id, err);
            redirect_with_flash(
                &state,
                "/venues",
                "An error occurred. Venue was not deleted.",
            )
        }
    };
    (state, response)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{form_mime, location, test_server};
    use crate::db;
    use crate::db::tests::{new_artist, new_venue};
    use crate::models::NewShow;
    use chrono::{Duration, Local};
    use hyper::StatusCode;

    #[test]
    fn create_then_view_venue() {
        let (_dir, database, server) = test_server();
        let response = server
            .client()
            .post(
                "http://localhost/venues/create",
                "name=The+Musical+Hop&city=San+Francisco&state=CA&phone=123-123-1234&genres=Jazz",
                form_mime(),
            )
            .perform()
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/?flash=Venue+The+Musical+Hop+was+successfully+listed%21"
        );

        let conn = database.connect().unwrap();
        let hit = &db::search_venues(&conn, "Musical Hop").unwrap().data[0];
        let response = server
            .client()
            .get(&*format!("http://localhost/venues/{}", hit.id))
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("The Musical Hop"));
        assert!(body.contains("Jazz"));
    }

    #[test]
    fn invalid_venue_rerenders_form() {
        let (_dir, database, server) = test_server();
        let response = server
            .client()
            .post(
                "http://localhost/venues/create",
                "name=The+Musical+Hop&city=San+Francisco&state=CA&phone=555",
                form_mime(),
            )
            .perform()
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response
            .read_utf8_body()
            .unwrap()
            .contains("Phone must look like 123-456-7890"));
        let conn = database.connect().unwrap();
        assert_eq!(db::venue_refs(&conn).unwrap().len(), 0);
    }

    #[test]
    fn missing_venue_is_404() {
        let (_dir, _database, server) = test_server();
        let response = server
            .client()
            .get("http://localhost/venues/404")
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn search_by_post_and_get() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        db::insert_venue(&conn, &new_venue("The Dueling Pianos Bar", "New York", "NY")).unwrap();

        let response = server
            .client()
            .post("http://localhost/venues/search", "search_term=hop", form_mime())
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("The Musical Hop"));
        assert!(!body.contains("The Dueling Pianos Bar"));

        let response = server
            .client()
            .get("http://localhost/venues/search?search_term=PIANO")
            .perform()
            .unwrap();
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("The Dueling Pianos Bar"));
        assert!(!body.contains("The Musical Hop"));
    }

    #[test]
    fn delete_removes_venue_and_shows() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        let venue_id =
            db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        let artist_id = db::insert_artist(&conn, &new_artist("Guns N Petals")).unwrap();
        db::insert_show(
            &conn,
            &NewShow {
                artist_id,
                venue_id,
                start_time: Local::now().naive_local() + Duration::days(7),
            },
        )
        .unwrap();

        let response = server
            .client()
            .delete(&*format!("http://localhost/venues/{}", venue_id))
            .perform()
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?flash=Venue+deleted");
        assert!(db::find_venue(&conn, venue_id).is_err());
        assert!(db::show_listings(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_venue_flashes_error() {
        let (_dir, _database, server) = test_server();
        let response = server
            .client()
            .post("http://localhost/venues/12/delete", "", form_mime())
            .perform()
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/venues?flash=An+error+occurred."));
    }

    #[test]
    fn edit_form_is_prefilled_and_submission_updates() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        let id =
            db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();

        let response = server
            .client()
            .get(&*format!("http://localhost/venues/{}/edit", id))
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .read_utf8_body()
            .unwrap()
            .contains("value=\"1015 Folsom Street\""));

        let response = server
            .client()
            .post(
                &*format!("http://localhost/venues/{}/edit", id),
                "name=The+Musical+Hop&city=Oakland&state=CA&genres=Blues",
                form_mime(),
            )
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with(&format!("/venues/{}?flash=", id)));

        let venue = db::find_venue(&conn, id).unwrap();
        assert_eq!(venue.city, "Oakland");
        assert!(!venue.seeking_talent);
    }

    #[test]
    fn listing_groups_by_area() {
        let (_dir, database, server) = test_server();
        let conn = database.connect().unwrap();
        db::insert_venue(&conn, &new_venue("The Musical Hop", "San Francisco", "CA")).unwrap();
        db::insert_venue(&conn, &new_venue("The Dueling Pianos Bar", "New York", "NY")).unwrap();

        let response = server
            .client()
            .get("http://localhost/venues")
            .perform()
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.read_utf8_body().unwrap();
        assert!(body.contains("San Francisco, CA"));
        assert!(body.contains("New York, NY"));
    }
}
