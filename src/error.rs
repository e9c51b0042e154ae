use crate::templates;
use gotham::helpers::http::response::create_response;
use gotham::state::State;
use hyper::{Body, Response, StatusCode};
use log::error;

#[derive(Debug)]
pub enum Error {
    VenueNotFound(i32),
    ArtistNotFound(i32),
    StaticNotFound(String),
    PageNotFound(String),
    BodyTooLarge(usize),
    InvalidForm(serde_urlencoded::de::Error),
    DatabaseConnection(diesel::ConnectionError),
    Database(diesel::result::Error),
    Template(std::io::Error),
    Inner(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn as_response(&self, state: &State) -> Response<Body> {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}: {:?}", self, self);
        }

        let mut buf = Vec::new();
        let rendered = match status {
            StatusCode::NOT_FOUND => templates::not_found(&mut buf, &self.to_string()),
            StatusCode::INTERNAL_SERVER_ERROR => templates::server_error(&mut buf),
            _ => {
                return create_response(
                    state,
                    status,
                    mime::TEXT_PLAIN_UTF_8,
                    format!("Error: {}", self),
                )
            }
        };

        match rendered {
            Ok(()) => create_response(state, status, mime::TEXT_HTML_UTF_8, buf),
            Err(err) => {
                error!("Failed to render error page: {:?}", err);
                create_response(
                    state,
                    status,
                    mime::TEXT_PLAIN_UTF_8,
                    format!("Error: {}", self),
                )
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        use Error::*;
        match self {
            VenueNotFound(..) | ArtistNotFound(..) | StaticNotFound(..) | PageNotFound(..) => {
                StatusCode::NOT_FOUND
            }
            BodyTooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
            InvalidForm(..) => StatusCode::BAD_REQUEST,
            DatabaseConnection(..) | Database(..) | Template(..) | Inner(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        use Error::*;
        match self {
            VenueNotFound(id) => write!(f, "Venue not found: {}", id),
            ArtistNotFound(id) => write!(f, "Artist not found: {}", id),
            StaticNotFound(name) => write!(f, "File not found: {}", name),
            PageNotFound(path) => write!(f, "Page not found: {}", path),
            BodyTooLarge(limit) => write!(f, "Request body is over {} bytes", limit),
            InvalidForm(err) => write!(f, "Invalid form submission: {}", err),
            DatabaseConnection(..) => write!(f, "Database connection error"),
            Database(..) => write!(f, "Database error"),
            Template(..) => write!(f, "Error rendering page"),
            Inner(..) => write!(f, "Unexpected error"),
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Error {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Template(err)
    }
}
