//! Parsing and validation of the urlencoded forms posted by the create and
//! edit pages.

use crate::error::Error;
use crate::models::{Artist, Genres, NewArtist, NewShow, NewVenue, Venue};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::Deserialize;
use url::{form_urlencoded, Url};

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR",
    "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

lazy_static! {
    static ref PHONE: Regex = Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").unwrap();
}

/// An option in a `<select>`, marked if the form currently holds it.
pub struct Choice {
    pub value: &'static str,
    pub selected: bool,
}

fn choices(options: &[&'static str], selected: &[String]) -> Vec<Choice> {
    options
        .iter()
        .map(|&value| Choice {
            value,
            selected: selected.iter().any(|s| s == value),
        })
        .collect()
}

/// Decoded form fields in submission order; `genres` repeats.
struct Fields(Vec<(String, String)>);

impl Fields {
    fn parse(buf: &[u8]) -> Fields {
        Fields(form_urlencoded::parse(buf).into_owned().collect())
    }

    fn get(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_owned())
            .unwrap_or_default()
    }

    fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.to_owned())
            .collect()
    }

    fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }
}

fn require(errors: &mut Vec<String>, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{} is required", label));
    }
}

fn check_state(errors: &mut Vec<String>, state: &str) {
    if !state.is_empty() && !STATES.contains(&state) {
        errors.push(format!("{} is not a valid state", state));
    }
}

fn check_phone(errors: &mut Vec<String>, phone: &str) {
    if !phone.is_empty() && !PHONE.is_match(phone) {
        errors.push("Phone must look like 123-456-7890".to_owned());
    }
}

fn check_link(errors: &mut Vec<String>, label: &str, link: &str) {
    if link.is_empty() {
        return;
    }
    match Url::parse(link) {
        Ok(ref url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(format!("{} must be a valid URL", label)),
    }
}

fn check_genres(errors: &mut Vec<String>, genres: &[String]) {
    for genre in genres {
        if !GENRES.contains(&genre.as_str()) {
            errors.push(format!("{} is not a valid genre", genre));
        }
    }
}

#[derive(Debug, Default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Vec<String>,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueForm {
    pub fn from_form_body(buf: &[u8]) -> VenueForm {
        let fields = Fields::parse(buf);
        VenueForm {
            name: fields.get("name"),
            city: fields.get("city"),
            state: fields.get("state"),
            address: fields.get("address"),
            phone: fields.get("phone"),
            image_link: fields.get("image_link"),
            facebook_link: fields.get("facebook_link"),
            website: fields.get("website"),
            genres: fields.get_all("genres"),
            seeking_talent: fields.has("seeking_talent"),
            seeking_description: fields.get("seeking_description"),
        }
    }

    pub fn from_venue(venue: &Venue) -> VenueForm {
        VenueForm {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            image_link: venue.image_link.clone(),
            facebook_link: venue.facebook_link.clone(),
            website: venue.website.clone(),
            genres: venue.genres.0.clone(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone(),
        }
    }

    pub fn validate(&self) -> Result<NewVenue, Vec<String>> {
        let mut errors = Vec::new();
        require(&mut errors, "Name", &self.name);
        require(&mut errors, "City", &self.city);
        require(&mut errors, "State", &self.state);
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        check_link(&mut errors, "Image link", &self.image_link);
        check_link(&mut errors, "Facebook link", &self.facebook_link);
        check_link(&mut errors, "Website", &self.website);
        check_genres(&mut errors, &self.genres);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewVenue {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            image_link: self.image_link.clone(),
            facebook_link: self.facebook_link.clone(),
            website: self.website.clone(),
            genres: Genres(self.genres.clone()),
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description.clone(),
        })
    }

    pub fn state_choices(&self) -> Vec<Choice> {
        choices(STATES, std::slice::from_ref(&self.state))
    }

    pub fn genre_choices(&self) -> Vec<Choice> {
        choices(GENRES, &self.genres)
    }
}

#[derive(Debug, Default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Vec<String>,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn from_form_body(buf: &[u8]) -> ArtistForm {
        let fields = Fields::parse(buf);
        ArtistForm {
            name: fields.get("name"),
            city: fields.get("city"),
            state: fields.get("state"),
            phone: fields.get("phone"),
            image_link: fields.get("image_link"),
            facebook_link: fields.get("facebook_link"),
            website: fields.get("website"),
            genres: fields.get_all("genres"),
            seeking_venue: fields.has("seeking_venue"),
            seeking_description: fields.get("seeking_description"),
        }
    }

    pub fn from_artist(artist: &Artist) -> ArtistForm {
        ArtistForm {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            image_link: artist.image_link.clone(),
            facebook_link: artist.facebook_link.clone(),
            website: artist.website.clone(),
            genres: artist.genres.0.clone(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description.clone(),
        }
    }

    pub fn validate(&self) -> Result<NewArtist, Vec<String>> {
        let mut errors = Vec::new();
        require(&mut errors, "Name", &self.name);
        require(&mut errors, "City", &self.city);
        require(&mut errors, "State", &self.state);
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        check_link(&mut errors, "Image link", &self.image_link);
        check_link(&mut errors, "Facebook link", &self.facebook_link);
        check_link(&mut errors, "Website", &self.website);
        check_genres(&mut errors, &self.genres);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewArtist {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: self.phone.clone(),
            image_link: self.image_link.clone(),
            facebook_link: self.facebook_link.clone(),
            website: self.website.clone(),
            genres: Genres(self.genres.clone()),
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description.clone(),
        })
    }

    pub fn state_choices(&self) -> Vec<Choice> {
        choices(STATES, std::slice::from_ref(&self.state))
    }

    pub fn genre_choices(&self) -> Vec<Choice> {
        choices(GENRES, &self.genres)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowForm {
    #[serde(default)]
    pub artist_id: String,
    #[serde(default)]
    pub venue_id: String,
    #[serde(default)]
    pub start_time: String,
}

impl ShowForm {
    pub fn from_form_body(buf: &[u8]) -> Result<ShowForm, Error> {
        serde_urlencoded::from_bytes(buf).map_err(Error::InvalidForm)
    }

    pub fn validate(&self) -> Result<NewShow, Vec<String>> {
        let mut errors = Vec::new();
        let artist_id = self.artist_id.trim().parse::<i32>();
        if artist_id.is_err() {
            errors.push("Artist ID must be a number".to_owned());
        }
        let venue_id = self.venue_id.trim().parse::<i32>();
        if venue_id.is_err() {
            errors.push("Venue ID must be a number".to_owned());
        }
        let start_time = parse_start_time(&self.start_time);
        if start_time.is_none() {
            errors.push("Start time must look like 2035-05-21 21:30".to_owned());
        }

        match (artist_id, venue_id, start_time) {
            (Ok(artist_id), Ok(venue_id), Some(start_time)) => Ok(NewShow {
                artist_id,
                venue_id,
                start_time,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    START_TIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .next()
}
