//! Display structures assembled from query results.

use crate::models::{Artist, Venue};
use chrono::NaiveDateTime;

/// Venues sharing a (city, state) pair.
#[derive(Debug)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

#[derive(Debug)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub upcoming_shows: usize,
}

#[derive(Debug, PartialEq, Queryable)]
pub struct SearchHit {
    pub id: i32,
    pub name: String,
}

#[derive(Debug)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<SearchHit>,
}

impl From<Vec<SearchHit>> for SearchResults {
    fn from(data: Vec<SearchHit>) -> SearchResults {
        SearchResults {
            count: data.len(),
            data,
        }
    }
}

/// One show as seen from a venue or artist page: the other side of the
/// booking plus when it happens.
#[derive(Debug)]
pub struct ShowSlot {
    pub counterpart_id: i32,
    pub name: String,
    pub image_link: String,
    pub start_time: String,
}

#[derive(Debug)]
pub struct VenueDetail {
    pub venue: Venue,
    pub past_shows: Vec<ShowSlot>,
    pub upcoming_shows: Vec<ShowSlot>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub past_shows: Vec<ShowSlot>,
    pub upcoming_shows: Vec<ShowSlot>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

fn show_noun(count: usize) -> &'static str {
    if count == 1 {
        "Show"
    } else {
        "Shows"
    }
}

impl VenueDetail {
    pub fn upcoming_noun(&self) -> &'static str {
        show_noun(self.upcoming_shows_count)
    }

    pub fn past_noun(&self) -> &'static str {
        show_noun(self.past_shows_count)
    }

    pub fn new(venue: Venue, rows: Vec<CounterpartRow>, now: NaiveDateTime) -> VenueDetail {
        let (past_shows, upcoming_shows) = partition_shows(rows, now);
        VenueDetail {
            venue,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

impl ArtistDetail {
    pub fn upcoming_noun(&self) -> &'static str {
        show_noun(self.upcoming_shows_count)
    }

    pub fn past_noun(&self) -> &'static str {
        show_noun(self.past_shows_count)
    }

    pub fn new(artist: Artist, rows: Vec<CounterpartRow>, now: NaiveDateTime) -> ArtistDetail {
        let (past_shows, upcoming_shows) = partition_shows(rows, now);
        ArtistDetail {
            artist,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

/// `(start_time, counterpart id, counterpart name, counterpart image link)`
pub type CounterpartRow = (NaiveDateTime, i32, String, String);

/// Splits shows into `(past, upcoming)`. A show starting exactly at `now` is
/// neither.
pub fn partition_shows(
    rows: Vec<CounterpartRow>,
    now: NaiveDateTime,
) -> (Vec<ShowSlot>, Vec<ShowSlot>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for (start_time, counterpart_id, name, image_link) in rows {
        let slot = ShowSlot {
            counterpart_id,
            name,
            image_link,
            start_time: format_datetime(&start_time, DateFormat::Medium),
        };
        if start_time < now {
            past.push(slot);
        } else if start_time > now {
            upcoming.push(slot);
        }
    }
    (past, upcoming)
}

/// Groups venues by distinct (city, state), keeping the order in which each
/// location is first seen.
pub fn group_by_area<I>(venues: I) -> Vec<Area>
where
    I: IntoIterator<Item = (Venue, usize)>,
{
    let mut areas: Vec<Area> = Vec::new();
    for (venue, upcoming_shows) in venues {
        let Venue {
            id,
            name,
            city,
            state,
            ..
        } = venue;
        let summary = VenueSummary {
            id,
            name,
            upcoming_shows,
        };
        match areas
            .iter_mut()
            .find(|area| area.city == city && area.state == state)
        {
            Some(area) => area.venues.push(summary),
            None => areas.push(Area {
                city,
                state,
                venues: vec![summary],
            }),
        }
    }
    areas
}

#[derive(Debug)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// `(start_time, venue id, venue name, artist id, artist name, artist image link)`
pub type ListingRow = (NaiveDateTime, i32, String, i32, String, String);

impl From<ListingRow> for ShowListing {
    fn from(row: ListingRow) -> ShowListing {
        let (start_time, venue_id, venue_name, artist_id, artist_name, artist_image_link) = row;
        ShowListing {
            venue_id,
            venue_name,
            artist_id,
            artist_name,
            artist_image_link,
            start_time: format_datetime(&start_time, DateFormat::Full),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum DateFormat {
    Medium,
    Full,
}

pub fn format_datetime(value: &NaiveDateTime, format: DateFormat) -> String {
    let pattern = match format {
        DateFormat::Medium => "%a %m, %d, %Y %-I:%M%p",
        DateFormat::Full => "%A %B, %-d, %Y at %-I:%M%p",
    };
    value.format(pattern).to_string()
}
