use crate::error::Error;
use crate::models::{Artist, NewArtist, NewShow, NewVenue, Show, Venue};
use crate::schema::{artists, shows, venues};
use crate::views::{
    group_by_area, Area, ArtistDetail, CounterpartRow, ListingRow, SearchHit, SearchResults,
    ShowListing, VenueDetail,
};
use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use gotham_derive::StateData;
use log::info;
use std::path::PathBuf;

const SCHEMA: &str = include_str!("../migrations/schema.sql");

no_arg_sql_function!(last_insert_rowid, diesel::sql_types::Integer);

/// Location of the SQLite database. Shared with every request through gotham
/// state; each request opens its own connection.
#[derive(Clone, StateData)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new<P: Into<PathBuf>>(path: P) -> Database {
        Database { path: path.into() }
    }

    pub fn connect(&self) -> Result<SqliteConnection, Error> {
        let conn = SqliteConnection::establish(&format!("{}", self.path.display()))
            .map_err(Error::DatabaseConnection)?;
        // SQLite leaves foreign keys (and so ON DELETE CASCADE) off per connection.
        // Requests run on several threads, so writers wait on the lock instead
        // of failing with SQLITE_BUSY.
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        Ok(conn)
    }

    pub fn migrate(&self) -> Result<(), Error> {
        let conn = self.connect()?;
        conn.batch_execute(SCHEMA)?;
        info!("Database schema ready at {}", self.path.display());
        Ok(())
    }
}

/// Keeps the hits whose name contains `term`, ignoring case. SQLite's `LIKE`
/// only folds ASCII, so matching happens here.
fn name_matches(hits: Vec<SearchHit>, term: &str) -> SearchResults {
    let term = term.to_lowercase();
    SearchResults::from(
        hits.into_iter()
            .filter(|hit| hit.name.to_lowercase().contains(&term))
            .collect::<Vec<_>>(),
    )
}

fn inserted_id(conn: &SqliteConnection) -> Result<i32, Error> {
    Ok(diesel::select(last_insert_rowid).get_result::<i32>(conn)?)
}

pub fn venue_areas(conn: &SqliteConnection, now: NaiveDateTime) -> Result<Vec<Area>, Error> {
    let all_venues = venues::table.order(venues::id).load::<Venue>(conn)?;
    let upcoming = Show::belonging_to(&all_venues)
        .filter(shows::start_time.gt(now))
        .load::<Show>(conn)?
        .grouped_by(&all_venues);
    Ok(group_by_area(
        all_venues
            .into_iter()
            .zip(upcoming)
            .map(|(venue, shows)| (venue, shows.len())),
    ))
}

pub fn venue_refs(conn: &SqliteConnection) -> Result<Vec<SearchHit>, Error> {
    Ok(venues::table
        .select((venues::id, venues::name))
        .order(venues::id)
        .load::<SearchHit>(conn)?)
}

pub fn search_venues(conn: &SqliteConnection, term: &str) -> Result<SearchResults, Error> {
    Ok(name_matches(venue_refs(conn)?, term))
}

pub fn find_venue(conn: &SqliteConnection, venue_id: i32) -> Result<Venue, Error> {
    venues::table
        .find(venue_id)
        .first(conn)
        .map_err(|err| match err {
            diesel::result::Error::NotFound => Error::VenueNotFound(venue_id),
            err => Error::Database(err),
        })
}

pub fn venue_detail(
    conn: &SqliteConnection,
    venue_id: i32,
    now: NaiveDateTime,
) -> Result<VenueDetail, Error> {
    let venue = find_venue(conn, venue_id)?;
    let rows = shows::table
        .inner_join(artists::table)
        .filter(shows::venue_id.eq(venue_id))
        .select((
            shows::start_time,
            artists::id,
            artists::name,
            artists::image_link,
        ))
        .order((shows::start_time.asc(), shows::id.asc()))
        .load::<CounterpartRow>(conn)?;
    Ok(VenueDetail::new(venue, rows, now))
}

pub fn insert_venue(conn: &SqliteConnection, new_venue: &NewVenue) -> Result<i32, Error> {
    conn.transaction(|| {
        diesel::insert_into(venues::table)
            .values(new_venue)
            .execute(conn)?;
        inserted_id(conn)
    })
}

pub fn update_venue(
    conn: &SqliteConnection,
    venue_id: i32,
    changes: &NewVenue,
) -> Result<(), Error> {
    conn.transaction(|| {
        let updated = diesel::update(venues::table.find(venue_id))
            .set(changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(Error::VenueNotFound(venue_id));
        }
        Ok(())
    })
}

/// Deletes the venue; its shows go with it through the foreign key cascade.
pub fn delete_venue(conn: &SqliteConnection, venue_id: i32) -> Result<(), Error> {
    conn.transaction(|| {
        let deleted = diesel::delete(venues::table.find(venue_id)).execute(conn)?;
        if deleted == 0 {
            return Err(Error::VenueNotFound(venue_id));
        }
        Ok(())
    })
}

pub fn artist_refs(conn: &SqliteConnection) -> Result<Vec<SearchHit>, Error> {
    Ok(artists::table
        .select((artists::id, artists::name))
        .order(artists::id)
        .load::<SearchHit>(conn)?)
}

pub fn search_artists(conn: &SqliteConnection, term: &str) -> Result<SearchResults, Error> {
    Ok(name_matches(artist_refs(conn)?, term))
}

pub fn find_artist(conn: &SqliteConnection, artist_id: i32) -> Result<Artist, Error> {
    artists::table
        .find(artist_id)
        .first(conn)
        .map_err(|err| match err {
            diesel::result::Error::NotFound => Error::ArtistNotFound(artist_id),
            err => Error::Database(err),
        })
}

pub fn artist_detail(
    conn: &SqliteConnection,
    artist_id: i32,
    now: NaiveDateTime,
) -> Result<ArtistDetail, Error> {
    let artist = find_artist(conn, artist_id)?;
    let rows = shows::table
        .inner_join(venues::table)
        .filter(shows::artist_id.eq(artist_id))
        .select((
            shows::start_time,
            venues::id,
            venues::name,
            venues::image_link,
        ))
        .order((shows::start_time.asc(), shows::id.asc()))
        .load::<CounterpartRow>(conn)?;
    Ok(ArtistDetail::new(artist, rows, now))
}

pub fn insert_artist(conn: &SqliteConnection, new_artist: &NewArtist) -> Result<i32, Error> {
    conn.transaction(|| {
        diesel::insert_into(artists::table)
            .values(new_artist)
            .execute(conn)?;
        inserted_id(conn)
    })
}

pub fn update_artist(
    conn: &SqliteConnection,
    artist_id: i32,
    changes: &NewArtist,
) -> Result<(), Error> {
    conn.transaction(|| {
        let updated = diesel::update(artists::table.find(artist_id))
            .set(changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(Error::ArtistNotFound(artist_id));
        }
        Ok(())
    })
}

pub fn delete_artist(conn: &SqliteConnection, artist_id: i32) -> Result<(), Error> {
    conn.transaction(|| {
        let deleted = diesel::delete(artists::table.find(artist_id)).execute(conn)?;
        if deleted == 0 {
            return Err(Error::ArtistNotFound(artist_id));
        }
        Ok(())
    })
}

/// Books an artist at a venue. Overlapping bookings are allowed; unknown
/// artist or venue ids fail the foreign key check.
pub fn insert_show(conn: &SqliteConnection, new_show: &NewShow) -> Result<i32, Error> {
    conn.transaction(|| {
        diesel::insert_into(shows::table)
            .values(new_show)
            .execute(conn)?;
        inserted_id(conn)
    })
}

pub fn show_listings(conn: &SqliteConnection) -> Result<Vec<ShowListing>, Error> {
    let rows = shows::table
        .inner_join(venues::table)
        .inner_join(artists::table)
        .select((
            shows::start_time,
            venues::id,
            venues::name,
            artists::id,
            artists::name,
            artists::image_link,
        ))
        .order((shows::start_time.asc(), shows::id.asc()))
        .load::<ListingRow>(conn)?;
    Ok(rows.into_iter().map(ShowListing::from).collect())
}
