use crate::schema::*;

use chrono::NaiveDateTime;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use std::io::Write;

/// A list of genre names, stored as a single comma-separated `TEXT` column.
#[derive(AsExpression, Clone, Debug, Default, FromSqlRow, PartialEq)]
#[sql_type = "Text"]
pub struct Genres(pub Vec<String>);

impl Genres {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl ToSql<Text, Sqlite> for Genres {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Sqlite>) -> serialize::Result {
        let joined = self.0.join(",");
        <String as ToSql<Text, Sqlite>>::to_sql(&joined, out)
    }
}

impl FromSql<Text, Sqlite> for Genres {
    fn from_sql(bytes: Option<&<Sqlite as Backend>::RawValue>) -> deserialize::Result<Self> {
        let joined = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Genres(
            joined
                .split(',')
                .filter(|genre| !genre.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

#[derive(Debug, Identifiable, Queryable)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Genres,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

#[derive(AsChangeset, Debug, Insertable)]
#[table_name = "venues"]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Genres,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

#[derive(Debug, Identifiable, Queryable)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Genres,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

#[derive(AsChangeset, Debug, Insertable)]
#[table_name = "artists"]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub genres: Genres,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

#[derive(Associations, Debug, Identifiable, Queryable)]
#[belongs_to(Artist)]
#[belongs_to(Venue)]
pub struct Show {
    pub id: i32,
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[table_name = "shows"]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}
