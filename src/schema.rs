table! {
    venues (id) {
        id -> Integer,
        name -> Text,
        city -> Text,
        state -> Text,
        address -> Text,
        phone -> Text,
        image_link -> Text,
        facebook_link -> Text,
        website -> Text,
        genres -> Text,
        seeking_talent -> Bool,
        seeking_description -> Text,
    }
}

table! {
    artists (id) {
        id -> Integer,
        name -> Text,
        city -> Text,
        state -> Text,
        phone -> Text,
        image_link -> Text,
        facebook_link -> Text,
        website -> Text,
        genres -> Text,
        seeking_venue -> Bool,
        seeking_description -> Text,
    }
}

table! {
    shows (id) {
        id -> Integer,
        artist_id -> Integer,
        venue_id -> Integer,
        start_time -> Timestamp,
    }
}

joinable!(shows -> artists (artist_id));
joinable!(shows -> venues (venue_id));

allow_tables_to_appear_in_same_query!(artists, shows, venues,);
