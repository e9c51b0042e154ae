#[macro_use]
extern crate diesel;
use crate::db::Database;
use crate::error::Error;
use clap::{App, Arg};
use gotham::middleware::logger::RequestLogger;
use gotham::middleware::state::StateMiddleware;
use gotham::pipeline::new_pipeline;
use gotham::pipeline::single::single_pipeline;
use gotham::router::{builder::*, Router};
use log::info;
use serde_derive::Deserialize;
use std::path::PathBuf;

mod db;
mod error;
mod forms;
mod logging;
mod models;
mod routes;
mod schema;
mod views;

include!(concat!(env!("OUT_DIR"), "/templates.rs"));

#[derive(Deserialize)]
struct Config {
    host: String,
    port: u16,
    db_path: PathBuf,
    log_file: PathBuf,
    log_level: String,
}

impl Config {
    /// Reads `settings` (any format the config crate knows, e.g.
    /// `settings.json`), then applies `BOOKINGS_*` environment overrides.
    fn load(settings_name: &str) -> Result<Config, config::ConfigError> {
        let mut settings = config::Config::default();
        settings.set_default("host", "127.0.0.1")?;
        settings.set_default("port", 5000i64)?;
        settings.set_default("db_path", "bookings.sqlite3")?;
        settings.set_default("log_file", "error.log")?;
        settings.set_default("log_level", "info")?;
        settings.merge(config::File::with_name(settings_name).required(false))?;
        settings.merge(config::Environment::with_prefix("BOOKINGS"))?;
        settings.try_into::<Config>()
    }
}

fn main() {
    let matches = App::new("booking-directory")
        .about("Browse and book venues, artists and shows")
        .arg(
            Arg::with_name("settings")
                .long("settings")
                .short("s")
                .value_name("NAME")
                .help("Settings file to read, without extension")
                .takes_value(true)
                .default_value("settings"),
        )
        .get_matches();

    if let Err(err) = run(matches.value_of("settings").unwrap_or("settings")) {
        eprintln!("{}: {:?}", err, err);
        std::process::exit(1);
    }
}

fn run(settings_name: &str) -> Result<(), Error> {
    let config = Config::load(settings_name).map_err(|err| Error::Inner(Box::new(err)))?;
    let level = config
        .log_level
        .parse::<log::LevelFilter>()
        .map_err(|err| Error::Inner(Box::new(err)))?;
    logging::init(level, &config.log_file).map_err(|err| Error::Inner(Box::new(err)))?;

    let db = Database::new(config.db_path);
    db.migrate()?;

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening for requests at http://{}", addr);
    gotham::start(addr, router(db));
    Ok(())
}

fn router(db: Database) -> Router {
    let (chain, pipelines) = single_pipeline(
        new_pipeline()
            .add(RequestLogger::new(log::Level::Info))
            .add(StateMiddleware::new(db))
            .build(),
    );

    build_router(chain, pipelines, |route| {
        route
            .get("/")
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::home);
        route
            .get("/static/:name")
            .with_path_extractor::<routes::StaticPath>()
            .to(routes::static_file);

        route
            .get("/venues")
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::venues::list);
        route
            .get("/venues/search")
            .with_query_string_extractor::<routes::SearchQuery>()
            .to(routes::venues::search_get);
        route.post("/venues/search").to(routes::venues::search_post);
        route.get("/venues/create").to(routes::venues::create_form);
        route.post("/venues/create").to(routes::venues::create);
        route
            .get("/venues/:id")
            .with_path_extractor::<routes::IdPath>()
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::venues::show);
        route
            .delete("/venues/:id")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::venues::delete);
        route
            .post("/venues/:id/delete")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::venues::delete);
        route
            .get("/venues/:id/edit")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::venues::edit_form);
        route
            .post("/venues/:id/edit")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::venues::edit);

        route
            .get("/artists")
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::artists::list);
        route
            .get("/artists/search")
            .with_query_string_extractor::<routes::SearchQuery>()
            .to(routes::artists::search_get);
        route.post("/artists/search").to(routes::artists::search_post);
        route.get("/artists/create").to(routes::artists::create_form);
        route.post("/artists/create").to(routes::artists::create);
        route
            .get("/artists/:id")
            .with_path_extractor::<routes::IdPath>()
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::artists::show);
        route
            .delete("/artists/:id")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::artists::delete);
        route
            .post("/artists/:id/delete")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::artists::delete);
        route
            .get("/artists/:id/edit")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::artists::edit_form);
        route
            .post("/artists/:id/edit")
            .with_path_extractor::<routes::IdPath>()
            .to(routes::artists::edit);

        route
            .get("/shows")
            .with_query_string_extractor::<routes::FlashQuery>()
            .to(routes::shows::list);
        route.get("/shows/create").to(routes::shows::create_form);
        route.post("/shows/create").to(routes::shows::create);

        route.get("/*").to(routes::not_found);
    })
}
