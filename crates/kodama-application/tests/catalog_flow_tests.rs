// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::{Arc, Mutex};

use kodama_application::{highlight_segments, AppContainer, GhibliState};
use kodama_client::{CancellationToken, GetAllOptions};
use kodama_config::AppConfig;
use kodama_domain::{PersonalRating, SortDirection, SortKey, StarsFilter};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn film(id: &str, title: &str, description: &str, running_time: &str, rt_score: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "original_title": "",
        "original_title_romanised": "",
        "image": "",
        "movie_banner": "",
        "description": description,
        "director": "Hayao Miyazaki",
        "producer": "Toshio Suzuki",
        "release_date": "2001",
        "running_time": running_time,
        "rt_score": rt_score,
        "people": [],
        "species": [],
        "locations": [],
        "vehicles": [],
        "url": ""
    })
}

fn catalog() -> serde_json::Value {
    serde_json::json!([
        film("sa", "Spirited Away", "Chihiro wanders into a world of spirits.", "124", "97"),
        film("pt", "Ponyo", "A goldfish princess longs to be human.", "101", "92"),
        film("tt", "My Neighbor Totoro", "Two girls meet forest spirits.", "86", ""),
        film("hm", "Howl's Moving Castle", "A young hatter is cursed.", "119", "87"),
    ])
}

async fn films_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/films"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog()))
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer, dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = Some(server.uri());
    config.storage.data_dir = dir.path().to_path_buf();
    config
}

fn titles(state: &GhibliState) -> Vec<String> {
    state
        .visible_films()
        .into_iter()
        .map(|f| f.title().to_string())
        .collect()
}

#[tokio::test]
async fn search_filter_and_sort_over_fetched_catalog() {
    let server = films_server().await;
    let dir = TempDir::new().unwrap();
    let mut app = AppContainer::build(config(&server, &dir)).unwrap();
    let loaded = app.load_films(GetAllOptions::default()).await;
    app.apply_films(loaded).unwrap();

    assert_eq!(
        titles(&app.store.snapshot()),
        vec!["Howl's Moving Castle", "My Neighbor Totoro", "Ponyo", "Spirited Away"]
    );

    app.store.set_query("spirit");
    assert_eq!(titles(&app.store.snapshot()), vec!["Spirited Away"]);

    app.store.toggle_include_synopsis();
    assert_eq!(
        titles(&app.store.snapshot()),
        vec!["My Neighbor Totoro", "Spirited Away"]
    );

    app.store.clear_filters();
    app.store.set_sort_key(SortKey::RtScore);
    app.store.set_sort_direction(SortDirection::Desc);
    assert_eq!(
        titles(&app.store.snapshot()),
        vec!["Spirited Away", "Ponyo", "Howl's Moving Castle", "My Neighbor Totoro"]
    );

    app.store.set_sort_key(SortKey::Duration);
    app.store.set_sort_direction(SortDirection::Asc);
    assert_eq!(
        titles(&app.store.snapshot()),
        vec!["My Neighbor Totoro", "Ponyo", "Howl's Moving Castle", "Spirited Away"]
    );
}

#[tokio::test]
async fn notes_and_ratings_drive_filters_and_persist() {
    let server = films_server().await;
    let dir = TempDir::new().unwrap();

    {
        let mut app = AppContainer::build(config(&server, &dir)).unwrap();
        let loaded = app.load_films(GetAllOptions::default()).await;
        app.apply_films(loaded).unwrap();

        app.store.save_note("pt", "Ham!", PersonalRating::new(5).unwrap());
        app.store.save_note("hm", "Calcifer steals it", PersonalRating::new(4).unwrap());
        app.store.toggle_watched("sa");

        app.store.set_stars_filter(Some(StarsFilter::Rating(PersonalRating::new(5).unwrap())));
        assert_eq!(titles(&app.store.snapshot()), vec!["Ponyo"]);

        app.store.set_stars_filter(Some(StarsFilter::Unrated));
        assert_eq!(
            titles(&app.store.snapshot()),
            vec!["My Neighbor Totoro", "Spirited Away"]
        );

        app.store.set_stars_filter(None);
        app.store.toggle_noted_only();
        app.store.remove_note("hm");
        assert_eq!(titles(&app.store.snapshot()), vec!["Ponyo"]);
    }

    let app = AppContainer::build(config(&server, &dir)).unwrap();
    let state = app.store.snapshot();
    assert!(state.filters.noted_only);
    assert_eq!(state.meta("pt").note, "Ham!");
    assert!(state.meta("sa").watched);
    assert_eq!(state.meta("hm").rating, None);
    assert_eq!(titles(&state), vec!["Ponyo"]);
}

#[tokio::test]
async fn listeners_see_each_new_snapshot() {
    let server = films_server().await;
    let dir = TempDir::new().unwrap();
    let mut app = AppContainer::build(config(&server, &dir)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = app.store.subscribe(Box::new(move |state: &Arc<GhibliState>| {
        sink.lock().unwrap().push(state.catalog.items.len());
    }));

    let loaded = app.load_films(GetAllOptions::default()).await;
    app.apply_films(loaded).unwrap();
    app.store.toggle_favorite("tt");
    assert!(app.store.unsubscribe(id));
    app.store.toggle_favorite("tt");

    assert_eq!(*seen.lock().unwrap(), vec![4, 4]);
}

#[tokio::test]
async fn cancelled_load_keeps_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/films"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog()))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut app = AppContainer::build(config(&server, &dir)).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let loaded = app.load_films(GetAllOptions::with_cancel(token)).await;
    assert!(app.apply_films(loaded).is_err());
    assert!(app.store.snapshot().catalog.items.is_empty());
}

#[test]
fn highlight_marks_query_terms_in_titles() {
    let marked: Vec<String> = highlight_segments("Howl's Moving Castle", "castle howl")
        .into_iter()
        .filter(|s| s.matched)
        .map(|s| s.text)
        .collect();
    assert_eq!(marked, vec!["Howl", "Castle"]);
}
