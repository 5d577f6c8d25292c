mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use common::*;
use gigbook_db::entities::{show, venue};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

const MUSICAL_HOP: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
    &address=1015+Folsom+Street&phone=123-123-1234\
    &genres=Jazz&genres=Reggae&genres=Swing\
    &facebook_link=https%3A%2F%2Fwww.facebook.com%2FTheMusicalHop\
    &website_link=https%3A%2F%2Fwww.themusicalhop.com\
    &seeking_talent=y&seeking_description=We+are+on+the+lookout";

#[tokio::test]
async fn test_create_venue_persists_one_row() {
    let state = test_state().await;

    let response = post_form(&state, "/venues/create", MUSICAL_HOP).await;
    let messages = expect_redirect(&response, "/");
    assert_eq!(messages, vec!["Venue The Musical Hop was successfully listed!"]);

    let rows = venue::Entity::find()
        .filter(venue::Column::Name.eq("The Musical Hop"))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let created = &rows[0];
    assert_eq!(created.genres.as_slice(), ["Jazz", "Reggae", "Swing"]);
    assert_eq!(created.website.as_deref(), Some("https://www.themusicalhop.com"));
    assert!(created.seeking_talent);
    assert_eq!(created.image_link, None);
}

#[tokio::test]
async fn test_create_venue_missing_address_persists_nothing() {
    let state = test_state().await;
    let body = MUSICAL_HOP.replace("&address=1015+Folsom+Street", "");

    let response = post_form(&state, "/venues/create", &body).await;
    let messages = expect_redirect(&response, "/");
    assert_eq!(
        messages,
        vec!["An error occurred. Venue The Musical Hop could not be listed."]
    );
    assert_eq!(venue::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_venue_with_overlong_name_persists_nothing() {
    let state = test_state().await;
    let name = "N".repeat(121);
    let body = MUSICAL_HOP.replace("name=The+Musical+Hop", &format!("name={name}"));

    let response = post_form(&state, "/venues/create", &body).await;
    let messages = expect_redirect(&response, "/");
    assert_eq!(
        messages,
        vec![format!("An error occurred. Venue {name} could not be listed.")]
    );
    assert_eq!(venue::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_huge_name_keeps_flash_cookie_small() {
    let state = test_state().await;
    let body = MUSICAL_HOP.replace(
        "name=The+Musical+Hop",
        &format!("name={}", "N".repeat(5000)),
    );

    let response = post_form(&state, "/venues/create", &body).await;
    assert!(flash_cookie(&response).len() < 4096);
    let messages = expect_redirect(&response, "/");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("An error occurred. Venue NNN"));
    assert_eq!(venue::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_matches_non_ascii_name_exactly() {
    let state = test_state().await;
    seed_venue(&state, "CAFÉ Oto", "London", "LDN").await;

    let page = page_json(post_form(&state, "/venues/search", "search_term=CAF%C3%89").await).await;
    assert_eq!(page["results"]["count"], 1);
    assert_eq!(page["results"]["data"][0]["name"], "CAFÉ Oto");

    let page = page_json(post_form(&state, "/venues/search", "search_term=oto").await).await;
    assert_eq!(page["results"]["count"], 1);
}

#[tokio::test]
async fn test_search_counts_upcoming_shows_of_matches() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    let bar = seed_venue(&state, "The Dueling Pianos Bar", "New York", "NY").await;
    let artist = seed_artist(&state, "Guns N Petals").await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(3)).await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(4)).await;
    seed_show(&state, artist.id, hop.id, Utc::now() - Duration::days(4)).await;
    seed_show(&state, artist.id, bar.id, Utc::now() + Duration::days(4)).await;

    let page = page_json(post_form(&state, "/venues/search", "search_term=hop").await).await;
    assert_eq!(page["results"]["count"], 1);
    assert_eq!(page["results"]["data"][0]["num_upcoming_shows"], 2);
}

#[tokio::test]
async fn test_flash_shown_once_on_next_page() {
    let state = test_state().await;
    let response = post_form(&state, "/venues/create", MUSICAL_HOP).await;
    let cookie = flash_cookie(&response);

    let home = get_with_cookie(&state, "/", &cookie).await;
    assert_eq!(home.status(), StatusCode::OK);
    let expired = home.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(expired.starts_with("flash=;"));
    assert!(expired.contains("Max-Age=0"));

    let page = page_json(home).await;
    assert_eq!(page["template"], "pages/home.html");
    assert_eq!(page["messages"][0], "Venue The Musical Hop was successfully listed!");

    let again = get(&state, "/").await;
    assert!(again.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(page_json(again).await["messages"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_venues_groups_by_city_and_state() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    seed_venue(&state, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
    seed_venue(&state, "The Dueling Pianos Bar", "New York", "NY").await;
    let artist = seed_artist(&state, "Guns N Petals").await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(30)).await;
    seed_show(&state, artist.id, hop.id, Utc::now() - Duration::days(30)).await;

    let page = page_json(get(&state, "/venues").await).await;
    let areas = page["areas"].as_array().unwrap();
    assert_eq!(areas.len(), 2);

    let sf = areas
        .iter()
        .find(|a| a["city"] == "San Francisco" && a["state"] == "CA")
        .unwrap();
    let venues = sf["venues"].as_array().unwrap();
    assert_eq!(venues.len(), 2);
    let hop_summary = venues.iter().find(|v| v["id"] == hop.id).unwrap();
    assert_eq!(hop_summary["num_upcoming_shows"], 1);

    let ny = areas.iter().find(|a| a["city"] == "New York").unwrap();
    assert_eq!(ny["venues"][0]["name"], "The Dueling Pianos Bar");
    assert_eq!(ny["venues"][0]["num_upcoming_shows"], 0);
}

#[tokio::test]
async fn test_search_venues_is_case_insensitive_substring() {
    let state = test_state().await;
    seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    seed_venue(&state, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
    seed_venue(&state, "The Dueling Pianos Bar", "New York", "NY").await;

    let page = page_json(post_form(&state, "/venues/search", "search_term=hOP").await).await;
    assert_eq!(page["template"], "pages/search_venues.html");
    assert_eq!(page["search_term"], "hOP");
    assert_eq!(page["results"]["count"], 1);
    assert_eq!(page["results"]["data"][0]["name"], "The Musical Hop");

    let page = page_json(post_form(&state, "/venues/search", "search_term=Music").await).await;
    assert_eq!(page["results"]["count"], 2);

    let page = page_json(post_form(&state, "/venues/search", "search_term=").await).await;
    assert_eq!(page["results"]["count"], 3);
}

#[tokio::test]
async fn test_search_venues_treats_wildcards_literally() {
    let state = test_state().await;
    seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;

    let page = page_json(post_form(&state, "/venues/search", "search_term=%25").await).await;
    assert_eq!(page["results"]["count"], 0);

    let page = page_json(post_form(&state, "/venues/search", "search_term=_").await).await;
    assert_eq!(page["results"]["count"], 0);
}

#[tokio::test]
async fn test_show_venue_partitions_past_and_upcoming() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    let artist = seed_artist(&state, "Guns N Petals").await;
    seed_show(&state, artist.id, hop.id, Utc::now() - Duration::days(365)).await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(365)).await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(400)).await;

    let response = get(&state, &format!("/venues/{}", hop.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = page_json(response).await;
    assert_eq!(page["template"], "pages/show_venue.html");

    let detail = &page["venue"];
    assert_eq!(detail["name"], "The Musical Hop");
    assert_eq!(detail["genres"], serde_json::json!(["Jazz", "Reggae"]));
    assert_eq!(detail["past_shows_count"], 1);
    assert_eq!(detail["upcoming_shows_count"], 2);
    assert_eq!(detail["past_shows"][0]["artist_name"], "Guns N Petals");
    assert_eq!(detail["upcoming_shows"][0]["artist_id"], artist.id);
}

#[tokio::test]
async fn test_show_unknown_venue_renders_404_page() {
    let state = test_state().await;

    let response = get(&state, "/venues/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(page_json(response).await["template"], "errors/404.html");
}

#[tokio::test]
async fn test_edit_venue_form_is_prefilled() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;

    let page = page_json(get(&state, &format!("/venues/{}/edit", hop.id)).await).await;
    assert_eq!(page["template"], "forms/edit_venue.html");
    assert_eq!(page["form"]["name"], "The Musical Hop");
    assert_eq!(page["form"]["genres"], serde_json::json!(["Jazz", "Reggae"]));
    assert_eq!(page["venue"]["id"], hop.id);
}

#[tokio::test]
async fn test_edit_venue_overwrites_fields() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    let body = "name=The+Musical+Hop+II&city=Oakland&state=CA\
        &address=1+Broadway&phone=555-000-1111&genres=Folk";

    let response = post_form(&state, &format!("/venues/{}/edit", hop.id), body).await;
    let messages = expect_redirect(&response, &format!("/venues/{}", hop.id));
    assert_eq!(messages, vec!["Venue The Musical Hop II was successfully updated!"]);

    let updated = venue::Entity::find_by_id(hop.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.city, "Oakland");
    assert_eq!(updated.genres.as_slice(), ["Folk"]);
    assert!(!updated.seeking_talent);
    assert_eq!(updated.image_link, None);
}

#[tokio::test]
async fn test_edit_unknown_venue_flashes_error() {
    let state = test_state().await;
    let response = post_form(&state, "/venues/42/edit", MUSICAL_HOP).await;
    let messages = expect_redirect(&response, "/venues/42");
    assert_eq!(
        messages,
        vec!["An error occurred. Venue The Musical Hop could not be updated."]
    );
}

#[tokio::test]
async fn test_delete_venue_removes_its_shows() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;
    let other = seed_venue(&state, "The Dueling Pianos Bar", "New York", "NY").await;
    let artist = seed_artist(&state, "Guns N Petals").await;
    seed_show(&state, artist.id, hop.id, Utc::now() + Duration::days(1)).await;
    seed_show(&state, artist.id, other.id, Utc::now() + Duration::days(1)).await;

    let response = delete(&state, &format!("/venues/{}", hop.id)).await;
    let messages = expect_redirect(&response, "/venues");
    assert_eq!(messages, vec!["Venue The Musical Hop was successfully deleted."]);

    assert!(venue::Entity::find_by_id(hop.id)
        .one(&state.db)
        .await
        .unwrap()
        .is_none());
    let remaining = show::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].venue_id, other.id);
}

#[tokio::test]
async fn test_delete_venue_via_post_route() {
    let state = test_state().await;
    let hop = seed_venue(&state, "The Musical Hop", "San Francisco", "CA").await;

    let response = post_form(&state, &format!("/venues/{}/delete", hop.id), "").await;
    expect_redirect(&response, "/venues");
    assert_eq!(venue::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_unknown_venue_flashes_error() {
    let state = test_state().await;

    let response = delete(&state, "/venues/7").await;
    let messages = expect_redirect(&response, "/venues");
    assert_eq!(messages, vec!["An error occurred. Venue 7 could not be deleted."]);
}
