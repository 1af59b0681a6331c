//! End-to-end behavior of a key-value resource over real HTTP.

use std::collections::HashMap;

use reqwest::{header, StatusCode};
use resource_client::ResourceClient;
use rest_resource::model::KeyValue;

mod common;

async fn collection(server: &common::TestServer) -> HashMap<String, String> {
    let client: ResourceClient<KeyValue> = ResourceClient::new(&server.url("/"));
    client
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|kv| (kv.key, kv.value))
        .collect()
}

#[tokio::test]
async fn test_full_scenario() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client = common::client();

    // Every seeded key resolves, anything else is absent
    for (key, value) in [("Peter", "Lemon"), ("Paul", "Tree"), ("Mary", "Very Pretty")] {
        let res = client.get(server.url(&format!("/{}", key))).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "max-age=5");
        let kv: KeyValue = res.json().await.unwrap();
        assert_eq!(kv, KeyValue::new(key, value));
    }
    let res = client.get(server.url("/Nobody")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The collection is exactly the store
    let all = collection(&server).await;
    assert_eq!(all.len(), 3);
    assert_eq!(all["Mary"], "Very Pretty");

    // Replace one item
    let res = client
        .put(server.url("/Peter"))
        .body(r#"{"Value":"Orange!"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
    let kv: KeyValue = client.get(server.url("/Peter")).send().await.unwrap().json().await.unwrap();
    assert_eq!(kv, KeyValue::new("Peter", "Orange!"));

    // Create one item
    let res = client
        .post(server.url("/"))
        .body(r#"{"Key":"JohnSmith","Value":"Stranger"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::LOCATION], "/JohnSmith");
    assert_eq!(res.text().await.unwrap(), "JohnSmith");
    let res = client.get(server.url("/JohnSmith")).send().await.unwrap();
    let kv: KeyValue = res.json().await.unwrap();
    assert_eq!(kv, KeyValue::new("JohnSmith", "Stranger"));

    // Creating it again conflicts
    let res = client
        .post(server.url("/"))
        .body(r#"{"Key":"JohnSmith","Value":"Again"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Delete is not idempotent at the status level
    let res = client.delete(server.url("/Paul")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
    let res = client.get(server.url("/Paul")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.delete(server.url("/Paul")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Empty the collection
    let res = client.delete(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn test_put_missing_item_is_not_found() {
    let server = common::spawn_config(common::seeded_config()).await;
    let res = common::client()
        .put(server.url("/Nobody"))
        .body(r#"{"Value":"x"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(!collection(&server).await.contains_key("Nobody"));
}

#[tokio::test]
async fn test_replace_collection() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client: ResourceClient<KeyValue> = ResourceClient::new(&server.url("/"));

    client
        .replace_all(&[KeyValue::new("A", "1"), KeyValue::new("B", "2")])
        .await
        .unwrap();

    let all = collection(&server).await;
    assert_eq!(
        all,
        HashMap::from([("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())])
    );
}

#[tokio::test]
async fn test_round_trip() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client: ResourceClient<KeyValue> = ResourceClient::new(&server.url("/"));

    for value in [
        KeyValue::new("Plain", "text"),
        KeyValue::new("Empty", ""),
        KeyValue::new("Unicode", "grüße, 世界"),
        KeyValue::new("Quoted", r#"say "hi" \ bye"#),
    ] {
        let id = client.post(&value).await.unwrap();
        assert_eq!(id, value.key);
        assert_eq!(client.get(&id).await.unwrap(), Some(value));
    }
}

#[tokio::test]
async fn test_not_acceptable_leaves_state_unchanged() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client = common::client();
    let before = collection(&server).await;

    let requests = [
        client.get(server.url("/Peter")),
        client.get(server.url("/")),
        client.put(server.url("/Peter")).body(r#"{"Value":"html"}"#),
        client.put(server.url("/")).body("[]"),
        client.post(server.url("/")).body(r#"{"Key":"Html","Value":"x"}"#),
        client.delete(server.url("/Mary")),
        client.delete(server.url("/")),
    ];
    for request in requests {
        let res = request.header(header::ACCEPT, "text/html").send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
    }

    assert_eq!(collection(&server).await, before);
}

#[tokio::test]
async fn test_accept_header_variants() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client = common::client();

    let accepted = [
        "application/json",
        "application/*",
        "*/*",
        "text/html, application/json;q=0.5",
    ];
    for accept in accepted {
        let res = client
            .get(server.url("/Peter"))
            .header(header::ACCEPT, accept)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "accept {:?}", accept);
    }

    let res = client
        .get(server.url("/Peter"))
        .header(header::ACCEPT, "application/json;q=0")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_malformed_bodies() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client = common::client();

    let res = client.put(server.url("/Peter")).body("{not json").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(server.url("/")).body(r#"{"Key":"NoValue"}"#).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(server.url("/")).body(r#"{"Value":"NoKey"}"#).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let kv: KeyValue = client.get(server.url("/Peter")).send().await.unwrap().json().await.unwrap();
    assert_eq!(kv.value, "Lemon");
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = common::spawn_config(common::seeded_config()).await;
    let client = common::client();

    let res = client.post(server.url("/Peter")).body("{}").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "GET, PUT, DELETE");

    let res = client.patch(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "GET, PUT, POST, DELETE");
}

#[tokio::test]
async fn test_non_alphanumeric_identifier_has_no_route() {
    let server = common::spawn_config(common::seeded_config()).await;
    let res = common::client().get(server.url("/John-Smith")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "No matching resource");
}

#[tokio::test]
async fn test_multiple_mounted_resources_are_independent() {
    let mut config = common::seeded_config();
    config.resources = vec![
        common::seeded_resource("people", "/people"),
        common::seeded_resource("fruit", "/fruit"),
    ];
    config.resources[1].expiration_secs = 0;
    let server = common::spawn_config(config).await;

    let people: ResourceClient<KeyValue> = ResourceClient::new(&server.url("/people"));
    let fruit: ResourceClient<KeyValue> = ResourceClient::new(&server.url("/fruit"));

    people.delete("Peter").await.unwrap();
    assert_eq!(people.get("Peter").await.unwrap(), None);
    assert!(fruit.get("Peter").await.unwrap().is_some());

    let res = common::client()
        .post(server.url("/fruit"))
        .body(r#"{"Key":"Kiwi","Value":"green"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()[header::LOCATION], "/fruit/Kiwi");

    let res = common::client().get(server.url("/fruit/Kiwi")).send().await.unwrap();
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-cache");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = common::spawn_config(common::seeded_config()).await;
    let res = common::client()
        .get(server.url("/Peter"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}
