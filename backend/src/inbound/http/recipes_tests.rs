//! Tests for the recipe handlers.

use std::path::Path;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::parse_decimal;
use crate::domain::recipe_image::fixtures::{jpeg_bytes, png_bytes};
use crate::inbound::http::state::MediaSettings;
use crate::inbound::http::test_utils::{
    TestContext, multipart_body, send_json, sign_up, token_header,
};

async fn create<S, B>(app: &S, token: &str, uri: &str, body: Value) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let (status, body) = send_json(
        app,
        actix_test::TestRequest::post().uri(uri).set_json(body),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body {body}");
    body
}

fn id_of(body: &Value) -> i64 {
    body["id"].as_i64().expect("id")
}

fn cake() -> Value {
    json!({"title": "Cake", "time_minutes": 60, "price": 20.00})
}

/// Files stored below the recipe upload directory.
fn stored_files(root: &Path) -> Vec<String> {
    std::fs::read_dir(root.join("uploads/recipe"))
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
#[case(json!(5), Some("5"))]
#[case(json!(20.5), Some("20.5"))]
#[case(json!("5.25"), Some("5.25"))]
#[case(json!(" 7 "), Some("7"))]
#[case(json!("abc"), None)]
#[case(json!(true), None)]
fn prices_parse_from_numbers_and_strings(#[case] raw: Value, #[case] expected: Option<&str>) {
    assert_eq!(
        parse_decimal(&raw).map(|value| value.to_string()),
        expected.map(str::to_owned)
    );
}

#[actix_web::test]
async fn cake_detail_nests_both_tags() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "a@x.com").await;
    let vegan = create(&app, &token, "/api/recipe/tags", json!({"name": "Vegan"})).await;
    let dessert = create(&app, &token, "/api/recipe/tags", json!({"name": "Dessert"})).await;

    let mut body = cake();
    body["tags"] = json!([id_of(&vegan), id_of(&dessert)]);
    let created = create(&app, &token, "/api/recipe/recipes", body).await;
    assert_eq!(created["price"], json!("20.00"));
    assert_eq!(created["tags"], json!([id_of(&vegan), id_of(&dessert)]));

    let (status, detail) = send_json(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/recipe/recipes/{}", id_of(&created))),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let mut names: Vec<&str> = detail["tags"]
        .as_array()
        .expect("tags")
        .iter()
        .filter_map(|tag| tag["name"].as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Dessert", "Vegan"]);
    assert_eq!(detail["title"], json!("Cake"));
    assert_eq!(detail["time_minutes"], json!(60));
    assert_eq!(detail["link"], json!(""));
}

#[actix_web::test]
async fn recipes_are_isolated_between_users() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;
    let first = create(&app, &alice, "/api/recipe/recipes", cake()).await;
    let second = create(&app, &alice, "/api/recipe/recipes", cake()).await;
    let foreign = create(&app, &bob, "/api/recipe/recipes", cake()).await;

    let (status, listed) = send_json(
        &app,
        actix_test::TestRequest::get().uri("/api/recipe/recipes"),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = listed
        .as_array()
        .expect("list")
        .iter()
        .map(id_of)
        .collect();
    assert_eq!(ids, vec![id_of(&second), id_of(&first)]);

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/recipe/recipes/{}", id_of(&foreign))),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("not_found"));

    let (status, _) = send_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/recipe/recipes/{}", id_of(&foreign)))
            .set_json(json!({"title": "Hijacked"})),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("tags", "/api/recipe/tags")]
#[case("ingredients", "/api/recipe/ingredients")]
#[actix_web::test]
async fn partial_update_keeps_relations_full_update_clears_them(
    #[case] field: &str,
    #[case] label_uri: &str,
) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let label = create(&app, &token, label_uri, json!({"name": "Kept"})).await;
    let mut body = cake();
    body[field] = json!([id_of(&label)]);
    let recipe = create(&app, &token, "/api/recipe/recipes", body).await;
    let uri = format!("/api/recipe/recipes/{}", id_of(&recipe));

    let (status, patched) = send_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({"title": "Renamed"})),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], json!("Renamed"));
    assert_eq!(patched[field], json!([id_of(&label)]));

    let (status, replaced) = send_json(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"title": "Plain", "time_minutes": 5, "price": "3.10"})),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced[field], json!([]));
    assert_eq!(replaced["price"], json!("3.10"));
}

#[rstest]
#[case(json!({"time_minutes": 5, "price": "1.00"}), "title", "This field is required.")]
#[case(json!({"title": "Soup", "price": "1.00"}), "time_minutes", "This field is required.")]
#[case(json!({"title": "Soup", "time_minutes": 5}), "price", "This field is required.")]
#[case(json!({"title": "", "time_minutes": 5, "price": "1.00"}), "title", "This field may not be blank.")]
#[case(json!({"title": "Soup", "time_minutes": 5, "price": "abc"}), "price", "A valid number is required.")]
#[case(json!({"title": "Soup", "time_minutes": 5, "price": "1.001"}), "price", "Ensure that there are no more than 2 decimal places.")]
#[case(json!({"title": "Soup", "time_minutes": 5, "price": 1000}), "price", "Ensure that there are no more than 5 digits in total.")]
#[case(json!({"title": "Soup", "time_minutes": -1, "price": "1.00"}), "time_minutes", "Ensure this value is greater than or equal to 0.")]
#[actix_web::test]
async fn create_validates_fields(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] message: &str,
) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/recipe/recipes")
            .set_json(payload),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][field][0], json!(message));
}

#[actix_web::test]
async fn foreign_tags_are_rejected() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;
    let foreign = create(&app, &bob, "/api/recipe/tags", json!({"name": "Bob's"})).await;

    let mut body = cake();
    body["tags"] = json!([id_of(&foreign)]);
    let (status, error) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/recipe/recipes")
            .set_json(body),
        &alice,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error["details"]["tags"][0],
        json!(format!("Invalid pk \"{}\" - object does not exist.", id_of(&foreign)))
    );
}

#[actix_web::test]
async fn non_numeric_id_is_not_found() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::get().uri("/api/recipe/recipes/abc"),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Not found."));
}

#[actix_web::test]
async fn upload_stores_image_under_a_generated_name() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let recipe = create(&app, &token, "/api/recipe/recipes", cake()).await;
    let id = id_of(&recipe);

    let (content_type, payload) = multipart_body("image", "holiday-photo.png", &png_bytes());
    let (status, first) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/recipe/recipes/{id}/upload-image"))
            .insert_header(content_type.clone())
            .set_payload(payload.clone()),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], json!(id));
    let url = first["image"].as_str().expect("image url");
    assert!(url.starts_with("/media/uploads/recipe/"));
    assert!(url.ends_with(".png"));
    assert!(!url.contains("holiday-photo"));
    let relative = url.trim_start_matches("/media/");
    assert!(ctx.media_root().join(relative).is_file());

    let (status, second) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/recipe/recipes/{id}/upload-image"))
            .insert_header(content_type)
            .set_payload(payload),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["image"], first["image"]);
    assert_eq!(stored_files(ctx.media_root()).len(), 1);

    let (status, retrieved) = send_json(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/recipe/recipes/{id}/retrieve-image")),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retrieved, second);
}

#[rstest]
#[case("cake.jpeg", jpeg_bytes(), ".jpeg")]
#[case("CAKE.PNG", png_bytes(), ".png")]
#[case("cake", jpeg_bytes(), ".jpg")]
#[actix_web::test]
async fn upload_keeps_the_lowercased_file_extension(
    #[case] file_name: &str,
    #[case] bytes: Vec<u8>,
    #[case] suffix: &str,
) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let recipe = create(&app, &token, "/api/recipe/recipes", cake()).await;
    let id = id_of(&recipe);

    let (content_type, payload) = multipart_body("image", file_name, &bytes);
    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/recipe/recipes/{id}/upload-image"))
            .insert_header(content_type)
            .set_payload(payload),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "unexpected body {body}");
    let url = body["image"].as_str().expect("image url");
    assert!(url.ends_with(suffix), "{url} should end with {suffix}");
    let relative = url.trim_start_matches("/media/");
    assert!(ctx.media_root().join(relative).is_file());
}

#[rstest]
#[case("image", b"notimage".to_vec(), "Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
#[case("image", Vec::new(), "The submitted file is empty.")]
#[case("photo", png_bytes(), "No file was submitted.")]
#[actix_web::test]
async fn invalid_uploads_store_nothing(
    #[case] field: &str,
    #[case] bytes: Vec<u8>,
    #[case] message: &str,
) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let recipe = create(&app, &token, "/api/recipe/recipes", cake()).await;

    let (content_type, payload) = multipart_body(field, "file.png", &bytes);
    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/recipe/recipes/{}/upload-image", id_of(&recipe)))
            .insert_header(content_type)
            .set_payload(payload),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["image"][0], json!(message));
    assert!(stored_files(ctx.media_root()).is_empty());
}

#[actix_web::test]
async fn oversized_uploads_are_refused() {
    let ctx = TestContext::with_media(MediaSettings::new("/media/", 16));
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let recipe = create(&app, &token, "/api/recipe/recipes", cake()).await;

    let (content_type, payload) = multipart_body("image", "big.png", &png_bytes());
    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/recipe/recipes/{}/upload-image", id_of(&recipe)))
            .insert_header(content_type)
            .set_payload(payload),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["image"].is_array());
    assert!(stored_files(ctx.media_root()).is_empty());
}

#[actix_web::test]
async fn retrieve_image_is_null_before_upload() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;
    let recipe = create(&app, &token, "/api/recipe/recipes", cake()).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/recipe/recipes/{}/retrieve-image", id_of(&recipe)))
        .insert_header(token_header(&token))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body, json!({"id": id_of(&recipe), "image": null}));
}
