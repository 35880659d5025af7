//! Tests for the tag and ingredient handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{TestContext, send_json, sign_up};

#[rstest]
#[case("/api/recipe/tags")]
#[case("/api/recipe/ingredients")]
#[actix_web::test]
async fn listing_requires_authentication(#[case] uri: &str) {
    let ctx = TestContext::new();
    let app = ctx.init().await;

    let request = actix_test::TestRequest::get().uri(uri).to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("/api/recipe/tags", "Vegan", "Dessert")]
#[case("/api/recipe/ingredients", "Kale", "Salt")]
#[actix_web::test]
async fn list_is_limited_to_the_caller_and_sorted_by_name_descending(
    #[case] uri: &str,
    #[case] first: &str,
    #[case] second: &str,
) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;

    for name in [first, second] {
        let (status, _) = send_json(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .set_json(json!({"name": name})),
            &alice,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(uri)
            .set_json(json!({"name": "Other"})),
        &bob,
    )
    .await;

    let (status, body) = send_json(&app, actix_test::TestRequest::get().uri(uri), &alice).await;

    assert_eq!(status, StatusCode::OK);
    let mut expected = vec![first, second];
    expected.sort_unstable_by(|a, b| b.cmp(a));
    let names: Vec<&str> = body
        .as_array()
        .expect("list body")
        .iter()
        .filter_map(|label| label["name"].as_str())
        .collect();
    assert_eq!(names, expected);
}

#[actix_web::test]
async fn create_returns_id_and_name() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/recipe/tags")
            .set_json(json!({"name": "Vegan"})),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().is_some_and(|id| id > 0));
    assert_eq!(body["name"], json!("Vegan"));
}

#[rstest]
#[case(json!({}), "This field is required.")]
#[case(json!({"name": ""}), "This field may not be blank.")]
#[case(json!({"name": "x".repeat(256)}), "Ensure this field has no more than 255 characters.")]
#[actix_web::test]
async fn create_rejects_invalid_names(#[case] payload: Value, #[case] message: &str) {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/recipe/ingredients")
            .set_json(payload),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["name"][0], json!(message));

    let (_, listed) = send_json(
        &app,
        actix_test::TestRequest::get().uri("/api/recipe/ingredients"),
        &token,
    )
    .await;
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    let ctx = TestContext::new();
    let app = ctx.init().await;
    let token = sign_up(&app, "alice@example.com").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/recipe/tags")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_request"));
    assert!(body["details"]["non_field_errors"].is_array());
}
