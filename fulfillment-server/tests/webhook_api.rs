//! HTTP 接口集成测试

mod common;

use common::{get, post_json, post_raw, router, say, test_state, webhook_body};
use http::StatusCode;
use serde_json::json;

const ADD: &str = "order.add - context: ongoing-order";
const REMOVE: &str = "order.remove - context: ongoing-order";
const COMPLETE: &str = "order.complete - context: ongoing-order";
const CANCEL: &str = "order.cancel - context: cancel-order";
const TRACK: &str = "track.order - context: ongoing-tracking";

#[tokio::test]
async fn full_order_conversation() {
    let (_dir, state) = test_state().await;
    let app = router(&state);

    let text = say(
        &app,
        ADD,
        json!({"food-item": ["Pav Bhaji", "Mango Lassi"], "number": [2.0, 1.0]}),
        "abc",
    )
    .await;
    assert_eq!(
        text,
        "So far, you have: 2 Pav Bhaji, 1 Mango Lassi. Do you need anything else?"
    );

    let text = say(&app, REMOVE, json!({"food-item": ["mango lassi"]}), "abc").await;
    assert_eq!(
        text,
        "Removed Mango Lassi from your order! Here is what remains in your order: 2 Pav Bhaji."
    );

    let text = say(&app, COMPLETE, json!({}), "abc").await;
    assert_eq!(
        text,
        "Got it! Your order is being processed. Order ID: #1. Total: $12.00"
    );
    assert_eq!(
        state.finalizer.wait(1).await,
        Some(fulfillment_server::core::JobStatus::Persisted)
    );

    let text = say(&app, TRACK, json!({"order_id": 1.0}), "other").await;
    assert_eq!(text, "The order status for order ID #1 is: in progress.");

    let text = say(&app, CANCEL, json!({"number": "1"}), "other").await;
    assert_eq!(text, "✅ Order #1 has been successfully canceled.");

    let text = say(&app, TRACK, json!({"number": 1}), "other").await;
    assert_eq!(
        text,
        "No order found with order ID #1. Please check your order ID and try again."
    );
}

#[tokio::test]
async fn complete_without_session_order() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let text = say(&app, COMPLETE, json!({}), "nobody").await;
    assert_eq!(
        text,
        "I'm having trouble finding your order. Please start a new one."
    );
}

#[tokio::test]
async fn complete_with_only_unknown_items() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    say(&app, ADD, json!({"food-item": ["Sushi"], "number": [1]}), "s").await;
    let text = say(&app, COMPLETE, json!({}), "s").await;
    assert_eq!(
        text,
        "Error calculating order total. Please check your items and try again."
    );
    assert!(state.sessions.get("s").await.is_none());
}

#[tokio::test]
async fn mismatched_lists_ask_for_clarity() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let text = say(
        &app,
        ADD,
        json!({"food-item": ["Pizza", "Samosa"], "number": [1]}),
        "s",
    )
    .await;
    assert_eq!(text, "Please specify food items and quantities clearly.");
}

#[tokio::test]
async fn missing_contexts_mean_no_session() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let body = json!({
        "queryResult": {
            "intent": {"displayName": ADD},
            "parameters": {"food-item": ["Pizza"], "number": [1]},
            "outputContexts": []
        }
    });
    let (status, reply) = post_json(&app, "/", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["fulfillmentText"],
        "Session not found. Please start a new order."
    );
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn unknown_intent_is_not_understood() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let text = say(&app, "Default Welcome Intent", json!({}), "s").await;
    assert_eq!(text, "I didn't understand that request.");
}

#[tokio::test]
async fn malformed_bodies_still_answer_200() {
    let (_dir, state) = test_state().await;
    let app = router(&state);

    let (status, reply) = post_raw(&app, "/", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["fulfillmentText"],
        "An unexpected error occurred. Please try again later."
    );

    let (status, reply) = post_json(&app, "/", &json!({"queryResult": {}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["fulfillmentText"],
        "Missing field in request: queryResult.intent."
    );
}

#[tokio::test]
async fn wrongly_typed_fields_get_the_generic_reply() {
    let (_dir, state) = test_state().await;
    let app = router(&state);

    let mut body = webhook_body(ADD, json!({}), "s");
    body["queryResult"]["intent"]["displayName"] = json!(42);
    let (status, reply) = post_json(&app, "/", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["fulfillmentText"],
        "An unexpected error occurred. Please try again later."
    );

    let body = webhook_body(ADD, json!([1]), "s");
    let (status, reply) = post_json(&app, "/", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["fulfillmentText"],
        "An unexpected error occurred. Please try again later."
    );
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn blank_item_names_keep_quantities_aligned() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let text = say(
        &app,
        ADD,
        json!({"food-item": ["Pizza", ""], "number": [1, 2]}),
        "s",
    )
    .await;
    assert_eq!(text, "So far, you have: 1 Pizza. Do you need anything else?");

    let text = say(
        &app,
        ADD,
        json!({"food-item": ["", "Samosa"], "number": [4, 3]}),
        "s",
    )
    .await;
    assert_eq!(
        text,
        "So far, you have: 1 Pizza, 3 Samosa. Do you need anything else?"
    );
}

#[tokio::test]
async fn reservation_round_trip_over_http() {
    let (_dir, state) = test_state().await;
    let app = router(&state);

    let text = say(
        &app,
        "book_reservation",
        json!({
            "given-name": "Ayesha",
            "date": "2025-03-14T12:00:00+05:30",
            "time": "2025-03-13T19:30:00+05:30"
        }),
        "r",
    )
    .await;
    assert_eq!(text, "Reservation confirmed! Your reservation ID is 1.");

    let text = say(&app, "check_reservation", json!({"id": 1.0}), "r").await;
    assert_eq!(
        text,
        "Your reservation is on 2025-03-14 at 19:30:00, under the name Ayesha."
    );

    let text = say(&app, "cancel_reservation", json!({"id": "1"}), "r").await;
    assert_eq!(text, "Your reservation has been canceled successfully.");

    let text = say(&app, "cancel_reservation", json!({"id": "1"}), "r").await;
    assert_eq!(text, "No reservation found with the provided ID.");

    let text = say(&app, "book_reservation", json!({"given-name": "Ayesha"}), "r").await;
    assert_eq!(
        text,
        "Missing reservation details. Please provide your name, the date and the time."
    );
}

#[tokio::test]
async fn register_and_login() {
    let (_dir, state) = test_state().await;
    let app = router(&state);
    let user = json!({"username": "meera", "email": "Meera@Example.com", "password": "pw"});

    let (status, reply) = post_json(&app, "/register", &user).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply, json!({"message": "User registered successfully"}));

    let (status, reply) = post_json(&app, "/register", &user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        reply,
        json!({"error": "Email already exists or failed to register"})
    );

    let login = json!({"email": "meera@example.com", "password": "pw"});
    let (status, reply) = post_json(&app, "/login", &login).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply,
        json!({"message": "Login successful", "username": "meera"})
    );

    let bad = json!({"email": "meera@example.com", "password": "nope"});
    let (status, reply) = post_json(&app, "/login", &bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply, json!({"error": "Invalid credentials"}));

    let (status, reply) = post_json(&app, "/register", &json!({"email": "x@y.z"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply, json!({"error": "username is required"}));
}

#[tokio::test]
async fn welcome_and_health() {
    let (_dir, state) = test_state().await;
    let app = router(&state);

    let (status, reply) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({"message": "Welcome to the chatbot API!"}));

    let (status, reply) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["database"], "ok");
    assert_eq!(reply["service"], "fulfillment-server");
}

#[test]
fn webhook_body_embeds_session() {
    let body = webhook_body(ADD, json!({}), "xyz");
    let name = body["queryResult"]["outputContexts"][0]["name"]
        .as_str()
        .unwrap();
    assert!(name.contains("/sessions/xyz/contexts/"));
}
