//! Integration tests for the batch verification provider using wiremock.

use leadscout_core::{canonicalize, CanonicalNumber, ReachabilityStatus, Region};
use leadscout_reachability::{ReachabilityError, ReachabilityValidator, WhapiValidator};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn number(raw: &str) -> CanonicalNumber {
    canonicalize(raw, Region::Brazil).expect("fixture should canonicalize")
}

fn validator(base_url: &str, token: Option<&str>) -> WhapiValidator {
    WhapiValidator::new(reqwest::Client::new(), base_url, token.map(str::to_string))
}

fn mobile_numbers(n: u32) -> Vec<CanonicalNumber> {
    (0..n).map(|i| number(&format!("119{:08}", 80_000_000 + i))).collect()
}

#[tokio::test]
async fn statuses_are_mapped_back_to_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(serde_json::json!({
            "blocking": "wait",
            "force_check": true,
            "contacts": ["554133221100", "5541998887766"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "contacts": [
                { "input": "+554133221100", "status": "invalid" },
                { "input": "5541998887766", "status": "valid", "wa_id": "5541998887766" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixed = number("(41) 3322-1100");
    let mobile = number("(41) 99888-7766");
    let unlisted = number("(11) 3344-5566");
    let validator = validator(&server.uri(), Some("secret"));

    let result = validator
        .validate(&[fixed.clone(), mobile.clone()])
        .await
        .unwrap();
    assert_eq!(result[&fixed], ReachabilityStatus::Invalid);
    assert_eq!(result[&mobile], ReachabilityStatus::Valid);
    assert!(!result.contains_key(&unlisted));
}

#[tokio::test]
async fn numbers_missing_from_the_response_are_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "phone": "554133221100", "is_whatsapp": true }]
        })))
        .mount(&server)
        .await;

    let fixed = number("(41) 3322-1100");
    let mobile = number("(41) 99888-7766");
    let result = validator(&server.uri(), Some("t"))
        .validate(&[fixed.clone(), mobile.clone()])
        .await
        .unwrap();

    assert_eq!(result[&fixed], ReachabilityStatus::Valid);
    assert_eq!(result[&mobile], ReachabilityStatus::Unknown);
}

#[tokio::test]
async fn large_inputs_are_sent_in_chunks_of_one_hundred() {
    let server = MockServer::start().await;
    let empty = ResponseTemplate::new(200).set_body_json(serde_json::json!({ "contacts": [] }));
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(empty)
        .expect(2)
        .mount(&server)
        .await;

    let numbers = mobile_numbers(150);
    let result = validator(&server.uri(), Some("t"))
        .validate(&numbers)
        .await
        .unwrap();
    assert_eq!(result.len(), 150);

    let requests = server.received_requests().await.expect("recording enabled");
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["contacts"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![100, 50]);
}

#[tokio::test]
async fn upstream_error_is_surfaced_with_body_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"bad token\"}"))
        .mount(&server)
        .await;

    let err = validator(&server.uri(), Some("t"))
        .validate(&[number("(41) 3322-1100")])
        .await
        .unwrap_err();
    let ReachabilityError::Upstream { status, body } = &err else {
        panic!("expected an upstream error, got: {err:?}");
    };
    assert_eq!(*status, 401);
    assert!(body.contains("bad token"));
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = validator(&server.uri(), None)
        .validate(&[number("(41) 3322-1100")])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReachabilityError::MissingCredential(ref var) if var == "WHAPI_TOKEN"),
        "got: {err:?}"
    );
}
