use super::*;
use serde_json::json;

#[test]
fn decode_body_empty_is_none() {
    assert_eq!(decode_body(b""), None);
    assert_eq!(decode_body(b"  \n"), None);
}

#[test]
fn decode_body_json_object() {
    assert_eq!(decode_body(br#"{"success":true}"#), Some(json!({ "success": true })));
}

#[test]
fn decode_body_plain_text_becomes_string() {
    assert_eq!(decode_body(b"auth failed"), Some(json!("auth failed")));
}

#[test]
fn decode_body_json_string_is_unquoted() {
    assert_eq!(decode_body(br#""quoted""#), Some(json!("quoted")));
}

#[test]
fn raw_response_success_range() {
    assert!(RawResponse::new(200, None).is_success());
    assert!(RawResponse::new(204, None).is_success());
    assert!(!RawResponse::new(199, None).is_success());
    assert!(!RawResponse::new(301, None).is_success());
    assert!(!RawResponse::new(401, None).is_success());
}

#[test]
fn header_lookup_is_case_insensitive() {
    let req = OutgoingRequest {
        method: Method::GET,
        url: "http://x/".into(),
        query: Vec::new(),
        headers: vec![("Authorization".into(), "tok".into())],
        body: None,
    };
    assert_eq!(req.header("authorization"), Some("tok"));
    assert_eq!(req.header("x-missing"), None);
}

#[tokio::test]
async fn reqwest_relative_url_is_config_error() {
    let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
    let req = OutgoingRequest {
        method: Method::GET,
        url: "/api/user/list".into(),
        query: Vec::new(),
        headers: Vec::new(),
        body: None,
    };
    let err = transport.send(req).await.unwrap_err();
    assert!(matches!(err, TransportError::Config(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn reqwest_invalid_header_is_config_error() {
    let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
    let req = OutgoingRequest {
        method: Method::GET,
        url: "http://127.0.0.1:9/".into(),
        query: Vec::new(),
        headers: vec![("Authorization".into(), "bad\ntoken".into())],
        body: None,
    };
    let err = transport.send(req).await.unwrap_err();
    assert!(matches!(err, TransportError::Config(_)), "unexpected: {err:?}");
}
