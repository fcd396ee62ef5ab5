use std::io::Cursor;

use outpost::http::response::{Body, Response, ResponseError, StatusCode};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Continue.as_u16(), 100);
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::Found.as_u16(), 302);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::HttpVersionNotSupported.as_u16(), 505);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::Found.reason_phrase(), "Found");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::RequestUriTooLong.reason_phrase(), "Request-URI Too Long");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_new_response_defaults() {
    let response = Response::new();

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.headers.is_empty());
    assert_eq!(response.content(), Some(""));
    assert!(!response.is_streaming());
}

#[test]
fn test_echo_accumulates_text() {
    let mut response = Response::new();
    response.echo("You requested ");
    response.echo("foo");
    response.echo(42);

    assert_eq!(response.content(), Some("You requested foo42"));
}

#[test]
fn test_set_content_replaces_text() {
    let mut response = Response::new();
    response.echo("draft");
    response.set_content("final");

    assert_eq!(response.content(), Some("final"));
}

#[test]
fn test_raw_content_wins_over_echo() {
    let mut response = Response::new();
    response.set_raw_content(vec![1, 2, 3]);
    response.echo("ignored");

    assert!(matches!(response.body(), Body::Bytes(bytes) if bytes == &[1, 2, 3]));
    assert_eq!(response.content(), None);
}

#[test]
fn test_set_status() {
    let mut response = Response::new();
    response.set_status(StatusCode::Found);

    assert_eq!(response.status, StatusCode::Found);
}

#[test]
fn test_stream_with_zero_length_is_rejected() {
    let mut response = Response::new();
    let result = response.set_stream(0, Box::new(Cursor::new(Vec::new())));

    assert!(matches!(result, Err(ResponseError::InvalidStreamState(_))));
    assert!(!response.is_streaming());
}

#[test]
fn test_second_stream_is_rejected() {
    let mut response = Response::new();
    response
        .set_stream(5, Box::new(Cursor::new(b"hello".to_vec())))
        .unwrap();

    let again = response.set_stream(5, Box::new(Cursor::new(b"again".to_vec())));
    assert!(matches!(again, Err(ResponseError::InvalidStreamState(_))));
    assert!(response.is_streaming());
}

#[test]
fn test_content_mutators_are_inert_once_streaming() {
    let mut response = Response::new();
    response
        .set_stream(5, Box::new(Cursor::new(b"hello".to_vec())))
        .unwrap();

    response.echo("text");
    response.set_content("text");
    response.set_raw_content(vec![1]);

    assert!(response.is_streaming());
    assert!(matches!(response.body(), Body::Stream { len: 5, .. }));
}

#[test]
fn test_not_found_helper() {
    let response = Response::not_found();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.content(), Some("404 Not Found"));
}

#[test]
fn test_internal_error_helper() {
    let response = Response::internal_error();

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.content(), Some("500 Internal Server Error"));
}
