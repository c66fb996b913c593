use spindle::http::response::{Response, ResponseBuilder, StatusCode};
use spindle::http::writer::{serialize_head, serialize_response};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::Teapot.as_u16(), 418);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
    assert_eq!(StatusCode::Teapot.reason_phrase(), "I'm A Teapot");
}

#[test]
fn test_status_code_display() {
    assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
}

#[test]
fn test_response_builder_has_no_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.len(), 1);
    assert!(!response.headers.contains_key("Content-Length"));
}

#[test]
fn test_error_page_names_status() {
    let response = Response::error_page(StatusCode::NotFound);
    let body = String::from_utf8(response.body).unwrap();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.headers.get("Content-Type").unwrap(), "text/html");
    assert!(body.contains("404 Not Found"));
}

#[test]
fn test_serialize_head() {
    let head = serialize_head(StatusCode::Ok, [("Content-Type", "text/html")]);

    assert_eq!(head, b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n");
}

#[test]
fn test_serialize_error_response() {
    let bytes = serialize_response(&Response::error_page(StatusCode::BadRequest));
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.0 400 Bad Request\r\nContent-Type: text/html\r\n\r\n"));
    assert!(text.ends_with("<h1>400 Bad Request</h1>\r\n"));
}
