use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::{Request, StatusCode},
    response::Response,
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}

/// Build a multipart form with one `files` field per entry of `files`, which
/// holds (file name, content type, contents).
pub(crate) async fn must_make_multipart(uri: &str, files: &[(&str, &str, &str)]) -> Multipart {
    let boundary = "MY_BOUNDARY123456789";

    let mut lines: Vec<String> = Vec::new();

    for (file_name, content_type, contents) in files {
        lines.push(format!("--{boundary}"));
        lines.push(format!(
            "Content-Disposition: form-data; name=\"files\"; filename=\"{file_name}\";"
        ));
        lines.push(format!("Content-Type: {content_type}"));
        lines.push(String::new());
        lines.push((*contents).to_owned());
    }

    lines.push(format!("--{boundary}--"));

    let data = lines.join("\r\n").into_bytes();

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(data))
        .unwrap();

    Multipart::from_request(request, &()).await.unwrap()
}
