//! `httpmock` routes standing in for the AWS JSON endpoints.

#![allow(dead_code)]

use httpmock::Mock;
use httpmock::prelude::*;

/// Answers every `POST /` carrying `X-Amz-Target: <target>` with `body`.
pub fn aws_route<'a>(server: &'a MockServer, target: &str, status: u16, body: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST).path("/").header("x-amz-target", target);
        then.status(status)
            .header("content-type", "application/x-amz-json-1.1")
            .body(body);
    })
}

/// Like [`aws_route`], but only for requests whose JSON body contains `partial`.
pub fn aws_route_matching<'a>(
    server: &'a MockServer,
    target: &str,
    partial: &str,
    body: &str,
) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .header("x-amz-target", target)
            .json_body_partial(partial);
        then.status(200)
            .header("content-type", "application/x-amz-json-1.1")
            .body(body);
    })
}
