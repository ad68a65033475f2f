//! End-to-end behaviour of the client over an in-process transport

use bytes::Bytes;
use httpclient::http::{HeaderMap, HeaderValue, StatusCode};
use httpclient::{
    Body, Client, Error, FormValues, MultipartWriter, Request, Response, Result,
    multipart_fields, multipart_file, transport_fn, write_multipart, write_multiparts,
};
use multer::Multipart;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Request as seen by the transport, with the body fully read
#[derive(Debug, Clone)]
struct Captured {
    method: String,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

/// Client whose transport records each request and answers 200 with the
/// request body echoed back.
fn recording_client() -> (Client, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);

    let client = Client::builder()
        .header("X-Test", "test")
        .transport(transport_fn(move |request: Request| {
            let sink = Arc::clone(&sink);
            async move {
                let Request {
                    method,
                    url,
                    headers,
                    body,
                } = request;
                let body = body.collect().await?;
                sink.lock().unwrap().push(Captured {
                    method: method.to_string(),
                    url: url.to_string(),
                    headers: headers.clone(),
                    body: body.clone(),
                });
                Ok::<_, Error>(Response::new(StatusCode::OK, headers, url, Body::from(body)))
            }
        }))
        .build()
        .unwrap();

    (client, captured)
}

fn last(captured: &Arc<Mutex<Vec<Captured>>>) -> Captured {
    captured.lock().unwrap().last().cloned().unwrap()
}

#[derive(Debug, PartialEq, Eq)]
struct Part {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Vec<Part> {
    let boundary = multer::parse_boundary(content_type).unwrap();
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = Multipart::new(stream, boundary);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        parts.push(Part {
            name: field.name().unwrap_or_default().to_owned(),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(|mime| mime.to_string()),
            bytes: field.bytes().await.unwrap(),
        });
    }
    parts
}

#[tokio::test]
async fn get_form_merges_query_and_copies_default_headers() -> Result<()> {
    let (client, captured) = recording_client();

    client
        .get_form("http://host/test", &FormValues::from([("foo", "bar")]))
        .await?;

    let request = last(&captured);
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "http://host/test?foo=bar");
    assert_eq!(request.headers["x-test"], "test");
    assert!(request.body.is_empty());
    Ok(())
}

#[tokio::test]
async fn query_form_sends_data_in_body() -> Result<()> {
    let (client, captured) = recording_client();

    client
        .query_form("http://host/test", &FormValues::from([("foo", "bar")]))
        .await?;

    let request = last(&captured);
    assert_eq!(request.method, "QUERY");
    assert_eq!(request.url, "http://host/test");
    assert_eq!(
        request.headers["content-type"],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(request.body, "foo=bar");
    Ok(())
}

#[tokio::test]
async fn form_verbs_encode_every_value() -> Result<()> {
    let (client, captured) = recording_client();
    let data = FormValues::from([("tag", "a"), ("tag", "b c"), ("id", "1")]);

    client.post_form("http://host/", &data).await?;
    assert_eq!(last(&captured).method, "POST");
    client.put_form("http://host/", &data).await?;
    assert_eq!(last(&captured).method, "PUT");
    client.patch_form("http://host/", &data).await?;

    let request = last(&captured);
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.body, "id=1&tag=a&tag=b%20c");
    Ok(())
}

#[tokio::test]
async fn empty_verbs_send_no_body() -> Result<()> {
    let (client, captured) = recording_client();

    client.get("http://host/a").await?;
    client.delete("http://host/b").await?;
    client.head("http://host/c").await?;
    client.options("http://host/d").await?;

    let requests = captured.lock().unwrap().clone();
    let methods: Vec<_> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["GET", "DELETE", "HEAD", "OPTIONS"]);
    for request in &requests {
        assert!(request.body.is_empty());
        assert!(request.headers.get("content-type").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn json_round_trip() -> Result<()> {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    let (client, captured) = recording_client();
    let payload = Payload {
        name: "widget".into(),
        count: 3,
    };

    let response = client.post_json("http://host/items", &payload).await?;
    assert_eq!(response.content_type(), Some("application/json"));
    let echoed: Payload = response.json().await?;
    assert_eq!(echoed, payload);

    client.query_json("http://host/items", &payload).await?;
    assert_eq!(last(&captured).method, "QUERY");
    Ok(())
}

#[tokio::test]
async fn json_encoding_failure_never_reaches_transport() {
    let client = Client::from_transport(transport_fn(|_: Request| async move {
        Err::<Response, _>(Error::Internal("transport must not be called".into()))
    }));

    let mut map = std::collections::HashMap::new();
    map.insert(vec![1u8], "byte string keys are not valid JSON object keys");

    let err = client.put_json("http://host/", &map).await.unwrap_err();
    assert!(matches!(err, Error::Encoding(_)));
}

#[tokio::test]
async fn post_multipart_streams_fields_and_file() -> Result<()> {
    let (client, captured) = recording_client();

    let write = write_multiparts([
        multipart_fields(FormValues::from([("foo", "bar")])),
        multipart_file("file", "file.txt", io::Cursor::new("file content")),
    ]);
    tokio::time::timeout(TIMEOUT, client.post_multipart("http://host/upload", write))
        .await
        .expect("multipart request timed out")?;

    let request = last(&captured);
    let content_type = request.headers["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(request.headers["x-test"], "test");

    let parts = parse_multipart(&content_type, request.body).await;
    assert_eq!(
        parts,
        [
            Part {
                name: "foo".into(),
                file_name: None,
                content_type: None,
                bytes: Bytes::from_static(b"bar"),
            },
            Part {
                name: "file".into(),
                file_name: Some("file.txt".into()),
                content_type: Some("application/octet-stream".into()),
                bytes: Bytes::from_static(b"file content"),
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn multipart_part_count_matches_fields_and_files() -> Result<()> {
    let (client, captured) = recording_client();

    let fields: FormValues = (0..4).map(|i| (format!("field{i}"), i.to_string())).collect();
    let mut writers = vec![multipart_fields(fields)];
    for i in 0..3 {
        writers.push(multipart_file(
            format!("file{i}"),
            format!("file{i}.bin"),
            io::Cursor::new(vec![i as u8; 64 * 1024]),
        ));
    }

    tokio::time::timeout(
        TIMEOUT,
        client.put_multipart("http://host/upload", write_multiparts(writers)),
    )
    .await
    .expect("multipart request timed out")?;

    let request = last(&captured);
    assert_eq!(request.method, "PUT");
    let content_type = request.headers["content-type"].to_str().unwrap().to_owned();
    let parts = parse_multipart(&content_type, request.body).await;

    assert_eq!(parts.len(), 7);
    assert_eq!(parts[4].file_name.as_deref(), Some("file0.bin"));
    assert_eq!(parts[6].bytes.len(), 64 * 1024);
    Ok(())
}

#[tokio::test]
async fn empty_multipart_is_a_valid_body() -> Result<()> {
    let (client, captured) = recording_client();

    client
        .patch_multipart("http://host/", write_multipart(|_| Ok(())))
        .await?;

    let request = last(&captured);
    let content_type = request.headers["content-type"].to_str().unwrap().to_owned();
    let boundary = multer::parse_boundary(&content_type).unwrap();
    assert_eq!(request.body, format!("--{boundary}--\r\n"));
    Ok(())
}

#[tokio::test]
async fn multipart_callback_error_is_returned() {
    let (client, captured) = recording_client();

    let write = write_multiparts([
        multipart_fields(FormValues::from([("a", "1"), ("b", "2")])),
        write_multipart(|_| Err(Error::Internal("part 3 failed".into()))),
        multipart_file("never", "never.txt", io::empty()),
    ]);
    let err = tokio::time::timeout(TIMEOUT, client.post_multipart("http://host/", write))
        .await
        .expect("multipart request timed out")
        .unwrap_err();

    assert!(matches!(err, Error::Internal(msg) if msg == "part 3 failed"));

    // The transport still saw a complete body holding the parts written so far
    let request = last(&captured);
    let content_type = request.headers["content-type"].to_str().unwrap().to_owned();
    let parts = parse_multipart(&content_type, request.body).await;
    assert_eq!(parts.len(), 2);
}

/// Reader that never runs out, so only a broken pipe can stop the producer
struct Endless;

impl Read for Endless {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(b'x');
        Ok(buf.len())
    }
}

#[tokio::test]
async fn transport_failure_wins_and_releases_producer() {
    let client = Client::from_transport(transport_fn(|request: Request| async move {
        let mut stream = request.body.into_stream();
        // Read a little, then give up as a failed connection would
        let _ = futures_util::StreamExt::next(&mut stream).await;
        Err::<Response, _>(Error::transport(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }));

    let write = multipart_file("file", "big.bin", Endless);
    let err = tokio::time::timeout(TIMEOUT, client.post_multipart("http://host/", write))
        .await
        .expect("producer was not released after transport failure")
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn transport_that_never_reads_body_does_not_deadlock() {
    let client = Client::from_transport(transport_fn(|_: Request| async move {
        Err::<Response, _>(Error::transport("dial failed"))
    }));

    let err = tokio::time::timeout(
        TIMEOUT,
        client.query_multipart("http://host/", multipart_file("f", "f", Endless)),
    )
    .await
    .expect("deadlocked")
    .unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn non_success_status_is_not_an_error() -> Result<()> {
    let client = Client::from_transport(transport_fn(|request: Request| async move {
        Ok(Response::new(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            request.url,
            Body::from("try later"),
        ))
    }));

    let response = client.get("http://host/").await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.is_server_error());
    assert_eq!(response.text().await?, "try later");
    Ok(())
}

#[tokio::test]
async fn malformed_address_fails_before_transport() {
    let client = Client::from_transport(transport_fn(|_: Request| async move {
        Err::<Response, _>(Error::Internal("transport must not be called".into()))
    }));

    let err = client
        .post_multipart("::nope", write_multipart(|_| Ok(())))
        .await
        .unwrap_err();
    assert!(err.is_invalid_request());

    let err = client.get_form("", &FormValues::new()).await.unwrap_err();
    assert!(err.is_invalid_request());
}

#[tokio::test]
async fn middleware_sees_content_type_and_can_rewrite() -> Result<()> {
    let (mut client, captured) = recording_client();
    client.set_middleware(|mut request: Request| {
        assert!(request.content_type().is_some());
        request
            .headers
            .insert("authorization", HeaderValue::from_static("Bearer token"));
        Ok(request)
    });

    client
        .post("http://host/", "text/plain", "hello")
        .await?;

    let request = last(&captured);
    assert_eq!(request.headers["authorization"], "Bearer token");
    assert_eq!(request.headers["content-type"], "text/plain");
    Ok(())
}

#[tokio::test]
async fn middleware_rejection_skips_multipart_producer() {
    let (mut client, captured) = recording_client();
    let ran = Arc::new(Mutex::new(false));
    client.set_middleware(|_| Err("not allowed".into()));

    let flag = Arc::clone(&ran);
    let write = write_multipart(move |w: &mut MultipartWriter| {
        *flag.lock().unwrap() = true;
        w.write_field("a", "b")
    });
    let err = client.post_multipart("http://host/", write).await.unwrap_err();

    assert!(matches!(err, Error::Middleware(_)));
    assert!(captured.lock().unwrap().is_empty());
    assert!(!*ran.lock().unwrap());
}

#[tokio::test]
async fn concurrent_requests_share_one_client() -> Result<()> {
    let (client, captured) = recording_client();

    let calls = (0..8).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .post_multipart(
                    &format!("http://host/{i}"),
                    multipart_fields(FormValues::from([("i", i.to_string())])),
                )
                .await
        })
    });
    for call in calls {
        call.await.unwrap()?;
    }

    assert_eq!(captured.lock().unwrap().len(), 8);
    Ok(())
}
