#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use serde_json::{json, Value};

    use crate::tests::support::{body_bytes, id_of, spawn_app, TestApp};

    const BOUNDARY: &str = "friendly-test-boundary";

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(w, h, |x, y| Rgb([(x * 3 % 255) as u8, (y * 7 % 255) as u8, 90]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", field, file_name).as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn upload(app: &TestApp, token: Option<&str>, body: Vec<u8>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/image")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = app.send(builder.body(Body::from(body)).unwrap()).await;
        let status = response.status();
        let bytes = body_bytes(response).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn upload_png(app: &TestApp, token: &str) -> String {
        let (status, body) = upload(app, Some(token), multipart_body("image", "pic.png", "image/png", &png(32, 24))).await;
        assert_eq!(status, StatusCode::CREATED);
        id_of(&body["data"], "image_id")
    }

    #[tokio::test]
    async fn test_upload_and_fetch_resized() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;

        let bytes = png(32, 24);
        let (status, body) =
            upload(&app, Some(&token), multipart_body("image", "pic.png", "image/png", &bytes)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["size"], bytes.len());
        assert_eq!(body["data"]["content_type"], "image/png");
        let id = id_of(&body["data"], "image_id");

        let req = Request::builder()
            .uri(format!("/api/image/{}/64", id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.send(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
        let jpeg = body_bytes(response).await;
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;

        let (status, body) =
            upload(&app, Some(&token), multipart_body("image", "notes.txt", "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");

        let (status, _) = upload(&app, Some(&token), multipart_body("file", "pic.png", "image/png", &png(4, 4))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = upload(&app, None, multipart_body("image", "pic.png", "image/png", &png(4, 4))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.get(&format!("/api/image/{}/32", uuid::Uuid::new_v4()), &token).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[cfg(not(feature = "heic"))]
    #[tokio::test]
    async fn test_heic_upload_is_refused_without_decoder() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;

        for (name, content_type) in [("pic.heic", "image/heic"), ("pic.heif", "image/heif"), ("pic.HEIC", "image/jpeg")] {
            let (status, body) =
                upload(&app, Some(&token), multipart_body("image", name, content_type, b"ftypheic")).await;
            assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE, "{} accepted", name);
            assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
        }
    }

    #[tokio::test]
    async fn test_resolution_must_be_in_range() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let id = upload_png(&app, &token).await;

        assert_eq!(app.get(&format!("/api/image/{}/0", id), &token).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(app.get(&format!("/api/image/{}/100000", id), &token).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(app.get(&format!("/api/image/{}/abc", id), &token).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_image() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let id = upload_png(&app, &token).await;

        let (status, body) = app.delete(&format!("/api/image/{}", id), &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(app.delete(&format!("/api/image/{}", id), &token).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get(&format!("/api/image/{}/16", id), &token).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_replaced_friend_image_is_removed() {
        let app = spawn_app().await;
        let token = app.register("ann@example.com").await;
        let first = upload_png(&app, &token).await;
        let second = upload_png(&app, &token).await;

        let (_, body) = app
            .post("/api/friend", &token, json!({ "friend": { "first_name": "Lea", "image_id": first } }))
            .await;
        let friend_id = id_of(&body, "friend_id");

        let (status, _) = app
            .put(&format!("/api/friend/{}", friend_id), &token, json!({ "friend": { "image_id": second } }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.get(&format!("/api/image/{}/16", first), &token).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get(&format!("/api/image/{}/16", second), &token).await.0, StatusCode::OK);

        // Deleting the friend takes its image along
        app.delete(&format!("/api/friend/{}", friend_id), &token).await;
        assert_eq!(app.get(&format!("/api/image/{}/16", second), &token).await.0, StatusCode::NOT_FOUND);
    }
}
