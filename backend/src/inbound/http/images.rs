//! Stored image delivery.
//!
//! ```text
//! GET /api/v1/images/{filename}
//! ```
//!
//! Serves the normalised JPEGs written by image intake. File names are
//! opaque UUIDs; anything that looks like a path is rejected outright.

use std::path::PathBuf;

use actix_web::{HttpResponse, get, web};

use crate::domain::DomainError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::blocking_cancelled;

/// Directory stored images are served from.
#[derive(Debug, Clone)]
pub struct ImageRoot(pub PathBuf);

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.contains('\0')
}

/// Serve one stored image by file name.
#[get("/images/{filename}")]
pub async fn serve_image(
    root: web::Data<ImageRoot>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename = path.into_inner();
    if !is_plain_file_name(&filename) {
        return Err(DomainError::not_found(format!(
            "Image '{filename}' not found."
        )));
    }

    let full_path = root.0.join(&filename);
    let bytes = web::block(move || std::fs::read(full_path))
        .await
        .map_err(blocking_cancelled)?
        .map_err(|_| DomainError::not_found(format!("Image '{filename}' not found.")))?;

    Ok(HttpResponse::Ok().content_type("image/jpeg").body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use tempfile::TempDir;

    fn test_app(
        dir: &TempDir,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(ImageRoot(dir.path().to_path_buf())))
            .service(web::scope("/api/v1").service(serve_image))
    }

    #[actix_web::test]
    async fn serves_stored_bytes_as_jpeg() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("abc.jpg"), b"jpeg-bytes").expect("seed image");
        let app = actix_test::init_service(test_app(&dir)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/images/abc.jpg")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("content-type")
                .expect("content type")
                .to_str()
                .expect("ascii"),
            "image/jpeg"
        );
        let body = actix_test::read_body(res).await;
        assert_eq!(body, b"jpeg-bytes".as_slice());
    }

    #[actix_web::test]
    async fn missing_image_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let app = actix_test::init_service(test_app(&dir)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/images/missing.jpg")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn traversal_attempts_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("abc.jpg"), b"jpeg-bytes").expect("seed image");
        let app = actix_test::init_service(test_app(&dir)).await;

        for uri in [
            "/api/v1/images/..%2Fabc.jpg",
            "/api/v1/images/%2e%2e%2fetc%2fpasswd",
            "/api/v1/images/..%5Cabc.jpg",
        ] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "uri: {uri}");
        }
    }
}
