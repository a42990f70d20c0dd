//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"alice","password":"Abcde1","confirmPassword":"Abcde1"}
//! POST /api/v1/login    {"username":"alice","password":"Abcde1"}
//! POST /api/v1/logout
//! GET  /api/v1/session
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::RegisterAccount;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::blocking_cancelled;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Authenticated-user payload returned by login, register, and the session
/// probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
    /// Degradation notice from the users-table read, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Create an account. Does not establish a session; clients log in
/// afterwards.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let accounts = state.accounts.clone();
    let request = payload.into_inner();
    let account = web::block(move || {
        accounts.register(RegisterAccount {
            username: request.username,
            password: request.password,
            confirm_password: request.confirm_password,
        })
    })
    .await
    .map_err(blocking_cancelled)??;

    Ok(HttpResponse::Created().json(SessionUser {
        username: account.username.to_string(),
        warning: account.warning,
    }))
}

/// Authenticate and establish a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let accounts = state.accounts.clone();
    let request = payload.into_inner();
    let account = web::block(move || accounts.login(&request.username, &request.password))
        .await
        .map_err(blocking_cancelled)??;

    session.persist_user(&account.username)?;
    Ok(HttpResponse::Ok().json(SessionUser {
        username: account.username.to_string(),
        warning: account.warning,
    }))
}

/// End the session. Always succeeds, logged in or not.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Report the logged-in username, or `401` without a session.
#[get("/session")]
pub async fn current_session(session: SessionContext) -> ApiResult<web::Json<SessionUser>> {
    let username = session.require_user()?;
    Ok(web::Json(SessionUser {
        username: username.to_string(),
        warning: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts_service::LOGIN_FAILED;
    use crate::inbound::http::test_utils::{test_session_middleware, test_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(test_state())
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(logout)
                    .service(current_session),
            )
    }

    fn register_body(username: &str, password: &str) -> Value {
        json!({
            "username": username,
            "password": password,
            "confirmPassword": password,
        })
    }

    #[actix_web::test]
    async fn register_login_session_flow() {
        let app = actix_test::init_service(test_app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("Alice", "Abcde1"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["username"], "alice");
        assert!(created.get("warning").is_none(), "clean read has no warning");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "ALICE", "password": "Abcde1" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/session")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["username"], "alice");
    }

    #[actix_web::test]
    async fn session_probe_without_cookie_is_unauthorised() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/session")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn weak_password_is_a_bad_request() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("alice", "abcdef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "validation_failed");
    }

    #[actix_web::test]
    async fn duplicate_username_conflicts() {
        let app = actix_test::init_service(test_app()).await;
        for (username, expected) in [("Alice", StatusCode::CREATED), ("alice", StatusCode::CONFLICT)]
        {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/register")
                    .set_json(register_body(username, "Abcde1"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn failed_login_uses_the_generic_message() {
        let app = actix_test::init_service(test_app()).await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("alice", "Abcde1"))
                .to_request(),
        )
        .await;

        for body in [
            json!({ "username": "alice", "password": "Wrong99" }),
            json!({ "username": "nobody", "password": "Abcde1" }),
        ] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/login")
                    .set_json(body)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            let payload: Value = actix_test::read_body_json(res).await;
            assert_eq!(payload["message"], LOGIN_FAILED);
        }
    }

    #[actix_web::test]
    async fn logout_ends_the_session() {
        let app = actix_test::init_service(test_app()).await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("alice", "Abcde1"))
                .to_request(),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "alice", "password": "Abcde1" }))
                .to_request(),
        )
        .await;
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let cleared = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("removal cookie set")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/session")
                .cookie(cleared)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
