//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::path::Path;
use std::sync::Arc;

use actix_session::{SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::domain::{AccountsService, RestaurantService, ReviewService};
use crate::inbound::http::accounts::{current_session, login, logout, register};
use crate::inbound::http::images::{ImageRoot, serve_image};
use crate::inbound::http::restaurants::{map_view, register_restaurant, restaurant_details};
use crate::inbound::http::reviews::submit_review;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::images::JpegImageStore;
use crate::outbound::persistence::{
    CsvRestaurantRepository, CsvReviewRepository, CsvTables, CsvUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

/// Everything one `App` instance needs; cloned into the server factory.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub image_root: web::Data<ImageRoot>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Assemble the application: session middleware, `/api/v1` scope, tracing.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        image_root,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_session)
        .service(register_restaurant)
        .service(map_view)
        .service(restaurant_details)
        .service(submit_review)
        .service(serve_image);

    App::new()
        .app_data(http_state)
        .app_data(image_root)
        .wrap(Trace)
        .service(api)
}

/// Wire the CSV-backed services for the given data and image directories,
/// creating both directories (and header-only dataset files) when absent.
pub fn build_dependencies(
    data_dir: &Path,
    image_dir: &Path,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> std::io::Result<AppDependencies> {
    let tables = CsvTables::new(data_dir);
    tables.bootstrap()?;
    let image_store = JpegImageStore::new(image_dir);
    image_store.bootstrap()?;

    let users = Arc::new(CsvUserRepository::new(tables.clone()));
    let restaurants = Arc::new(CsvRestaurantRepository::new(tables.clone()));
    let reviews = Arc::new(CsvReviewRepository::new(tables));
    let images = Arc::new(image_store);

    let accounts = Arc::new(AccountsService::new(users, Arc::new(Argon2PasswordHasher)));
    let restaurant_service = Arc::new(RestaurantService::new(
        restaurants.clone(),
        reviews.clone(),
        images,
    ));
    let review_service = Arc::new(ReviewService::new(restaurants, reviews));

    Ok(AppDependencies {
        http_state: web::Data::new(HttpState::new(
            accounts,
            restaurant_service,
            review_service,
        )),
        image_root: web::Data::new(ImageRoot(image_dir.to_path_buf())),
        key,
        cookie_secure,
        same_site,
    })
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when creating the data directories or
/// binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        data_dir,
        image_dir,
    } = config;

    let deps = build_dependencies(&data_dir, &image_dir, key, cookie_secure, same_site)?;
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
