#[macro_use]
extern crate rocket;

pub mod auth;
pub mod error;
pub mod request_logger;
pub mod routes;
pub mod users;

use std::sync::{Arc, Once};

use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};

use crate::auth::{AuthConfig, AuthState};
use crate::request_logger::RequestLogger;
use crate::users::model::NewUser;
use crate::users::store::{MemoryUserStore, SharedUserStore, UserStore};

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Users present at first boot, mirroring the seed data of the service this
/// API fronts. `admin` can never be claimed through registration, so the
/// admin account only exists by seeding.
const SEED_USERS: &[(&str, &str, &str)] = &[("bob", "1234", "admin"), ("sue", "1234", "student")];

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(cors)
        .attach(AdHoc::try_on_ignite("Auth State", |rocket| async move {
            let config = AuthConfig::from_env();
            match AuthState::from_config(config) {
                Ok(state) => Ok(rocket.manage(state)),
                Err(err) => {
                    log::error!("failed to initialize auth services: {}", err);
                    Err(rocket)
                }
            }
        }))
        .attach(AdHoc::try_on_ignite("Seed User Store", |rocket| async move {
            let Some(auth_state) = rocket.state::<AuthState>().cloned() else {
                log::error!("auth state unavailable, cannot seed users");
                return Err(rocket);
            };

            let store = MemoryUserStore::new();
            for (username, password, role_name) in SEED_USERS {
                let password_hash = match auth_state.password_service.hash_password(password) {
                    Ok(hash) => hash,
                    Err(err) => {
                        log::error!("failed to hash seed credentials: {}", err);
                        return Err(rocket);
                    }
                };

                if let Err(err) = store
                    .create(NewUser {
                        username: username.to_string(),
                        password_hash,
                        role_name: role_name.to_string(),
                    })
                    .await
                {
                    log::error!("failed to seed user store: {}", err);
                    return Err(rocket);
                }
            }

            log::info!("seeded user store with {} users", SEED_USERS.len());
            Ok(rocket.manage(Arc::new(store) as SharedUserStore))
        }))
        .register(
            "/",
            catchers![auth::catchers::unauthorized, auth::catchers::forbidden],
        )
        .mount(
            "/api",
            openapi_get_routes![
                routes::health::health_check,
                auth::routes::register,
                auth::routes::login,
                routes::users::list_users,
                routes::users::get_user,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Roles API", "../../openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use std::sync::Arc;

    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};

    use crate::auth::config::DEFAULT_TOKEN_TTL_SECS;
    use crate::auth::{AuthConfig, AuthState, PasswordService};
    use crate::users::model::{NewUser, User};
    use crate::users::store::{MemoryUserStore, SharedUserStore, UserStore};

    pub const TEST_JWT_SECRET: &str = "roles-api-test-secret";

    /// Auth configuration with a fixed secret so tests can mint and decode
    /// tokens out-of-band.
    pub fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn test_auth_state() -> AuthState {
        AuthState::from_config(test_auth_config()).expect("auth services")
    }

    /// Seeding helpers for the in-memory user store.
    pub struct TestFixtures {
        store: SharedUserStore,
        passwords: PasswordService,
    }

    impl TestFixtures {
        pub fn new(store: SharedUserStore) -> Self {
            Self {
                store,
                passwords: PasswordService::new().expect("password service"),
            }
        }

        /// Hash the password and insert a user record, returning it.
        pub async fn insert_user(&self, username: &str, password: &str, role_name: &str) -> User {
            let password_hash = self
                .passwords
                .hash_password(password)
                .expect("hash password");
            self.store
                .create(NewUser {
                    username: username.to_string(),
                    password_hash,
                    role_name: role_name.to_string(),
                })
                .await
                .expect("insert user")
        }
    }

    /// Builder for Rocket instances tailored for integration tests: random
    /// port, logging off, catchers registered, auth state and user store
    /// managed (defaults provided when not set explicitly).
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        auth_state: Option<AuthState>,
        store: Option<SharedUserStore>,
    }

    impl TestRocketBuilder {
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                auth_state: None,
                store: None,
            }
        }

        /// Mount routes under `/api`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api".to_string(), routes));
            self
        }

        pub fn manage_auth_state(mut self, state: AuthState) -> Self {
            self.auth_state = Some(state);
            self
        }

        pub fn manage_user_store(mut self, store: SharedUserStore) -> Self {
            self.store = Some(store);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment).register(
                "/",
                catchers![
                    crate::auth::catchers::unauthorized,
                    crate::auth::catchers::forbidden
                ],
            );

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            let auth_state = self.auth_state.unwrap_or_else(test_auth_state);
            let store = self
                .store
                .unwrap_or_else(|| Arc::new(MemoryUserStore::new()) as SharedUserStore);

            rocket.manage(auth_state).manage(store)
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
