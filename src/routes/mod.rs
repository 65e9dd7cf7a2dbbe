//! HTTP route handlers outside the auth module, annotated with `#[openapi]`
//! so `rocket_okapi` can derive an OpenAPI document automatically.

pub mod health;
pub mod users;
