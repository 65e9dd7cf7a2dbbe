#[rocket::launch]
fn rocket() -> _ {
    roles_api::rocket()
}
