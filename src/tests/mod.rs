mod report;

use axum::{
    body::Body,
    http::{self, Request},
    response::Response,
};
use certportal_shared::account::Role;
use serde::{de::DeserializeOwned, Serialize};
use tower::util::ServiceExt;

/// Reset all static instances.
fn reset_all() {
    crate::account::INSTANCE.reset();
    crate::certificate::INSTANCE.reset();
    crate::upload::INSTANCE.reset();
}

/// A logged in account.
struct Session {
    account_id: u64,
    token: String,
}

/// Registers an account under `<user>@uabc.mx` with the given role
/// and logs it in.
fn push_account(user: &str, role: Role, password: &str) -> Session {
    use certportal_shared::account::handle::RegisterDescriptor;

    let mut account = crate::account::Account::new(&RegisterDescriptor {
        email: lettre::Address::new(user, "uabc.mx").unwrap(),
        name: user.to_owned(),
        password: password.to_owned(),
    })
    .unwrap();
    account.role = role;
    let account_id = account.id;
    let token = account.tokens.new_token(account_id, 0);
    crate::account::INSTANCE.push(account).unwrap();

    Session { account_id, token }
}

/// Sends a JSON body to the router, authenticated when `session` is given.
async fn post_json(path: &str, session: Option<&Session>, body: &impl Serialize) -> Response {
    post(
        path,
        session,
        mime::APPLICATION_JSON.as_ref(),
        serde_json::to_vec(body).unwrap(),
    )
    .await
}

async fn post(
    path: &str,
    session: Option<&Session>,
    content_type: &str,
    body: Vec<u8>,
) -> Response {
    let mut builder = Request::builder()
        .uri(path)
        .method("POST")
        .header(http::header::CONTENT_TYPE, content_type);
    if let Some(session) = session {
        builder = builder
            .header("AccountId", session.account_id)
            .header("Token", &session.token);
    }

    crate::router()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body())
        .await
        .unwrap()
        .to_vec()
}

async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
