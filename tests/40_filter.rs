mod common;

use anyhow::Result;
use reqwest::StatusCode;
use realty_api::auth::Role;

#[tokio::test]
async fn malformed_limit_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Agent)?;
    let res = client
        .get(format!("{}/api/clients?limit=abc", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_sort_field_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Agent)?;
    let res = client
        .get(format!(
            "{}/api/clients?sort_by=password_hash",
            server.base_url
        ))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_path_id_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Agent)?;
    let res = client
        .get(format!("{}/api/clients/not-a-uuid", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
