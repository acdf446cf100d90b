mod common;

use anyhow::Result;
use reqwest::StatusCode;
use realty_api::auth::Role;

#[tokio::test]
async fn support_cannot_delete_users() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Support)?;
    let res = client
        .delete(format!(
            "{}/api/users/{}",
            server.base_url,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(
        body["message"],
        "You do not have permission to perform this action"
    );
    Ok(())
}

#[tokio::test]
async fn agent_cannot_list_users() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Agent)?;
    let res = client
        .get(format!("{}/api/users", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn agent_cannot_export_clients() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::session_token(Role::Agent)?;
    let res = client
        .get(format!("{}/api/clients/export", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
