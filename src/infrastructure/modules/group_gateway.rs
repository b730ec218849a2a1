//! Group membership lookups through the groups module's HTTP API.

use async_trait::async_trait;
use serde::Deserialize;

use super::client::{ModuleClient, ModuleError};
use crate::domain::services::GroupGateway;
use crate::domain::GroupRole;
use crate::shared::error::AppError;

#[derive(Debug, Deserialize)]
struct RoleBody {
    admin: bool,
}

pub struct HttpGroupGateway {
    client: ModuleClient,
}

impl HttpGroupGateway {
    pub fn new(client: ModuleClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GroupGateway for HttpGroupGateway {
    async fn user_role(&self, token: &str, group_id: i64) -> Result<Option<GroupRole>, AppError> {
        let path = format!("/api/v1/groups/{}/role", group_id);
        match self.client.get_json::<RoleBody>(&path, token).await {
            Ok(body) => Ok(Some(GroupRole::from_admin(body.admin))),
            Err(ModuleError::Status { status: 403 | 404, .. }) => Ok(None),
            Err(ModuleError::Status { status: 401, message }) => Err(AppError::Unauthorized(message)),
            Err(e) => Err(e.into()),
        }
    }
}
