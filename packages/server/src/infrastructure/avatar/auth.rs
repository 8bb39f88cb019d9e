//! 認証プロバイダが提供するアバター URL を使う実装

use async_trait::async_trait;

use crate::domain::{Avatar, AvatarError, Identity};

/// 認証プロバイダの URL をそのまま返す（I/O なし）
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthAvatar;

#[async_trait]
impl Avatar for AuthAvatar {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn avatar_url(&self, identity: &Identity) -> Result<String, AvatarError> {
        identity
            .avatar_url()
            .map(str::to_string)
            .ok_or_else(|| AvatarError::NotFound(identity.unique_id().to_string()))
    }
}
