//! Gravatar を使うアバター実装（常に成功する最後の手段）

use async_trait::async_trait;

use crate::domain::{Avatar, AvatarError, Identity};

pub const GRAVATAR_BASE_URL: &str = "//www.gravatar.com/avatar/";

/// unique id（Gravatar のハッシュ）から URL を組み立てる
#[derive(Debug, Clone)]
pub struct GravatarAvatar {
    base_url: String,
}

impl GravatarAvatar {
    pub fn new() -> Self {
        Self::with_base_url(GRAVATAR_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }
}

impl Default for GravatarAvatar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Avatar for GravatarAvatar {
    fn name(&self) -> &'static str {
        "gravatar"
    }

    async fn avatar_url(&self, identity: &Identity) -> Result<String, AvatarError> {
        Ok(format!("{}{}", self.base_url, identity.unique_id()))
    }
}
