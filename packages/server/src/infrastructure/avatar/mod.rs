//! アバター取得戦略の実装
//!
//! - `auth`: 認証プロバイダが提供する URL
//! - `file`: ローカルディレクトリのファイル
//! - `gravatar`: Gravatar（常に成功）

pub mod auth;
pub mod file_system;
pub mod gravatar;

use std::{path::Path, sync::Arc};

use clap::ValueEnum;

use crate::domain::{Avatar, AvatarResolver};

pub use auth::AuthAvatar;
pub use file_system::{DEFAULT_AVATAR_URL_PREFIX, FileSystemAvatar};
pub use gravatar::{GRAVATAR_BASE_URL, GravatarAvatar};

/// Selectable avatar strategy, in the order given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AvatarKind {
    /// URL supplied by the auth provider
    Auth,
    /// File named after the user id in the avatar directory
    File,
    /// Gravatar URL derived from the user id
    Gravatar,
}

/// Default chain: auth provider, then local file, then Gravatar
pub const DEFAULT_AVATAR_CHAIN: [AvatarKind; 3] =
    [AvatarKind::Auth, AvatarKind::File, AvatarKind::Gravatar];

/// Build the avatar chain in the given order
pub fn build_resolver(chain: &[AvatarKind], avatar_dir: &Path) -> AvatarResolver {
    let strategies: Vec<Arc<dyn Avatar>> = chain
        .iter()
        .map(|kind| -> Arc<dyn Avatar> {
            match kind {
                AvatarKind::Auth => Arc::new(AuthAvatar),
                AvatarKind::File => Arc::new(FileSystemAvatar::new(avatar_dir)),
                AvatarKind::Gravatar => Arc::new(GravatarAvatar::new()),
            }
        })
        .collect();

    AvatarResolver::new(strategies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, Identity, UniqueId};

    fn create_test_identity(avatar_url: Option<&str>) -> Identity {
        Identity::new(
            UniqueId::new("u42".to_string()).unwrap(),
            DisplayName::new("Alice".to_string()).unwrap(),
            avatar_url.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_default_chain_prefers_local_file_over_gravatar() {
        // テスト項目: 認証 URL がなく、ローカルファイルがある場合はファイルの URL が返される
        // given (前提条件): avatars/ に u42.png がある
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("u42.png"), b"").unwrap();
        let resolver = build_resolver(&DEFAULT_AVATAR_CHAIN, dir.path());

        // when (操作):
        let result = resolver.resolve(&create_test_identity(None)).await;

        // then (期待する結果):
        assert_eq!(result, Ok("/avatars/u42.png".to_string()));
    }

    #[tokio::test]
    async fn test_default_chain_falls_back_to_gravatar() {
        // テスト項目: ローカルファイルもない場合は Gravatar の URL が返される（NotFound にはならない）
        // given (前提条件): avatars/ は空
        let dir = tempfile::tempdir().unwrap();
        let resolver = build_resolver(&DEFAULT_AVATAR_CHAIN, dir.path());

        // when (操作):
        let result = resolver.resolve(&create_test_identity(None)).await;

        // then (期待する結果):
        assert_eq!(result, Ok("//www.gravatar.com/avatar/u42".to_string()));
    }

    #[tokio::test]
    async fn test_default_chain_prefers_auth_provider() {
        // テスト項目: 認証 URL がある場合は、ファイルがあっても認証 URL が優先される
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("u42.png"), b"").unwrap();
        let resolver = build_resolver(&DEFAULT_AVATAR_CHAIN, dir.path());

        // when (操作):
        let result = resolver
            .resolve(&create_test_identity(Some("https://example.com/a.png")))
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok("https://example.com/a.png".to_string()));
    }

    #[tokio::test]
    async fn test_chain_order_is_configuration() {
        // テスト項目: 順序を入れ替えると優先される戦略も入れ替わる
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("u42.png"), b"").unwrap();
        let resolver = build_resolver(&[AvatarKind::Gravatar, AvatarKind::File], dir.path());

        // when (操作):
        let result = resolver.resolve(&create_test_identity(None)).await;

        // then (期待する結果):
        assert_eq!(resolver.strategy_names(), vec!["gravatar", "file"]);
        assert_eq!(result, Ok("//www.gravatar.com/avatar/u42".to_string()));
    }
}
