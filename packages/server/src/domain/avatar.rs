//! Avatar trait 定義とフォールバックチェーン
//!
//! アバター URL の取得方法（認証プロバイダ、ローカルファイル、Gravatar など）を
//! `Avatar` trait で抽象化します。具体的な実装は Infrastructure 層が提供します。
//!
//! `AvatarResolver` は複数の `Avatar` を優先順位順に試し、最初に成功した結果を返します。
//! 順序はデプロイ時の設定であり、Resolver 自身は順序について何も判断しません。

use std::sync::Arc;

use async_trait::async_trait;

use super::{entity::Identity, error::AvatarError};

/// アバター URL を取得する戦略
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Avatar: Send + Sync {
    /// 戦略名（ログ出力用）
    fn name(&self) -> &'static str;

    /// 参加者のアバター URL を返す
    ///
    /// 取得できない場合は `AvatarError::NotFound` を返す。
    /// 読み取り専用の I/O 以外の副作用を持ってはならない。
    async fn avatar_url(&self, identity: &Identity) -> Result<String, AvatarError>;
}

/// 優先順位付きのアバター取得チェーン
///
/// 起動時に一度だけ構築され、全ての接続から読み取り専用で共有されます。
pub struct AvatarResolver {
    strategies: Vec<Arc<dyn Avatar>>,
}

impl AvatarResolver {
    /// 新しい AvatarResolver を作成（`strategies` の順に試行する）
    pub fn new(strategies: Vec<Arc<dyn Avatar>>) -> Self {
        Self { strategies }
    }

    /// チェーンに含まれる戦略名を優先順に返す
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 戦略を順に試し、最初に成功した URL を返す
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - 最初に成功した戦略の URL
    /// * `Err(AvatarError::NotFound)` - 全ての戦略が失敗した
    pub async fn resolve(&self, identity: &Identity) -> Result<String, AvatarError> {
        for strategy in &self.strategies {
            match strategy.avatar_url(identity).await {
                Ok(url) => {
                    tracing::debug!(
                        "Avatar for '{}' resolved by '{}': {}",
                        identity.unique_id(),
                        strategy.name(),
                        url
                    );
                    return Ok(url);
                }
                Err(e) => {
                    tracing::trace!("Avatar strategy '{}' failed: {}", strategy.name(), e);
                }
            }
        }

        Err(AvatarError::NotFound(identity.unique_id().to_string()))
    }

    /// `resolve` と同じだが、取得できない場合は空文字列を返す
    pub async fn resolve_or_empty(&self, identity: &Identity) -> String {
        match self.resolve(identity).await {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("{}; sending message without avatar", e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl Avatar for AvatarResolver {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn avatar_url(&self, identity: &Identity) -> Result<String, AvatarError> {
        self.resolve(identity).await
    }
}
