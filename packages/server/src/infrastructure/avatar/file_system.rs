//! ローカルディレクトリのファイルを使うアバター実装
//!
//! ディレクトリには `<unique id>.<拡張子>` という名前のファイルが置かれている想定です。
//! ファイルの中身は読まず、一覧と名前だけを使います。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{Avatar, AvatarError, Identity};

/// URL path under which the avatar directory is served
pub const DEFAULT_AVATAR_URL_PREFIX: &str = "/avatars";

/// ディレクトリ内のファイル名から URL を作る
#[derive(Debug, Clone)]
pub struct FileSystemAvatar {
    dir: PathBuf,
    url_prefix: String,
}

impl FileSystemAvatar {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_url_prefix(dir, DEFAULT_AVATAR_URL_PREFIX)
    }

    pub fn with_url_prefix(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// 一致するファイル名を探す（複数ある場合は名前順で最初のもの）
    ///
    /// ディレクトリが読めない場合は「一致なし」として扱う。
    async fn find_file_name(&self, unique_id: &str) -> Option<String> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot read avatar directory {:?}: {}", self.dir, e);
                return None;
            }
        };

        let mut matched: Option<String> = None;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("Error while listing {:?}: {}", self.dir, e);
                    break;
                }
            };

            match entry.file_type().await {
                Ok(file_type) if !file_type.is_dir() => {}
                _ => continue,
            }

            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let stem = Path::new(&file_name)
                .file_stem()
                .and_then(|stem| stem.to_str());
            if stem != Some(unique_id) {
                continue;
            }

            if matched.as_ref().is_none_or(|current| file_name < *current) {
                matched = Some(file_name);
            }
        }

        matched
    }
}

#[async_trait]
impl Avatar for FileSystemAvatar {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn avatar_url(&self, identity: &Identity) -> Result<String, AvatarError> {
        let unique_id = identity.unique_id().as_str();
        match self.find_file_name(unique_id).await {
            Some(file_name) => Ok(format!("{}/{}", self.url_prefix, file_name)),
            None => Err(AvatarError::NotFound(unique_id.to_string())),
        }
    }
}
