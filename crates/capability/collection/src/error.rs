use plc_storage::StorageError;

/// 采集链路错误。
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// 配置更新参数非法（不做任何修改）
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("registry error: {0}")]
    Registry(String),
}

impl From<StorageError> for CollectionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
