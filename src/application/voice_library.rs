//! Voice Library - 音色目录扫描、加载与缓存
//!
//! 磁盘约定（只读）:
//! `voices/<id>/<id>.onnx` (模型) + `voices/<id>/<id>.onnx.json` (配置)
//!
//! 缓存生命周期: 进程启动时创建，首次成功加载后写入，
//! 不过期、不淘汰。部署的音色集合小且有限时可接受。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::application::error::ApplicationError;
use crate::application::ports::{TtsEnginePort, VoiceHandle};
use crate::domain::VoiceId;

/// 模型文件扩展名
pub const MODEL_EXT: &str = "onnx";
/// 伴随配置文件扩展名
pub const CONFIG_EXT: &str = "onnx.json";

/// 音色库
///
/// 进程级共享。模型缓存用 DashMap 支撑并发读；
/// 冷加载按音色标识互斥，保证同一音色最多加载一次。
pub struct VoiceLibrary {
    root: PathBuf,
    engine: Arc<dyn TtsEnginePort>,
    models: DashMap<VoiceId, Arc<dyn VoiceHandle>>,
    load_locks: DashMap<VoiceId, Arc<Mutex<()>>>,
}

impl VoiceLibrary {
    pub fn new(root: impl Into<PathBuf>, engine: Arc<dyn TtsEnginePort>) -> Self {
        Self {
            root: root.into(),
            engine,
            models: DashMap::new(),
            load_locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn model_path(&self, id: &VoiceId) -> PathBuf {
        self.root
            .join(id.as_str())
            .join(format!("{}.{}", id.as_str(), MODEL_EXT))
    }

    fn config_path(&self, id: &VoiceId) -> PathBuf {
        self.root
            .join(id.as_str())
            .join(format!("{}.{}", id.as_str(), CONFIG_EXT))
    }

    /// 扫描 voices 根目录，列出可用音色
    ///
    /// 子目录 `<name>` 含有 `<name>.onnx` 才算可用。
    /// 根目录不存在时返回空集而不是错误。
    pub async fn list_voices(&self) -> Result<Vec<String>, ApplicationError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!(root = %self.root.display(), error = %e, "Failed to open voices directory");
                return Err(ApplicationError::Internal(
                    "Failed to scan voices directory".to_string(),
                ));
            }
        };

        let mut voices = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(root = %self.root.display(), error = %e, "Failed to read voices directory entry");
                    return Err(ApplicationError::Internal(
                        "Failed to scan voices directory".to_string(),
                    ));
                }
            };

            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };

            let model_file = entry.path().join(format!("{}.{}", name, MODEL_EXT));
            if tokio::fs::try_exists(&model_file).await.unwrap_or(false) {
                voices.push(name);
            }
        }

        voices.sort();
        Ok(voices)
    }

    /// 加载音色模型（幂等）
    ///
    /// 缓存命中直接返回句柄，不访问磁盘。
    /// 未命中时校验模型文件存在后调用引擎加载并写入缓存。
    pub async fn load(&self, id: &VoiceId) -> Result<Arc<dyn VoiceHandle>, ApplicationError> {
        if let Some(handle) = self.models.get(id) {
            tracing::debug!(voice = %id, "Voice served from cache");
            return Ok(handle.clone());
        }

        let model_path = self.model_path(id);
        let config_path = self.config_path(id);

        // 存在性检查先于取锁: 不为不存在的音色名留下锁表项，
        // 否则任意未知标识都会让锁表无限增长
        if !tokio::fs::try_exists(&model_path).await.unwrap_or(false) {
            tracing::warn!(voice = %id, model = %model_path.display(), "Voice model file not found");
            return Err(ApplicationError::VoiceNotFound(id.to_string()));
        }

        // 按音色加锁，避免同一个冷模型被并发重复加载
        let lock = self
            .load_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let _guard = lock.lock().await;

        if let Some(handle) = self.models.get(id) {
            tracing::debug!(voice = %id, "Voice loaded concurrently, served from cache");
            return Ok(handle.clone());
        }

        tracing::info!(
            voice = %id,
            model = %model_path.display(),
            config = %config_path.display(),
            "Loading voice model"
        );

        let handle = self
            .engine
            .load_model(&model_path, &config_path)
            .await
            .map_err(|e| {
                tracing::error!(voice = %id, error = %e, "Voice model load failed");
                ApplicationError::from(e)
            })?;

        self.models.insert(id.clone(), handle.clone());
        tracing::info!(voice = %id, "Voice model loaded");

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::tts::FakeTtsEngine;
    use std::fs;

    fn install_voice(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.onnx", name)), b"model").unwrap();
        fs::write(dir.join(format!("{}.onnx.json", name)), b"{}").unwrap();
    }

    #[tokio::test]
    async fn test_list_voices_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let library = VoiceLibrary::new(tmp.path().join("no-such-dir"), Arc::new(FakeTtsEngine::new()));

        let voices = library.list_voices().await.unwrap();
        assert!(voices.is_empty());
    }

    #[tokio::test]
    async fn test_list_voices_requires_model_file() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        // 缺少模型文件的目录不计入
        fs::create_dir_all(tmp.path().join("bruno")).unwrap();
        // 普通文件不计入
        fs::write(tmp.path().join("stray.txt"), b"x").unwrap();

        let library = VoiceLibrary::new(tmp.path(), Arc::new(FakeTtsEngine::new()));
        let voices = library.list_voices().await.unwrap();
        assert_eq!(voices, vec!["alba".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_model_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeTtsEngine::new());
        let library = VoiceLibrary::new(tmp.path(), engine.clone());

        // err() 而不是 unwrap_err(): 成功值 Arc<dyn VoiceHandle> 没有 Debug
        let err = library
            .load(&VoiceId::new("ghost").unwrap())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApplicationError::VoiceNotFound(_)));
        // 模型文件缺失时不应触碰引擎
        assert_eq!(engine.load_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_loads_do_not_accumulate_locks() {
        let tmp = tempfile::tempdir().unwrap();
        let library = VoiceLibrary::new(tmp.path(), Arc::new(FakeTtsEngine::new()));

        // 每次用不同的未知标识，锁表不应随之增长
        for i in 0..32 {
            let err = library
                .load(&VoiceId::new(format!("ghost-{}", i)).unwrap())
                .await
                .err()
                .unwrap();
            assert!(matches!(err, ApplicationError::VoiceNotFound(_)));
        }

        assert_eq!(library.load_locks.len(), 0);
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        let engine = Arc::new(FakeTtsEngine::new());
        let library = VoiceLibrary::new(tmp.path(), engine.clone());

        let id = VoiceId::new("alba").unwrap();
        library.load(&id).await.unwrap();
        library.load(&id).await.unwrap();

        assert_eq!(engine.load_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_cold_load_happens_once() {
        let tmp = tempfile::tempdir().unwrap();
        install_voice(tmp.path(), "alba");
        let engine = Arc::new(FakeTtsEngine::new());
        let library = Arc::new(VoiceLibrary::new(tmp.path(), engine.clone()));

        let id = VoiceId::new("alba").unwrap();
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let library = library.clone();
                let id = id.clone();
                tokio::spawn(async move { library.load(&id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(engine.load_calls(), 1);
    }
}
