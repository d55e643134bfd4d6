use crate::layout::{LayoutDelays, LayoutInitOptions};
use crate::workflow::DEFAULT_MAX_PARTY_SIZE;
use shared::error::{AppError, AppResult, ErrorCode};
use std::path::PathBuf;
use std::time::Duration;

/// 引擎配置 - 预订引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | STORE_FILE | booking.redb | 存储文件名 (相对 WORK_DIR) |
/// | SNAP_INCREMENT | 20 | 桌台拖动吸附步长 |
/// | LAYOUT_SAVE_DEBOUNCE_MS | 120 | 布局保存防抖(毫秒) |
/// | POSITION_SAVE_DEBOUNCE_MS | 60 | 拖动位置保存防抖(毫秒) |
/// | SEED_TABLES_IF_EMPTY | true | 存储为空时写入默认布局 |
/// | MERGE_MISSING_DEFAULT_TABLES | false | 合并缺失的默认桌台 |
/// | MAX_PARTY_SIZE | 8 | 单次预订最大人数 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志目录，设置后按天滚动写文件 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/tmp/booking MAX_PARTY_SIZE=6 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 工作目录，存放存储文件
    pub work_dir: String,
    /// redb 文件名
    pub store_file: String,
    /// 吸附步长，0 表示不吸附
    pub snap_increment: f64,
    pub layout_save_debounce_ms: u64,
    pub position_save_debounce_ms: u64,
    pub seed_tables_if_empty: bool,
    pub merge_missing_default_tables: bool,
    pub max_party_size: u32,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    /// 内置默认值，不读取环境变量
    pub fn defaults() -> Self {
        Self {
            work_dir: "./data".into(),
            store_file: "booking.redb".into(),
            snap_increment: crate::layout::DEFAULT_SNAP_INCREMENT,
            layout_save_debounce_ms: 120,
            position_save_debounce_ms: 60,
            seed_tables_if_empty: true,
            merge_missing_default_tables: false,
            max_party_size: DEFAULT_MAX_PARTY_SIZE,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let d = Self::defaults();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or(d.work_dir),
            store_file: std::env::var("STORE_FILE").unwrap_or(d.store_file),
            snap_increment: env_or("SNAP_INCREMENT", d.snap_increment),
            layout_save_debounce_ms: env_or("LAYOUT_SAVE_DEBOUNCE_MS", d.layout_save_debounce_ms),
            position_save_debounce_ms: env_or(
                "POSITION_SAVE_DEBOUNCE_MS",
                d.position_save_debounce_ms,
            ),
            seed_tables_if_empty: env_or("SEED_TABLES_IF_EMPTY", d.seed_tables_if_empty),
            merge_missing_default_tables: env_or(
                "MERGE_MISSING_DEFAULT_TABLES",
                d.merge_missing_default_tables,
            ),
            max_party_size: env_or("MAX_PARTY_SIZE", d.max_party_size),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(d.log_level),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景，其余字段取内置默认值，不受环境变量影响
    pub fn with_overrides(work_dir: impl Into<String>, max_party_size: u32) -> Self {
        Self {
            work_dir: work_dir.into(),
            max_party_size,
            ..Self::defaults()
        }
    }

    /// 存储文件完整路径
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.store_file)
    }

    pub fn layout_delays(&self) -> LayoutDelays {
        LayoutDelays {
            edit: Duration::from_millis(self.layout_save_debounce_ms),
            position: Duration::from_millis(self.position_save_debounce_ms),
        }
    }

    pub fn layout_init_options(&self) -> LayoutInitOptions {
        LayoutInitOptions {
            seed_if_empty: self.seed_tables_if_empty,
            merge_missing_defaults: self.merge_missing_default_tables,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if !self.snap_increment.is_finite() || self.snap_increment < 0.0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Invalid snap increment {}", self.snap_increment),
            )
            .with_detail("field", "SNAP_INCREMENT"));
        }
        if self.max_party_size == 0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "Max party size must be at least 1",
            )
            .with_detail("field", "MAX_PARTY_SIZE"));
        }
        if self.store_file.trim().is_empty() {
            return Err(AppError::with_message(ErrorCode::RequiredField, "Store file name is empty")
                .with_detail("field", "STORE_FILE"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
