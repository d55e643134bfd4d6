//! 核心模块 - 引擎配置与会话门面
//!
//! # 模块结构
//!
//! - [`EngineConfig`] - 引擎配置
//! - [`BookingSession`] - 预订会话 (状态机 + 订单行 + 布局 + 历史 + 持久化)

pub mod config;
pub mod session;

pub use config::EngineConfig;
pub use session::{BookingSession, CartView};
