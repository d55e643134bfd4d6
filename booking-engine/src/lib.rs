//! Booking Engine - 餐厅桌台预订引擎
//!
//! # 架构概述
//!
//! Drives the table booking flow of a restaurant front end:
//!
//! - **预订流程** (`workflow`): table → seats → people → food → confirmation
//! - **订单行** (`cart`): shared cart and per-person pre-orders in one book
//! - **桌台布局** (`layout`): floor plan records with debounced saves
//! - **订单历史** (`history`): one entry per confirmed booking
//! - **结账** (`checkout`): draft order totals and bill split
//! - **存储** (`storage`): key-value port with a redb adapter
//!
//! # 模块结构
//!
//! ```text
//! booking-engine/src/
//! ├── core/          # 配置、会话门面
//! ├── workflow/      # 预订状态机
//! ├── cart/          # 订单行 (购物车 + 个人点餐)
//! ├── catalog.rs     # 菜单
//! ├── layout/        # 桌台布局 + 防抖保存
//! ├── flow.rs        # 步骤只读视图
//! ├── history.rs     # 订单历史
//! ├── checkout/      # 草稿订单汇总、分账
//! ├── storage.rs     # 持久化端口
//! ├── money.rs       # 金额计算
//! ├── outcome.rs     # 命令结果
//! └── utils/         # 日志
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod core;
pub mod flow;
pub mod history;
pub mod layout;
pub mod money;
pub mod outcome;
pub mod storage;
pub mod utils;
pub mod workflow;

// Re-export 公共类型
pub use cart::OrderBook;
pub use catalog::Catalog;
pub use core::{BookingSession, CartView, EngineConfig};
pub use flow::FlowView;
pub use history::{HistorySort, OrderHistory};
pub use layout::{LayoutSink, LayoutStore};
pub use outcome::{CommandOutcome, IgnoredReason};
pub use storage::{KeyValueStore, RedbStore, SessionPersistence, StorageError};
pub use workflow::{BookingState, BookingWorkflow};

// Re-export unified error types from shared
pub use shared::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
