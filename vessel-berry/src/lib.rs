#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 基于三维重建得到的血管树 (及可选的体素掩膜), 计算肝脏血管网络的形态学参数.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 输入的血管树必须是合法的有根树. 加载时会完整校验结构, 非法输入返回错误而不是 panic.
//! 2. 各计算步骤之间有严格的先后依赖. 单独调用某一步骤前, 需确保其前置属性已经计算,
//!   否则返回 [`MissingPropertyError`]. 完整流程请使用 [`Pipeline`].
//!
//! # 开发计划
//!
//! ### 血管树存储结构 ✅
//!
//! 节点和边存放在 arena 中, 通过稳定索引互相引用; 父边在构建时确定.
//! 先序遍历结果在构建时缓存.
//!
//! 实现位于 `vessel-berry/src/dag`.
//!
//! ### 边的几何描述 ✅
//!
//! 质心, 端点切向 (加权平均), 分叉角, 扭曲度.
//!
//! 1. 分叉角计算前将点积截断到 `[-1, 1]`. ✅
//! 2. 弦长为 0 时扭曲度记为 [`Tortuosity::DegenerateChord`], 而不是无穷大. ✅
//!
//! 实现位于 `vessel-berry/src/descriptor.rs`.
//!
//! ### 代数划分 ✅
//!
//! 根据分叉角与半径比例判断子边是否延续父边.
//!
//! 实现位于 `vessel-berry/src/generation.rs`.
//!
//! ### 间质距离 ✅
//!
//! 每条边到下游最近末端的最短质心路径长度. 自底向上计算.
//!
//! 实现位于 `vessel-berry/src/interstitial.rs`.
//!
//! ### 整体统计量 ✅
//!
//! 血管条数, 总长, 平均长度, 填充体积, 分叉指数.
//!
//! 实现位于 `vessel-berry/src/aggregate.rs`.
//!
//! ### 二维投影, 血管密度, lacunarity ✅
//!
//! 1. 基于 `nalgebra` 特征分解的 PCA 投影. ✅
//! 2. 像素正方形角点的凸包 (`geo`). ✅
//! 3. 积分图实现的多尺度盒计数. ✅
//!
//! 实现位于 `vessel-berry/src/projection`.
//!
//! ### 样本目录批处理 ✅
//!
//! 实现位于 `vessel-berry/src/dataset`.
//!
//! ### 全部递归改为显式栈 ✅
//!
//! 任意深度的树都不会耗尽调用栈.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 三维实向量.
pub type Vec3 = [f64; 3];

mod geom;

pub mod aggregate;
pub mod config;
pub mod consts;
pub mod dag;
pub mod dataset;
pub mod descriptor;
pub mod error;
pub mod generation;
pub mod interstitial;
pub mod pipeline;
pub mod prelude;
pub mod projection;

pub use config::MorphConfig;
pub use dag::{Dag, Edge, EdgeId, EdgeProps, GraphProps, Node, NodeId, Tortuosity};
pub use error::{
    ConfigError, GraphLoadError, MissingPropertyError, MorphError, MorphResult, SaveError,
    StructureError,
};
pub use generation::GenerationRule;
pub use pipeline::Pipeline;
pub use projection::Projection;
