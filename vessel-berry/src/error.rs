//! 运行时错误.

use std::fmt;

use ndarray_npy::ReadNpyError;
use thiserror::Error;

use crate::dag::{EdgeId, NodeId};
use crate::Idx3d;

/// 血管树结构非法. 加载时检测, 一旦出现即放弃整棵树.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum StructureError {
    /// 没有任何节点.
    #[error("tree has no node")]
    Empty,

    /// 根节点索引越界.
    #[error("root index {0} is out of range")]
    RootOutOfRange(usize),

    /// 边的端点索引越界.
    #[error("edge #{edge} refers to missing node #{node}")]
    NodeOutOfRange {
        /// 边索引.
        edge: usize,
        /// 越界的节点索引.
        node: usize,
    },

    /// 根节点存在入边.
    #[error("root node has incoming edge #{0}")]
    RootHasParent(usize),

    /// 非根节点存在多条入边.
    #[error("node #{0} has more than one incoming edge")]
    MultipleParents(usize),

    /// 节点无法从根节点到达 (存在环或不连通).
    #[error("node #{0} is not reachable from the root")]
    Unreachable(usize),

    /// 两个节点坐标相同.
    #[error("duplicate node coordinates {0:?}")]
    DuplicateCoords(Idx3d),

    /// 边不包含任何体素.
    #[error("edge #{0} has no voxel")]
    EmptyVoxels(usize),

    /// 边的输入标量非有限或为负数.
    #[error("edge #{edge} has invalid `{field}`")]
    InvalidScalar {
        /// 边索引.
        edge: usize,
        /// 字段名.
        field: &'static str,
    },

    /// 边已记录的分代为 0. 分代从 1 开始计数.
    #[error("edge #{0} has generation 0")]
    ZeroGeneration(usize),
}

/// 加载血管树或三维重建文件失败. 该错误是致命的, 不做部分恢复.
#[derive(Debug, Error)]
pub enum GraphLoadError {
    /// 底层 I/O 错误.
    #[error("could not read graph file: {0}")]
    Io(#[from] std::io::Error),

    /// 文件内容无法解码.
    #[error("could not decode graph file: {0}")]
    Decode(#[from] bincode::Error),

    /// npy 文件读取错误.
    #[error("could not read reconstruction: {0}")]
    Npy(#[from] ReadNpyError),

    /// 解码成功, 但树结构非法.
    #[error("invalid graph structure: {0}")]
    Structure(#[from] StructureError),
}

/// 写回血管树文件失败.
#[derive(Debug, Error)]
pub enum SaveError {
    /// 底层 I/O 错误.
    #[error("could not write graph file: {0}")]
    Io(#[from] std::io::Error),

    /// 编码错误.
    #[error("could not encode graph: {0}")]
    Encode(#[from] bincode::Error),
}

/// 缺失属性的所属实体.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// 节点.
    Node(NodeId),
    /// 边.
    Edge(EdgeId),
    /// 整棵树.
    Graph,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Node(id) => write!(f, "{id}"),
            Entity::Edge(id) => write!(f, "{id}"),
            Entity::Graph => f.write_str("graph"),
        }
    }
}

impl From<NodeId> for Entity {
    #[inline]
    fn from(id: NodeId) -> Self {
        Entity::Node(id)
    }
}

impl From<EdgeId> for Entity {
    #[inline]
    fn from(id: EdgeId) -> Self {
        Entity::Edge(id)
    }
}

/// 某一步计算所依赖的属性尚未计算. 一般说明各步骤的调用顺序有误.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("missing property `{field}` on {entity}")]
pub struct MissingPropertyError {
    /// 属性名.
    pub field: &'static str,
    /// 所属实体.
    pub entity: Entity,
}

/// `Option<T>` -> `Result<T, MissingPropertyError>` 的简写.
pub(crate) trait Require<T> {
    fn require(self, field: &'static str, entity: impl Into<Entity>)
        -> Result<T, MissingPropertyError>;
}

impl<T> Require<T> for Option<T> {
    #[inline]
    fn require(
        self,
        field: &'static str,
        entity: impl Into<Entity>,
    ) -> Result<T, MissingPropertyError> {
        self.ok_or_else(|| MissingPropertyError {
            field,
            entity: entity.into(),
        })
    }
}

/// 配置非法.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// 切向估计权重为空.
    #[error("direction weights must not be empty")]
    EmptyWeights,

    /// 切向估计权重为负数或非有限值.
    #[error("invalid direction weight {0}")]
    InvalidWeight(f64),

    /// 权重之和为 0.
    #[error("direction weights sum to zero")]
    ZeroWeightSum,

    /// 分叉角阈值不在 `(0, PI]` 内.
    #[error("max angle {0} is not in (0, PI]")]
    InvalidAngle(f64),

    /// 半径比例阈值非正或非有限值.
    #[error("thickness ratio {0} must be positive")]
    InvalidThicknessRatio(f64),

    /// lacunarity 盒子列表为空.
    #[error("box sizes must not be empty")]
    EmptyBoxSizes,

    /// lacunarity 盒子边长为 0.
    #[error("box size must be positive")]
    ZeroBoxSize,

    /// 环境变量无法解析.
    #[error("could not parse `{key}={value}`")]
    Env {
        /// 变量名.
        key: &'static str,
        /// 原始值.
        value: String,
    },
}

/// 形态学计算流程的总错误类型.
#[derive(Debug, Error)]
pub enum MorphError {
    /// 加载失败.
    #[error(transparent)]
    Load(#[from] GraphLoadError),

    /// 保存失败.
    #[error(transparent)]
    Save(#[from] SaveError),

    /// 前置属性缺失.
    #[error(transparent)]
    MissingProperty(#[from] MissingPropertyError),

    /// 配置非法.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 三维重建中不存在任何前景体素.
    #[error("reconstruction volume has no occupied voxel")]
    EmptyVolume,
}

/// 形态学计算的运行结果.
pub type MorphResult<T> = Result<T, MorphError>;
