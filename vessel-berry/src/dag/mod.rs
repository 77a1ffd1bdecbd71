//! 血管树数据结构.
//!
//! 所有节点和边保存在 [`Dag`] 的两块连续存储 (arena) 中, 并通过稳定索引
//! [`NodeId`], [`EdgeId`] 相互引用. 每条边指向近端节点 `node_a` 和远端节点 `node_b`;
//! 每个节点记录其出边列表和唯一入边 (根节点没有入边). 入边在构建时确定, 此后不可修改.
//!
//! 虽然名为 DAG, 该结构实际上是一棵树: 单一根节点, 每个非根节点恰有一条入边, 无环且连通.
//! 这些约束在 [`Dag::try_from`] 中检查.
//!
//! 各计算步骤只会写入边和整棵树的属性记录 ([`EdgeProps`], [`GraphProps`]),
//! 不会增删节点或边.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{MissingPropertyError, Require, StructureError};
use crate::{Idx3d, Vec3};

mod persist;
mod record;

#[cfg(test)]
pub(crate) mod fixture;

pub use persist::{load_dag, load_reconstruction, save_dag};
pub use record::{DagRecord, EdgeRecord, NodeRecord};

/// 节点索引.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// 边索引.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

impl NodeId {
    /// 在节点存储中的位置.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl EdgeId {
    /// 在边存储中的位置.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge #{}", self.0)
    }
}

/// 分叉点或末端点.
///
/// 节点的相等性和哈希值仅由坐标决定.
#[derive(Clone, Debug)]
pub struct Node {
    coords: Idx3d,
    centroid: Vec3,
    edges: Vec<EdgeId>,
    parent: Option<EdgeId>,
}

impl Node {
    /// 体素坐标.
    #[inline]
    pub fn coords(&self) -> Idx3d {
        self.coords
    }

    /// 节点质心. 输入未提供时与坐标相同.
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// 有序出边.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// 入边. 根节点为 `None`.
    #[inline]
    pub fn parent(&self) -> Option<EdgeId> {
        self.parent
    }

    /// 是否为末端节点 (没有出边).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coords.hash(state);
    }
}

/// 弯曲度. 弦长为 0 时无定义.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Tortuosity {
    /// 路径长度 / 弦长.
    Ratio(f64),

    /// 两端节点质心重合, 弦长为 0.
    DegenerateChord,
}

impl Tortuosity {
    /// 有定义时返回比值.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Tortuosity::Ratio(v) => Some(*v),
            Tortuosity::DegenerateChord => None,
        }
    }
}

/// 每条边的计算结果. 尚未计算的属性为 `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeProps {
    /// 体素坐标均值.
    pub centroid: Option<Vec3>,
    /// 近端切向 (单位向量, 退化时为零向量).
    pub start_direction: Option<Vec3>,
    /// 远端切向 (单位向量, 指向远离边的方向; 退化时为零向量).
    pub end_direction: Option<Vec3>,
    /// 与父边的分叉角 (弧度). 根节点的出边始终为 `None`.
    pub relative_angle: Option<f64>,
    /// 弯曲度.
    pub tortuosity: Option<Tortuosity>,
    /// 代数, 从 1 开始.
    pub generation: Option<u32>,
    /// 到最近末端边的最短质心路径长度.
    pub interstitial_distance: Option<f64>,
}

/// 一段血管.
#[derive(Clone, Debug)]
pub struct Edge {
    node_a: NodeId,
    node_b: NodeId,
    voxels: Vec<Idx3d>,
    mean_radius: f64,
    length: f64,
    props: EdgeProps,
}

impl Edge {
    /// 近端节点.
    #[inline]
    pub fn node_a(&self) -> NodeId {
        self.node_a
    }

    /// 远端节点.
    #[inline]
    pub fn node_b(&self) -> NodeId {
        self.node_b
    }

    /// 从近端到远端有序的体素坐标. 保证非空.
    #[inline]
    pub fn voxels(&self) -> &[Idx3d] {
        &self.voxels
    }

    /// 平均半径.
    #[inline]
    pub fn mean_radius(&self) -> f64 {
        self.mean_radius
    }

    /// 路径长度.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// 计算结果.
    #[inline]
    pub fn props(&self) -> &EdgeProps {
        &self.props
    }
}

/// 整棵树的统计量. 尚未计算的属性为 `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphProps {
    /// 血管 (末端边) 条数.
    pub number_of_vessels: Option<usize>,
    /// 血管总长.
    pub vessel_total_length: Option<f64>,
    /// 血管平均长度.
    pub vessel_avg_length: Option<f64>,
    /// 血管结构填充体积.
    pub vascular_structure_volume: Option<f64>,
    /// 二维投影的血管网面积 (像素).
    pub vascular_network_projection_area: Option<usize>,
    /// 二维投影凸包面积 (像素).
    pub projection_explant_area: Option<usize>,
    /// 投影面积 / 凸包面积.
    pub vascular_density: Option<f64>,
    /// 分叉点个数 (不含根节点).
    pub branching_points: Option<usize>,
    /// 每像素投影面积上的分叉点个数.
    pub branchings_points_per_pixel: Option<f64>,
    /// 多尺度平均 lacunarity.
    pub lacunarity: Option<f64>,
}

/// 血管树.
#[derive(Clone, Debug)]
pub struct Dag {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: NodeId,
    volume_shape: Option<Idx3d>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    props: GraphProps,
}

impl Index<NodeId> for Dag {
    type Output = Node;

    #[inline]
    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl Index<EdgeId> for Dag {
    type Output = Edge;

    #[inline]
    fn index(&self, index: EdgeId) -> &Self::Output {
        &self.edges[index.0]
    }
}

impl Dag {
    /// 根节点.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 三维重建的体素形状 (如果已知).
    #[inline]
    pub fn volume_shape(&self) -> Option<Idx3d> {
        self.volume_shape
    }

    /// 节点个数.
    #[inline]
    pub fn len_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 边个数.
    #[inline]
    pub fn len_edges(&self) -> usize {
        self.edges.len()
    }

    /// 深度优先先序的全部节点. 构建时缓存.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.node_order
    }

    /// 深度优先先序的全部边 (每条边先于其子树). 构建时缓存.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edge_order
    }

    /// 重新遍历得到深度优先先序的全部节点.
    pub fn enumerate_nodes(&self) -> Vec<NodeId> {
        pre_order(&self.nodes, &self.edges, self.root).0
    }

    /// 重新遍历得到深度优先先序的全部边.
    pub fn enumerate_edges(&self) -> Vec<EdgeId> {
        pre_order(&self.nodes, &self.edges, self.root).1
    }

    /// 父边, 即 `node_a` 的入边. 根节点的出边返回 `None`.
    #[inline]
    pub fn parent_edge(&self, e: EdgeId) -> Option<EdgeId> {
        self[self[e].node_a].parent
    }

    /// 子边, 即 `node_b` 的出边.
    #[inline]
    pub fn child_edges(&self, e: EdgeId) -> &[EdgeId] {
        &self[self[e].node_b].edges
    }

    /// `node_b` 是否为末端节点.
    #[inline]
    pub fn is_terminal(&self, e: EdgeId) -> bool {
        self[self[e].node_b].is_leaf()
    }

    /// 整棵树的统计量.
    #[inline]
    pub fn props(&self) -> &GraphProps {
        &self.props
    }

    #[inline]
    pub(crate) fn props_mut(&mut self) -> &mut GraphProps {
        &mut self.props
    }

    #[inline]
    pub(crate) fn edge_props_mut(&mut self, e: EdgeId) -> &mut EdgeProps {
        &mut self.edges[e.0].props
    }

    /// 按代数对边的某个标量分组. 返回值第 `i` 项为第 `i + 1` 代的全部取值,
    /// 长度等于出现过的最大代数. `f` 返回 `None` 的边被跳过 (例如根节点出边的分叉角).
    ///
    /// 需要先计算代数.
    pub fn group_by_generation<F>(&self, f: F) -> Result<Vec<Vec<f64>>, MissingPropertyError>
    where
        F: Fn(&Edge) -> Option<f64>,
    {
        let mut groups: Vec<Vec<f64>> = vec![];
        for &e in self.edges() {
            let edge = &self[e];
            let g = edge.props.generation.require("generation", e)? as usize;
            if groups.len() < g {
                groups.resize_with(g, Vec::new);
            }
            if let Some(v) = f(edge) {
                groups[g - 1].push(v);
            }
        }
        Ok(groups)
    }
}

/// 使用显式栈做深度优先先序遍历. 返回 `(节点序列, 边序列)`.
///
/// 调用者需保证每个节点至多一条入边, 否则节点可能被重复访问.
fn pre_order(nodes: &[Node], edges: &[Edge], root: NodeId) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut node_order = Vec::with_capacity(nodes.len());
    let mut edge_order = Vec::with_capacity(edges.len());
    node_order.push(root);

    let mut stack: Vec<EdgeId> = nodes[root.0].edges.iter().rev().copied().collect();
    while let Some(e) = stack.pop() {
        edge_order.push(e);
        let b = edges[e.0].node_b;
        node_order.push(b);
        stack.extend(nodes[b.0].edges.iter().rev().copied());
    }
    (node_order, edge_order)
}
