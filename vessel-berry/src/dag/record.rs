//! 血管树的扁平持久化表示, 以及到 [`Dag`] 的校验转换.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{pre_order, Dag, Edge, EdgeId, EdgeProps, GraphProps, Node, NodeId};
use crate::error::StructureError;
use crate::geom::idx3d_to_vec3;
use crate::{Idx3d, Vec3};

/// 节点记录.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// 体素坐标.
    pub coords: Idx3d,
    /// 节点质心; 缺省时取坐标.
    #[serde(default)]
    pub centroid: Option<Vec3>,
}

/// 边记录. 端点以节点记录在 [`DagRecord::nodes`] 中的下标表示.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// 近端节点下标.
    pub node_a: usize,
    /// 远端节点下标.
    pub node_b: usize,
    /// 从近端到远端有序的体素.
    pub voxels: Vec<Idx3d>,
    /// 平均半径.
    pub mean_radius: f64,
    /// 路径长度.
    pub length: f64,
    /// 已计算的属性.
    #[serde(default)]
    pub props: EdgeProps,
}

/// 血管树的扁平记录.
///
/// 同一节点的出边顺序即为它们在 `edges` 中出现的顺序.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DagRecord {
    /// 全部节点.
    pub nodes: Vec<NodeRecord>,
    /// 全部边.
    pub edges: Vec<EdgeRecord>,
    /// 根节点下标.
    pub root: usize,
    /// 三维重建的体素形状.
    #[serde(default)]
    pub volume_shape: Option<Idx3d>,
    /// 已计算的整体统计量.
    #[serde(default)]
    pub props: GraphProps,
}

impl DagRecord {
    /// 追加一个节点, 返回其下标.
    pub fn push_node(&mut self, coords: Idx3d) -> usize {
        self.nodes.push(NodeRecord {
            coords,
            centroid: None,
        });
        self.nodes.len() - 1
    }

    /// 追加一条边, 返回其下标.
    pub fn push_edge(
        &mut self,
        node_a: usize,
        node_b: usize,
        voxels: Vec<Idx3d>,
        mean_radius: f64,
        length: f64,
    ) -> usize {
        self.edges.push(EdgeRecord {
            node_a,
            node_b,
            voxels,
            mean_radius,
            length,
            props: EdgeProps::default(),
        });
        self.edges.len() - 1
    }
}

impl TryFrom<DagRecord> for Dag {
    type Error = StructureError;

    /// 校验并构建血管树.
    ///
    /// # 返回值
    ///
    /// - 没有节点时返回 `Err(StructureError::Empty)`;
    /// - 根或端点下标越界时返回 `Err(StructureError::{RootOutOfRange, NodeOutOfRange})`;
    /// - 节点坐标重复时返回 `Err(StructureError::DuplicateCoords)`;
    /// - 边没有体素, 或半径/长度为负数或非有限值时返回
    ///   `Err(StructureError::{EmptyVoxels, InvalidScalar})`;
    /// - 边已记录的分代为 0 时返回 `Err(StructureError::ZeroGeneration)`;
    /// - 根节点有入边, 或非根节点有多条入边时返回
    ///   `Err(StructureError::{RootHasParent, MultipleParents})`;
    /// - 存在无法从根节点到达的节点 (环或不连通) 时返回 `Err(StructureError::Unreachable)`.
    fn try_from(record: DagRecord) -> Result<Self, Self::Error> {
        let DagRecord {
            nodes: node_records,
            edges: edge_records,
            root,
            volume_shape,
            props,
        } = record;

        if node_records.is_empty() {
            return Err(StructureError::Empty);
        }
        if root >= node_records.len() {
            return Err(StructureError::RootOutOfRange(root));
        }

        let mut seen = HashSet::with_capacity(node_records.len());
        let mut nodes = Vec::with_capacity(node_records.len());
        for NodeRecord { coords, centroid } in node_records {
            if !seen.insert(coords) {
                return Err(StructureError::DuplicateCoords(coords));
            }
            nodes.push(Node {
                coords,
                centroid: centroid.unwrap_or_else(|| idx3d_to_vec3(&coords)),
                edges: vec![],
                parent: None,
            });
        }

        let mut edges = Vec::with_capacity(edge_records.len());
        for (i, r) in edge_records.into_iter().enumerate() {
            for node in [r.node_a, r.node_b] {
                if node >= nodes.len() {
                    return Err(StructureError::NodeOutOfRange { edge: i, node });
                }
            }
            if r.voxels.is_empty() {
                return Err(StructureError::EmptyVoxels(i));
            }
            for (field, v) in [("mean_radius", r.mean_radius), ("length", r.length)] {
                if !v.is_finite() || v < 0.0 {
                    return Err(StructureError::InvalidScalar { edge: i, field });
                }
            }
            if r.props.generation == Some(0) {
                return Err(StructureError::ZeroGeneration(i));
            }
            if r.node_b == root {
                return Err(StructureError::RootHasParent(i));
            }
            let child = &mut nodes[r.node_b];
            if child.parent.is_some() {
                return Err(StructureError::MultipleParents(r.node_b));
            }
            child.parent = Some(EdgeId(i));
            nodes[r.node_a].edges.push(EdgeId(i));

            edges.push(Edge {
                node_a: NodeId(r.node_a),
                node_b: NodeId(r.node_b),
                voxels: r.voxels,
                mean_radius: r.mean_radius,
                length: r.length,
                props: r.props,
            });
        }

        let root = NodeId(root);
        let (node_order, edge_order) = pre_order(&nodes, &edges, root);
        if node_order.len() != nodes.len() {
            let mut reached = vec![false; nodes.len()];
            for n in &node_order {
                reached[n.0] = true;
            }
            let missing = reached.iter().position(|r| !r).unwrap_or(root.0);
            return Err(StructureError::Unreachable(missing));
        }
        debug_assert_eq!(edge_order.len(), edges.len());

        Ok(Self {
            nodes,
            edges,
            root,
            volume_shape,
            node_order,
            edge_order,
            props,
        })
    }
}

impl Dag {
    /// 转换为可持久化的扁平记录. 节点质心总是显式写出.
    pub fn to_record(&self) -> DagRecord {
        DagRecord {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    coords: n.coords,
                    centroid: Some(n.centroid),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeRecord {
                    node_a: e.node_a.0,
                    node_b: e.node_b.0,
                    voxels: e.voxels.clone(),
                    mean_radius: e.mean_radius,
                    length: e.length,
                    props: e.props.clone(),
                })
                .collect(),
            root: self.root.0,
            volume_shape: self.volume_shape,
            props: self.props.clone(),
        }
    }
}
