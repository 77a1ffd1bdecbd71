//! 整棵树的形态学统计量.

use std::f64::consts::PI;

use crate::dag::{Dag, EdgeId};
use crate::error::{Entity, MissingPropertyError, Require};

/// 血管条数, 即末端边的条数.
///
/// 只有根节点的树为 0. 这里有意不把孤立的根节点算作一条血管, 与按 "无出边的节点计 1"
/// 递归计数的做法不同, 后者对这种树给出 1.
pub fn number_of_vessels(dag: &Dag) -> usize {
    let mut count = 0;
    let mut stack = vec![dag.root()];
    while let Some(n) = stack.pop() {
        for &e in dag[n].edges() {
            let b = dag[e].node_b();
            if dag[b].is_leaf() {
                count += 1;
            } else {
                stack.push(b);
            }
        }
    }
    count
}

/// 以 `e` 为起点的子树中全部边的长度之和 (含 `e` 本身).
pub fn subtree_length(dag: &Dag, e: EdgeId) -> f64 {
    let mut total = 0.0;
    let mut stack = vec![e];
    while let Some(e) = stack.pop() {
        total += dag[e].length();
        stack.extend_from_slice(dag.child_edges(e));
    }
    total
}

/// 血管总长: 根节点每条出边的子树长度之和.
pub fn vessel_total_length(dag: &Dag) -> f64 {
    dag[dag.root()]
        .edges()
        .iter()
        .map(|&e| subtree_length(dag, e))
        .sum()
}

/// 血管结构填充体积.
///
/// 每个体素按半椭球体 `2/3 * PI * r^2` 近似, 对全部边累加.
pub fn vascular_structure_volume(dag: &Dag) -> f64 {
    dag.edges()
        .iter()
        .map(|&e| {
            let edge = &dag[e];
            let r = edge.mean_radius();
            2.0 / 3.0 * edge.voxels().len() as f64 * r * r * PI
        })
        .sum()
}

/// 分叉点个数: 有出边且有入边的节点 (不含根节点).
pub fn branching_points(dag: &Dag) -> usize {
    dag.nodes()
        .iter()
        .filter(|&&n| !dag[n].is_leaf() && dag[n].parent().is_some())
        .count()
}

/// 计算血管条数、总长和平均长度. 没有血管时平均长度为 `None`.
pub fn set_vessel_stats(dag: &mut Dag) {
    let count = number_of_vessels(dag);
    let total = vessel_total_length(dag);
    let props = dag.props_mut();
    props.number_of_vessels = Some(count);
    props.vessel_total_length = Some(total);
    props.vessel_avg_length = (count > 0).then(|| total / count as f64);
    log::debug!("{count} vessel(s), total length {total:.3}");
}

/// 计算血管结构填充体积.
pub fn set_structure_volume(dag: &mut Dag) {
    let v = vascular_structure_volume(dag);
    dag.props_mut().vascular_structure_volume = Some(v);
}

/// 计算分叉点个数和每像素分叉点个数.
///
/// 需要先计算二维投影面积 ([`crate::projection::set_projection_area`]).
pub fn set_branching_index(dag: &mut Dag) -> Result<(), MissingPropertyError> {
    let area = dag
        .props()
        .vascular_network_projection_area
        .require("vascular_network_projection_area", Entity::Graph)?;
    let points = branching_points(dag);
    let props = dag.props_mut();
    props.branching_points = Some(points);
    props.branchings_points_per_pixel = (area > 0).then(|| points as f64 / area as f64);
    Ok(())
}
