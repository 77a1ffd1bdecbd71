//! 边的几何描述量: 质心, 端点切向, 分叉角, 弯曲度.
//!
//! 各函数按如下顺序依次调用 (后者依赖前者写入的属性):
//!
//! 1. [`set_centroids`];
//! 2. [`set_directions`];
//! 3. [`set_relative_angles`];
//! 4. [`set_tortuosities`] (只依赖节点质心, 可在任意时刻调用).
//!
//! # 退化情形
//!
//! - 加权平均位移为零向量时, 切向无定义, 记为零向量. 零向量与任意向量的点积为 0,
//!   因此对应的分叉角为 `PI / 2`.
//! - `acos` 之前将点积截断到 `[-1, 1]`, 避免浮点误差产生 NaN.
//! - 两端节点质心重合时弦长为 0, 弯曲度记为 [`Tortuosity::DegenerateChord`].

use crate::dag::{Dag, Tortuosity};
use crate::error::{MissingPropertyError, Require};
use crate::geom::{add_scaled, distance, dot, idx3d_to_vec3, norm, scale, sub};
use crate::{Idx3d, Vec3};

/// 体素坐标均值. `voxels` 为空时返回 `None`.
pub fn centroid(voxels: &[Idx3d]) -> Option<Vec3> {
    if voxels.is_empty() {
        return None;
    }
    let mut acc = [0.0; 3];
    for v in voxels {
        add_scaled(&mut acc, &idx3d_to_vec3(v), 1.0);
    }
    Some(scale(&acc, 1.0 / voxels.len() as f64))
}

/// 估计从 `source` 出发的局部切向.
///
/// 取 `points` 的前 `k = min(weights.len(), points.len())` 个点, 以 `weights`
/// 的前 `k` 项为权重, 对各点相对 `source` 的位移做加权平均, 并归一化为单位向量.
///
/// 没有可用的点、权重之和为 0 或平均位移为零向量时返回 `None`.
pub fn calculate_direction<'a, I>(source: &Vec3, points: I, weights: &[f64]) -> Option<Vec3>
where
    I: IntoIterator<Item = &'a Idx3d>,
{
    let mut acc = [0.0; 3];
    let mut weight_sum = 0.0;
    for (p, &w) in points.into_iter().zip(weights) {
        add_scaled(&mut acc, &sub(&idx3d_to_vec3(p), source), w);
        weight_sum += w;
    }
    if weight_sum == 0.0 {
        return None;
    }
    let mean = scale(&acc, 1.0 / weight_sum);
    let n = norm(&mean);
    (n > 0.0 && n.is_finite()).then(|| scale(&mean, 1.0 / n))
}

/// 两个单位向量的夹角 (弧度). 点积会先截断到 `[-1, 1]`.
#[inline]
pub fn relative_angle(parent_end: &Vec3, child_start: &Vec3) -> f64 {
    dot(parent_end, child_start).clamp(-1.0, 1.0).acos()
}

/// 路径长度 / 两端质心连线长度.
pub fn tortuosity(length: f64, a: &Vec3, b: &Vec3) -> Tortuosity {
    let chord = distance(a, b);
    if chord > 0.0 {
        Tortuosity::Ratio(length / chord)
    } else {
        Tortuosity::DegenerateChord
    }
}

/// 计算每条边的质心.
pub fn set_centroids(dag: &mut Dag) {
    for i in 0..dag.edges().len() {
        let e = dag.edges()[i];
        // 体素非空由构建时的校验保证.
        let c = centroid(dag[e].voxels());
        dag.edge_props_mut(e).centroid = c;
    }
}

/// 计算每条边的近端切向和远端切向.
///
/// 近端切向以 `node_a` 质心为源点, 按原顺序使用体素; 远端切向以 `node_b`
/// 质心为源点, 逆序使用体素, 再取反使其指向远离本边的方向.
pub fn set_directions(dag: &mut Dag, weights: &[f64]) {
    let mut degenerate = 0usize;
    for i in 0..dag.edges().len() {
        let e = dag.edges()[i];
        let edge = &dag[e];
        let start_source = dag[edge.node_a()].centroid();
        let end_source = dag[edge.node_b()].centroid();

        let start = calculate_direction(&start_source, edge.voxels(), weights);
        let end = calculate_direction(&end_source, edge.voxels().iter().rev(), weights)
            .map(|d| scale(&d, -1.0));
        if start.is_none() || end.is_none() {
            log::warn!("{e}: degenerate direction, using zero vector");
            degenerate += 1;
        }

        let props = dag.edge_props_mut(e);
        props.start_direction = Some(start.unwrap_or_default());
        props.end_direction = Some(end.unwrap_or_default());
    }
    log::debug!("Directions done, {degenerate} degenerate edge(s)");
}

/// 计算每条非根边与其父边的分叉角. 根节点的出边记为 `None`.
///
/// 需要先调用 [`set_directions`].
pub fn set_relative_angles(dag: &mut Dag) -> Result<(), MissingPropertyError> {
    for i in 0..dag.edges().len() {
        let e = dag.edges()[i];
        let angle = match dag.parent_edge(e) {
            None => None,
            Some(p) => {
                let parent_end = dag[p].props().end_direction.require("end_direction", p)?;
                let start = dag[e].props().start_direction.require("start_direction", e)?;
                Some(relative_angle(&parent_end, &start))
            }
        };
        dag.edge_props_mut(e).relative_angle = angle;
    }
    Ok(())
}

/// 计算每条边的弯曲度. 弦长为 0 的边记为 [`Tortuosity::DegenerateChord`].
pub fn set_tortuosities(dag: &mut Dag) {
    for i in 0..dag.edges().len() {
        let e = dag.edges()[i];
        let edge = &dag[e];
        let t = tortuosity(
            edge.length(),
            &dag[edge.node_a()].centroid(),
            &dag[edge.node_b()].centroid(),
        );
        if t == Tortuosity::DegenerateChord {
            log::warn!("{e}: zero chord length, tortuosity undefined");
        }
        dag.edge_props_mut(e).tortuosity = Some(t);
    }
}

/// 依次计算全部几何描述量.
pub fn compute(dag: &mut Dag, weights: &[f64]) -> Result<(), MissingPropertyError> {
    set_centroids(dag);
    set_directions(dag, weights);
    set_relative_angles(dag)?;
    set_tortuosities(dag);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_DIRECTION_WEIGHTS;
    use crate::dag::{fixture, DagRecord, EdgeId};
    use crate::error::Entity;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn vec_eq(a: &Vec3, b: &Vec3) -> bool {
        a.iter().zip(b).all(|(x, y)| f64_eq(*x, *y))
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        assert_eq!(
            centroid(&[(0, 0, 0), (2, 4, 6), (1, 2, 0)]),
            Some([1.0, 2.0, 2.0])
        );
    }

    /// 权重截断到点的个数, 点截断到权重的个数.
    #[test]
    fn test_calculate_direction_truncation() {
        let source = [0.0, 0.0, 0.0];
        let points: [Idx3d; 2] = [(0, 0, 1), (0, 1, 0)];
        // 只使用第一个点.
        let d = calculate_direction(&source, &points, &[1.0]).unwrap();
        assert!(vec_eq(&d, &[0.0, 0.0, 1.0]));

        // 权重多于点.
        let d = calculate_direction(&source, &points, &[1.0, 1.0, 5.0, 5.0]).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(vec_eq(&d, &[0.0, h, h]));

        // 加权偏向第二个点.
        let d = calculate_direction(&source, &points, &[1.0, 3.0]).unwrap();
        assert!(d[1] > d[2]);
        assert!(f64_eq(norm(&d), 1.0));
    }

    #[test]
    fn test_calculate_direction_degenerate() {
        let source = [1.0, 1.0, 1.0];
        let empty: [Idx3d; 0] = [];
        assert_eq!(calculate_direction(&source, &empty, &[1.0]), None);
        let same: [Idx3d; 1] = [(1, 1, 1)];
        assert_eq!(calculate_direction(&source, &same, &[1.0]), None);
        let one: [Idx3d; 1] = [(1, 1, 2)];
        assert_eq!(calculate_direction(&source, &one, &[0.0]), None);
        // 对称分布, 平均位移为 0.
        let symmetric: [Idx3d; 2] = [(1, 1, 2), (1, 1, 0)];
        assert_eq!(calculate_direction(&source, &symmetric, &[1.0, 1.0]), None);
    }

    /// 点积因浮点误差略超出 `[-1, 1]` 时不产生 NaN.
    #[test]
    fn test_relative_angle_clamped() {
        let a = [1.0 + 1e-12, 0.0, 0.0];
        assert_eq!(relative_angle(&a, &a), 0.0);
        let b = [-1.0 - 1e-12, 0.0, 0.0];
        assert!(f64_eq(relative_angle(&a, &b), std::f64::consts::PI));
        assert!(f64_eq(
            relative_angle(&[0.0; 3], &a),
            std::f64::consts::FRAC_PI_2
        ));
    }

    #[test]
    fn test_tortuosity() {
        let a = [0.0, 0.0, 0.0];
        let b = [0.0, 3.0, 4.0];
        assert_eq!(tortuosity(10.0, &a, &b), Tortuosity::Ratio(2.0));
        assert_eq!(tortuosity(10.0, &a, &a), Tortuosity::DegenerateChord);
        assert_eq!(Tortuosity::DegenerateChord.value(), None);
    }

    /// 合成三边树上的切向、分叉角和弯曲度.
    #[test]
    fn test_three_edges() {
        let mut dag = fixture::three_edges();
        compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        let [a, b, c] = [EdgeId(0), EdgeId(1), EdgeId(2)];

        let pa = dag[a].props();
        assert!(vec_eq(&pa.centroid.unwrap(), &[0.0, 50.0, 5.0]));
        assert!(vec_eq(&pa.start_direction.unwrap(), &[0.0, 0.0, 1.0]));
        assert!(vec_eq(&pa.end_direction.unwrap(), &[0.0, 0.0, 1.0]));
        assert_eq!(pa.relative_angle, None);
        assert_eq!(pa.tortuosity, Some(Tortuosity::Ratio(1.0)));

        let pb = dag[b].props();
        let expected_b = (5.0 / 26f64.sqrt()).acos();
        assert!(f64_eq(pb.relative_angle.unwrap(), expected_b));
        assert!(pb.relative_angle.unwrap().to_degrees() < 30.0);
        assert!(f64_eq(pb.tortuosity.unwrap().value().unwrap(), 1.0));

        let pc = dag[c].props();
        let expected_c = (5.0 / 61f64.sqrt()).acos();
        assert!(f64_eq(pc.relative_angle.unwrap(), expected_c));
        assert!(pc.relative_angle.unwrap().to_degrees() >= 30.0);
    }

    /// 随机树上弯曲度不小于 1.
    #[test]
    fn test_tortuosity_lower_bound() {
        let mut dag = fixture::random_tree(3, 400);
        compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        for &e in dag.edges() {
            let t = dag[e].props().tortuosity.unwrap().value().unwrap();
            assert!(t >= 1.0 - 1e-9, "{e}: {t}");
            let angle = dag[e].props().relative_angle;
            assert_eq!(angle.is_none(), dag.parent_edge(e).is_none());
            assert!(angle.map_or(true, |a| (0.0..=std::f64::consts::PI).contains(&a)));
        }
    }

    /// 节点质心重合时弯曲度无定义, 但不影响其它边.
    #[test]
    fn test_degenerate_chord() {
        let mut r = DagRecord::default();
        let n0 = r.push_node((0, 0, 0));
        let n1 = r.push_node((0, 0, 4));
        r.push_edge(n0, n1, vec![(0, 1, 2)], 1.0, 3.0);
        r.nodes[n1].centroid = Some([0.0, 0.0, 0.0]);
        let mut dag = crate::Dag::try_from(r).unwrap();
        set_tortuosities(&mut dag);
        assert_eq!(
            dag[EdgeId(0)].props().tortuosity,
            Some(Tortuosity::DegenerateChord)
        );
    }

    #[test]
    fn test_relative_angles_need_directions() {
        let mut dag = fixture::three_edges();
        let err = set_relative_angles(&mut dag).unwrap_err();
        assert_eq!(err.field, "end_direction");
        assert_eq!(err.entity, Entity::Edge(EdgeId(0)));
    }
}
