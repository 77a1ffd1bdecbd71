//! 间质距离: 每条边沿质心路径到下游最近末端的最短距离.
//!
//! - 末端边 (`node_b` 无出边): `|node_b.centroid - edge.centroid|`;
//! - 其它边: 对每条子边 `c` 取 `|edge.centroid - c.centroid| + c.interstitial_distance`
//!   的最小值.
//!
//! 先序中父边总在子树之前, 因此按逆先序处理即可保证子边先于父边完成.

use ordered_float::OrderedFloat;

use crate::dag::Dag;
use crate::error::{MissingPropertyError, Require};
use crate::geom::distance;

/// 计算每条边的间质距离. 需要先计算边质心.
pub fn set_interstitial_distances(dag: &mut Dag) -> Result<(), MissingPropertyError> {
    for i in (0..dag.edges().len()).rev() {
        let e = dag.edges()[i];
        let centroid = dag[e].props().centroid.require("centroid", e)?;

        let d = if dag.is_terminal(e) {
            distance(&dag[dag[e].node_b()].centroid(), &centroid)
        } else {
            let mut best = OrderedFloat(f64::INFINITY);
            for &c in dag.child_edges(e) {
                let props = dag[c].props();
                let cc = props.centroid.require("centroid", c)?;
                let cd = props
                    .interstitial_distance
                    .require("interstitial_distance", c)?;
                best = best.min(OrderedFloat(distance(&centroid, &cc) + cd));
            }
            best.into_inner()
        };
        dag.edge_props_mut(e).interstitial_distance = Some(d);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{fixture, EdgeId};
    use crate::descriptor;
    use crate::error::Entity;

    fn prepared(mut dag: Dag) -> Dag {
        descriptor::set_centroids(&mut dag);
        set_interstitial_distances(&mut dag).unwrap();
        dag
    }

    #[test]
    fn test_three_edges() {
        let dag = prepared(fixture::three_edges());
        let [a, b, c] = [EdgeId(0), EdgeId(1), EdgeId(2)];

        // B 质心 (0, 52, 20), 末端 (0, 54, 30).
        assert_eq!(dag[b].props().interstitial_distance, Some(104f64.sqrt()));
        // C 质心 (0, 41, 17.5), 末端 (0, 32, 25).
        assert_eq!(dag[c].props().interstitial_distance, Some(137.25f64.sqrt()));

        // A 质心 (0, 50, 5): 经 B 为 sqrt(229) + sqrt(104), 经 C 为 sqrt(237.25) + sqrt(137.25).
        let via_b = 229f64.sqrt() + 104f64.sqrt();
        let via_c = 237.25f64.sqrt() + 137.25f64.sqrt();
        assert!(via_b < via_c);
        let got = dag[a].props().interstitial_distance.unwrap();
        assert!((got - via_b).abs() < 1e-9);
    }

    /// 末端边满足基本情形, 其余边满足递推关系, 且均非负.
    #[test]
    fn test_recurrence() {
        let dag = prepared(fixture::random_tree(5, 400));
        for &e in dag.edges() {
            let p = dag[e].props();
            let d = p.interstitial_distance.unwrap();
            let centroid = p.centroid.unwrap();
            assert!(d >= 0.0);
            if dag.is_terminal(e) {
                assert_eq!(d, distance(&dag[dag[e].node_b()].centroid(), &centroid));
            } else {
                let expected = dag
                    .child_edges(e)
                    .iter()
                    .map(|&c| {
                        let cp = dag[c].props();
                        distance(&centroid, &cp.centroid.unwrap())
                            + cp.interstitial_distance.unwrap()
                    })
                    .fold(f64::INFINITY, f64::min);
                assert_eq!(d, expected);
            }
        }
    }

    #[test]
    fn test_deep_chain() {
        let dag = prepared(fixture::chain(200_000));
        let first = dag.edges()[0];
        // 每段质心间距 2, 最后一段质心到末端距离 1.
        let expected = 2.0 * (200_000 - 1) as f64 + 1.0;
        let got = dag[first].props().interstitial_distance.unwrap();
        assert!((got - expected).abs() < 1e-6);
    }

    #[test]
    fn test_missing_centroid() {
        let mut dag = fixture::three_edges();
        let err = set_interstitial_distances(&mut dag).unwrap_err();
        assert_eq!(err.field, "centroid");
        assert_eq!(err.entity, Entity::Edge(EdgeId(2)));
    }
}
