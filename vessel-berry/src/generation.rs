//! 血管代数 (generation) 划分.
//!
//! 根节点的出边为第 1 代. 对非根边 `e` 及其父边 `p`, 若分叉角足够小且管径没有明显变细,
//! 则认为 `e` 是 `p` 的延续, 与 `p` 同代; 否则代数加一. 超过 `max_generation`
//! 的代数统一记为 `max_generation + 1`.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_ANGLE, DEFAULT_MAX_GENERATION, DEFAULT_MAX_THICKNESS_RATIO};
use crate::dag::{Dag, Edge};
use crate::error::{MissingPropertyError, Require};

/// 代数划分规则.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRule {
    /// 最大代数. 更深的分支全部归入 `max_generation + 1` 代.
    pub max_generation: u32,
    /// 同代允许的最大分叉角 (弧度, 不含).
    pub max_angle: f64,
    /// 同代要求 `子边半径 > max_thickness_ratio * 父边半径`.
    pub max_thickness_ratio: f64,
}

impl Default for GenerationRule {
    fn default() -> Self {
        Self {
            max_generation: DEFAULT_MAX_GENERATION,
            max_angle: DEFAULT_MAX_ANGLE,
            max_thickness_ratio: DEFAULT_MAX_THICKNESS_RATIO,
        }
    }
}

impl GenerationRule {
    /// `child` 是否是 `parent` 的延续. `angle` 为 `child` 的分叉角.
    #[inline]
    pub fn is_continuation(&self, parent: &Edge, child: &Edge, angle: f64) -> bool {
        angle < self.max_angle
            && child.mean_radius() > self.max_thickness_ratio * parent.mean_radius()
    }

    /// 将超出上限的代数归入 `max_generation + 1`.
    #[inline]
    pub fn cap(&self, generation: u32) -> u32 {
        if generation > self.max_generation {
            self.max_generation.saturating_add(1)
        } else {
            generation
        }
    }
}

/// 按先序遍历为每条边划分代数.
///
/// 需要先计算非根边的分叉角 ([`crate::descriptor::set_relative_angles`]).
pub fn assign_generations(
    dag: &mut Dag,
    rule: &GenerationRule,
) -> Result<(), MissingPropertyError> {
    let mut deepest = 0;
    for i in 0..dag.edges().len() {
        let e = dag.edges()[i];
        let generation = match dag.parent_edge(e) {
            None => 1,
            Some(p) => {
                // 先序保证父边已处理.
                let pg = dag[p].props().generation.require("generation", p)?;
                let angle = dag[e].props().relative_angle.require("relative_angle", e)?;
                if rule.is_continuation(&dag[p], &dag[e], angle) {
                    pg
                } else {
                    pg.saturating_add(1)
                }
            }
        };
        let generation = rule.cap(generation);
        deepest = deepest.max(generation);
        dag.edge_props_mut(e).generation = Some(generation);
    }
    log::debug!("Generations assigned, deepest = {deepest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_DIRECTION_WEIGHTS;
    use crate::dag::{fixture, EdgeId};
    use crate::descriptor;
    use crate::error::Entity;

    fn generations(dag: &Dag) -> Vec<u32> {
        dag.edges()
            .iter()
            .map(|&e| dag[e].props().generation.unwrap())
            .collect()
    }

    /// B 与 A 夹角约 11 度且半径 1.8 > 0.7 * 2, 与 A 同代; C 夹角约 50 度, 代数加一.
    #[test]
    fn test_three_edges() {
        let mut dag = fixture::three_edges();
        descriptor::compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        assign_generations(&mut dag, &GenerationRule::default()).unwrap();
        assert_eq!(generations(&dag), [1, 1, 2]);
    }

    /// 半径骤降时即使方向不变也要加一代.
    #[test]
    fn test_thickness_drop() {
        let mut dag = fixture::three_edges();
        descriptor::compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        let rule = GenerationRule {
            max_thickness_ratio: 0.95,
            ..GenerationRule::default()
        };
        assign_generations(&mut dag, &rule).unwrap();
        assert_eq!(generations(&dag), [1, 2, 2]);
    }

    /// 单链上半径逐级减半, 每条边各加一代, 直至封顶.
    #[test]
    fn test_cap() {
        let mut dag = fixture::chain(20);
        descriptor::compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        let rule = GenerationRule::default();
        assign_generations(&mut dag, &rule).unwrap();

        let g = generations(&dag);
        assert_eq!(&g[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(g[8..].iter().all(|&x| x == 9));
        assert_eq!(rule.cap(100), 9);
        assert_eq!(rule.cap(8), 8);
    }

    /// 随机树上代数沿路径单调不减, 每步至多加一, 且不超过上限.
    #[test]
    fn test_monotonicity() {
        for seed in [1, 2, 3] {
            let mut dag = fixture::random_tree(seed, 300);
            descriptor::compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
            let rule = GenerationRule {
                max_generation: 4,
                ..GenerationRule::default()
            };
            assign_generations(&mut dag, &rule).unwrap();

            for &e in dag.edges() {
                let g = dag[e].props().generation.unwrap();
                assert!((1..=5).contains(&g));
                match dag.parent_edge(e) {
                    None => assert_eq!(g, 1),
                    Some(p) => {
                        let pg = dag[p].props().generation.unwrap();
                        assert!(g == pg || g == pg + 1, "{e}: {pg} -> {g}");
                    }
                }
            }
        }
    }

    /// 很深的单链不会耗尽调用栈.
    #[test]
    fn test_deep_chain() {
        let mut dag = fixture::chain(200_000);
        descriptor::compute(&mut dag, &DEFAULT_DIRECTION_WEIGHTS).unwrap();
        assign_generations(&mut dag, &GenerationRule::default()).unwrap();
        let last = *dag.edges().last().unwrap();
        assert_eq!(dag[last].props().generation, Some(9));
    }

    #[test]
    fn test_missing_relative_angle() {
        let mut dag = fixture::three_edges();
        let err = assign_generations(&mut dag, &GenerationRule::default()).unwrap_err();
        assert_eq!(err.field, "relative_angle");
        assert_eq!(err.entity, Entity::Edge(EdgeId(1)));
    }
}
