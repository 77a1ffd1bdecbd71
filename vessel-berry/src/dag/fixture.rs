//! 测试用的合成血管树.

use super::{Dag, DagRecord};

/// [`three_edges`] 中各边的名字, 按边下标排列.
pub(crate) const THREE_EDGE_NAMES: [&str; 3] = ["A", "B", "C"];

/// 三条边的合成树, 所有体素位于 `z = 0` 平面.
///
/// - A: 根 `(0, 50, 0)` -> 分叉点 `(0, 50, 10)`, 沿 `+w` 方向, 长度 10, 半径 2.0;
/// - B: 分叉点 -> `(0, 54, 30)`, 方向 `(0, 1, 5)`, 与 A 夹角约 11.3 度, 半径 1.8;
/// - C: 分叉点 -> `(0, 32, 25)`, 方向 `(0, -6, 5)`, 与 A 夹角约 50.2 度, 半径 1.0.
pub(crate) fn three_edges() -> Dag {
    Dag::try_from(three_edges_record()).unwrap()
}

pub(crate) fn three_edges_record() -> DagRecord {
    let mut r = DagRecord::default();
    let root = r.push_node((0, 50, 0));
    let p = r.push_node((0, 50, 10));
    let qb = r.push_node((0, 54, 30));
    let qc = r.push_node((0, 32, 25));

    let a_voxels = (1..10).map(|w| (0, 50, w)).collect();
    r.push_edge(root, p, a_voxels, 2.0, 10.0);

    let b_voxels = (1..4).map(|k| (0, 50 + k, 10 + 5 * k)).collect();
    r.push_edge(p, qb, b_voxels, 1.8, 4.0 * 26f64.sqrt());

    let c_voxels = (1..3).map(|k| (0, 50 - 6 * k, 10 + 5 * k)).collect();
    r.push_edge(p, qc, c_voxels, 1.0, 3.0 * 61f64.sqrt());
    r
}

/// 深度为 `depth` 的单链, 每条边沿 `+w` 方向前进 2 个体素, 半径逐级减半.
pub(crate) fn chain(depth: usize) -> Dag {
    let mut r = DagRecord::default();
    let mut prev = r.push_node((0, 0, 0));
    for i in 0..depth {
        let next = r.push_node((0, 0, 2 * i + 2));
        let radius = 0.5f64.powi(i as i32);
        r.push_edge(prev, next, vec![(0, 0, 2 * i + 1)], radius, 2.0);
        prev = next;
    }
    Dag::try_from(r).unwrap()
}

/// 简单线性同余随机数. 测试只需要确定性, 不需要统计质量.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

/// 由种子 `seed` 确定的、含 `n_edges` 条边的随机树.
///
/// 每个新节点随机挂在已有节点下, 相对父节点偏移 `(dz, dh, dw)`, `dz >= 1`.
/// 体素取两节点连线上的若干取整点, 路径长度不小于弦长. 节点坐标互不相同.
pub(crate) fn random_tree(seed: u64, n_edges: usize) -> Dag {
    let mut rng = Lcg(seed);
    let mut r = DagRecord::default();
    // 足够大的偏移量保证坐标不会为负.
    let base = 2 * n_edges + 16;
    r.push_node((base, base, base));

    for _ in 0..n_edges {
        let parent = rng.below(r.nodes.len() as u64) as usize;
        let from = r.nodes[parent].coords;
        let delta = [
            1 + rng.below(3) as isize,
            rng.below(5) as isize - 2,
            rng.below(5) as isize - 2,
        ];
        let mut to = offset(from, delta, 1.0);
        while r.nodes.iter().any(|n| n.coords == to) {
            to.0 += 1;
        }

        let samples = 1 + rng.below(4) as usize;
        let voxels = (1..=samples)
            .map(|k| offset(from, delta, k as f64 / (samples + 1) as f64))
            .collect();
        let chord = crate::geom::distance(
            &crate::geom::idx3d_to_vec3(&from),
            &crate::geom::idx3d_to_vec3(&to),
        );
        let length = chord * (1.0 + rng.below(50) as f64 / 100.0);
        let radius = 0.5 + rng.below(100) as f64 / 40.0;

        let child = r.push_node(to);
        r.push_edge(parent, child, voxels, radius, length);
    }
    Dag::try_from(r).unwrap()
}

/// `from + round(t * delta)`
fn offset(from: (usize, usize, usize), delta: [isize; 3], t: f64) -> (usize, usize, usize) {
    let f = |c: usize, d: isize| (c as f64 + t * d as f64).round() as usize;
    (f(from.0, delta[0]), f(from.1, delta[1]), f(from.2, delta[2]))
}
