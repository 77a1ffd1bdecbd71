//! 三维点集的主成分分析 (只取前两个主成分).
//!
//! 协方差矩阵为 3x3 实对称矩阵, 特征分解交给 `nalgebra::SymmetricEigen`.

use nalgebra::{Matrix3, Vector3};

use crate::geom::{add_scaled, dot, scale, sub};
use crate::Vec3;

/// 拟合得到的二维投影基.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Pca2 {
    mean: Vec3,
    /// 按方差从大到小排列的两个单位主方向.
    components: [Vec3; 2],
}

impl Pca2 {
    /// 拟合. `points` 不能为空.
    pub fn fit(points: &[Vec3]) -> Self {
        assert!(!points.is_empty(), "至少需要一个点");

        let mut mean = [0.0; 3];
        for p in points {
            add_scaled(&mut mean, p, 1.0);
        }
        let mean = scale(&mean, 1.0 / points.len() as f64);

        let mut cov = Matrix3::<f64>::zeros();
        for p in points {
            let d = Vector3::from(sub(p, &mean));
            cov += d * d.transpose();
        }

        let eigen = cov.symmetric_eigen();
        let values = eigen.eigenvalues;
        let mut order = [0, 1, 2];
        order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

        let column = |k: usize| {
            let v = eigen.eigenvectors.column(k);
            normalize_sign([v[0], v[1], v[2]])
        };
        Self {
            mean,
            components: [column(order[0]), column(order[1])],
        }
    }

    /// 投影到二维主成分坐标.
    #[inline]
    pub fn transform(&self, p: &Vec3) -> (f64, f64) {
        let d = sub(p, &self.mean);
        (dot(&d, &self.components[0]), dot(&d, &self.components[1]))
    }

    /// 两个主方向.
    #[inline]
    pub fn components(&self) -> &[Vec3; 2] {
        &self.components
    }
}

/// 特征向量的符号不唯一. 统一使绝对值最大的分量为正, 保证结果确定.
fn normalize_sign(v: Vec3) -> Vec3 {
    let mut k = 0;
    for i in 1..3 {
        if v[i].abs() > v[k].abs() {
            k = i;
        }
    }
    if v[k] < 0.0 {
        scale(&v, -1.0)
    } else {
        v
    }
}
