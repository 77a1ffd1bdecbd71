//! 三维重建体素的二维投影, 及基于投影的血管密度和 lacunarity.
//!
//! 投影方式: 取全部占据体素坐标, 拟合两个主成分, 将各点变换到主成分坐标后四舍五入到整数网格,
//! 平移到非负索引后栅格化为二维掩膜.

mod hull;
mod lacunarity;
mod pca;

use itertools::Itertools;
use ndarray::{Array2, ArrayView2, ArrayView3};

use crate::dag::Dag;
use crate::error::{MorphError, MorphResult};
use crate::geom::idx3d_to_vec3;
use crate::Vec3;

pub use lacunarity::lacunarity;

/// 体素的二维主成分投影掩膜.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    mask: Array2<bool>,
}

impl Projection {
    /// 由三维占据体素构造投影. 没有任何占据体素时返回 `None`.
    ///
    /// 主成分坐标取整时恰为 `.5` 的值舍入到偶数 (`round_ties_even`), 与 numpy 的 `round` 一致.
    pub fn from_volume(volume: ArrayView3<bool>) -> Option<Self> {
        let points: Vec<Vec3> = volume
            .indexed_iter()
            .filter_map(|(idx, &v)| v.then(|| idx3d_to_vec3(&idx)))
            .collect();
        if points.is_empty() {
            return None;
        }

        let pca = pca::Pca2::fit(&points);
        log::debug!("Principal axes {:?}", pca.components());
        let cells: Vec<(i64, i64)> = points
            .iter()
            .map(|p| {
                let (x, y) = pca.transform(p);
                (x.round_ties_even() as i64, y.round_ties_even() as i64)
            })
            .collect();

        // 以取整后的最小值平移, 保证索引非负.
        let (x_lo, x_hi) = cells.iter().map(|c| c.0).minmax().into_option()?;
        let (y_lo, y_hi) = cells.iter().map(|c| c.1).minmax().into_option()?;
        let shape = ((x_hi - x_lo + 1) as usize, (y_hi - y_lo + 1) as usize);
        let mut mask = Array2::from_elem(shape, false);
        for (x, y) in cells {
            mask[[(x - x_lo) as usize, (y - y_lo) as usize]] = true;
        }
        log::debug!("Projection mask of shape {shape:?} from {} voxel(s)", points.len());
        Some(Self { mask })
    }

    /// 投影掩膜.
    #[inline]
    pub fn mask(&self) -> ArrayView2<bool> {
        self.mask.view()
    }

    /// 占据像素数.
    pub fn area(&self) -> usize {
        self.mask.iter().filter(|&&v| v).count()
    }

    /// 投影掩膜的凸包.
    pub fn convex_hull(&self) -> Array2<bool> {
        hull::convex_hull_mask(self.mask.view())
    }

    /// 各尺度的 lacunarity, 与 `box_sizes` 一一对应.
    pub fn lacunarity_per_scale(&self, box_sizes: &[usize]) -> Vec<f64> {
        lacunarity::lacunarity_per_scale(self.mask.view(), box_sizes)
    }
}

/// 计算二维投影面积, 返回投影供后续步骤使用. 体素全空时返回 `MorphError::EmptyVolume`.
pub fn set_projection_area(dag: &mut Dag, volume: ArrayView3<bool>) -> MorphResult<Projection> {
    let projection = Projection::from_volume(volume).ok_or(MorphError::EmptyVolume)?;
    dag.props_mut().vascular_network_projection_area = Some(projection.area());
    Ok(projection)
}

/// 计算凸包面积和血管密度 `投影面积 / 凸包面积`.
pub fn set_vascular_density(dag: &mut Dag, projection: &Projection) {
    let area = projection.area();
    let explant = projection.convex_hull().iter().filter(|&&v| v).count();
    let props = dag.props_mut();
    props.vascular_network_projection_area = Some(area);
    props.projection_explant_area = Some(explant);
    // 凸包覆盖全部占据像素, 非空投影的凸包面积不为 0.
    props.vascular_density = (explant > 0).then(|| area as f64 / explant as f64);
}

/// 计算多尺度平均 lacunarity.
pub fn set_lacunarity(dag: &mut Dag, projection: &Projection, box_sizes: &[usize]) {
    let value = lacunarity(projection.mask(), box_sizes);
    dag.props_mut().lacunarity = Some(value);
}

/// 依次计算投影面积、血管密度和 lacunarity. 返回投影掩膜.
pub fn set_projection_stats(
    dag: &mut Dag,
    volume: ArrayView3<bool>,
    box_sizes: &[usize],
) -> MorphResult<Projection> {
    let projection = set_projection_area(dag, volume)?;
    set_vascular_density(dag, &projection);
    set_lacunarity(dag, &projection, box_sizes);
    Ok(projection)
}
