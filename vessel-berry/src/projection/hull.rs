//! 二维掩膜的凸包.
//!
//! 每个像素视为边长为 1 的正方形, 对全部占据像素的四个角点求凸包 (`geo::ConvexHull`).
//! 坐标统一放大两倍, 使角点落在整数上: 像素 `(r, c)` 的中心为 `(2c, 2r)`,
//! 四个角点为 `(2c ± 1, 2r ± 1)`. 像素中心落在凸包内部或边界上即视为被凸包覆盖.

use geo::{BoundingRect, ConvexHull, Coord, Intersects, MultiPoint, Polygon};
use itertools::{Itertools, MinMaxResult};
use ndarray::{Array2, ArrayView2};

/// 放大两倍后的平面坐标 `(x, y)`, `x` 对应列, `y` 对应行. 数值均为小整数, `f64` 可精确表示.
type Point = (f64, f64);

/// 每行最左和最右的占据像素提供了凸包所需的全部角点.
fn corner_points(mask: ArrayView2<bool>) -> Vec<Point> {
    let mut corners = vec![];
    for (r, row) in mask.outer_iter().enumerate() {
        let span = row
            .indexed_iter()
            .filter_map(|(c, &v)| v.then_some(c))
            .minmax();
        let (first, last) = match span {
            MinMaxResult::NoElements => continue,
            MinMaxResult::OneElement(c) => (c, c),
            MinMaxResult::MinMax(a, b) => (a, b),
        };
        let y = 2.0 * r as f64;
        for x in [2.0 * first as f64 - 1.0, 2.0 * last as f64 + 1.0] {
            corners.push((x, y - 1.0));
            corners.push((x, y + 1.0));
        }
    }
    corners
}

/// 角点的凸包. 没有角点时返回 `None`.
fn hull_polygon(points: Vec<Point>) -> Option<Polygon<f64>> {
    if points.is_empty() {
        return None;
    }
    Some(MultiPoint::from(points).convex_hull())
}

/// 计算 `mask` 的凸包掩膜, 形状与 `mask` 相同. 空掩膜的凸包也为空.
pub(crate) fn convex_hull_mask(mask: ArrayView2<bool>) -> Array2<bool> {
    let Some(hull) = hull_polygon(corner_points(mask)) else {
        return Array2::from_elem(mask.raw_dim(), false);
    };
    let Some(rect) = hull.bounding_rect() else {
        return Array2::from_elem(mask.raw_dim(), false);
    };

    // 只需扫描凸包的包围盒. `Intersects` 把边界上的点也计入.
    let (lo, hi) = (rect.min(), rect.max());
    Array2::from_shape_fn(mask.raw_dim(), |(r, c)| {
        let p = Coord { x: 2.0 * c as f64, y: 2.0 * r as f64 };
        (lo.x..=hi.x).contains(&p.x) && (lo.y..=hi.y).contains(&p.y) && hull.intersects(&p)
    })
}
