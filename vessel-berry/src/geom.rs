//! 三维实向量的基础运算.
//!
//! 体素坐标以 `Idx3d` 表示, 参与计算前统一转换为 `Vec3`.

use crate::{Idx3d, Vec3};

/// `Idx3d` -> `Vec3`
#[inline]
pub(crate) fn idx3d_to_vec3((z, h, w): &Idx3d) -> Vec3 {
    [*z as f64, *h as f64, *w as f64]
}

/// `a - b`
#[inline]
pub(crate) fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// `k * a`
#[inline]
pub(crate) fn scale(a: &Vec3, k: f64) -> Vec3 {
    [a[0] * k, a[1] * k, a[2] * k]
}

/// `acc += k * a`
#[inline]
pub(crate) fn add_scaled(acc: &mut Vec3, a: &Vec3, k: f64) {
    acc[0] += a[0] * k;
    acc[1] += a[1] * k;
    acc[2] += a[2] * k;
}

/// 点积.
#[inline]
pub(crate) fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 欧几里得范数.
#[inline]
pub(crate) fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// 两点间欧几里得距离.
#[inline]
pub(crate) fn distance(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub(a, b))
}
