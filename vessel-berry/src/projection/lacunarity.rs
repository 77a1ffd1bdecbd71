//! 多尺度盒计数 lacunarity.
//!
//! 对每个盒子尺寸 `s`, 用 `s x s` 的全 1 核对掩膜做 valid 模式卷积, 得到每个窗口内的
//! 占据像素数 `S`. 该尺度的 lacunarity 为 `Var(S) / Mean(S)^2 + 1`, 均值为 0 时记为 0.
//! 最终结果为全部尺度的算术平均.
//!
//! 盒子在两个方向上都不小于掩膜时, 卷积交换两个输入, 唯一的窗口覆盖整个掩膜: 非空掩膜为 1,
//! 空掩膜为 0. 只在一个方向上超出掩膜时没有 valid 窗口, 记为 0.
//!
//! 窗口和通过积分图 (summed-area table) 得到, 全程整数运算, 与卷积结果精确一致.

use ndarray::{Array2, ArrayView2};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
    }
}

/// 掩膜的积分图, 形状为 `(h + 1, w + 1)`, 首行首列为 0.
fn summed_area(mask: ArrayView2<bool>) -> Array2<u64> {
    let (h, w) = mask.dim();
    let mut table = Array2::<u64>::zeros((h + 1, w + 1));
    for r in 0..h {
        let mut row_sum = 0;
        for c in 0..w {
            row_sum += u64::from(mask[[r, c]]);
            table[[r + 1, c + 1]] = table[[r, c + 1]] + row_sum;
        }
    }
    table
}

/// 单一尺度的 lacunarity.
fn box_lacunarity(table: &Array2<u64>, size: usize) -> f64 {
    let (h, w) = (table.nrows() - 1, table.ncols() - 1);
    if size == 0 {
        return 0.0;
    }
    if size >= h && size >= w {
        // 盒子覆盖整个掩膜, 单一窗口, 方差为 0.
        return if table[[h, w]] > 0 { 1.0 } else { 0.0 };
    }
    if size > h || size > w {
        return 0.0;
    }

    let mut sum = 0u128;
    let mut sum_sq = 0u128;
    for r in 0..=h - size {
        for c in 0..=w - size {
            let s = table[[r + size, c + size]] + table[[r, c]]
                - table[[r, c + size]]
                - table[[r + size, c]];
            sum += u128::from(s);
            sum_sq += u128::from(s) * u128::from(s);
        }
    }
    if sum == 0 {
        return 0.0;
    }

    // Var / Mean^2 = (n * sum_sq - sum^2) / sum^2, 分子为精确整数.
    let n = ((h - size + 1) * (w - size + 1)) as u128;
    let numerator = n * sum_sq - sum * sum;
    numerator as f64 / (sum * sum) as f64 + 1.0
}

/// 各尺度 lacunarity, 与 `box_sizes` 一一对应.
pub(crate) fn lacunarity_per_scale(mask: ArrayView2<bool>, box_sizes: &[usize]) -> Vec<f64> {
    let table = summed_area(mask);
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            box_sizes.par_iter().map(|&s| box_lacunarity(&table, s)).collect()
        } else {
            box_sizes.iter().map(|&s| box_lacunarity(&table, s)).collect()
        }
    }
}

/// 全部尺度 lacunarity 的平均值. `box_sizes` 为空时返回 0.
pub fn lacunarity(mask: ArrayView2<bool>, box_sizes: &[usize]) -> f64 {
    if box_sizes.is_empty() {
        return 0.0;
    }
    let values = lacunarity_per_scale(mask, box_sizes);
    values.iter().sum::<f64>() / values.len() as f64
}
