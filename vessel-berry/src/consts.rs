//! 通用常量.

/// 估计边端点切向时使用的默认权重. 越靠近端点的体素权重越大.
pub const DEFAULT_DIRECTION_WEIGHTS: [f64; 9] = [1.0, 1.0, 1.0, 1.0, 1.0, 0.8, 0.8, 0.6, 0.2];

/// 默认最大代数. 超过该代数的边统一归入 `DEFAULT_MAX_GENERATION + 1` 代.
pub const DEFAULT_MAX_GENERATION: u32 = 8;

/// 子边与父边同属一代时允许的最大分叉角 (弧度), 即 30 度.
pub const DEFAULT_MAX_ANGLE: f64 = std::f64::consts::FRAC_PI_6;

/// 子边与父边同属一代时, 子边平均半径相对父边平均半径的最小比例.
pub const DEFAULT_MAX_THICKNESS_RATIO: f64 = 0.7;

/// 计算 lacunarity 时默认使用的盒子边长 (像素).
pub const DEFAULT_BOX_SIZES: [usize; 8] = [10, 30, 50, 70, 90, 110, 130, 150];

/// 样本目录下的文件名.
pub mod files {
    /// 血管树文件.
    pub const DAG_FILE: &str = "dag.bin";

    /// 三维重建体素文件 (可选).
    pub const RECONSTRUCTION_FILE: &str = "reconstruction.npy";

    /// 计算完毕后写回的血管树文件.
    pub const OUTPUT_FILE: &str = "dag_with_stats.bin";
}

/// 环境变量名.
pub mod env {
    /// 样本根目录.
    pub const DATA_DIR: &str = "VESSEL_DATA_DIR";

    /// 最大代数.
    pub const MAX_GENERATION: &str = "VESSEL_MAX_GENERATION";

    /// 同代最大分叉角, 以角度 (而非弧度) 表示.
    pub const MAX_ANGLE_DEG: &str = "VESSEL_MAX_ANGLE_DEG";

    /// 同代最小半径比例.
    pub const MAX_THICKNESS_RATIO: &str = "VESSEL_MAX_THICKNESS_RATIO";

    /// 切向估计权重, 以逗号分隔.
    pub const DIRECTION_WEIGHTS: &str = "VESSEL_DIRECTION_WEIGHTS";

    /// lacunarity 盒子边长, 以逗号分隔.
    pub const BOX_SIZES: &str = "VESSEL_BOX_SIZES";
}
