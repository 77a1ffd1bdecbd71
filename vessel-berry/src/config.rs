//! 形态学计算参数.
//!
//! 默认值取自 [`crate::consts`]. 可以通过环境变量逐项覆盖:
//!
//! | 变量 | 含义 | 格式 |
//! |---|---|---|
//! | `$VESSEL_MAX_GENERATION` | 最大代数 | 整数 |
//! | `$VESSEL_MAX_ANGLE_DEG` | 同代最大分叉角 | 角度 |
//! | `$VESSEL_MAX_THICKNESS_RATIO` | 同代最小半径比例 | 实数 |
//! | `$VESSEL_DIRECTION_WEIGHTS` | 切向估计权重 | 逗号分隔实数 |
//! | `$VESSEL_BOX_SIZES` | lacunarity 盒子边长 | 逗号分隔整数 |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{env, DEFAULT_BOX_SIZES, DEFAULT_DIRECTION_WEIGHTS};
use crate::error::ConfigError;
use crate::generation::GenerationRule;

/// 全部可调参数.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// 边端点切向估计权重, 从端点向内依次使用.
    pub direction_weights: Vec<f64>,
    /// 代数划分规则.
    pub generation: GenerationRule,
    /// lacunarity 盒子边长 (像素).
    pub box_sizes: Vec<usize>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            direction_weights: DEFAULT_DIRECTION_WEIGHTS.to_vec(),
            generation: GenerationRule::default(),
            box_sizes: DEFAULT_BOX_SIZES.to_vec(),
        }
    }
}

impl MorphConfig {
    /// 默认参数, 并由环境变量覆盖. 结果已经过 [`MorphConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 与 [`MorphConfig::from_env`] 相同, 但从 `lookup` 读取变量.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let rule = &mut config.generation;
        if let Some(v) = parse_one(&lookup, env::MAX_GENERATION)? {
            rule.max_generation = v;
        }
        if let Some(v) = parse_one::<f64, _>(&lookup, env::MAX_ANGLE_DEG)? {
            rule.max_angle = v.to_radians();
        }
        if let Some(v) = parse_one(&lookup, env::MAX_THICKNESS_RATIO)? {
            rule.max_thickness_ratio = v;
        }
        if let Some(v) = parse_list(&lookup, env::DIRECTION_WEIGHTS)? {
            config.direction_weights = v;
        }
        if let Some(v) = parse_list(&lookup, env::BOX_SIZES)? {
            config.box_sizes = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// 检查参数是否合法.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.direction_weights.is_empty() {
            return Err(ConfigError::EmptyWeights);
        }
        if let Some(&w) = self
            .direction_weights
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(ConfigError::InvalidWeight(w));
        }
        if self.direction_weights.iter().sum::<f64>() == 0.0 {
            return Err(ConfigError::ZeroWeightSum);
        }

        let rule = &self.generation;
        if !(rule.max_angle > 0.0 && rule.max_angle <= std::f64::consts::PI) {
            return Err(ConfigError::InvalidAngle(rule.max_angle));
        }
        if !(rule.max_thickness_ratio.is_finite() && rule.max_thickness_ratio > 0.0) {
            return Err(ConfigError::InvalidThicknessRatio(rule.max_thickness_ratio));
        }

        if self.box_sizes.is_empty() {
            return Err(ConfigError::EmptyBoxSizes);
        }
        if self.box_sizes.contains(&0) {
            return Err(ConfigError::ZeroBoxSize);
        }
        Ok(())
    }
}

fn env_error(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Env {
        key,
        value: value.to_owned(),
    }
}

/// 读取单个值. 变量不存在或为空白时返回 `Ok(None)`.
fn parse_one<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| env_error(key, &v)),
        _ => Ok(None),
    }
}

/// 读取逗号分隔的列表.
fn parse_list<T, F>(lookup: &F, key: &'static str) -> Result<Option<Vec<T>>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .split(',')
            .map(|s| s.trim().parse())
            .collect::<Result<Vec<T>, _>>()
            .map(Some)
            .map_err(|_| env_error(key, &v)),
        _ => Ok(None),
    }
}
