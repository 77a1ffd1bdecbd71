//! 按固定顺序执行全部计算步骤.
//!
//! 每一步读取之前步骤写入的属性, 因此顺序不可调换:
//!
//! 1. 边质心, 端点切向, 分叉角, 扭曲度;
//! 2. 代数划分;
//! 3. 血管条数与长度, 结构体积, 间质距离;
//! 4. (仅当提供三维重建时) 投影面积, 血管密度, 分叉指数, lacunarity.

use ndarray::ArrayView3;

use crate::dag::Dag;
use crate::error::{ConfigError, MorphResult};
use crate::projection::{self, Projection};
use crate::{aggregate, descriptor, generation, interstitial, MorphConfig};

/// 经过校验的计算流程. 默认使用 [`MorphConfig::default`].
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: MorphConfig,
}

impl Pipeline {
    /// 校验参数并创建流程.
    pub fn new(config: MorphConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 使用的参数.
    #[inline]
    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// 对 `dag` 执行全部步骤. 提供 `volume` 时额外计算投影相关参数, 并返回投影掩膜.
    ///
    /// 重复执行会覆盖之前的结果.
    pub fn run(
        &self,
        dag: &mut Dag,
        volume: Option<ArrayView3<bool>>,
    ) -> MorphResult<Option<Projection>> {
        let config = &self.config;

        log::info!("Calculating centroid of edges...");
        descriptor::set_centroids(dag);

        log::info!("Calculating edge directions...");
        descriptor::set_directions(dag, &config.direction_weights);

        log::info!("Calculating edges relative angles (bifurcation angles)...");
        descriptor::set_relative_angles(dag)?;

        log::info!("Calculating tortuosity...");
        descriptor::set_tortuosities(dag);

        log::info!("Calculating generations...");
        generation::assign_generations(dag, &config.generation)?;

        log::info!("Calculating number of vessels and vessel length...");
        aggregate::set_vessel_stats(dag);

        log::info!("Calculating vascular structure volume...");
        aggregate::set_structure_volume(dag);

        log::info!("Calculating interstitial distances...");
        interstitial::set_interstitial_distances(dag)?;

        let Some(volume) = volume else {
            log::info!("No reconstruction given, skipping projection parameters");
            return Ok(None);
        };

        log::info!("Calculating vascular network projection area...");
        let projection = projection::set_projection_area(dag, volume)?;

        log::info!("Calculating vascular density...");
        projection::set_vascular_density(dag, &projection);

        log::info!("Calculating branching index...");
        aggregate::set_branching_index(dag)?;

        log::info!("Calculating lacunarity...");
        projection::set_lacunarity(dag, &projection, &config.box_sizes);

        Ok(Some(projection))
    }
}
