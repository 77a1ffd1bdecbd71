//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Vec3};

pub use crate::dag::{load_dag, load_reconstruction, save_dag, Dag, EdgeId, NodeId, Tortuosity};
pub use crate::{EdgeProps, GraphProps};

pub use crate::config::MorphConfig;
pub use crate::generation::GenerationRule;
pub use crate::pipeline::Pipeline;
pub use crate::projection::Projection;

pub use crate::consts::{DEFAULT_BOX_SIZES, DEFAULT_DIRECTION_WEIGHTS, DEFAULT_MAX_GENERATION};

pub use crate::dataset::{data_dir_from_env_or_home, home_dataset_dir_with, Specimen};

pub use crate::error::{MorphError, MorphResult};
