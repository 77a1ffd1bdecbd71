//! 样本目录.
//!
//! 每个样本占据根目录下的一个子目录, 子目录名即样本编号:
//!
//! ```text
//! {根目录}/
//! ├── 3/
//! │   ├── dag.bin               血管树
//! │   ├── reconstruction.npy    三维重建 (可选)
//! │   └── dag_with_stats.bin    计算结果
//! └── 12/
//!     └── ...
//! ```

use std::env;
use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::consts::{env as env_key, files};
use crate::dag::{load_dag, load_reconstruction, save_dag, Dag};
use crate::error::{GraphLoadError, MorphResult};
use crate::pipeline::Pipeline;

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 获取样本根目录.
///
/// 1. 若环境变量 `$VESSEL_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/vessel`. 无法确定用户主目录时返回 `None`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(env_key::DATA_DIR) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["vessel"]),
    }
}

/// 单个样本.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specimen {
    id: String,
    dir: PathBuf,
}

impl Specimen {
    /// 根目录 `root` 下编号为 `id` 的样本. 不检查文件是否存在.
    pub fn new<P: AsRef<Path>, S: Into<String>>(root: P, id: S) -> Self {
        let id = id.into();
        let dir = root.as_ref().join(&id);
        Self { id, dir }
    }

    /// 列出 `root` 下全部含有血管树文件的样本, 按编号排序.
    ///
    /// 编号均为数字时按数值排序, 否则按字典序.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Vec<Self>, GraphLoadError> {
        let mut ans = vec![];
        for entry in std::fs::read_dir(root.as_ref())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
                log::warn!("Skipping non UTF-8 directory {:?}", entry.path());
                continue;
            };
            let specimen = Self::new(root.as_ref(), id);
            if specimen.dag_path().is_file() {
                ans.push(specimen);
            }
        }
        ans.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.id.cmp(&b.id),
        });
        Ok(ans)
    }

    /// 样本编号.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 样本目录.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 血管树文件路径.
    pub fn dag_path(&self) -> PathBuf {
        self.dir.join(files::DAG_FILE)
    }

    /// 三维重建文件路径.
    pub fn reconstruction_path(&self) -> PathBuf {
        self.dir.join(files::RECONSTRUCTION_FILE)
    }

    /// 计算结果路径.
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(files::OUTPUT_FILE)
    }

    /// 加载血管树.
    pub fn load_dag(&self) -> Result<Dag, GraphLoadError> {
        load_dag(self.dag_path())
    }

    /// 加载三维重建. 文件不存在时返回 `Ok(None)`.
    pub fn load_reconstruction(&self) -> Result<Option<Array3<bool>>, GraphLoadError> {
        let path = self.reconstruction_path();
        if !path.is_file() {
            return Ok(None);
        }
        load_reconstruction(path).map(Some)
    }

    /// 加载, 计算全部参数, 并将结果写入 [`Specimen::output_path`]. 返回计算后的血管树.
    pub fn process(&self, pipeline: &Pipeline) -> MorphResult<Dag> {
        log::info!("Loading graph file {}...", self.dag_path().display());
        let mut dag = self.load_dag()?;
        let volume = self.load_reconstruction()?;
        if let (Some(v), Some(shape)) = (&volume, dag.volume_shape()) {
            if v.dim() != shape {
                log::warn!(
                    "Specimen {}: reconstruction shape {:?} differs from graph volume {:?}",
                    self.id,
                    v.dim(),
                    shape
                );
            }
        }

        pipeline.run(&mut dag, volume.as_ref().map(|v| v.view()))?;
        save_dag(&dag, self.output_path())?;
        log::info!("Specimen {} done", self.id);
        Ok(dag)
    }
}
