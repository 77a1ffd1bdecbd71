//! 血管树文件与三维重建文件的读写.
//!
//! 血管树文件是 [`DagRecord`] 的 bincode 编码, 外层再做 zlib 压缩.
//! 三维重建文件是 numpy 的 `.npy` 格式, 任意非零体素均视为前景.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::Array3;
use ndarray_npy::{read_npy, ReadNpyError};

use super::{Dag, DagRecord};
use crate::error::{GraphLoadError, SaveError};

/// 从 `path` 加载血管树, 并校验其结构.
pub fn load_dag<P: AsRef<Path>>(path: P) -> Result<Dag, GraphLoadError> {
    let file = File::open(path.as_ref())?;
    let d = ZlibDecoder::new(BufReader::new(file));
    let record: DagRecord = bincode::deserialize_from(d)?;
    let dag = Dag::try_from(record)?;
    log::debug!(
        "Loaded {} nodes / {} edges from {}",
        dag.len_nodes(),
        dag.len_edges(),
        path.as_ref().display()
    );
    Ok(dag)
}

/// 将血管树 (包括全部已计算属性) 写入 `path`. 已存在的文件会被覆盖.
pub fn save_dag<P: AsRef<Path>>(dag: &Dag, path: P) -> Result<(), SaveError> {
    let file = File::create(path.as_ref())?;
    let mut e = ZlibEncoder::new(BufWriter::new(file), Compression::best());
    bincode::serialize_into(&mut e, &dag.to_record())?;
    e.finish()?.flush()?;
    log::debug!("Saved graph to {}", path.as_ref().display());
    Ok(())
}

/// 从 `.npy` 文件加载三维重建体素, 返回前景掩膜.
///
/// 先尝试以 `u8` 读取, 数据类型不符时再以 `bool` 读取.
pub fn load_reconstruction<P: AsRef<Path>>(path: P) -> Result<Array3<bool>, GraphLoadError> {
    let path = path.as_ref();
    let volume = match read_npy::<_, Array3<u8>>(path) {
        Ok(v) => v.mapv(|p| p != 0),
        Err(ReadNpyError::WrongDescriptor(_)) => read_npy::<_, Array3<bool>>(path)?,
        Err(e) => return Err(e.into()),
    };
    log::debug!("Loaded reconstruction {:?}", volume.dim());
    Ok(volume)
}
