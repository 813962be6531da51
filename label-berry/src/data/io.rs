//! nifti 文件读取.

use std::path::Path;

use ndarray::{Array3, ArrayD, ErrorKind, ShapeError};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use super::{DynVolume, Volume};
use crate::{LabelResult, ScalarType};

/// 将 nifti 的 `[x, y, z]` 数据转换为 `(z, y, x)` 标准布局.
fn into_zyx<T: Clone>(data: ArrayD<T>) -> LabelResult<Array3<T>> {
    if data.ndim() != 3 {
        return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
    }
    // hint: 原第一维 (x) 变化最快.
    let data = data.permuted_axes([2, 1, 0].as_slice());
    let sh = (data.shape()[0], data.shape()[1], data.shape()[2]);
    let buf = data.as_standard_layout().into_owned().into_raw_vec();
    Ok(Array3::from_shape_vec(sh, buf)?)
}

macro_rules! load_as {
    ($obj: expr, $t: ty) => {{
        let data = $obj.into_volume().into_ndarray::<$t>()?;
        DynVolume::from(Volume::new(into_zyx(data)?))
    }};
}

impl DynVolume {
    /// 打开 nii 文件格式的三维体数据. `path` 为 nii 文件的本地路径.
    ///
    /// 元素类型由文件头的 `datatype` 决定. 如果文件读取失败、
    /// 类型不受支持 (如 64 位整数、复数、RGB) 或数据不是三维的, 返回 `Err`.
    /// 背景值为 0, landmarks 为空.
    pub fn open<P: AsRef<Path>>(path: P) -> LabelResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let tag = ScalarType::try_from(obj.header().data_type()?)?;
        log::debug!("读取 {:?}: 元素类型 {tag}", path.as_ref());

        let volume = match tag {
            ScalarType::I8 => load_as!(obj, i8),
            ScalarType::U8 => load_as!(obj, u8),
            ScalarType::I16 => load_as!(obj, i16),
            ScalarType::U16 => load_as!(obj, u16),
            ScalarType::I32 => load_as!(obj, i32),
            ScalarType::U32 => load_as!(obj, u32),
            ScalarType::F32 => load_as!(obj, f32),
            ScalarType::F64 => load_as!(obj, f64),
        };
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::into_zyx;
    use crate::data::test_utils::scratch_path;
    use crate::labeling::label_dyn;
    use crate::{DynVolume, LabelError, ScalarType};
    use ndarray::{Array, Array3, IxDyn, ShapeBuilder};
    use nifti::writer::WriterOptions;

    #[test]
    fn test_into_zyx() {
        // nifti 数据按 Fortran 顺序排列, x 变化最快.
        let buf: Vec<u8> = (0..6).collect();
        let xyz = Array::from_shape_vec(IxDyn(&[3, 2, 1]).f(), buf).unwrap();
        let zyx = into_zyx(xyz.clone()).unwrap();
        assert!(zyx.is_standard_layout());
        assert_eq!(zyx.dim(), (1, 2, 3));
        for ((z, y, x), v) in zyx.indexed_iter() {
            assert_eq!(*v, xyz[IxDyn(&[x, y, z])]);
        }
        assert_eq!(zyx.as_slice().unwrap(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_into_zyx_rejects_4d() {
        let d = Array::<u8, _>::zeros(IxDyn(&[1, 1, 1, 1]));
        assert!(into_zyx(d).is_err());
    }

    /// 两个相对的角点体素. 轴无论如何排列, 它们都仍是互不相邻的角点.
    fn corners<T: num::Zero + Clone>(a: T, b: T) -> Array3<T> {
        let mut data = Array3::zeros((3, 3, 3));
        data[(0, 0, 0)] = a;
        data[(2, 2, 2)] = b;
        data
    }

    #[test]
    fn test_open_i16() {
        let path = scratch_path("open-i16.nii");
        WriterOptions::new(&path).write_nifti(&corners(7i16, -3)).unwrap();

        let volume = DynVolume::open(&path).unwrap();
        assert_eq!(volume.scalar_type(), ScalarType::I16);
        assert_eq!(volume.shape(), (3, 3, 3));
        assert!(volume.landmarks().points().is_empty());

        let mask = label_dyn(&volume, 255);
        assert_eq!(mask.num_labels(), 2);
        assert_eq!(mask.foreground_count(), 2);

        let DynVolume::I16(v) = volume else {
            panic!("类型不符");
        };
        let mut values: Vec<i16> = v.data().iter().copied().filter(|&x| x != 0).collect();
        values.sort_unstable();
        assert_eq!(values, vec![-3, 7]);
    }

    #[test]
    fn test_open_f32() {
        let path = scratch_path("open-f32.nii");
        WriterOptions::new(&path).write_nifti(&corners(0.5f32, 2.0)).unwrap();

        let volume = DynVolume::open(&path).unwrap();
        assert!(matches!(volume, DynVolume::F32(_)));
        assert_eq!(label_dyn(&volume, 1).foreground_count(), 1);
    }

    #[test]
    fn test_open_unsupported_type() {
        let path = scratch_path("open-u64.nii");
        WriterOptions::new(&path).write_nifti(&corners(1u64, 2)).unwrap();

        let err = DynVolume::open(&path).unwrap_err();
        assert!(matches!(err, LabelError::UnsupportedType(_)));
    }
}
