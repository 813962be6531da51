//! 标签切片的持久化存储.

use super::MaskSlice;
use crate::consts::gray::{BLACK, DARK_GRAY, WHITE};
use crate::consts::label::{is_background, U8_MAX_LABEL};
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 标签值通常很小且彼此接近, 直接保存时肉眼几乎无法区分.
/// 因此保存时背景映射为黑色, 各标签均匀分布在暗灰色到白色之间.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// 标签值按原样写入单通道 8-bit 图像, 因此标签不能超过 255.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使标签更有利于单通道可视化. `num_labels` 为标签总数.
#[inline]
pub(crate) fn pretty(label: u32, num_labels: u32) -> u8 {
    if is_background(label) {
        return BLACK;
    }
    if num_labels <= 1 {
        return WHITE;
    }
    // 标签 1 (最大连通域) 最亮.
    let span = (WHITE - DARK_GRAY) as u64;
    let step = (label.min(num_labels) - 1) as u64 * span / (num_labels - 1) as u64;
    WHITE - step as u8
}

impl ImgWriteVis for MaskSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let num_labels = self.num_labels();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &l) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pretty(l, num_labels)]));
        }
        buf.save(path)
    }
}

impl ImgWriteRaw for MaskSlice<'_> {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &l) in self.indexed_iter() {
            if l > U8_MAX_LABEL {
                return Err(ImageError::Parameter(ParameterError::from_kind(
                    ParameterErrorKind::Generic(format!("标签 `{l}` 超出单字节范围")),
                )));
            }
            buf.put_pixel(w as u32, h as u32, image::Luma([l as u8]));
        }
        buf.save(path)
    }
}
