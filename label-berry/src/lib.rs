#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对三维标量体数据做 26-连通域标记, 按连通域体积重标号,
//! 并提取各连通域的质心, 按需分发到调用方给出的点集 ("平面") 中.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 流水线
//!
//! ```text
//! DynVolume --(dispatch)--> Volume<T> --label--> LabelMask --extract--> ComponentRecord
//!                                                                 |
//!                                                         route_centroids
//!                                                                 v
//!                                              Landmarks / PlanePartition 点集
//! ```
//!
//! ### 标量类型分发 ✅
//!
//! 运行时类型标签 (`ScalarType`) 到泛型实现的闭集分发, 每次调用只分发一次.
//!
//! 实现位于 `label-berry/src/dispatch.rs`.
//!
//! ### 连通域标记 & 重标号 ✅
//!
//! 基于行程编码 (run-length) 的并查集实现, 26-连通. 标记后强制将背景体素清零,
//! 然后按体积降序重新编号, 超过上限的连通域被抹去.
//!
//! 实现位于 `label-berry/src/labeling`.
//!
//! ### 质心与形状信息 ✅
//!
//! 实现位于 `label-berry/src/shape`.
//!
//! ### 质心分发 ✅
//!
//! 默认模式写入体数据自带的 landmarks, 分区模式写入各平面点集 (允许一对多).
//!
//! 实现位于 `label-berry/src/route.rs`.
//!
//! # 注意
//!
//! 1. 所有坐标均为索引空间坐标, 不做物理间距换算.
//! 2. 索引元组按 `(z, y, x)` 顺序, 但质心坐标按 `[x, y, z]` 顺序给出.

/// 三维索引, 按 `(z, y, x)` 排列, 即 `(切片, 高, 宽)`.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

mod error;

pub use error::{LabelError, LabelResult};

pub mod dispatch;

pub use dispatch::{
    invoke, invoke_by_name, Scalar, ScalarOp, ScalarType, VolumeVisitor, VolumeVisitorMut,
};

/// 体数据, 标签体数据与 landmarks.
mod data;

pub use data::{DynVolume, ImgWriteRaw, ImgWriteVis, LabelMask, MaskSlice, Volume};

pub mod neighbour;

pub mod labeling;

pub mod shape;

pub mod points;

pub use points::{Landmarks, Point, PointList};

pub mod route;

pub mod prelude;
