//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::{DynVolume, ImgWriteRaw, ImgWriteVis, LabelMask, MaskSlice, Volume};
pub use crate::dispatch::{Scalar, ScalarType, VolumeVisitor, VolumeVisitorMut};
pub use crate::{LabelError, LabelResult};

pub use crate::consts::label::BACKGROUND;
pub use crate::consts::ElemType;

pub use crate::labeling::{label, label_dyn, label_with, LabelSpec};
pub use crate::shape::{extract_components, ComponentRecord};

#[cfg(feature = "rayon")]
pub use crate::shape::par_extract_components;

pub use crate::points::{Landmarks, Point, PointList};
pub use crate::route::{compute_centroids, compute_centroids_with, CentroidSpec, PlanePartition};
