//! 通用常量.

/// 标签值.
pub mod label {
    /// 标签体数据中, 背景 (或被抹去的连通域) 的值.
    pub const BACKGROUND: u32 = 0;

    /// 单字节标签体数据能容纳的最大标签值.
    pub const U8_MAX_LABEL: u32 = u8::MAX as u32;

    /// 标签是否为背景?
    #[inline]
    pub const fn is_background(l: u32) -> bool {
        matches!(l, BACKGROUND)
    }

    /// 标签是否为前景 (某个连通域)?
    #[inline]
    pub const fn is_foreground(l: u32) -> bool {
        !is_background(l)
    }
}

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;
}

/// 体素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// 值等于背景值的体素.
    Background,

    /// 值不等于背景值的体素, 参与连通域计算.
    Foreground,
}

impl ElemType {
    /// 根据体素值与背景值判断体素类型.
    ///
    /// 浮点 `NaN` 与任何值都不相等, 因此总被视为前景.
    #[inline]
    pub fn classify<T: PartialEq>(value: T, background: T) -> Self {
        if value == background {
            Self::Background
        } else {
            Self::Foreground
        }
    }

    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// 是否为背景.
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.is_foreground()
    }
}

#[cfg(test)]
mod tests {
    use super::ElemType;

    #[test]
    fn test_classify() {
        assert!(ElemType::classify(0u8, 0).is_background());
        assert!(ElemType::classify(3i16, 0).is_foreground());
        assert!(ElemType::classify(-1.0f32, -1.0).is_background());
        // NaN 不等于自身.
        assert!(ElemType::classify(f64::NAN, f64::NAN).is_foreground());
    }
}
