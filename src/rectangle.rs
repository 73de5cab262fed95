use derive_more::Display;
use serde::{Deserialize, Serialize};

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// 所有比较均采用标准 IEEE 双精度语义，区间为闭区间：
/// 边缘相接的两个矩形视为相交。
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[display(
    fmt = "[{}, {}, {}, {}]",
    "self.min[0]",
    "self.min[1]",
    "self.max[0]",
    "self.max[1]"
)]
pub struct Rectangle {
    pub min: [f64; 2], // [x_min, y_min]
    pub max: [f64; 2], // [x_max, y_max]
}

impl Rectangle {
    /// 空矩形 - 并集运算的单位元
    ///
    /// 任何矩形与空矩形求并集都得到其自身
    pub const EMPTY: Rectangle = Rectangle {
        min: [f64::INFINITY, f64::INFINITY],
        max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
    };

    /// 创建新的矩形
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        }
    }

    /// 创建一个点矩形
    pub fn from_point(x: f64, y: f64) -> Self {
        Rectangle {
            min: [x, y],
            max: [x, y],
        }
    }

    /// 检查矩形是否可用作数据条目的边界框
    ///
    /// 要求四个坐标均为有限值，且 min <= max
    pub fn is_valid(&self) -> bool {
        self.min[0].is_finite()
            && self.min[1].is_finite()
            && self.max[0].is_finite()
            && self.max[1].is_finite()
            && self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1]
    }

    /// 计算矩形面积
    pub fn area(&self) -> f64 {
        (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
    }

    /// 计算矩形的半周长（宽 + 高）
    ///
    /// 分裂算法用它评估各种分布方案的紧凑程度
    pub fn margin(&self) -> f64 {
        (self.max[0] - self.min[0]) + (self.max[1] - self.min[1])
    }

    /// 计算两个矩形的并集MBR
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
            ],
        }
    }

    /// 原地扩大矩形以包含另一个矩形
    pub fn extend(&mut self, other: &Rectangle) {
        self.min[0] = self.min[0].min(other.min[0]);
        self.min[1] = self.min[1].min(other.min[1]);
        self.max[0] = self.max[0].max(other.max[0]);
        self.max[1] = self.max[1].max(other.max[1]);
    }

    /// 计算两个矩形并集的面积（不修改任何一方）
    pub fn enlarged_area(&self, other: &Rectangle) -> f64 {
        (self.max[0].max(other.max[0]) - self.min[0].min(other.min[0]))
            * (self.max[1].max(other.max[1]) - self.min[1].min(other.min[1]))
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    pub fn enlargement(&self, other: &Rectangle) -> f64 {
        self.enlarged_area(other) - self.area()
    }

    /// 计算两个矩形的交集面积，不相交时为 0
    pub fn intersection_area(&self, other: &Rectangle) -> f64 {
        let x_overlap = self.max[0].min(other.max[0]) - self.min[0].max(other.min[0]);
        let y_overlap = self.max[1].min(other.max[1]) - self.min[1].max(other.min[1]);

        x_overlap.max(0.0) * y_overlap.max(0.0)
    }

    /// 判断当前矩形是否包含另一个矩形（闭区间，相等也算包含）
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.min[0] <= other.min[0]
            && self.min[1] <= other.min[1]
            && self.max[0] >= other.max[0]
            && self.max[1] >= other.max[1]
    }

    /// 判断两个矩形是否相交（闭区间，共享边界也算相交）
    pub fn intersects(&self, other: &Rectangle) -> bool {
        other.min[0] <= self.max[0]
            && other.min[1] <= self.max[1]
            && other.max[0] >= self.min[0]
            && other.max[1] >= self.min[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect.min, [0.0, 0.0]);
        assert_eq!(rect.max, [10.0, 10.0]);
        assert!(rect.is_valid());
    }

    #[test]
    fn test_rectangle_validity() {
        // min > max 的矩形不可用
        assert!(!Rectangle::new(5.0, 0.0, 0.0, 10.0).is_valid());
        // 非有限坐标不可用
        assert!(!Rectangle::new(0.0, f64::NAN, 1.0, 1.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, f64::INFINITY, 1.0).is_valid());
        // 空矩形也不可用作数据条目
        assert!(!Rectangle::EMPTY.is_valid());
        // 点矩形可用
        assert!(Rectangle::from_point(3.0, 4.0).is_valid());
    }

    #[test]
    fn test_rectangle_area_and_margin() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(rect.area(), 50.0);
        assert_eq!(rect.margin(), 15.0);
    }

    #[test]
    fn test_rectangle_union() {
        let rect1 = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        let rect2 = Rectangle::new(3.0, 3.0, 8.0, 8.0);
        let union = rect1.union(&rect2);
        assert_eq!(union, Rectangle::new(0.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn test_empty_is_union_identity() {
        let rect = Rectangle::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Rectangle::EMPTY.union(&rect), rect);

        let mut extended = Rectangle::EMPTY;
        extended.extend(&rect);
        assert_eq!(extended, rect);
    }

    #[test]
    fn test_rectangle_extend() {
        let mut rect = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        rect.extend(&Rectangle::new(3.0, 3.0, 8.0, 8.0));
        assert_eq!(rect, Rectangle::new(0.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn test_rectangle_intersects() {
        let rect1 = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        let rect2 = Rectangle::new(3.0, 3.0, 8.0, 8.0);
        let rect3 = Rectangle::new(10.0, 10.0, 15.0, 15.0);

        assert!(rect1.intersects(&rect2));
        assert!(!rect1.intersects(&rect3));

        // 闭区间语义：只在边缘相接也算相交
        let touching = Rectangle::new(5.0, 0.0, 10.0, 5.0);
        assert!(rect1.intersects(&touching));
        let corner = Rectangle::new(5.0, 5.0, 6.0, 6.0);
        assert!(rect1.intersects(&corner));
    }

    #[test]
    fn test_rectangle_contains() {
        let rect1 = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let rect2 = Rectangle::new(2.0, 2.0, 8.0, 8.0);
        let rect3 = Rectangle::new(5.0, 5.0, 15.0, 15.0);

        assert!(rect1.contains(&rect2));
        assert!(!rect1.contains(&rect3));
        // 相等也算包含
        assert!(rect1.contains(&rect1));
    }

    #[test]
    fn test_rectangle_enlargement() {
        let rect1 = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        let rect2 = Rectangle::new(3.0, 3.0, 8.0, 8.0);
        assert_eq!(rect1.enlarged_area(&rect2), 64.0);
        assert_eq!(rect1.enlargement(&rect2), 39.0); // 8*8 - 5*5 = 64 - 25 = 39

        // enlarged_area 不得修改参与计算的矩形
        assert_eq!(rect1, Rectangle::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_rectangle_intersection_area() {
        let rect1 = Rectangle::new(0.0, 0.0, 5.0, 5.0);
        let rect2 = Rectangle::new(3.0, 3.0, 8.0, 8.0);
        assert_eq!(rect1.intersection_area(&rect2), 4.0);

        // 不相交时被钳制为 0，而不是负数
        let rect3 = Rectangle::new(10.0, 10.0, 15.0, 15.0);
        assert_eq!(rect1.intersection_area(&rect3), 0.0);
    }

    #[test]
    fn test_rectangle_display() {
        let rect = Rectangle::new(0.0, 1.0, 2.0, 3.0);
        assert_eq!(format!("{}", rect), "[0, 1, 2, 3]");
    }
}
