//! # rtree2d — 二维空间索引数据结构
//!
//! 一个存储轴对齐边界框并支持范围相交与碰撞查询的内存 R-tree。
//! 插入使用最小面积扩张的子树选择，节点分裂采用 R*-tree 风格的
//! 轴选择与分布选择（Beckmann 等人，1990），删除只做自下而上的
//! 空节点剪除，所有操作都接近 O(log n)。
//!
//! ## 主要特性
//!
//! - 面向二维边界框的高效范围查询与碰撞测试
//! - 条目句柄配合父节点反向引用，删除和更新无需重新搜索
//! - 小幅移动的 `update` 快速路径，不触发任何树结构调整
//! - 可配置的节点容量（默认 M=9，m=4）
//! - 支持并发安全访问（同步和异步包装）
//!
//! ## 使用示例
//!
//! ### 基础用法
//! ```rust
//! use rtree2d::{RTree, Rectangle};
//!
//! let mut tree = RTree::new(9);
//!
//! let a = tree.insert(Rectangle::new(0.0, 0.0, 10.0, 10.0), "a").unwrap();
//! let b = tree.insert(Rectangle::new(20.0, 20.0, 30.0, 30.0), "b").unwrap();
//!
//! let hits = tree.search(&Rectangle::new(5.0, 5.0, 15.0, 15.0));
//! assert_eq!(hits, vec![a]);
//! assert!(tree.collides(&Rectangle::new(25.0, 25.0, 26.0, 26.0)));
//!
//! tree.remove(a).unwrap();
//! assert_eq!(tree.all(), vec![b]);
//! ```
//!
//! ### 并发使用（同步）
//! ```rust
//! use rtree2d::{ConcurrentRTree, Rectangle};
//! use std::thread;
//!
//! let tree = ConcurrentRTree::new(4);
//! let tree_clone = tree.clone();
//!
//! let handle = thread::spawn(move || {
//!     tree_clone.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), 1).unwrap();
//! });
//!
//! handle.join().unwrap();
//! assert_eq!(tree.len().unwrap(), 1);
//! ```
//!
//! ### 并发使用（异步）
//! ```rust
//! use rtree2d::{AsyncConcurrentRTree, Rectangle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tree = AsyncConcurrentRTree::new(4);
//!     tree.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), 1).await?;
//!     assert_eq!(tree.len().await?, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## 并发模型
//!
//! `RTree` 本身是单线程的同步结构，内部没有任何锁；并发修改或
//! 边遍历边修改都会产生未定义的结果。需要跨线程共享时使用
//! [`ConcurrentRTree`] 或 [`AsyncConcurrentRTree`]。

pub mod algorithms;
pub mod node;
pub mod rectangle;
pub mod rtree;

// 重新导出主要的公共接口
pub use node::{Children, ItemId, Node, NodeId};
pub use rectangle::Rectangle;
pub use rtree::{DataEntry, NodeVisualization, RTree, RTreeError, TreeConfig, TreeVisualization};

// 并发版本
pub use algorithms::concurrent::{ConcurrentError, ConcurrentRTree};

// 异步并发版本
pub use algorithms::async_concurrent::{AsyncConcurrentError, AsyncConcurrentRTree};

// 几何互操作
pub use algorithms::utils::{GeometryError, geojson_to_bbox, geometry_to_bbox};
