use crate::node::ItemId;
use crate::rectangle::Rectangle;
use crate::rtree::{RTree, RTreeError};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 并发错误类型
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConcurrentError {
    #[error("lock was poisoned by a panicked thread")]
    LockPoisoned,
    #[error(transparent)]
    Tree(#[from] RTreeError),
}

/// 并发安全的R-tree包装
///
/// 核心树本身是单线程的，没有任何内部加锁；这个包装用读写锁
/// 把调用方必须自行完成的串行化打包起来：
/// - 读操作（search, collides, all, len）可以并发执行
/// - 写操作（insert, remove, update, clear）需要独占访问
///
/// # 示例
///
/// ```
/// use rtree2d::{ConcurrentRTree, Rectangle};
/// use std::thread;
///
/// let rtree = ConcurrentRTree::new(4);
///
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let rtree_clone = rtree.clone(); // 通过clone共享同一棵树
///         thread::spawn(move || {
///             let offset = i as f64;
///             let rect = Rectangle::new(offset, offset, offset + 1.0, offset + 1.0);
///             rtree_clone.insert(rect, i).unwrap();
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(rtree.len().unwrap(), 4);
/// ```
#[derive(Debug)]
pub struct ConcurrentRTree<T> {
    inner: Arc<RwLock<RTree<T>>>,
}

impl<T> ConcurrentRTree<T> {
    /// 创建新的并发R-tree
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RTree::new(max_entries))),
        }
    }

    /// 从现有的R-tree创建并发版本
    pub fn from_tree(rtree: RTree<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rtree)),
        }
    }

    /// 插入新的数据条目
    ///
    /// 与 `RTree::insert` 一致：边界框不可用时返回 `Ok(None)`
    pub fn insert(&self, mbr: Rectangle, data: T) -> Result<Option<ItemId>, ConcurrentError> {
        Ok(self.write()?.insert(mbr, data))
    }

    /// 删除指定的数据条目并取回其负载
    pub fn remove(&self, id: ItemId) -> Result<T, ConcurrentError> {
        Ok(self.write()?.remove(id)?)
    }

    /// 更新条目的边界框
    pub fn update(&self, id: ItemId, mbr: Rectangle) -> Result<(), ConcurrentError> {
        Ok(self.write()?.update(id, mbr)?)
    }

    /// 搜索与查询矩形相交的所有条目
    pub fn search(&self, query: &Rectangle) -> Result<Vec<ItemId>, ConcurrentError> {
        Ok(self.read()?.search(query))
    }

    /// 判断是否存在与查询矩形相交的条目
    pub fn collides(&self, query: &Rectangle) -> Result<bool, ConcurrentError> {
        Ok(self.read()?.collides(query))
    }

    /// 返回树中存储的全部条目
    pub fn all(&self) -> Result<Vec<ItemId>, ConcurrentError> {
        Ok(self.read()?.all())
    }

    /// 获取条目数量
    pub fn len(&self) -> Result<usize, ConcurrentError> {
        Ok(self.read()?.len())
    }

    /// 检查树是否为空
    pub fn is_empty(&self) -> Result<bool, ConcurrentError> {
        Ok(self.read()?.is_empty())
    }

    /// 获取树的高度
    pub fn height(&self) -> Result<usize, ConcurrentError> {
        Ok(self.read()?.height())
    }

    /// 清空整棵树
    pub fn clear(&self) -> Result<(), ConcurrentError> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RTree<T>>, ConcurrentError> {
        self.inner.read().map_err(|_| ConcurrentError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RTree<T>>, ConcurrentError> {
        self.inner.write().map_err(|_| ConcurrentError::LockPoisoned)
    }
}

impl<T: Clone> ConcurrentRTree<T> {
    /// 按句柄获取条目负载的克隆
    pub fn get_cloned(&self, id: ItemId) -> Result<Option<T>, ConcurrentError> {
        Ok(self.read()?.get(id).cloned())
    }
}

impl<T> Clone for ConcurrentRTree<T> {
    /// 克隆共享同一棵树的新句柄
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_insert_and_search() {
        let rtree = ConcurrentRTree::new(4);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let rtree_clone = rtree.clone();
                thread::spawn(move || {
                    let offset = i as f64 * 5.0;
                    let rect = Rectangle::new(offset, offset, offset + 1.0, offset + 1.0);
                    rtree_clone.insert(rect, i).unwrap().unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(rtree.len().unwrap(), 8);
        let results = rtree.search(&Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(results.len(), 8);
    }

    #[test]
    fn test_concurrent_remove_and_errors() {
        let rtree = ConcurrentRTree::new(4);
        let id = rtree
            .insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), "x".to_string())
            .unwrap()
            .unwrap();

        assert_eq!(rtree.get_cloned(id).unwrap(), Some("x".to_string()));
        assert_eq!(rtree.remove(id).unwrap(), "x".to_string());
        assert!(rtree.is_empty().unwrap());

        // 树层错误透传
        assert_eq!(
            rtree.remove(id),
            Err(ConcurrentError::Tree(RTreeError::NotFound))
        );
    }

    #[test]
    fn test_parallel_readers() {
        let rtree = ConcurrentRTree::new(4);
        for i in 0..20 {
            let offset = i as f64 * 2.0;
            rtree
                .insert(Rectangle::new(offset, 0.0, offset + 1.0, 1.0), i)
                .unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rtree_clone = rtree.clone();
                thread::spawn(move || {
                    rtree_clone
                        .search(&Rectangle::new(0.0, 0.0, 100.0, 1.0))
                        .unwrap()
                        .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 20);
        }
    }
}
