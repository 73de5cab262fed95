use crate::node::ItemId;
use crate::rectangle::Rectangle;
use crate::rtree::{RTree, RTreeError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::timeout;

/// 异步并发错误类型
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AsyncConcurrentError {
    #[error("operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error(transparent)]
    Tree(#[from] RTreeError),
}

/// 异步并发安全的R-tree包装
///
/// 与 [`ConcurrentRTree`](crate::ConcurrentRTree) 的分工相同，但使用
/// `tokio::sync::RwLock`，所有操作都不会阻塞 tokio 运行时。锁的获取
/// 带超时，长期被写者占住时返回 `Timeout` 而不是无限等待。
///
/// # 示例
///
/// ```
/// use rtree2d::{AsyncConcurrentRTree, Rectangle};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let rtree = AsyncConcurrentRTree::new(4);
///
///     let rect = Rectangle::new(0.0, 0.0, 1.0, 1.0);
///     rtree.insert(rect, 1).await?;
///
///     let search_area = Rectangle::new(-0.5, -0.5, 1.5, 1.5);
///     let results = rtree.search(&search_area).await?;
///     assert_eq!(results.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AsyncConcurrentRTree<T> {
    inner: Arc<RwLock<RTree<T>>>,
    timeout: Duration,
}

impl<T> AsyncConcurrentRTree<T> {
    /// 默认的锁获取超时
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// 创建新的异步并发R-tree
    pub fn new(max_entries: usize) -> Self {
        Self::with_timeout(max_entries, Self::DEFAULT_TIMEOUT)
    }

    /// 创建新的异步并发R-tree并指定锁获取超时
    pub fn with_timeout(max_entries: usize, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RTree::new(max_entries))),
            timeout,
        }
    }

    /// 从现有的R-tree创建异步并发版本
    pub fn from_tree(rtree: RTree<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rtree)),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// 插入新的数据条目
    ///
    /// 与 `RTree::insert` 一致：边界框不可用时返回 `Ok(None)`
    pub async fn insert(
        &self,
        mbr: Rectangle,
        data: T,
    ) -> Result<Option<ItemId>, AsyncConcurrentError> {
        Ok(self.write().await?.insert(mbr, data))
    }

    /// 删除指定的数据条目并取回其负载
    pub async fn remove(&self, id: ItemId) -> Result<T, AsyncConcurrentError> {
        Ok(self.write().await?.remove(id)?)
    }

    /// 更新条目的边界框
    pub async fn update(&self, id: ItemId, mbr: Rectangle) -> Result<(), AsyncConcurrentError> {
        Ok(self.write().await?.update(id, mbr)?)
    }

    /// 搜索与查询矩形相交的所有条目
    pub async fn search(&self, query: &Rectangle) -> Result<Vec<ItemId>, AsyncConcurrentError> {
        Ok(self.read().await?.search(query))
    }

    /// 判断是否存在与查询矩形相交的条目
    pub async fn collides(&self, query: &Rectangle) -> Result<bool, AsyncConcurrentError> {
        Ok(self.read().await?.collides(query))
    }

    /// 返回树中存储的全部条目
    pub async fn all(&self) -> Result<Vec<ItemId>, AsyncConcurrentError> {
        Ok(self.read().await?.all())
    }

    /// 获取条目数量
    pub async fn len(&self) -> Result<usize, AsyncConcurrentError> {
        Ok(self.read().await?.len())
    }

    /// 检查树是否为空
    pub async fn is_empty(&self) -> Result<bool, AsyncConcurrentError> {
        Ok(self.read().await?.is_empty())
    }

    /// 获取树的高度
    pub async fn height(&self) -> Result<usize, AsyncConcurrentError> {
        Ok(self.read().await?.height())
    }

    /// 清空整棵树
    pub async fn clear(&self) -> Result<(), AsyncConcurrentError> {
        self.write().await?.clear();
        Ok(())
    }

    async fn read(&self) -> Result<RwLockReadGuard<'_, RTree<T>>, AsyncConcurrentError> {
        timeout(self.timeout, self.inner.read())
            .await
            .map_err(|_| AsyncConcurrentError::Timeout {
                timeout: self.timeout,
            })
    }

    async fn write(&self) -> Result<RwLockWriteGuard<'_, RTree<T>>, AsyncConcurrentError> {
        timeout(self.timeout, self.inner.write())
            .await
            .map_err(|_| AsyncConcurrentError::Timeout {
                timeout: self.timeout,
            })
    }
}

impl<T: Clone> AsyncConcurrentRTree<T> {
    /// 按句柄获取条目负载的克隆
    pub async fn get_cloned(&self, id: ItemId) -> Result<Option<T>, AsyncConcurrentError> {
        Ok(self.read().await?.get(id).cloned())
    }
}

impl<T> Clone for AsyncConcurrentRTree<T> {
    /// 克隆共享同一棵树的新句柄
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_async_insert_and_search() {
        let rtree = AsyncConcurrentRTree::new(4);

        let mut tasks = Vec::new();
        for i in 0..10 {
            let rtree_clone = rtree.clone();
            tasks.push(tokio::spawn(async move {
                let offset = i as f64 * 3.0;
                let rect = Rectangle::new(offset, offset, offset + 1.0, offset + 1.0);
                rtree_clone.insert(rect, i).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap().unwrap();
        }

        assert_eq!(rtree.len().await.unwrap(), 10);
        let results = rtree
            .search(&Rectangle::new(0.0, 0.0, 100.0, 100.0))
            .await
            .unwrap();
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn test_async_remove_and_update() {
        let rtree = AsyncConcurrentRTree::new(4);
        let id = rtree
            .insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), "x".to_string())
            .await
            .unwrap()
            .unwrap();

        rtree
            .update(id, Rectangle::new(10.0, 10.0, 11.0, 11.0))
            .await
            .unwrap();
        let hits = rtree
            .search(&Rectangle::new(9.0, 9.0, 12.0, 12.0))
            .await
            .unwrap();
        assert_eq!(hits, vec![id]);

        assert_eq!(rtree.remove(id).await.unwrap(), "x".to_string());
        assert_eq!(
            rtree.remove(id).await,
            Err(AsyncConcurrentError::Tree(RTreeError::NotFound))
        );
    }

    #[tokio::test]
    async fn test_async_timeout_while_write_locked() {
        let rtree: AsyncConcurrentRTree<i32> =
            AsyncConcurrentRTree::with_timeout(4, Duration::from_millis(20));

        // 写锁被长期占住时读操作超时返回而不是永远等待
        let guard = rtree.inner.write().await;
        let result = rtree.len().await;
        assert_eq!(
            result,
            Err(AsyncConcurrentError::Timeout {
                timeout: Duration::from_millis(20)
            })
        );
        drop(guard);

        assert_eq!(rtree.len().await.unwrap(), 0);
    }
}
