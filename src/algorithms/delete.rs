use crate::node::{ChildRef, Children, ItemId, NodeId};
use crate::rectangle::Rectangle;
use crate::rtree::{RTree, RTreeError};
use tracing::warn;

/// 删除与更新相关算法
impl<T> RTree<T> {
    /// 删除指定的数据条目并取回其负载
    ///
    /// 通过条目上记录的父节点反向引用以 O(1) 定位，不做树搜索。
    /// 句柄已失效、条目不在树中、或父节点的子条目列表里找不到它时
    /// 返回 `NotFound` —— 后者意味着调用方的簿记已被破坏（比如
    /// 重复删除）。
    pub fn remove(&mut self, id: ItemId) -> Result<T, RTreeError> {
        let parent_id = self.detach_item(id)?;
        let item = self.free_item(id);
        self.dec_len();
        self.condense(parent_id);
        Ok(item.data)
    }

    /// 更新条目的边界框
    ///
    /// 新边界框仍被当前父节点的MBR完全包含时不改动任何结构：
    /// 祖先的MBR仍是有效的超集。否则执行完整的删除加重插。
    /// 小幅移动因此非常便宜，大幅移动仍然保持正确。
    pub fn update(&mut self, id: ItemId, mbr: Rectangle) -> Result<(), RTreeError> {
        if !mbr.is_valid() {
            warn!(%mbr, "update rejected: unusable bounding box");
            return Err(RTreeError::InvalidItem);
        }

        let parent_id = self
            .item_slot(id)
            .and_then(|item| item.parent)
            .ok_or(RTreeError::NotFound)?;

        self.item_mut(id).mbr = mbr;
        if self.node(parent_id).mbr.contains(&mbr) {
            return Ok(());
        }

        let parent_id = self.detach_item(id)?;
        self.condense(parent_id);
        let level = self.height() - 1;
        self.insert_entry(ChildRef::Item(id), mbr, level);
        Ok(())
    }

    /// 树的收缩 - 自下而上剪除空节点并重算祖先MBR
    ///
    /// 只有完全变空的节点才会被剪除；条目数低于最小填充的节点
    /// 被有意容忍，不做兄弟合并也不重插孤儿条目。空掉的根节点
    /// 被替换为全新的空叶子根。
    pub(crate) fn condense(&mut self, start: NodeId) {
        let mut current = Some(start);

        while let Some(node_id) = current {
            let parent = self.node(node_id).parent;

            if self.node(node_id).is_empty() {
                match parent {
                    Some(parent_id) => {
                        if let Children::Nodes(children) = &mut self.node_mut(parent_id).children {
                            children.retain(|&child| child != node_id);
                        }
                        self.free_node(node_id);
                    }
                    None => {
                        self.reset_root();
                        return;
                    }
                }
            } else {
                self.recompute_mbr(node_id);
            }

            current = parent;
        }
    }

    /// 把条目从其父节点的子条目列表中摘除
    ///
    /// 返回原父节点句柄供后续收缩使用；条目自身的槽位保持占用，
    /// 调用方决定是释放（删除）还是重插（更新）
    fn detach_item(&mut self, id: ItemId) -> Result<NodeId, RTreeError> {
        let parent_id = self
            .item_slot(id)
            .and_then(|item| item.parent)
            .ok_or(RTreeError::NotFound)?;

        let children = match &mut self.node_mut(parent_id).children {
            Children::Items(children) => children,
            Children::Nodes(_) => return Err(RTreeError::NotFound),
        };
        let position = children
            .iter()
            .position(|&child| child == id)
            .ok_or(RTreeError::NotFound)?;
        children.remove(position);

        self.item_mut(id).parent = None;
        Ok(parent_id)
    }
}
