use crate::node::{ChildRef, Children, Item, ItemId, NodeId};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;
use tracing::warn;

/// 插入操作相关算法
impl<T> RTree<T> {
    /// 插入新的数据条目
    ///
    /// 边界框不可用（坐标非有限或 min > max）时记录一条警告并
    /// 返回 `None`，树保持原状。成功时返回条目句柄，后续的
    /// `remove` / `update` 都通过它定位条目。
    pub fn insert(&mut self, mbr: Rectangle, data: T) -> Option<ItemId> {
        if !mbr.is_valid() {
            warn!(%mbr, "insert rejected: unusable bounding box");
            return None;
        }

        let id = self.alloc_item(Item {
            mbr,
            data,
            parent: None,
        });

        // 数据条目总是插到叶子层
        let level = self.height() - 1;
        self.insert_entry(ChildRef::Item(id), mbr, level);
        self.inc_len();

        Some(id)
    }

    /// 在指定层插入一个条目（数据条目或整棵子树）
    ///
    /// 插入流程：
    /// 1. 自根下降选择目标节点，沿途记录访问路径
    /// 2. 把条目挂到目标节点并扩大其MBR
    /// 3. 自目标层向上处理溢出，每次分裂后上移一层
    /// 4. 对分裂停止层以上的祖先做廉价的MBR扩大
    pub(crate) fn insert_entry(&mut self, entry: ChildRef, bbox: Rectangle, level: usize) {
        let mut path = Vec::new();
        let target = self.choose_subtree(&bbox, self.root_id(), level, &mut path);

        self.attach_child(target, entry);
        self.node_mut(target).mbr.extend(&bbox);

        // 溢出的节点一分为二，分裂可能向上传播直到根节点
        let mut level = level as isize;
        while level >= 0 {
            let node_id = path[level as usize];
            if self.node(node_id).len() > self.max_entries() {
                self.split(&path, level as usize);
                level -= 1;
            } else {
                break;
            }
        }

        // 分裂停止层及以下的MBR已由分裂算法精确重算，
        // 其余祖先只需扩大到覆盖新条目
        self.adjust_parent_bboxes(&bbox, &path, level);
    }

    /// 选择子树 - 最小面积扩张策略
    ///
    /// 从 `start` 下降，在每一层选择容纳 `bbox` 所需面积扩张最小的
    /// 子节点，扩张相同时取自身面积最小者。到达叶子节点或目标层
    /// （`path.len() - 1 == level`）时停止，因此同样适用于重插整棵
    /// 子树，而不仅仅是叶子条目。
    pub(crate) fn choose_subtree(
        &self,
        bbox: &Rectangle,
        start: NodeId,
        level: usize,
        path: &mut Vec<NodeId>,
    ) -> NodeId {
        let mut current = start;

        loop {
            path.push(current);
            let node = self.node(current);
            if node.is_leaf() || path.len() - 1 == level {
                break;
            }

            let Children::Nodes(children) = &node.children else {
                break;
            };

            let mut min_enlargement = f64::INFINITY;
            let mut min_area = f64::INFINITY;
            let mut target = None;

            for &child_id in children {
                let child_mbr = &self.node(child_id).mbr;
                let area = child_mbr.area();
                let enlargement = bbox.enlarged_area(child_mbr) - area;

                if enlargement < min_enlargement {
                    min_enlargement = enlargement;
                    min_area = min_area.min(area);
                    target = Some(child_id);
                } else if enlargement == min_enlargement && area < min_area {
                    min_area = area;
                    target = Some(child_id);
                }
            }

            current = match target {
                Some(child_id) => child_id,
                None => children[0],
            };
        }

        current
    }

    /// 把子条目挂到指定节点下，并写入父节点反向引用
    pub(crate) fn attach_child(&mut self, parent_id: NodeId, entry: ChildRef) {
        match entry {
            ChildRef::Item(id) => {
                match &mut self.node_mut(parent_id).children {
                    Children::Items(children) => children.push(id),
                    Children::Nodes(_) => unreachable!("data entry attached to a branch node"),
                }
                self.item_mut(id).parent = Some(parent_id);
            }
            ChildRef::Node(id) => {
                match &mut self.node_mut(parent_id).children {
                    Children::Nodes(children) => children.push(id),
                    Children::Items(_) => unreachable!("child node attached to a leaf node"),
                }
                self.node_mut(id).parent = Some(parent_id);
            }
        }
    }

    /// 沿插入路径自 `level` 层向上扩大祖先的MBR
    pub(crate) fn adjust_parent_bboxes(&mut self, bbox: &Rectangle, path: &[NodeId], level: isize) {
        if level < 0 {
            return;
        }
        for i in (0..=level as usize).rev() {
            self.node_mut(path[i]).mbr.extend(bbox);
        }
    }
}
