use crate::node::{Children, ItemId, NodeId};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;

/// 搜索操作相关算法
///
/// 三个遍历都使用显式的待访问栈而不是递归，树再深也不会
/// 耗尽调用栈。
impl<T> RTree<T> {
    /// 搜索与查询矩形相交的所有数据条目
    ///
    /// 扫描当前节点的每个子条目：不相交的直接跳过；叶子层的命中
    /// 直接进结果；被查询矩形完全包含的子树整棵收集，无需再对其
    /// 后代做相交测试；其余子节点压栈待访问。
    pub fn search(&self, query: &Rectangle) -> Vec<ItemId> {
        let mut result = Vec::new();

        if !query.intersects(self.root_mbr()) {
            return result;
        }

        let mut nodes_to_search: Vec<NodeId> = Vec::new();
        let mut current = self.root_id();

        loop {
            match &self.node(current).children {
                Children::Items(items) => {
                    for &item_id in items {
                        if query.intersects(&self.item(item_id).mbr) {
                            result.push(item_id);
                        }
                    }
                }
                Children::Nodes(children) => {
                    for &child_id in children {
                        let child_mbr = &self.node(child_id).mbr;
                        if query.intersects(child_mbr) {
                            if query.contains(child_mbr) {
                                // 完全包含时整棵子树的后代必然都相交
                                self.collect_subtree(child_id, &mut result);
                            } else {
                                nodes_to_search.push(child_id);
                            }
                        }
                    }
                }
            }

            match nodes_to_search.pop() {
                Some(next) => current = next,
                None => break,
            }
        }

        result
    }

    /// 判断是否存在与查询矩形相交的条目
    ///
    /// 与 `search` 相同的遍历，但命中任何叶子条目或完全被包含的
    /// 子树时立即返回，不继续收集
    pub fn collides(&self, query: &Rectangle) -> bool {
        if !query.intersects(self.root_mbr()) {
            return false;
        }

        let mut nodes_to_search: Vec<NodeId> = Vec::new();
        let mut current = self.root_id();

        loop {
            match &self.node(current).children {
                Children::Items(items) => {
                    for &item_id in items {
                        if query.intersects(&self.item(item_id).mbr) {
                            return true;
                        }
                    }
                }
                Children::Nodes(children) => {
                    for &child_id in children {
                        let child_mbr = &self.node(child_id).mbr;
                        if query.intersects(child_mbr) {
                            if query.contains(child_mbr) {
                                return true;
                            }
                            nodes_to_search.push(child_id);
                        }
                    }
                }
            }

            match nodes_to_search.pop() {
                Some(next) => current = next,
                None => break,
            }
        }

        false
    }

    /// 返回树中存储的全部数据条目
    ///
    /// 顺序只反映树的内部布局，没有其他保证
    pub fn all(&self) -> Vec<ItemId> {
        let mut result = Vec::new();
        self.collect_subtree(self.root_id(), &mut result);
        result
    }

    /// 收集一棵子树下的全部数据条目，不做任何相交测试
    pub(crate) fn collect_subtree(&self, start: NodeId, result: &mut Vec<ItemId>) {
        let mut nodes_to_search: Vec<NodeId> = Vec::new();
        let mut current = start;

        loop {
            match &self.node(current).children {
                Children::Items(items) => result.extend_from_slice(items),
                Children::Nodes(children) => nodes_to_search.extend_from_slice(children),
            }

            match nodes_to_search.pop() {
                Some(next) => current = next,
                None => break,
            }
        }
    }
}
