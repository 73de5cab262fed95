use crate::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// 节点句柄 - 树内部 arena 中某个节点槽位的索引
///
/// 父节点反向引用就是一个 `NodeId`：它不拥有所指节点，
/// 节点的所有权始终在树的 arena 手中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// 数据条目句柄 - 插入时返回给调用者
///
/// 后续的删除和更新都通过这个句柄以 O(1) 定位条目，
/// 不需要重新搜索整棵树。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub(crate) usize);

/// 节点的子节点集合
///
/// 用 tagged variant 明确区分两种节点，避免混合列表：
/// - 叶子节点只包含数据条目句柄
/// - 索引节点只包含子节点句柄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Children {
    /// 叶子节点的数据条目
    Items(Vec<ItemId>),
    /// 索引节点的子节点
    Nodes(Vec<NodeId>),
}

impl Children {
    /// 子条目数量
    pub fn len(&self) -> usize {
        match self {
            Children::Items(items) => items.len(),
            Children::Nodes(nodes) => nodes.len(),
        }
    }

    /// 是否没有任何子条目
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 分裂与重插入时使用的统一子条目引用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildRef {
    Item(ItemId),
    Node(NodeId),
}

/// R-tree节点
///
/// 节点的MBR在每次完整的修改操作结束后，都精确等于
/// 其所有子条目MBR的并集。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 节点的最小边界矩形
    pub mbr: Rectangle,
    /// 节点包含的子条目
    pub children: Children,
    /// 节点高度，叶子节点为 1，每上一层加 1
    pub height: usize,
    /// 父节点反向引用，根节点为 None
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    /// 创建新的叶子节点
    pub(crate) fn new_leaf() -> Self {
        Node {
            mbr: Rectangle::EMPTY,
            children: Children::Items(Vec::new()),
            height: 1,
            parent: None,
        }
    }

    /// 创建指定高度的索引节点
    pub(crate) fn new_branch(height: usize) -> Self {
        Node {
            mbr: Rectangle::EMPTY,
            children: Children::Nodes(Vec::new()),
            height,
            parent: None,
        }
    }

    /// 检查是否为叶子节点（高度为 1）
    pub fn is_leaf(&self) -> bool {
        self.height == 1
    }

    /// 子条目数量
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// 是否没有任何子条目
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// 树内部记录的数据条目
///
/// 条目携带调用者提供的负载、它的边界框，以及插入后由树
/// 维护的父节点反向引用。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Item<T> {
    pub(crate) mbr: Rectangle,
    pub(crate) data: T,
    pub(crate) parent: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let leaf = Node::new_leaf();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.height, 1);
        assert!(leaf.is_empty());
        assert_eq!(leaf.mbr, Rectangle::EMPTY);
        assert!(matches!(leaf.children, Children::Items(_)));

        let branch = Node::new_branch(2);
        assert!(!branch.is_leaf());
        assert_eq!(branch.height, 2);
        assert!(matches!(branch.children, Children::Nodes(_)));
    }

    #[test]
    fn test_children_len() {
        let mut children = Children::Items(vec![ItemId(0), ItemId(1)]);
        assert_eq!(children.len(), 2);
        assert!(!children.is_empty());

        children = Children::Nodes(Vec::new());
        assert_eq!(children.len(), 0);
        assert!(children.is_empty());
    }
}
