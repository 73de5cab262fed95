use crate::node::{Children, Item, ItemId, Node, NodeId};
use crate::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// R-tree 操作的错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RTreeError {
    /// 条目缺少可用的边界框（坐标非有限或 min > max）
    #[error("item has no usable bounding box")]
    InvalidItem,
    /// 条目与其记录的父节点不一致，通常意味着重复删除
    /// 或使用了已失效的句柄
    #[error("item is not present in the tree")]
    NotFound,
}

/// R-tree主结构
///
/// 节点保存在树拥有的 arena 中，以 `NodeId` 索引；数据条目保存在
/// 独立的槽位表中，以 `ItemId` 索引。父节点反向引用是普通的
/// `Option<NodeId>`，不构成第二个所有权。
///
/// 根节点始终存在：空树的根是一个高度为 1、没有任何子条目的叶子节点。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RTree<T> {
    /// 节点 arena，空槽位为 None
    nodes: Vec<Option<Node>>,
    /// 可复用的节点槽位
    free_nodes: Vec<usize>,
    /// 数据条目槽位表，空槽位为 None
    items: Vec<Option<Item<T>>>,
    /// 可复用的条目槽位
    free_items: Vec<usize>,
    /// 根节点
    root: NodeId,
    /// 最大条目数M
    max_entries: usize,
    /// 最小条目数m = max(2, ceil(0.4 * M))
    min_entries: usize,
    /// 当前存储的数据条目总数
    len: usize,
}

impl<T> RTree<T> {
    /// 创建新的R-tree
    ///
    /// `max_entries` 会被钳制到不小于 4；最小条目数取
    /// `max(2, ceil(0.4 * max_entries))`，40% 的填充率对查询性能最优
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        let min_entries = ((max_entries as f64 * 0.4).ceil() as usize).max(2);

        RTree {
            nodes: vec![Some(Node::new_leaf())],
            free_nodes: Vec::new(),
            items: Vec::new(),
            free_items: Vec::new(),
            root: NodeId(0),
            max_entries,
            min_entries,
            len: 0,
        }
    }

    /// 清空整棵树，重置为一个全新的空叶子根节点
    ///
    /// 返回自身以便链式调用
    pub fn clear(&mut self) -> &mut Self {
        self.items.clear();
        self.free_items.clear();
        self.len = 0;
        self.reset_root();
        self
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取总的数据条目数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 获取树的高度（空树为 1）
    pub fn height(&self) -> usize {
        self.node(self.root).height
    }

    /// 获取根节点
    ///
    /// 展示层只读取节点的 `children`、`height`、`mbr` 字段，
    /// 不直接构造或修改节点。
    pub fn root(&self) -> &Node {
        self.node(self.root)
    }

    /// 获取R-tree的根节点MBR（空树为空矩形）
    pub fn root_mbr(&self) -> &Rectangle {
        &self.node(self.root).mbr
    }

    /// 按句柄获取节点
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// 按句柄获取数据条目的负载
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.item_slot(id).map(|item| &item.data)
    }

    /// 按句柄获取数据条目负载的可变引用
    ///
    /// 只允许修改负载本身；边界框的修改必须走 `update`
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.items
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .map(|item| &mut item.data)
    }

    /// 按句柄获取数据条目的边界框
    pub fn item_mbr(&self, id: ItemId) -> Option<&Rectangle> {
        self.item_slot(id).map(|item| &item.mbr)
    }

    /// 获取最大条目数
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 获取最小条目数
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    // ---- 内部 arena 管理 ----

    /// 内部方法：获取节点引用
    ///
    /// 树内保存的句柄永远指向被占用的槽位，空槽位意味着
    /// 结构不变量已被破坏，属于编程错误
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.0].as_ref().expect("node slot is vacant")
    }

    /// 内部方法：获取节点可变引用
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.0].as_mut().expect("node slot is vacant")
    }

    /// 内部方法：按句柄获取条目（槽位可能为空）
    pub(crate) fn item_slot(&self, id: ItemId) -> Option<&Item<T>> {
        self.items.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// 内部方法：获取条目引用
    pub(crate) fn item(&self, id: ItemId) -> &Item<T> {
        self.items[id.0].as_ref().expect("item slot is vacant")
    }

    /// 内部方法：获取条目可变引用
    pub(crate) fn item_mut(&mut self, id: ItemId) -> &mut Item<T> {
        self.items[id.0].as_mut().expect("item slot is vacant")
    }

    /// 内部方法：当前根节点句柄
    pub(crate) fn root_id(&self) -> NodeId {
        self.root
    }

    /// 内部方法：替换根节点（根分裂时使用）
    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    /// 内部方法：分配一个节点槽位
    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeId {
        match self.free_nodes.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// 内部方法：释放一个节点槽位
    pub(crate) fn free_node(&mut self, id: NodeId) {
        self.nodes[id.0] = None;
        self.free_nodes.push(id.0);
    }

    /// 内部方法：分配一个条目槽位
    pub(crate) fn alloc_item(&mut self, item: Item<T>) -> ItemId {
        match self.free_items.pop() {
            Some(index) => {
                self.items[index] = Some(item);
                ItemId(index)
            }
            None => {
                self.items.push(Some(item));
                ItemId(self.items.len() - 1)
            }
        }
    }

    /// 内部方法：释放一个条目槽位并取回条目
    pub(crate) fn free_item(&mut self, id: ItemId) -> Item<T> {
        let item = self.items[id.0].take().expect("item slot is vacant");
        self.free_items.push(id.0);
        item
    }

    /// 内部方法：当前被占用的节点槽位数
    pub(crate) fn occupied_nodes(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// 内部方法：当前被占用的条目槽位数
    pub(crate) fn occupied_items(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    /// 内部方法：条目数量计数
    pub(crate) fn dec_len(&mut self) {
        self.len -= 1;
    }

    /// 内部方法：条目数量计数
    pub(crate) fn inc_len(&mut self) {
        self.len += 1;
    }

    /// 内部方法：丢弃所有节点并安装一个全新的空叶子根
    ///
    /// 只重置节点 arena，不触碰条目槽位表；调用方负责保证
    /// 此时不再有节点引用任何条目
    pub(crate) fn reset_root(&mut self) {
        self.nodes.clear();
        self.free_nodes.clear();
        self.nodes.push(Some(Node::new_leaf()));
        self.root = NodeId(0);
    }

    /// 内部方法：根据子条目精确重算节点的MBR
    pub(crate) fn recompute_mbr(&mut self, id: NodeId) {
        let mut mbr = Rectangle::EMPTY;
        match &self.node(id).children {
            Children::Items(items) => {
                for &item_id in items {
                    mbr.extend(&self.item(item_id).mbr);
                }
            }
            Children::Nodes(nodes) => {
                for &node_id in nodes {
                    mbr.extend(&self.node(node_id).mbr);
                }
            }
        }
        self.node_mut(id).mbr = mbr;
    }
}

impl<T> Default for RTree<T> {
    /// 使用默认参数创建R-tree（M=9, m=4）
    fn default() -> Self {
        Self::new(9)
    }
}

// ---- 树结构的JSON导出，供前端可视化使用 ----

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize)]
pub struct TreeVisualization<'a, T> {
    /// 根节点（空树时为 None）
    pub root: Option<NodeVisualization<'a, T>>,
    /// 树的配置参数
    pub config: TreeConfig,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize)]
pub struct TreeConfig {
    pub max_entries: usize,
    pub min_entries: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize)]
pub struct NodeVisualization<'a, T> {
    /// 节点的最小边界矩形
    pub mbr: Rectangle,
    /// 节点高度
    pub height: usize,
    /// 是否为叶子节点
    pub leaf: bool,
    /// 数据条目（仅叶子节点）
    pub data_entries: Vec<DataEntry<'a, T>>,
    /// 子节点（仅索引节点）
    pub child_nodes: Vec<NodeVisualization<'a, T>>,
}

/// 用于JSON序列化的数据条目
#[derive(Debug, Serialize)]
pub struct DataEntry<'a, T> {
    pub mbr: Rectangle,
    pub data: &'a T,
}

impl<T: Serialize> RTree<T> {
    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串，用于前端可视化
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = self.create_tree_visualization();
        serde_json::to_string_pretty(&visualization)
    }

    /// 创建用于可视化的树结构
    fn create_tree_visualization(&self) -> TreeVisualization<'_, T> {
        TreeVisualization {
            root: if self.is_empty() {
                None
            } else {
                Some(self.create_node_visualization(self.root))
            },
            config: TreeConfig {
                max_entries: self.max_entries,
                min_entries: self.min_entries,
            },
        }
    }

    /// 递归创建节点的可视化结构
    fn create_node_visualization(&self, id: NodeId) -> NodeVisualization<'_, T> {
        let node = self.node(id);
        let mut data_entries = Vec::new();
        let mut child_nodes = Vec::new();

        match &node.children {
            Children::Items(items) => {
                for &item_id in items {
                    let item = self.item(item_id);
                    data_entries.push(DataEntry {
                        mbr: item.mbr,
                        data: &item.data,
                    });
                }
            }
            Children::Nodes(nodes) => {
                for &node_id in nodes {
                    child_nodes.push(self.create_node_visualization(node_id));
                }
            }
        }

        NodeVisualization {
            mbr: node.mbr,
            height: node.height,
            leaf: node.is_leaf(),
            data_entries,
            child_nodes,
        }
    }
}
