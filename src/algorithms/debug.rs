use crate::node::{Children, NodeId};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;

/// R-tree调试功能实现
impl<T> RTree<T> {
    /// 打印完整的树结构用于调试
    ///
    /// 递归遍历整个树结构，打印每个节点的高度、MBR边界和
    /// 条目数量，用于调试和可视化
    pub fn print_tree_structure(&self) {
        fn print_node<T>(rtree: &RTree<T>, id: NodeId, depth: usize) {
            let node = rtree.node(id);
            let indent = "  ".repeat(depth);
            println!(
                "{}Node (height={}, leaf={}, mbr={}, {} entries):",
                indent,
                node.height,
                node.is_leaf(),
                node.mbr,
                node.len()
            );

            if node.is_empty() {
                println!("{}  ❌ EMPTY NODE!", indent);
            }

            match &node.children {
                Children::Items(items) => {
                    for (i, &item_id) in items.iter().enumerate() {
                        println!("{}  [{}] Item at {}", indent, i, rtree.item(item_id).mbr);
                    }
                }
                Children::Nodes(children) => {
                    for (i, &child_id) in children.iter().enumerate() {
                        println!("{}  [{}] -> child:", indent, i);
                        print_node(rtree, child_id, depth + 1);
                    }
                }
            }
        }

        println!("=== R-tree Structure ===");
        print_node(self, self.root_id(), 0);
        println!("=== End ===");
    }

    /// 校验树的全部结构不变量
    ///
    /// 检查内容：
    /// - 每个节点的MBR精确等于其子条目MBR的并集
    /// - 子节点高度恰好比父节点低 1，叶子节点高度为 1
    /// - 子条目类型与节点类型一致
    /// - 所有父节点反向引用指向真实的父节点
    /// - 节点条目数不超过最大值，非根节点至少有 1 个条目
    /// - arena 中没有泄漏的节点或条目槽位
    ///
    /// 这些不变量由每个成功返回的修改操作保证；唯一的例外是
    /// `update` 的小幅移动快速路径，它让祖先MBR暂时退化为并集的
    /// 超集（文档化行为），此后的精确性检查会报告差异，直到下一次
    /// 结构性修改重算为止。
    pub fn check_consistency(&self) -> Result<(), String> {
        let root_id = self.root_id();
        let root = self.node(root_id);
        if root.parent.is_some() {
            return Err("root node has a parent back-reference".to_string());
        }
        if root.height != 1 && root.is_empty() {
            return Err("empty root must be a leaf of height 1".to_string());
        }

        let mut item_count = 0usize;
        let mut node_count = 0usize;
        let mut stack = vec![root_id];

        while let Some(node_id) = stack.pop() {
            node_count += 1;
            let node = self.node(node_id);

            if node.len() > self.max_entries() {
                return Err(format!(
                    "node holds {} entries, more than max_entries {}",
                    node.len(),
                    self.max_entries()
                ));
            }
            if node_id != root_id && node.is_empty() {
                return Err("non-root node has no entries".to_string());
            }
            if node.is_leaf() != matches!(node.children, Children::Items(_)) {
                return Err("children variant disagrees with node height".to_string());
            }

            let mut union = Rectangle::EMPTY;
            match &node.children {
                Children::Items(items) => {
                    for &item_id in items {
                        let item = self
                            .item_slot(item_id)
                            .ok_or_else(|| "leaf references a vacant item slot".to_string())?;
                        if item.parent != Some(node_id) {
                            return Err("item parent back-reference is wrong".to_string());
                        }
                        union.extend(&item.mbr);
                        item_count += 1;
                    }
                }
                Children::Nodes(children) => {
                    for &child_id in children {
                        let child = self
                            .get_node(child_id)
                            .ok_or_else(|| "branch references a vacant node slot".to_string())?;
                        if child.parent != Some(node_id) {
                            return Err("child parent back-reference is wrong".to_string());
                        }
                        if child.height + 1 != node.height {
                            return Err(format!(
                                "child height {} under node of height {}",
                                child.height, node.height
                            ));
                        }
                        union.extend(&child.mbr);
                        stack.push(child_id);
                    }
                }
            }

            if !node.is_empty() && node.mbr != union {
                return Err(format!(
                    "node mbr {} is not the exact union {} of its children",
                    node.mbr, union
                ));
            }
        }

        if item_count != self.len() {
            return Err(format!(
                "tree stores {} items but len() reports {}",
                item_count,
                self.len()
            ));
        }
        if item_count != self.occupied_items() {
            return Err("item arena holds unreachable entries".to_string());
        }
        if node_count != self.occupied_nodes() {
            return Err("node arena holds unreachable nodes".to_string());
        }

        Ok(())
    }
}
