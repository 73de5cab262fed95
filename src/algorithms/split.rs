use crate::node::{ChildRef, Children, Node, NodeId};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;
use std::cmp::Ordering;

/// 节点分裂算法 - R*-tree 风格的轴选择与分布选择
///
/// 分裂分两步：先用所有合法分布的总半周长挑选排序轴
/// （Beckmann 等人的 ChooseSplitAxis），再在该轴上挑选重叠面积
/// 最小的分布（ChooseSplitIndex）。
impl<T> RTree<T> {
    /// 分裂路径上第 `level` 层的溢出节点
    ///
    /// 分出的新兄弟节点沿用原节点的高度和叶子属性；两个节点的MBR
    /// 都根据各自的子条目精确重算。若被分裂的是根节点，则创建一个
    /// 高度加一的新根容纳两半。
    pub(crate) fn split(&mut self, path: &[NodeId], level: usize) {
        let node_id = path[level];
        let m = self.min_entries();

        let mut entries = self.take_entries(node_id);
        let total = entries.len();

        choose_split_axis(&mut entries, m, total);
        let split_index = choose_split_index(&entries, m, total);
        let spilled = entries.split_off(split_index);

        let height = self.node(node_id).height;
        let sibling = if self.node(node_id).is_leaf() {
            Node::new_leaf()
        } else {
            Node::new_branch(height)
        };
        let new_id = self.alloc_node(sibling);

        self.restore_entries(node_id, entries);
        self.restore_entries(new_id, spilled);

        if level > 0 {
            // 新兄弟挂到同一个父节点下，父节点的溢出由上层循环处理
            self.attach_child(path[level - 1], ChildRef::Node(new_id));
        } else {
            self.split_root(node_id, new_id);
        }
    }

    /// 根节点分裂 - 用一个新根容纳分裂出的两半
    pub(crate) fn split_root(&mut self, left: NodeId, right: NodeId) {
        let height = self.node(left).height + 1;
        let mbr = self.node(left).mbr.union(&self.node(right).mbr);

        let new_root = self.alloc_node(Node {
            mbr,
            children: Children::Nodes(vec![left, right]),
            height,
            parent: None,
        });
        self.node_mut(left).parent = Some(new_root);
        self.node_mut(right).parent = Some(new_root);
        self.set_root(new_root);
    }

    /// 取出节点的全部子条目及其MBR快照，节点暂时变空
    pub(crate) fn take_entries(&mut self, node_id: NodeId) -> Vec<(ChildRef, Rectangle)> {
        let children = match &mut self.node_mut(node_id).children {
            Children::Items(items) => Children::Items(std::mem::take(items)),
            Children::Nodes(nodes) => Children::Nodes(std::mem::take(nodes)),
        };

        match children {
            Children::Items(ids) => ids
                .into_iter()
                .map(|id| (ChildRef::Item(id), self.item(id).mbr))
                .collect(),
            Children::Nodes(ids) => ids
                .into_iter()
                .map(|id| (ChildRef::Node(id), self.node(id).mbr))
                .collect(),
        }
    }

    /// 按给定顺序重建节点的子条目，修正反向引用并精确重算MBR
    pub(crate) fn restore_entries(&mut self, node_id: NodeId, entries: Vec<(ChildRef, Rectangle)>) {
        let mut mbr = Rectangle::EMPTY;
        let mut items = Vec::new();
        let mut nodes = Vec::new();

        for (child, rect) in &entries {
            mbr.extend(rect);
            match *child {
                ChildRef::Item(id) => items.push(id),
                ChildRef::Node(id) => nodes.push(id),
            }
        }

        for &id in &items {
            self.item_mut(id).parent = Some(node_id);
        }
        for &id in &nodes {
            self.node_mut(id).parent = Some(node_id);
        }

        let node = self.node_mut(node_id);
        node.children = if node.is_leaf() {
            Children::Items(items)
        } else {
            Children::Nodes(nodes)
        };
        node.mbr = mbr;
    }
}

/// 选择分裂轴并按该轴排好序
///
/// 分别计算按 minX 与按 minY 排序时所有合法分布的总半周长，
/// 取总半周长较小的轴。计算结束时条目已按 minY 排序，因此只有
/// X 轴严格更优时才需要重新按 minX 排序。
pub(crate) fn choose_split_axis(entries: &mut [(ChildRef, Rectangle)], m: usize, total: usize) {
    let x_margin = all_dist_margin(entries, m, total, 0);
    let y_margin = all_dist_margin(entries, m, total, 1);

    if x_margin < y_margin {
        sort_by_min(entries, 0);
    }
}

/// 计算某个轴上所有合法分布的总半周长
///
/// 条目按该轴的 min 坐标排序后，分布的分割点取遍 `[m, total-m]`。
/// 左右两侧的MBR分别从最小分布开始增量扩展，避免为每个分割点
/// 重新扫描全部条目。
pub(crate) fn all_dist_margin(
    entries: &mut [(ChildRef, Rectangle)],
    m: usize,
    total: usize,
    axis: usize,
) -> f64 {
    sort_by_min(entries, axis);

    let mut left = Rectangle::EMPTY;
    for (_, rect) in &entries[..m] {
        left.extend(rect);
    }
    let mut right = Rectangle::EMPTY;
    for (_, rect) in &entries[total - m..] {
        right.extend(rect);
    }

    let mut margin = left.margin() + right.margin();
    for i in m..total - m {
        left.extend(&entries[i].1);
        margin += left.margin();
    }
    for i in (m..total - m).rev() {
        right.extend(&entries[i].1);
        margin += right.margin();
    }

    margin
}

/// 在已排序的条目上选择重叠面积最小的分割点
///
/// 重叠相同时取两侧面积之和较小者；理论上循环一定会命中一个
/// 分割点，保险起见仍以 `total - m` 作为兜底。
pub(crate) fn choose_split_index(entries: &[(ChildRef, Rectangle)], m: usize, total: usize) -> usize {
    let mut best = None;
    let mut min_overlap = f64::INFINITY;
    let mut min_area = f64::INFINITY;

    for i in m..=total - m {
        let left = mbr_of(&entries[..i]);
        let right = mbr_of(&entries[i..]);

        let overlap = left.intersection_area(&right);
        let area = left.area() + right.area();

        if overlap < min_overlap {
            min_overlap = overlap;
            min_area = min_area.min(area);
            best = Some(i);
        } else if overlap == min_overlap && area < min_area {
            min_area = area;
            best = Some(i);
        }
    }

    best.unwrap_or(total - m)
}

/// 按指定轴的 min 坐标排序条目
fn sort_by_min(entries: &mut [(ChildRef, Rectangle)], axis: usize) {
    entries.sort_by(|a, b| {
        a.1.min[axis]
            .partial_cmp(&b.1.min[axis])
            .unwrap_or(Ordering::Equal)
    });
}

/// 一组条目的最小边界矩形
fn mbr_of(entries: &[(ChildRef, Rectangle)]) -> Rectangle {
    let mut mbr = Rectangle::EMPTY;
    for (_, rect) in entries {
        mbr.extend(rect);
    }
    mbr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ItemId;

    fn entry(index: usize, rect: Rectangle) -> (ChildRef, Rectangle) {
        (ChildRef::Item(ItemId(index)), rect)
    }

    #[test]
    fn test_all_dist_margin() {
        // x 轴顺序为 a,b,c,d；y 轴顺序为 b,d,c,a
        let a = Rectangle::new(0.0, 9.0, 1.0, 10.0);
        let b = Rectangle::new(2.0, 0.0, 3.0, 1.0);
        let c = Rectangle::new(4.0, 6.0, 5.0, 7.0);
        let d = Rectangle::new(6.0, 2.0, 7.0, 3.0);
        let mut entries = vec![entry(0, a), entry(1, b), entry(2, c), entry(3, d)];

        // m=2, total=4 时只有一个分布：前两个一组，后两个一组
        // x 轴分组 {a,b} + {c,d}: (3+10) + (3+5) = 21
        let x_margin = all_dist_margin(&mut entries, 2, 4, 0);
        assert_eq!(x_margin, 21.0);

        // y 轴分组 {b,d} + {c,a}: (5+3) + (5+4) = 17
        let y_margin = all_dist_margin(&mut entries, 2, 4, 1);
        assert_eq!(y_margin, 17.0);
    }

    #[test]
    fn test_choose_split_axis_keeps_better_axis_order() {
        let a = Rectangle::new(0.0, 9.0, 1.0, 10.0);
        let b = Rectangle::new(2.0, 0.0, 3.0, 1.0);
        let c = Rectangle::new(4.0, 6.0, 5.0, 7.0);
        let d = Rectangle::new(6.0, 2.0, 7.0, 3.0);
        let mut entries = vec![entry(0, a), entry(1, b), entry(2, c), entry(3, d)];

        // y 轴总半周长更小，条目应保持按 minY 排序
        choose_split_axis(&mut entries, 2, 4);
        let order: Vec<ChildRef> = entries.iter().map(|(child, _)| *child).collect();
        assert_eq!(
            order,
            vec![
                ChildRef::Item(ItemId(1)), // b
                ChildRef::Item(ItemId(3)), // d
                ChildRef::Item(ItemId(2)), // c
                ChildRef::Item(ItemId(0)), // a
            ]
        );
    }

    #[test]
    fn test_choose_split_index_minimizes_overlap() {
        // 两个明显的簇，最优分割点在中间
        let entries = vec![
            entry(0, Rectangle::new(0.0, 0.0, 1.0, 1.0)),
            entry(1, Rectangle::new(0.5, 0.5, 1.5, 1.5)),
            entry(2, Rectangle::new(10.0, 10.0, 11.0, 11.0)),
            entry(3, Rectangle::new(10.5, 10.5, 11.5, 11.5)),
        ];

        assert_eq!(choose_split_index(&entries, 1, 4), 2);
    }

    #[test]
    fn test_split_on_overflow() {
        let mut rtree = RTree::new(4);

        // 第 5 个条目触发叶子分裂并产生新根
        rtree.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), 0);
        rtree.insert(Rectangle::new(2.0, 2.0, 3.0, 3.0), 1);
        rtree.insert(Rectangle::new(4.0, 4.0, 5.0, 5.0), 2);
        rtree.insert(Rectangle::new(6.0, 6.0, 7.0, 7.0), 3);
        assert_eq!(rtree.height(), 1);

        rtree.insert(Rectangle::new(8.0, 8.0, 9.0, 9.0), 4);

        assert_eq!(rtree.height(), 2);
        let root = rtree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.len(), 2);
        assert_eq!(root.mbr, Rectangle::new(0.0, 0.0, 9.0, 9.0));

        // 两半都满足最小填充
        if let crate::node::Children::Nodes(children) = &root.children {
            for &child_id in children {
                let child = rtree.get_node(child_id).unwrap();
                assert!(child.is_leaf());
                assert!(child.len() >= rtree.min_entries());
            }
        } else {
            panic!("root should be a branch node after the split");
        }

        // 分裂后所有条目仍然可查
        let results = rtree.search(&Rectangle::new(0.0, 0.0, 9.0, 9.0));
        assert_eq!(results.len(), 5);
        rtree.check_consistency().unwrap();
    }

    #[test]
    fn test_split_propagates_to_root() {
        let mut rtree = RTree::new(4);

        // 足够多的条目让分裂向上传播出三层的树
        for i in 0..60 {
            let offset = (i % 30) as f64 * 3.0;
            let row = (i / 30) as f64 * 50.0;
            rtree.insert(
                Rectangle::new(offset, row, offset + 2.0, row + 2.0),
                i,
            );
        }

        assert!(rtree.height() >= 3);
        assert_eq!(rtree.len(), 60);
        rtree.check_consistency().unwrap();
    }
}
