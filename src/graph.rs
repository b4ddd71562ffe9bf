//! 组嵌套关系图
//!
//! 边 `parent -> child` 表示 child 组嵌套在 parent 组内。图必须始终保持无环，
//! 因此插入新边前需要做完整的可达性检查，而不仅仅检查一跳的反向边。

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::group::GroupRelation;

/// 从边集构建的邻接表（正向与反向）
#[derive(Debug, Default, Clone)]
pub struct GroupGraph {
    children: HashMap<Uuid, Vec<Uuid>>,
    parents: HashMap<Uuid, Vec<Uuid>>,
}

impl GroupGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 (parent, child) 边构建
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, Uuid)>,
    {
        let mut graph = Self::new();
        for (parent, child) in edges {
            graph.add_edge(parent, child);
        }
        graph
    }

    pub fn from_relations(relations: &[GroupRelation]) -> Self {
        Self::from_edges(
            relations
                .iter()
                .map(|r| (r.parent_group_id, r.child_group_id)),
        )
    }

    pub fn add_edge(&mut self, parent: Uuid, child: Uuid) {
        self.children.entry(parent).or_default().push(child);
        self.parents.entry(child).or_default().push(parent);
    }

    pub fn contains_edge(&self, parent: Uuid, child: Uuid) -> bool {
        self.children
            .get(&parent)
            .is_some_and(|children| children.contains(&child))
    }

    /// 直接子组
    pub fn children_of(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 直接父组
    pub fn parents_of(&self, id: Uuid) -> &[Uuid] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 沿正向边是否能从 `from` 到达 `to`（迭代 DFS）
    pub fn reachable(&self, from: Uuid, to: Uuid) -> bool {
        if from == to {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for &next in self.children_of(node) {
                if next == to {
                    return true;
                }
                stack.push(next);
            }
        }

        false
    }

    /// 插入 parent -> child 是否会形成环：当且仅当 parent 已可从 child 到达
    pub fn would_create_cycle(&self, parent: Uuid, child: Uuid) -> bool {
        self.reachable(child, parent)
    }

    /// 所有后代（不含自身）
    pub fn descendants(&self, id: Uuid) -> HashSet<Uuid> {
        Self::closure(id, |node| self.children_of(node))
    }

    /// 所有祖先（不含自身）
    pub fn ancestors(&self, id: Uuid) -> HashSet<Uuid> {
        Self::closure(id, |node| self.parents_of(node))
    }

    fn closure<'a, F>(start: Uuid, next: F) -> HashSet<Uuid>
    where
        F: Fn(Uuid) -> &'a [Uuid],
    {
        let mut seen = HashSet::new();
        let mut stack: Vec<Uuid> = next(start).to_vec();

        while let Some(node) = stack.pop() {
            if node == start || !seen.insert(node) {
                continue;
            }
            stack.extend_from_slice(next(node));
        }

        seen
    }

    /// 整图是否存在环（三色 DFS）
    pub fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: HashMap<Uuid, Mark> = HashMap::new();

        for &root in self.children.keys() {
            if marks.contains_key(&root) {
                continue;
            }

            // (节点, 下一个待访问子节点下标)
            let mut stack: Vec<(Uuid, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Visiting);

            while let Some((node, idx)) = stack.pop() {
                let children = self.children_of(node);
                if idx < children.len() {
                    stack.push((node, idx + 1));
                    let child = children[idx];
                    match marks.get(&child) {
                        Some(Mark::Visiting) => return true,
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(child, Mark::Visiting);
                            stack.push((child, 0));
                        }
                    }
                } else {
                    marks.insert(node, Mark::Done);
                }
            }
        }

        false
    }
}
