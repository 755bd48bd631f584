use ratatui::layout::{Direction, Rect};

use super::path::SplitStep;
use crate::geometry::split_weighted;

/// Shape of a split station. Leaves are the station's children; the same
/// shape with `usize` leaves is what a saved layout stores.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitNode<Id: Copy + Eq> {
    Leaf(Id),
    Split {
        direction: Direction,
        children: Vec<SplitNode<Id>>,
        weights: Vec<f32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Left,
    Right,
    Top,
    Bottom,
}

impl InsertPosition {
    pub fn direction(self) -> Direction {
        match self {
            InsertPosition::Left | InsertPosition::Right => Direction::Horizontal,
            InsertPosition::Top | InsertPosition::Bottom => Direction::Vertical,
        }
    }

    /// Whether the inserted leaf goes before its neighbour.
    pub fn is_leading(self) -> bool {
        matches!(self, InsertPosition::Left | InsertPosition::Top)
    }
}

/// Outcome of following a split path in an existing shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResolution<Id> {
    /// The path ends exactly at this leaf.
    Existing(Id),
    /// The path ran out of matching structure; insert a new leaf.
    Insert,
}

impl<Id: Copy + Eq> SplitNode<Id> {
    pub fn leaf(id: Id) -> Self {
        Self::Leaf(id)
    }

    pub fn split(direction: Direction, children: Vec<SplitNode<Id>>) -> Self {
        let weights = vec![1.0; children.len()];
        Self::Split {
            direction,
            children,
            weights,
        }
    }

    pub fn unwrap_leaf(&self) -> Option<Id> {
        match self {
            SplitNode::Leaf(id) => Some(*id),
            _ => None,
        }
    }

    /// Leaves in pre-order.
    pub fn leaves(&self) -> Vec<Id> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Id>) {
        match self {
            SplitNode::Leaf(id) => out.push(*id),
            SplitNode::Split { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        match self {
            SplitNode::Leaf(leaf) => *leaf == id,
            SplitNode::Split { children, .. } => children.iter().any(|c| c.contains(id)),
        }
    }

    pub fn map<U: Copy + Eq>(&self, f: &mut impl FnMut(Id) -> U) -> SplitNode<U> {
        match self {
            SplitNode::Leaf(id) => SplitNode::Leaf(f(*id)),
            SplitNode::Split {
                direction,
                children,
                weights,
            } => SplitNode::Split {
                direction: *direction,
                children: children.iter().map(|c| c.map(f)).collect(),
                weights: weights.clone(),
            },
        }
    }

    /// Same as [`SplitNode::map`] but drops leaves for which `f` yields
    /// `None`, collapsing splits that end up with a single child.
    pub fn filter_map<U: Copy + Eq>(&self, f: &mut impl FnMut(Id) -> Option<U>) -> Option<SplitNode<U>> {
        match self {
            SplitNode::Leaf(id) => f(*id).map(SplitNode::Leaf),
            SplitNode::Split {
                direction,
                children,
                weights,
            } => {
                let mut kept = Vec::new();
                let mut kept_weights = Vec::new();
                for (idx, child) in children.iter().enumerate() {
                    if let Some(mapped) = child.filter_map(f) {
                        kept.push(mapped);
                        kept_weights.push(weights.get(idx).copied().unwrap_or(1.0));
                    }
                }
                match kept.len() {
                    0 => None,
                    1 => kept.pop(),
                    _ => Some(SplitNode::Split {
                        direction: *direction,
                        children: kept,
                        weights: kept_weights,
                    }),
                }
            }
        }
    }

    pub fn path_of(&self, id: Id) -> Option<Vec<SplitStep>> {
        let mut steps = Vec::new();
        self.path_recursive(id, &mut steps).then_some(steps)
    }

    fn path_recursive(&self, id: Id, steps: &mut Vec<SplitStep>) -> bool {
        match self {
            SplitNode::Leaf(leaf) => *leaf == id,
            SplitNode::Split {
                direction,
                children,
                ..
            } => {
                for (idx, child) in children.iter().enumerate() {
                    steps.push(SplitStep::new(*direction, idx));
                    if child.path_recursive(id, steps) {
                        return true;
                    }
                    steps.pop();
                }
                false
            }
        }
    }

    /// Follows `steps` exactly; yields the leaf if the path still leads to one.
    pub fn resolve(&self, steps: &[SplitStep]) -> PathResolution<Id> {
        let mut current = self;
        for step in steps {
            match current {
                SplitNode::Split {
                    direction,
                    children,
                    ..
                } if *direction == step.direction => match children.get(step.index) {
                    Some(child) => current = child,
                    None => return PathResolution::Insert,
                },
                _ => return PathResolution::Insert,
            }
        }
        match current {
            SplitNode::Leaf(id) => PathResolution::Existing(*id),
            SplitNode::Split { .. } => PathResolution::Insert,
        }
    }

    pub fn remove_leaf(&mut self, id: Id) -> bool {
        match self {
            SplitNode::Leaf(_) => false,
            SplitNode::Split {
                children, weights, ..
            } => {
                let mut removed = false;
                let mut index = 0;
                while index < children.len() {
                    let is_target = matches!(&children[index], SplitNode::Leaf(i) if *i == id);
                    if is_target {
                        children.remove(index);
                        if index < weights.len() {
                            weights.remove(index);
                        }
                        removed = true;
                        break;
                    }
                    if children[index].remove_leaf(id) {
                        removed = true;
                        break;
                    }
                    index += 1;
                }
                if removed && children.len() == 1 {
                    let only = children.remove(0);
                    *self = only;
                }
                removed
            }
        }
    }

    pub fn replace_leaf(&mut self, old: Id, new: Id) -> bool {
        match self {
            SplitNode::Leaf(current) => {
                if *current == old {
                    *current = new;
                    true
                } else {
                    false
                }
            }
            SplitNode::Split { children, .. } => {
                children.iter_mut().any(|child| child.replace_leaf(old, new))
            }
        }
    }

    /// Puts `insert` next to `target`. A parent split running the same way
    /// gains a sibling; otherwise the target leaf is wrapped in a new split.
    pub fn insert_beside(&mut self, target: Id, insert: Id, position: InsertPosition) -> bool {
        match self {
            SplitNode::Leaf(current) => {
                if *current != target {
                    return false;
                }
                *self = Self::pair(SplitNode::Leaf(*current), insert, position);
                true
            }
            SplitNode::Split {
                direction,
                children,
                weights,
            } => {
                let direct = children
                    .iter()
                    .position(|c| matches!(c, SplitNode::Leaf(i) if *i == target));
                if let Some(idx) = direct
                    && *direction == position.direction()
                {
                    let at = if position.is_leading() { idx } else { idx + 1 };
                    let half = weights.get(idx).copied().unwrap_or(1.0) / 2.0;
                    if let Some(w) = weights.get_mut(idx) {
                        *w = half;
                    }
                    children.insert(at, SplitNode::Leaf(insert));
                    weights.insert(at.min(weights.len()), half);
                    return true;
                }
                children
                    .iter_mut()
                    .any(|child| child.insert_beside(target, insert, position))
            }
        }
    }

    /// Wraps the whole shape in a new split with `insert` on one side.
    pub fn split_root(&mut self, insert: Id, position: InsertPosition) {
        let current = std::mem::replace(self, SplitNode::Leaf(insert));
        *self = Self::pair(current, insert, position);
    }

    fn pair(existing: SplitNode<Id>, insert: Id, position: InsertPosition) -> Self {
        let children = if position.is_leading() {
            vec![SplitNode::Leaf(insert), existing]
        } else {
            vec![existing, SplitNode::Leaf(insert)]
        };
        SplitNode::split(position.direction(), children)
    }

    /// Inserts a new leaf following `steps` as far as the shape allows. Where
    /// the structure diverges the reached node is wrapped using the remaining
    /// step's direction.
    pub fn insert_by_path(&mut self, steps: &[SplitStep], insert: Id) {
        let Some((step, rest)) = steps.split_first() else {
            self.split_root(insert, InsertPosition::Right);
            return;
        };
        match self {
            SplitNode::Split {
                direction,
                children,
                weights,
            } if *direction == step.direction => {
                if rest.is_empty() || step.index >= children.len() {
                    let at = step.index.min(children.len());
                    let share = if weights.is_empty() {
                        1.0
                    } else {
                        weights.iter().sum::<f32>() / weights.len() as f32
                    };
                    children.insert(at, SplitNode::Leaf(insert));
                    weights.insert(at.min(weights.len()), share);
                } else {
                    children[step.index].insert_by_path(rest, insert);
                }
            }
            _ => {
                let position = match (step.direction, step.index) {
                    (Direction::Horizontal, 0) => InsertPosition::Left,
                    (Direction::Horizontal, _) => InsertPosition::Right,
                    (Direction::Vertical, 0) => InsertPosition::Top,
                    (Direction::Vertical, _) => InsertPosition::Bottom,
                };
                self.split_root(insert, position);
            }
        }
    }

    pub fn layout(&self, area: Rect) -> Vec<(Id, Rect)> {
        let mut regions = Vec::new();
        self.layout_recursive(area, &mut regions);
        regions
    }

    fn layout_recursive(&self, area: Rect, regions: &mut Vec<(Id, Rect)>) {
        match self {
            SplitNode::Leaf(id) => regions.push((*id, area)),
            SplitNode::Split {
                direction,
                children,
                weights,
            } => {
                let weights = if weights.len() == children.len() {
                    weights.clone()
                } else {
                    vec![1.0; children.len()]
                };
                let rects = split_weighted(*direction, area, &weights);
                for (child, rect) in children.iter().zip(rects) {
                    child.layout_recursive(rect, regions);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: 40,
            height: 20,
        }
    }

    #[test]
    fn insert_beside_reuses_same_direction_parent() {
        let mut shape = SplitNode::leaf(1u8);
        shape.split_root(2, InsertPosition::Right);
        assert!(shape.insert_beside(2, 3, InsertPosition::Right));
        // still one flat horizontal split
        match &shape {
            SplitNode::Split { children, .. } => assert_eq!(children.len(), 3),
            _ => panic!("expected split"),
        }
        assert_eq!(shape.leaves(), vec![1, 2, 3]);
    }

    #[test]
    fn insert_beside_wraps_on_direction_change() {
        let mut shape = SplitNode::split(
            Direction::Horizontal,
            vec![SplitNode::leaf(1u8), SplitNode::leaf(2)],
        );
        assert!(shape.insert_beside(2, 3, InsertPosition::Top));
        assert_eq!(shape.leaves(), vec![1, 3, 2]);
        assert_eq!(
            shape.path_of(3).unwrap(),
            vec![
                SplitStep::new(Direction::Horizontal, 1),
                SplitStep::new(Direction::Vertical, 0)
            ]
        );
    }

    #[test]
    fn remove_leaf_collapses_single_child_splits() {
        let mut shape = SplitNode::split(
            Direction::Horizontal,
            vec![
                SplitNode::leaf(1u8),
                SplitNode::split(
                    Direction::Vertical,
                    vec![SplitNode::leaf(2), SplitNode::leaf(3)],
                ),
            ],
        );
        assert!(shape.remove_leaf(3));
        assert_eq!(
            shape,
            SplitNode::split(
                Direction::Horizontal,
                vec![SplitNode::leaf(1), SplitNode::leaf(2)]
            )
        );
        assert!(shape.remove_leaf(1));
        assert_eq!(shape, SplitNode::leaf(2));
        assert!(!shape.remove_leaf(2));
    }

    #[test]
    fn path_round_trips_through_insert_by_path() {
        let mut shape = SplitNode::split(
            Direction::Horizontal,
            vec![
                SplitNode::leaf(1u8),
                SplitNode::split(
                    Direction::Vertical,
                    vec![SplitNode::leaf(2), SplitNode::leaf(3)],
                ),
            ],
        );
        let path = shape.path_of(3).unwrap();
        assert!(shape.remove_leaf(3));
        shape.insert_by_path(&path, 3);
        assert_eq!(shape.path_of(3).unwrap(), path);
    }

    #[test]
    fn insert_by_path_wraps_missing_structure() {
        let mut shape = SplitNode::leaf(1u8);
        shape.insert_by_path(&[SplitStep::new(Direction::Vertical, 0)], 2);
        assert_eq!(shape.leaves(), vec![2, 1]);
        assert_eq!(shape.resolve(&[SplitStep::new(Direction::Vertical, 1)]), PathResolution::Existing(1));
        assert_eq!(shape.resolve(&[SplitStep::new(Direction::Horizontal, 0)]), PathResolution::Insert);
    }

    #[test]
    fn layout_covers_area() {
        let shape = SplitNode::split(
            Direction::Horizontal,
            vec![SplitNode::leaf(1u8), SplitNode::leaf(2)],
        );
        let regions = shape.layout(area());
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].1.width + regions[1].1.width, 40);
        assert_eq!(regions[1].1.height, 20);
    }

    #[test]
    fn filter_map_collapses() {
        let shape = SplitNode::split(
            Direction::Horizontal,
            vec![SplitNode::leaf(1u8), SplitNode::leaf(2)],
        );
        let kept = shape.filter_map(&mut |id| (id == 2).then_some(id as usize));
        assert_eq!(kept, Some(SplitNode::leaf(2usize)));
    }
}
