use std::{collections::HashMap, ops::Deref};

use crate::api::{self, Comment, CommentId};

/// A comment along with the replies made to it, in server order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadNode {
    pub comment: Comment,
    pub replies: Vec<ThreadNode>,
}

impl ThreadNode {
    fn leaf(comment: Comment) -> ThreadNode {
        ThreadNode {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, self included
    pub fn len(&self) -> usize {
        walk(std::slice::from_ref(self)).count()
    }
}

// The derived drop would recurse once per nesting level
impl Drop for ThreadNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

impl Deref for ThreadNode {
    type Target = Comment;

    fn deref(&self) -> &Comment {
        &self.comment
    }
}

/// Rebuilds the reply forest out of the flat comment list of a post.
///
/// Comments whose parent is not part of `comments` are shown at the top
/// level rather than dropped.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<ThreadNode> {
    let index = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect::<HashMap<CommentId, usize>>();

    let mut children = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent.map(|p| (p, index.get(&p))) {
            None => roots.push(i),
            Some((_, Some(&parent))) => children[parent].push(i),
            Some((parent, None)) => {
                tracing::warn!(
                    comment = %c.id,
                    %parent,
                    "parent comment is missing, showing reply at top level"
                );
                roots.push(i);
            }
        }
    }

    // Every node has at most one parent index, so what hangs off the roots
    // is a forest. Assemble it bottom-up, without recursing.
    let mut post_order = Vec::with_capacity(comments.len());
    let mut stack = roots.iter().rev().map(|&r| (r, false)).collect::<Vec<_>>();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            post_order.push(i);
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|&c| (c, false)));
        }
    }

    let mut slots = comments
        .iter()
        .cloned()
        .map(|c| Some(ThreadNode::leaf(c)))
        .collect::<Vec<_>>();
    for i in post_order {
        let replies = children[i]
            .iter()
            .filter_map(|&c| slots[c].take())
            .collect::<Vec<_>>();
        if let Some(node) = &mut slots[i] {
            node.replies = replies;
        }
    }
    roots.iter().filter_map(|&r| slots[r].take()).collect()
}

/// Same as `build_comment_tree`, straight from a response body
pub fn build_comment_tree_from_value(
    body: serde_json::Value,
) -> serde_json::Result<Vec<ThreadNode>> {
    Ok(build_comment_tree(&api::decode_comment_list(body)?))
}

/// Depth-first, pre-order traversal of a forest, yielding each node along
/// with its depth (roots are at depth 0)
pub fn walk(forest: &[ThreadNode]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().map(|n| (0, n)).collect(),
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a ThreadNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a ThreadNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.replies.iter().rev().map(|r| (depth + 1, r)));
        Some((depth, node))
    }
}

pub fn count_nodes(forest: &[ThreadNode]) -> usize {
    walk(forest).count()
}

/// Finds a comment in the forest, returning its depth along with it
pub fn find(forest: &[ThreadNode], id: CommentId) -> Option<(usize, &ThreadNode)> {
    walk(forest).find(|(_, n)| n.id == id)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use bolero::generator::TypeGenerator;

    use chrono::TimeZone;

    use super::*;
    use crate::api::{Role, User, UserId};

    pub fn user(id: i64) -> User {
        User {
            id: UserId(id),
            username: format!("user{id}"),
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
            role: Role::Alumni,
        }
    }

    pub fn comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: CommentId(id),
            content: format!("comment {id}"),
            image: None,
            parent: parent.map(CommentId),
            user: user(1),
            created_date: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                + chrono::Duration::minutes(id),
            updated_date: None,
        }
    }

    fn shape(forest: &[ThreadNode]) -> Vec<(usize, i64)> {
        walk(forest).map(|(d, n)| (d, n.id.0)).collect()
    }

    #[test]
    fn empty() {
        assert!(build_comment_tree(&[]).is_empty());
        assert!(build_comment_tree_from_value(serde_json::json!([]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn non_array_bodies_are_empty() {
        for body in [
            serde_json::json!(null),
            serde_json::json!({"results": []}),
            serde_json::json!(42),
        ] {
            assert!(build_comment_tree_from_value(body).unwrap().is_empty());
        }
    }

    #[test]
    fn malformed_elements_are_an_error() {
        assert!(build_comment_tree_from_value(serde_json::json!([{"id": 1}])).is_err());
    }

    #[test]
    fn chain() {
        let forest = build_comment_tree(&[
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(3)),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, CommentId(1));
        assert_eq!(forest[0].replies[0].id, CommentId(2));
        assert_eq!(forest[0].replies[0].replies[0].id, CommentId(3));
        assert_eq!(forest[0].replies[0].replies[0].replies[0].id, CommentId(4));
        assert_eq!(shape(&forest), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(find(&forest, CommentId(4)).map(|(d, _)| d), Some(3));
        assert_eq!(forest[0].len(), 4);
    }

    #[test]
    fn source_order_is_kept() {
        let forest = build_comment_tree(&[
            comment(5, None),
            comment(1, None),
            comment(9, Some(5)),
            comment(3, Some(5)),
            comment(2, None),
            comment(7, Some(1)),
        ]);
        assert_eq!(
            shape(&forest),
            vec![(0, 5), (1, 9), (1, 3), (0, 1), (1, 7), (0, 2)]
        );
    }

    #[test]
    fn reply_listed_before_its_parent() {
        let forest = build_comment_tree(&[comment(2, Some(1)), comment(1, None)]);
        assert_eq!(shape(&forest), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn dangling_parent_is_promoted() {
        let forest = build_comment_tree(&[
            comment(1, None),
            comment(2, Some(42)),
            comment(3, Some(2)),
        ]);
        assert_eq!(shape(&forest), vec![(0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn corrupt_cycles_terminate() {
        let forest = build_comment_tree(&[
            comment(1, None),
            comment(2, Some(3)),
            comment(3, Some(2)),
            comment(4, Some(4)),
        ]);
        assert_eq!(shape(&forest), vec![(0, 1)]);
    }

    #[test]
    fn very_deep_chain() {
        let comments = (0..100_000)
            .map(|i| comment(i, (i > 0).then(|| i - 1)))
            .collect::<Vec<_>>();
        let forest = build_comment_tree(&comments);
        assert_eq!(count_nodes(&forest), comments.len());
        assert_eq!(
            find(&forest, CommentId(99_999)).map(|(d, _)| d),
            Some(99_999)
        );
        drop(forest);
    }

    /// Parent choices in a generated forest: each comment picks a parent among
    /// the ones before it, or none
    #[derive(Clone, Debug, bolero::generator::TypeGenerator)]
    struct Shape {
        #[generator(bolero::generator::gen_with::<Vec<Option<u16>>>().len(0..200usize))]
        parents: Vec<Option<u16>>,
        dangling: Vec<u16>,
    }

    impl Shape {
        fn comments(&self) -> Vec<Comment> {
            let mut res = Vec::with_capacity(self.parents.len());
            for (i, p) in self.parents.iter().enumerate() {
                let parent = match (p, i) {
                    (Some(p), i) if i > 0 => Some(*p as i64 % i as i64),
                    _ => None,
                };
                res.push(comment(i as i64, parent));
            }
            res
        }
    }

    #[test]
    fn fuzz_completeness_and_idempotence() {
        bolero::check!()
            .with_type::<Shape>()
            .for_each(|s: &Shape| {
                let comments = s.comments();
                let forest = build_comment_tree(&comments);
                assert_eq!(count_nodes(&forest), comments.len());
                assert_eq!(forest, build_comment_tree(&comments));
                for (depth, node) in walk(&forest) {
                    assert_eq!(depth == 0, node.parent.is_none());
                }
                let roots = comments.iter().filter(|c| c.parent.is_none()).count();
                assert_eq!(forest.len(), roots);
            })
    }

    #[test]
    fn fuzz_dangling_parents_stay_visible() {
        bolero::check!()
            .with_type::<Shape>()
            .for_each(|s: &Shape| {
                let mut comments = s.comments();
                let n = comments.len() as i64;
                for (c, d) in comments.iter_mut().zip(s.dangling.iter()) {
                    if c.parent.is_some() {
                        c.parent = Some(CommentId(n + *d as i64));
                    }
                }
                let forest = build_comment_tree(&comments);
                assert_eq!(count_nodes(&forest), comments.len());
                for (depth, node) in walk(&forest) {
                    let resolves = node.parent.map_or(false, |p| p.0 < n);
                    assert_eq!(depth == 0, !resolves);
                }
            })
    }

    #[test]
    fn fuzz_arbitrary_ids() {
        bolero::check!()
            .with_type::<Vec<(CommentId, Option<CommentId>)>>()
            .for_each(|pairs| {
                let mut seen = HashSet::new();
                let comments = pairs
                    .iter()
                    .filter(|(id, _)| seen.insert(*id))
                    .map(|&(id, parent)| Comment {
                        id,
                        parent,
                        ..comment(0, None)
                    })
                    .collect::<Vec<_>>();
                let forest = build_comment_tree(&comments);
                let roots = comments
                    .iter()
                    .filter(|c| c.parent.map_or(true, |p| !seen.contains(&p)))
                    .map(|c| c.id)
                    .collect::<Vec<_>>();
                assert_eq!(forest.iter().map(|n| n.id).collect::<Vec<_>>(), roots);
                for (_, node) in walk(&forest) {
                    for reply in &node.replies {
                        assert_eq!(reply.parent, Some(node.id));
                    }
                }
            })
    }
}
