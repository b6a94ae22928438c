use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use ratmail_tree::{FixedNode, FixedTree, PositionedTree, Subtrees, TreeError, TreePath};

use crate::{AttachmentMeta, Message};

/// One row of the detail tree nested under every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLine {
    Header { name: &'static str, value: String },
    Attachments(usize),
    Attachment(AttachmentMeta),
    /// The whole text body; rendered as a multi-row box.
    Body(String),
}

impl DetailLine {
    pub fn text(&self) -> String {
        match self {
            Self::Header { name, value } => format!("{}: {}", name, value),
            Self::Attachments(1) => "1 attachment".to_string(),
            Self::Attachments(count) => format!("{} attachments", count),
            Self::Attachment(meta) => {
                format!("{} ({}, {} bytes)", meta.filename, meta.mime, meta.size)
            }
            Self::Body(body) => body.clone(),
        }
    }
}

pub fn detail_tree(message: &Message) -> FixedTree<DetailLine> {
    let mut nodes = Vec::new();
    let headers = [
        ("From", &message.from),
        ("To", &message.to),
        ("Date", &message.date),
        ("Subject", &message.subject),
    ];
    for (name, value) in headers {
        if !value.is_empty() {
            nodes.push(FixedNode::leaf(DetailLine::Header {
                name,
                value: value.clone(),
            }));
        }
    }
    if !message.attachments.is_empty() {
        nodes.push(FixedNode::new(
            DetailLine::Attachments(message.attachments.len()),
            message
                .attachments
                .iter()
                .cloned()
                .map(|meta| FixedNode::leaf(DetailLine::Attachment(meta)))
                .collect(),
        ));
    }
    if !message.body.is_empty() {
        nodes.push(FixedNode::leaf(DetailLine::Body(message.body.clone())));
    }
    FixedTree::new(nodes)
}

/// Groups messages into reply threads; node contents index into `messages`.
///
/// A message hangs below the nearest known id among `In-Reply-To` and its
/// `References` (newest first). Messages whose parent is unknown start a
/// thread. Replies are ordered oldest first, threads by their most recent
/// message, newest first.
pub fn build_threads(messages: &[Message]) -> FixedTree<usize> {
    let count = messages.len();
    let mut by_id: HashMap<&str, usize> = HashMap::new();
    for (idx, message) in messages.iter().enumerate() {
        by_id.entry(message.message_id.as_str()).or_insert(idx);
    }

    let mut parent: Vec<Option<usize>> = messages
        .iter()
        .enumerate()
        .map(|(idx, message)| {
            message
                .in_reply_to
                .iter()
                .chain(message.references.iter().rev())
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .find(|candidate| *candidate != idx)
        })
        .collect();

    // Reference loops: the first member of each loop becomes a thread root.
    // Each message has one parent, so a walk up meets at most one loop.
    let mut state = vec![Walk::Unseen; count];
    for start in 0..count {
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            match state[idx] {
                Walk::Done => break,
                Walk::OnPath => {
                    let from = path.iter().position(|p| *p == idx).unwrap_or(0);
                    if let Some(first) = path[from..].iter().min().copied() {
                        debug!("reply loop through {}", messages[first].message_id);
                        parent[first] = None;
                    }
                    break;
                }
                Walk::Unseen => {
                    state[idx] = Walk::OnPath;
                    path.push(idx);
                    current = parent[idx];
                }
            }
        }
        for idx in path {
            state[idx] = Walk::Done;
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots = Vec::new();
    for idx in 0..count {
        match parent[idx] {
            Some(up) => children[up].push(idx),
            None => roots.push(idx),
        }
    }
    for list in &mut children {
        list.sort_by_key(|idx| (messages[*idx].timestamp, *idx));
    }

    // Pre-order: every message comes after its parent.
    let mut order = Vec::with_capacity(count);
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children[idx].iter().rev());
    }

    let mut latest: Vec<i64> = messages.iter().map(|m| m.timestamp).collect();
    for idx in order.iter().rev() {
        if let Some(up) = parent[*idx] {
            latest[up] = latest[up].max(latest[*idx]);
        }
    }
    roots.sort_by_key(|idx| (std::cmp::Reverse(latest[*idx]), *idx));

    let mut built: Vec<Option<FixedNode<usize>>> = (0..count).map(|_| None).collect();
    for idx in order.into_iter().rev() {
        let nodes = children[idx].iter().filter_map(|child| built[*child].take()).collect();
        built[idx] = Some(FixedNode::new(idx, nodes));
    }
    FixedTree::new(roots.into_iter().filter_map(|idx| built[idx].take()).collect())
}

#[derive(Clone, Copy)]
enum Walk {
    Unseen,
    OnPath,
    Done,
}

/// Threaded mailbox: messages as a forest, each carrying its detail tree.
#[derive(Debug, Clone)]
pub struct ThreadTree {
    messages: Vec<Rc<Message>>,
    threads: FixedTree<usize>,
    details: Vec<FixedTree<DetailLine>>,
}

impl ThreadTree {
    pub fn new(messages: Vec<Message>) -> Self {
        let threads = build_threads(&messages);
        let details = messages.iter().map(detail_tree).collect();
        Self {
            messages: messages.into_iter().map(Rc::new).collect(),
            threads,
            details,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.roots().len()
    }

    pub fn message_at(&self, pos: &TreePath) -> Option<&Message> {
        let node = self.threads.node(pos)?;
        self.messages.get(node.content).map(|m| m.as_ref())
    }

    /// Current position of a message, e.g. to carry focus over a reload.
    pub fn position_of(&self, message_id: &str) -> Option<TreePath> {
        self.threads
            .iter()
            .find(|(_, idx)| self.messages[**idx].message_id == message_id)
            .map(|(pos, _)| pos)
    }
}

impl PositionedTree for ThreadTree {
    type Position = TreePath;
    type Content = Rc<Message>;

    fn root(&self) -> Option<TreePath> {
        self.threads.root()
    }

    fn get(&self, pos: &TreePath) -> Result<Rc<Message>, TreeError> {
        self.threads
            .node(pos)
            .and_then(|node| self.messages.get(node.content))
            .cloned()
            .ok_or_else(|| TreeError::not_found(pos))
    }

    fn parent(&self, pos: &TreePath) -> Option<TreePath> {
        self.threads.parent(pos)
    }

    fn first_child(&self, pos: &TreePath) -> Option<TreePath> {
        self.threads.first_child(pos)
    }

    fn last_child(&self, pos: &TreePath) -> Option<TreePath> {
        self.threads.last_child(pos)
    }

    fn next_sibling(&self, pos: &TreePath) -> Option<TreePath> {
        self.threads.next_sibling(pos)
    }

    fn prev_sibling(&self, pos: &TreePath) -> Option<TreePath> {
        self.threads.prev_sibling(pos)
    }

    fn depth(&self, pos: &TreePath) -> usize {
        self.threads.depth(pos)
    }
}

impl Subtrees for ThreadTree {
    type Subtree = FixedTree<DetailLine>;

    fn subtree(&self, pos: &TreePath) -> Option<&FixedTree<DetailLine>> {
        let node = self.threads.node(pos)?;
        self.details.get(node.content)
    }
}

#[cfg(test)]
mod tests {
    use ratmail_tree::{
        NestedContent, NestedTree, PositionedTree, Traverse, TreePath, check_structure,
    };

    use super::{DetailLine, ThreadTree, build_threads, detail_tree};
    use crate::{AttachmentMeta, Message};

    fn message(id: &str, reply_to: Option<&str>, refs: &[&str], ts: i64) -> Message {
        Message {
            message_id: id.to_string(),
            in_reply_to: reply_to.map(str::to_string),
            references: refs.iter().map(|r| r.to_string()).collect(),
            timestamp: ts,
            date: String::new(),
            from: format!("{}@example.com", id),
            to: String::new(),
            subject: format!("subject {}", id),
            body: format!("body of {}", id),
            attachments: Vec::new(),
            unread: false,
        }
    }

    fn ids(messages: &[Message]) -> Vec<(usize, String)> {
        let tree = build_threads(messages);
        tree.iter()
            .map(|(pos, idx)| (tree.depth(&pos), messages[*idx].message_id.clone()))
            .collect()
    }

    #[test]
    fn replies_nest_below_their_parent() {
        let messages = vec![
            message("m1", None, &[], 10),
            message("r2", Some("gone"), &["m1", "r1"], 30),
            message("r1", Some("m1"), &["m1"], 20),
            message("o1", Some("missing"), &[], 5),
        ];
        assert_eq!(
            ids(&messages),
            vec![
                (0, "m1".to_string()),
                (1, "r1".to_string()),
                (2, "r2".to_string()),
                (0, "o1".to_string()),
            ]
        );
    }

    #[test]
    fn threads_sort_by_latest_activity() {
        let messages = vec![
            message("old", None, &[], 1),
            message("new", None, &[], 50),
            message("old-reply", Some("old"), &[], 100),
        ];
        let order: Vec<String> = ids(&messages).into_iter().map(|(_, id)| id).collect();
        assert_eq!(order, vec!["old", "old-reply", "new"]);
    }

    #[test]
    fn reply_loops_are_broken() {
        let messages = vec![message("a", Some("b"), &[], 1), message("b", Some("a"), &[], 2)];
        assert_eq!(
            ids(&messages),
            vec![(0, "a".to_string()), (1, "b".to_string())]
        );
    }

    #[test]
    fn loop_reached_from_a_tail_cuts_at_its_first_member() {
        let messages = vec![
            message("tail", Some("c"), &[], 1),
            message("b", Some("c"), &[], 2),
            message("c", Some("b"), &[], 3),
        ];
        assert_eq!(
            ids(&messages),
            vec![
                (0, "b".to_string()),
                (1, "c".to_string()),
                (2, "tail".to_string()),
            ]
        );
    }

    #[test]
    fn long_reply_chains_stay_one_thread() {
        let depth: usize = 100_000;
        let names: Vec<String> = (0..depth).map(|n| format!("m{}", n)).collect();
        let messages: Vec<Message> = (0..depth)
            .map(|n| {
                let parent = n.checked_sub(1).map(|up| names[up].as_str());
                message(&names[n], parent, &[], n as i64)
            })
            .collect();
        let tree = build_threads(&messages);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.len(), depth);
        let mut node = &tree.roots()[0];
        let mut levels = 0;
        while let Some(child) = node.children.first() {
            assert_eq!(child.content, node.content + 1);
            node = child;
            levels += 1;
        }
        assert_eq!((levels, node.content), (depth - 1, depth - 1));
    }

    #[test]
    fn detail_tree_lists_headers_attachments_and_body() {
        let mut msg = message("m1", None, &[], 1);
        msg.attachments.push(AttachmentMeta {
            filename: "a.pdf".to_string(),
            mime: "application/pdf".to_string(),
            size: 3,
        });
        let details = detail_tree(&msg);
        let lines: Vec<String> = details.iter().map(|(_, line)| line.text()).collect();
        assert_eq!(
            lines,
            vec![
                "From: m1@example.com",
                "Subject: subject m1",
                "1 attachment",
                "a.pdf (application/pdf, 3 bytes)",
                "body of m1",
            ]
        );
        assert!(matches!(
            details.get(&TreePath::new(vec![2, 0])),
            Ok(DetailLine::Attachment(_))
        ));
    }

    #[test]
    fn composed_thread_view_is_consistent() {
        let threads = ThreadTree::new(vec![
            message("m1", None, &[], 10),
            message("r1", Some("m1"), &[], 20),
            message("m2", None, &[], 5),
        ]);
        assert_eq!(threads.thread_count(), 2);
        assert_eq!(threads.position_of("r1"), Some(TreePath::new(vec![0, 0])));
        assert_eq!(
            threads.message_at(&TreePath::top(1)).map(|m| m.message_id.as_str()),
            Some("m2")
        );
        for covered in [true, false] {
            let nested = NestedTree::new(threads.clone(), covered);
            assert_eq!(check_structure(&nested), Ok(()));
        }
        let nested = NestedTree::new(threads, true);
        let labels: Vec<String> = nested
            .positions(false)
            .filter_map(|pos| nested.get(&pos).ok())
            .map(|content| match content {
                NestedContent::Outer(message) => message.message_id.clone(),
                NestedContent::Inner(line) => line.text(),
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                "m1",
                "From: m1@example.com",
                "Subject: subject m1",
                "body of m1",
                "r1",
                "From: r1@example.com",
                "Subject: subject r1",
                "body of r1",
                "m2",
                "From: m2@example.com",
                "Subject: subject m2",
                "body of m2",
            ]
        );
    }
}
