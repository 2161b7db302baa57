use super::TreeNode;

/// Depth-first pre-order traversal, children left to right.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> PreOrder<'a> {
    pub(super) fn new(root: &'a TreeNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse push so the first child is visited next
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
