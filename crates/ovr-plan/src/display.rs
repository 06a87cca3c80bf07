//! Tree display for plans

use std::fmt;

/// A node that can be rendered by [`DisplayTree`]
pub trait TreeNode {
    /// Display label of this node
    fn label(&self) -> String;

    /// Child nodes in order
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Additional details shown after the label
    fn details(&self) -> Option<String> {
        None
    }
}

/// Renders a tree with box-drawing connectors
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
}

impl<'a> DisplayTree<'a> {
    /// Create a display tree rooted at `root`
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self { root }
    }

    fn write_label(f: &mut fmt::Formatter<'_>, node: &dyn TreeNode) -> fmt::Result {
        f.write_str(&node.label())?;
        if let Some(details) = node.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)
    }

    fn fmt_node(
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };
        write!(f, "{prefix}{connector}")?;
        Self::write_label(f, node)?;

        let children = node.children();
        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, &child_prefix, i == children.len() - 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_label(f, self.root)?;
        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, "", i == children.len() - 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {
        name: &'static str,
        children: Vec<TestNode>,
    }

    impl TreeNode for TestNode {
        fn label(&self) -> String {
            self.name.to_string()
        }

        fn children(&self) -> Vec<&dyn TreeNode> {
            self.children.iter().map(|c| c as &dyn TreeNode).collect()
        }
    }

    #[test]
    fn renders_connectors() {
        let tree = TestNode {
            name: "Root",
            children: vec![
                TestNode {
                    name: "A",
                    children: vec![TestNode {
                        name: "A1",
                        children: vec![],
                    }],
                },
                TestNode {
                    name: "B",
                    children: vec![],
                },
            ],
        };
        let rendered = DisplayTree::new(&tree).to_string();
        assert_eq!(rendered, "Root\n├─ A\n│  └─ A1\n└─ B\n");
    }
}
