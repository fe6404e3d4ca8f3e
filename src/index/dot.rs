use std::io::{self, Write};

use super::suffix_tree::SuffixTree;

fn escape(label: &[u8]) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in String::from_utf8_lossy(label).chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// 以 Graphviz dot 格式输出后缀树（后序），后缀链接以绿色边表示。
pub fn write_dot<W: Write + ?Sized>(tree: &SuffixTree<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph SuffixTree {{")?;

    for id in tree.post_order_ids() {
        let node = tree.node(id);
        if id != tree.root() {
            let parent = tree.node(node.parent());
            writeln!(
                out,
                "\"{}\" -> \"{}\" [ label=\"{}\" ];",
                parent.id(),
                node.id(),
                escape(&tree.text()[node.edge()])
            )?;
        }
        match node.suffix_number() {
            Some(suffix) => writeln!(
                out,
                "\"{}\" [ shape=rectangle, label=\"ID : {}\\nDepth : {}\\nSuffixID : {}\" ];",
                node.id(),
                node.id(),
                node.depth(),
                suffix
            )?,
            None => writeln!(
                out,
                "\"{}\" [ label=\"ID : {}\\nDepth : {}\" ];",
                node.id(),
                node.id(),
                node.depth()
            )?,
        }
        if let Some(link) = node.suffix_link() {
            writeln!(out, "\"{}\" -> \"{}\" [ color=green ];", node.id(), tree.node(link).id())?;
        }
    }

    writeln!(out, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_lists_every_edge_and_link() {
        let tree = SuffixTree::build(b"banana$", 0).unwrap();
        let mut buf = Vec::new();
        write_dot(&tree, &mut buf).unwrap();
        let dot = String::from_utf8(buf).unwrap();

        assert!(dot.starts_with("digraph SuffixTree {\n"));
        assert!(dot.trim_end().ends_with('}'));
        let tree_edges = dot.lines().filter(|l| l.contains("[ label=") && l.contains("->")).count();
        assert_eq!(tree_edges, tree.node_count() - 1);
        let links = dot.lines().filter(|l| l.contains("color=green")).count();
        assert_eq!(links, tree.node_count() - tree.leaf_count());
        assert_eq!(dot.matches("shape=rectangle").count(), 7);
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape(b"a\"b\\"), "a\\\"b\\\\");
    }
}
