//! Grouping of a torrent's flat file list into a directory tree.

use std::collections::BTreeMap;

use shoal_rpc::model::TorrentFile;

use crate::fmt::format_bytes;

pub enum TreeNode {
    Dir(BTreeMap<String, TreeNode>),
    File(FileLeaf),
}

pub struct FileLeaf {
    pub length: i64,
    pub bytes_completed: i64,
    pub first_piece: i64,
    pub last_piece: i64,
}

/// Build a directory tree from the daemon's flat file list. Byte offsets are
/// cumulative in list order, which is how the daemon lays files across
/// pieces, so each leaf also knows its first and last piece index.
pub fn build_tree(files: &[TorrentFile], piece_size: i64) -> BTreeMap<String, TreeNode> {
    let mut root = BTreeMap::new();
    let mut offset: i64 = 0;
    for file in files {
        let first_byte = offset;
        offset += file.length;
        let last_byte = offset;
        let (first_piece, last_piece) = if piece_size > 0 {
            (first_byte / piece_size, last_byte / piece_size)
        } else {
            (0, 0)
        };

        let trimmed = file.name.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        insert_file(
            &mut root,
            &segments,
            FileLeaf {
                length: file.length,
                bytes_completed: file.bytes_completed,
                first_piece,
                last_piece,
            },
        );
    }
    root
}

fn insert_file(map: &mut BTreeMap<String, TreeNode>, segments: &[&str], leaf: FileLeaf) {
    match segments {
        [] => {}
        [name] => {
            map.insert((*name).to_string(), TreeNode::File(leaf));
        }
        [dir, rest @ ..] => {
            let entry = map
                .entry((*dir).to_string())
                .or_insert_with(|| TreeNode::Dir(BTreeMap::new()));
            if let TreeNode::Dir(children) = entry {
                insert_file(children, rest, leaf);
            } else {
                // A file where a directory is needed: the directory wins.
                let mut children = BTreeMap::new();
                insert_file(&mut children, rest, leaf);
                *entry = TreeNode::Dir(children);
            }
        }
    }
}

/// Indented listing with sizes and piece spans.
pub fn render(tree: &BTreeMap<String, TreeNode>, out: &mut String, depth: usize) {
    for (name, node) in tree {
        let indent = "  ".repeat(depth);
        match node {
            TreeNode::Dir(children) => {
                out.push_str(&format!("{indent}{name}/\n"));
                render(children, out, depth + 1);
            }
            TreeNode::File(leaf) => {
                let done = if leaf.length > 0 && leaf.bytes_completed < leaf.length {
                    format!(
                        " {:.0}%",
                        leaf.bytes_completed as f64 / leaf.length as f64 * 100.0
                    )
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "{indent}{name}  {}{done} [pieces {}-{}]\n",
                    format_bytes(leaf.length as f64),
                    leaf.first_piece,
                    leaf.last_piece
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, length: i64) -> TorrentFile {
        TorrentFile {
            name: name.to_string(),
            length,
            bytes_completed: length,
        }
    }

    #[test]
    fn files_nest_under_their_directories() {
        let files = vec![
            file("album/cd1/01.flac", 10),
            file("album/cover.jpg", 6),
            file("readme.txt", 3),
        ];
        let tree = build_tree(&files, 4);

        let TreeNode::Dir(album) = &tree["album"] else {
            panic!("album is not a directory");
        };
        assert!(matches!(album["cover.jpg"], TreeNode::File(_)));
        let TreeNode::Dir(cd1) = &album["cd1"] else {
            panic!("cd1 is not a directory");
        };
        assert!(matches!(cd1["01.flac"], TreeNode::File(_)));
        assert!(matches!(tree["readme.txt"], TreeNode::File(_)));
    }

    #[test]
    fn piece_spans_follow_cumulative_offsets() {
        let files = vec![file("a.bin", 10), file("b.bin", 6), file("c.bin", 3)];
        let tree = build_tree(&files, 4);

        let span = |name: &str| match &tree[name] {
            TreeNode::File(leaf) => (leaf.first_piece, leaf.last_piece),
            TreeNode::Dir(_) => panic!("{name} is a directory"),
        };
        // Bytes 0..10, 10..16, 16..19 over 4-byte pieces.
        assert_eq!(span("a.bin"), (0, 2));
        assert_eq!(span("b.bin"), (2, 4));
        assert_eq!(span("c.bin"), (4, 4));
    }

    #[test]
    fn trailing_slashes_are_ignored() {
        let tree = build_tree(&[file("dir/name/", 1)], 0);
        let TreeNode::Dir(dir) = &tree["dir"] else {
            panic!("dir is not a directory");
        };
        assert!(matches!(dir["name"], TreeNode::File(_)));
    }

    #[test]
    fn rendering_indents_and_orders_deterministically() {
        let files = vec![file("b/z.bin", 1024), file("b/a.bin", 1), file("a.bin", 1)];
        let mut out = String::new();
        render(&build_tree(&files, 0), &mut out, 0);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "a.bin  1 bytes [pieces 0-0]");
        assert_eq!(lines[1], "b/");
        assert!(lines[2].starts_with("  a.bin"));
        assert!(lines[3].starts_with("  z.bin  1.000 kB"));
    }

    #[test]
    fn partial_files_show_their_progress() {
        let mut partial = file("half.bin", 100);
        partial.bytes_completed = 50;
        let mut out = String::new();
        render(&build_tree(&[partial], 0), &mut out, 0);
        assert_eq!(out.trim_end(), "half.bin  100 bytes 50% [pieces 0-0]");
    }
}
