//! Parallel batch reads
//!
//! A frozen [`TreeIndex`] is `Sync`, so many reads can run against one
//! shared reference from Rayon's pool without locking.

use rayon::prelude::*;

use super::index::TreeIndex;

/// `text_content` of every position, in input order
pub fn text_contents(tree: &TreeIndex, positions: &[usize]) -> Vec<String> {
    positions
        .par_iter()
        .map(|&pos| tree.text_content(pos))
        .collect()
}

/// Child positions of every position, in input order
pub fn child_lists(tree: &TreeIndex, positions: &[usize]) -> Vec<Vec<usize>> {
    positions
        .par_iter()
        .map(|&pos| tree.child_positions(pos))
        .collect()
}

/// Apply `mapper` to every position in parallel
pub fn map_positions<F, T>(tree: &TreeIndex, positions: &[usize], mapper: F) -> Vec<T>
where
    F: Fn(&TreeIndex, usize) -> T + Sync + Send,
    T: Send,
{
    positions
        .par_iter()
        .map(|&pos| mapper(tree, pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{parse_str, BuildOptions};

    fn tree() -> TreeIndex {
        let mut xml = String::from("<list>");
        for i in 0..200 {
            xml.push_str(&format!("<item n=\"{}\">value {}</item>", i, i));
        }
        xml.push_str("</list>");
        parse_str(&xml, BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_parallel_text_contents() {
        let tree = tree();
        let items = tree.elements_by_tag_name(tree.document(), "item");
        let texts = text_contents(&tree, &items);
        assert_eq!(texts.len(), 200);
        assert_eq!(texts[0], "value 0");
        assert_eq!(texts[199], "value 199");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tree = tree();
        let all: Vec<usize> = (0..tree.node_count()).map(|o| tree.position(o)).collect();
        let parallel = child_lists(&tree, &all);
        let sequential: Vec<Vec<usize>> = all.iter().map(|&p| tree.child_positions(p)).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_map_positions() {
        let tree = tree();
        let items = tree.elements_by_tag_name(tree.document(), "item");
        let ids = map_positions(&tree, &items, |t, pos| {
            let e = t.element_ordinal(pos).unwrap();
            t.attribute_value_by_name(e, "n").unwrap().parse::<usize>().unwrap()
        });
        assert_eq!(ids, (0..200).collect::<Vec<_>>());
    }
}
