use crate::akn::classify::Classifier;
use crate::docx::paragraphs::Paragraph;

pub const ROOT_TITLE: &str = "root";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub level: u8,
    pub content: Vec<String>,
    pub children: Vec<Section>,
}

impl Section {
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of sections below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

#[derive(Clone, Debug)]
struct ArenaNode {
    title: String,
    level: u8,
    content: Vec<String>,
    children: Vec<usize>,
}

fn arena_add(arena: &mut Vec<ArenaNode>, parent: Option<usize>, node: ArenaNode) -> usize {
    let idx = arena.len();
    arena.push(node);
    if let Some(p) = parent {
        arena[p].children.push(idx);
    }
    idx
}

fn arena_to_tree(idx: usize, arena: &mut [ArenaNode]) -> Section {
    let title = std::mem::take(&mut arena[idx].title);
    let content = std::mem::take(&mut arena[idx].content);
    let child_ids = std::mem::take(&mut arena[idx].children);
    Section {
        title,
        level: arena[idx].level,
        content,
        children: child_ids
            .into_iter()
            .map(|c| arena_to_tree(c, arena))
            .collect(),
    }
}

/// Builds the heading tree in one pass. A heading of level L closes every open
/// section at level L or deeper, then opens under the nearest shallower one.
/// Body paragraphs go to the innermost open section; those before the first
/// heading land in the synthetic level-0 root.
pub fn build_sections(paragraphs: &[Paragraph], classifier: &Classifier) -> Section {
    let mut arena: Vec<ArenaNode> = Vec::new();
    let root = arena_add(
        &mut arena,
        None,
        ArenaNode {
            title: ROOT_TITLE.to_string(),
            level: 0,
            content: Vec::new(),
            children: Vec::new(),
        },
    );
    // Levels along the stack are strictly increasing from the root.
    let mut stack: Vec<usize> = vec![root];

    for p in paragraphs {
        if let Some(level) = classifier.heading_level(p.style.as_deref()) {
            while let Some(&top) = stack.last() {
                if arena[top].level < level {
                    break;
                }
                stack.pop();
            }
            let parent = stack.last().copied().unwrap_or(root);
            let title = if p.text.is_empty() {
                format!("Heading{level}")
            } else {
                p.text.clone()
            };
            let idx = arena_add(
                &mut arena,
                Some(parent),
                ArenaNode {
                    title,
                    level,
                    content: Vec::new(),
                    children: Vec::new(),
                },
            );
            stack.push(idx);
            continue;
        }

        if classifier.should_skip(&p.text) {
            continue;
        }
        let top = stack.last().copied().unwrap_or(root);
        arena[top].content.push(p.text.clone());
    }

    arena_to_tree(root, &mut arena)
}

#[cfg(test)]
mod tests {
    use super::{build_sections, Section};
    use crate::akn::classify::Classifier;
    use crate::docx::paragraphs::Paragraph;

    fn heading(level: u8, text: &str) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            style: Some(format!("heading{level}")),
        }
    }

    fn body(text: &str) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            style: None,
        }
    }

    fn build(paras: &[Paragraph]) -> Section {
        build_sections(paras, &Classifier::default())
    }

    fn outline(s: &Section) -> Vec<(u8, String, usize)> {
        let mut out = vec![(s.level, s.title.clone(), s.children.len())];
        for c in &s.children {
            out.extend(outline(c));
        }
        out
    }

    fn assert_levels_increase(s: &Section) {
        for c in &s.children {
            assert!(c.level > s.level, "{} under {}", c.title, s.title);
            assert_levels_increase(c);
        }
    }

    #[test]
    fn second_top_level_heading_closes_first_subtree() {
        let root = build(&[
            heading(1, "H1_a"),
            heading(2, "H2_a"),
            heading(1, "H1_b"),
            heading(3, "H3_a"),
        ]);
        assert_eq!(
            outline(&root),
            vec![
                (0, "root".to_string(), 2),
                (1, "H1_a".to_string(), 1),
                (2, "H2_a".to_string(), 0),
                (1, "H1_b".to_string(), 1),
                (3, "H3_a".to_string(), 0),
            ]
        );
        assert_levels_increase(&root);
    }

    #[test]
    fn content_goes_to_innermost_open_section() {
        let root = build(&[
            body("preamble"),
            heading(1, "Argument"),
            body("intro"),
            heading(3, "Detail"),
            body("deep"),
            heading(2, "Point"),
            body("point text"),
        ]);
        assert_eq!(root.content, vec!["preamble"]);
        let arg = &root.children[0];
        assert_eq!(arg.content, vec!["intro"]);
        assert_eq!(arg.children[0].title, "Detail");
        assert_eq!(arg.children[0].content, vec!["deep"]);
        assert_eq!(arg.children[1].title, "Point");
        assert_eq!(arg.children[1].content, vec!["point text"]);
        assert_levels_increase(&root);
    }

    #[test]
    fn boilerplate_is_dropped_everywhere() {
        let root = build(&[
            body("Case No. 24-1234"),
            heading(1, "A"),
            body("12 of 45"),
            body("case no. 24-1234"),
            heading(2, "B"),
            body("7"),
            body("kept"),
            body(""),
        ]);
        assert!(root.content.is_empty());
        assert!(root.children[0].content.is_empty());
        assert_eq!(root.children[0].children[0].content, vec!["kept"]);
    }

    #[test]
    fn no_headings_means_no_children() {
        let root = build(&[body("just text"), body("more")]);
        assert!(root.children.is_empty());
        assert_eq!(root.content.len(), 2);
    }

    #[test]
    fn empty_heading_gets_placeholder_title() {
        let root = build(&[heading(2, "")]);
        assert_eq!(root.children[0].title, "Heading2");
        assert_eq!(root.descendant_count(), 1);
    }

    #[test]
    fn levels_increase_for_arbitrary_sequences() {
        let seqs: [&[u8]; 5] = [
            &[4, 3, 2, 1],
            &[1, 4, 2, 4, 3, 1, 1],
            &[2, 2, 2],
            &[3, 1, 4, 4, 2, 3, 1, 2],
            &[1, 2, 3, 4, 3, 2, 1],
        ];
        for seq in seqs {
            let paras: Vec<_> = seq
                .iter()
                .enumerate()
                .map(|(i, l)| heading(*l, &format!("s{i}")))
                .collect();
            let root = build(&paras);
            assert_levels_increase(&root);
            assert_eq!(root.descendant_count(), seq.len());
        }
    }
}
