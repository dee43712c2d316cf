use crate::drawing::Annotation;

/// Committed annotations in paint order plus the redo buffer.
///
/// Undo pops from `items` onto `redo`, redo pops back. A fresh commit drops
/// whatever is left in `redo`, so the two never share an annotation and there
/// is never more than one branch.
#[derive(Debug, Default, Clone)]
pub struct History {
    items: Vec<Annotation>,
    redo: Vec<Annotation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, annotation: Annotation) {
        self.items.push(annotation);
        self.redo.clear();
    }

    pub fn undo(&mut self) -> bool {
        match self.items.pop() {
            Some(annotation) => {
                self.redo.push(annotation);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(annotation) => {
                self.items.push(annotation);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    #[cfg(test)]
    pub fn redo_items(&self) -> &[Annotation] {
        &self.redo
    }

    /// Repositions a text annotation. Strokes and missing indices are left alone.
    pub fn move_text(&mut self, index: usize, anchor: [f32; 2]) -> bool {
        match self.items.get_mut(index) {
            Some(Annotation::Text(text)) => {
                text.anchor = anchor;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{PenStyle, Stroke, TextAnnotation};

    fn stroke(x: f32) -> Annotation {
        Annotation::Stroke(Stroke {
            points: vec![[x, 0.0], [x, 10.0]],
            style: PenStyle::Pencil,
            color: [0.0, 0.0, 0.0, 1.0],
            width: 2.0,
            opacity: 0.3,
        })
    }

    fn text(content: &str) -> Annotation {
        Annotation::Text(TextAnnotation {
            content: content.to_string(),
            anchor: [0.0, 16.0],
            color: [0.0, 0.0, 0.0, 1.0],
            font_size: 16.0,
        })
    }

    #[test]
    fn test_undo_all_then_redo_in_reverse_removal_order() {
        let mut history = History::new();
        let committed: Vec<Annotation> = (0..5).map(|i| stroke(i as f32)).collect();
        for annotation in &committed {
            history.commit(annotation.clone());
        }
        for _ in 0..5 {
            assert!(history.undo());
        }
        assert!(history.is_empty());
        assert!(!history.undo());

        for expected in &committed {
            assert!(history.redo());
            assert_eq!(history.items().last(), Some(expected));
        }
        assert_eq!(history.items(), committed.as_slice());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_after_undo_drops_redo_branch() {
        let mut history = History::new();
        history.commit(stroke(1.0));
        history.commit(stroke(2.0));
        history.undo();
        assert_eq!(history.items(), &[stroke(1.0)]);
        assert_eq!(history.redo_items(), &[stroke(2.0)]);

        history.commit(stroke(3.0));
        assert_eq!(history.items(), &[stroke(1.0), stroke(3.0)]);
        assert!(history.redo_items().is_empty());
        assert!(!history.redo());
    }

    #[test]
    fn test_clear_empties_both_buffers() {
        let mut history = History::new();
        history.commit(stroke(1.0));
        history.commit(text("a"));
        history.commit(stroke(2.0));
        history.undo();
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_empty_operations_are_noops() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(!history.move_text(0, [1.0, 1.0]));
    }

    #[test]
    fn test_move_text_only_moves_text() {
        let mut history = History::new();
        history.commit(stroke(1.0));
        history.commit(text("hi"));
        assert!(!history.move_text(0, [5.0, 5.0]));
        assert!(history.move_text(1, [5.0, 5.0]));
        assert_eq!(history.get(1).and_then(Annotation::as_text).map(|t| t.anchor), Some([5.0, 5.0]));
    }
}
