use image::RgbaImage;

/// Linear undo/redo stack of full image snapshots.
///
/// The current snapshot is always `snapshots[index]`. Pushing after an undo
/// drops every snapshot past `index`, so there is never a redo branch to
/// return to once a new edit is committed.
#[derive(Default)]
pub struct History {
    snapshots: Vec<RgbaImage>,
    index: usize,
}

impl History {
    #[cfg(test)]
    pub fn new(image: &RgbaImage) -> Self {
        Self {
            snapshots: vec![image.clone()],
            index: 0,
        }
    }

    /// Replace the whole stack with a single snapshot.
    pub fn reset(&mut self, image: &RgbaImage) {
        self.snapshots.clear();
        self.snapshots.push(image.clone());
        self.index = 0;
    }

    /// Store a copy of `image` as the newest snapshot, discarding any redo tail.
    pub fn push(&mut self, image: &RgbaImage) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(image.clone());
        self.index = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&RgbaImage> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    pub fn redo(&mut self) -> Option<&RgbaImage> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.snapshots.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
