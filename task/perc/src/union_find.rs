use crate::error::{Error, Result};

////////////////////////////////////////////////////////////////////////////////

/// Disjoint-set forest over the elements `0..len` with union-by-size and
/// path compression.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    classes: usize,
}

impl UnionFind {
    /// Creates `len` singleton classes.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
            classes: len,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the number of distinct classes.
    pub fn count(&self) -> usize {
        self.classes
    }

    /// Returns the representative of the class containing `id`,
    /// compressing the path walked along the way.
    pub fn find(&mut self, id: usize) -> Result<usize> {
        self.check(id)?;
        Ok(self.find_unchecked(id))
    }

    /// Returns the same representative as [`UnionFind::find`] without
    /// mutating the forest.
    pub fn root(&self, id: usize) -> Result<usize> {
        self.check(id)?;

        let mut current = id;
        while self.parent[current] != current {
            current = self.parent[current];
        }
        Ok(current)
    }

    /// Returns the number of elements in the class containing `id`.
    pub fn class_size(&self, id: usize) -> Result<usize> {
        Ok(self.root_size(self.root(id)?))
    }

    /// Merges the classes of `a` and `b` and returns the root of the merged
    /// class. The smaller tree goes under the larger one; on a tie `b`'s
    /// root goes under `a`'s root.
    pub fn union(&mut self, a: usize, b: usize) -> Result<usize> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.union_unchecked(a, b))
    }

    pub fn connected(&mut self, a: usize, b: usize) -> Result<bool> {
        Ok(self.find(a)? == self.find(b)?)
    }

    /// [`UnionFind::find`] for an id already known to be in range.
    pub(crate) fn find_unchecked(&mut self, id: usize) -> usize {
        let parent = self.parent[id];
        if parent != id {
            self.parent[id] = self.find_unchecked(parent);
        }
        self.parent[id]
    }

    /// [`UnionFind::union`] for ids already known to be in range.
    pub(crate) fn union_unchecked(&mut self, a: usize, b: usize) -> usize {
        let a_root = self.find_unchecked(a);
        let b_root = self.find_unchecked(b);

        if a_root == b_root {
            return a_root;
        }

        let (parent, child) = if self.size[a_root] < self.size[b_root] {
            (b_root, a_root)
        } else {
            (a_root, b_root)
        };

        self.parent[child] = parent;
        self.size[parent] += self.size[child];
        self.classes -= 1;

        parent
    }

    /// Size of the class rooted at `root`.
    pub(crate) fn root_size(&self, root: usize) -> usize {
        self.size[root]
    }

    fn check(&self, id: usize) -> Result<()> {
        if id < self.len() {
            Ok(())
        } else {
            Err(Error::ElementOutOfRange {
                id,
                size: self.len(),
            })
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
