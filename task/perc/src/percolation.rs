use core::ops::{BitOr, BitOrAssign};

use log::trace;

use crate::{
    error::{Error, Result},
    union_find::UnionFind,
};

////////////////////////////////////////////////////////////////////////////////

/// Connectivity flags aggregated on the root of every class of open sites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const NONE: Status = Status(0);
    pub const CONNECTED_TO_TOP: Status = Status(0b01);
    pub const CONNECTED_TO_BOTTOM: Status = Status(0b10);
    pub const SPANNING: Status = Status(0b11);

    pub fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Status) -> Self::Output {
        Status(self.0 | rhs.0)
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.0 |= rhs.0
    }
}

////////////////////////////////////////////////////////////////////////////////

/// An `n` by `n` grid of sites that are opened one by one.
///
/// Rows and columns are 1-indexed: the top row is `1`, the bottom row is `n`.
/// Top and bottom connectivity is stored as [`Status`] flags on class roots
/// rather than through virtual nodes, so a class touching only the bottom
/// row never makes its sites full.
#[derive(Debug, Clone)]
pub struct Percolation {
    n: usize,
    open: Vec<bool>,
    open_count: usize,
    sites: UnionFind,
    status: Vec<Status>,
    percolates: bool,
}

impl Percolation {
    /// Creates a grid with every site closed.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] if `n` is zero or `n * n` overflows.
    pub fn new(n: usize) -> Result<Self> {
        let len = match n.checked_mul(n) {
            Some(len) if len > 0 => len,
            _ => return Err(Error::InvalidDimension(n)),
        };

        Ok(Self {
            n,
            open: vec![false; len],
            open_count: 0,
            sites: UnionFind::new(len),
            status: vec![Status::NONE; len],
            percolates: false,
        })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Opens the site at (`row`, `col`) if it is not open already and joins
    /// it with its open neighbours.
    pub fn open(&mut self, row: usize, col: usize) -> Result<()> {
        let site = self.site_id(row, col)?;
        if self.open[site] {
            return Ok(());
        }

        // Coordinates are valid past this point: nothing below can fail.
        self.open[site] = true;
        self.open_count += 1;

        let mut status = self.own_status(row);
        for neighbour in self.neighbours(row, col).into_iter().flatten() {
            if !self.open[neighbour] {
                continue;
            }
            status |= self.status[self.sites.find_unchecked(neighbour)];
            self.sites.union_unchecked(site, neighbour);
        }

        // Unions may have moved the root, so look it up once they are done.
        let root = self.sites.find_unchecked(site);
        status |= self.status[root];
        self.status[root] = status;

        if !self.percolates && status.contains(Status::SPANNING) {
            trace!(
                "{}x{} grid percolates after opening ({row}, {col}): {} sites open, \
                 spanning class of {}, {} classes",
                self.n,
                self.n,
                self.open_count,
                self.sites.root_size(root),
                self.sites.count()
            );
            self.percolates = true;
        }

        Ok(())
    }

    pub fn is_open(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.open[self.site_id(row, col)?])
    }

    /// Returns `true` if the site is open and connected to the top row
    /// through open sites.
    pub fn is_full(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.status(row, col)?.contains(Status::CONNECTED_TO_TOP))
    }

    /// Returns the flags of the class containing the site. Closed sites
    /// belong to no class and have [`Status::NONE`].
    pub fn status(&self, row: usize, col: usize) -> Result<Status> {
        let site = self.site_id(row, col)?;
        if !self.open[site] {
            return Ok(Status::NONE);
        }
        Ok(self.status[self.sites.root(site)?])
    }

    pub fn number_of_open_sites(&self) -> usize {
        self.open_count
    }

    /// Fraction of open sites among all `n * n` sites.
    pub fn open_fraction(&self) -> f64 {
        self.open_count as f64 / self.open.len() as f64
    }

    pub fn percolates(&self) -> bool {
        self.percolates
    }

    fn site_id(&self, row: usize, col: usize) -> Result<usize> {
        if !(1..=self.n).contains(&row) || !(1..=self.n).contains(&col) {
            return Err(Error::OutOfRange {
                row,
                col,
                n: self.n,
            });
        }
        Ok((row - 1) * self.n + (col - 1))
    }

    fn own_status(&self, row: usize) -> Status {
        let mut status = Status::NONE;
        if row == 1 {
            status |= Status::CONNECTED_TO_TOP;
        }
        if row == self.n {
            status |= Status::CONNECTED_TO_BOTTOM;
        }
        status
    }

    /// Ids of the in-range neighbours above, below, left and right of a
    /// valid site.
    fn neighbours(&self, row: usize, col: usize) -> [Option<usize>; 4] {
        let site = (row - 1) * self.n + (col - 1);
        [
            (row > 1).then(|| site - self.n),
            (row < self.n).then(|| site + self.n),
            (col > 1).then(|| site - 1),
            (col < self.n).then(|| site + 1),
        ]
    }
}

////////////////////////////////////////////////////////////////////////////////
