//! Deterministic lattice search for rigid groups.
//!
//! Shared by the fixed-table and carport-row strategies:
//!
//! 1. try the group at lattice index (0, 0);
//! 2. expand row 0 toward +column, then toward −column; a direction keeps
//!    scanning until something is placed and then stops at the first miss;
//! 3. expand row pairs −k, +k outward until a pair places nothing;
//! 4. run bounded gap-filling sweeps over the explored index range, testing
//!    only indices never tested before.

use std::collections::HashSet;

use solarpack_core::{GeoPoint, LatticeIndex, LocalPoint, Result};

use super::PlacementContext;
use crate::lattice::Lattice;

/// Groups accepted by a [`GroupSearch`], in acceptance order.
#[derive(Debug, Clone, Default)]
pub struct GroupSearchOutcome {
    /// Accepted lattice indices with their geographic centers.
    pub placed: Vec<(LatticeIndex, GeoPoint)>,
    /// True if the unit budget stopped the search.
    pub budget_hit: bool,
}

/// Search state for one boundary. Local to a single strategy run.
pub struct GroupSearch {
    lattice: Lattice,
    origin_local: LocalPoint,
    margin: f64,
    row_bound: i32,
    col_bound: i32,
    units_per_group: usize,
    budget: usize,
    sweeps: u32,
    tested: HashSet<LatticeIndex>,
    outcome: GroupSearchOutcome,
}

impl GroupSearch {
    /// Creates a search over `lattice` for groups of `units_per_group`
    /// units. `margin` is the group's half-diagonal, used for pruning.
    pub fn new(
        ctx: &PlacementContext<'_>,
        lattice: Lattice,
        margin: f64,
        units_per_group: usize,
        budget: usize,
    ) -> Self {
        let diagonal = ctx.site.diagonal();
        Self {
            lattice,
            origin_local: ctx.site.to_local(lattice.origin()),
            margin,
            row_bound: (diagonal / lattice.row_pitch()).ceil() as i32 + 1,
            col_bound: (diagonal / lattice.col_pitch()).ceil() as i32 + 1,
            units_per_group: units_per_group.max(1),
            budget,
            sweeps: ctx.config.gap_fill_sweeps,
            tested: HashSet::new(),
            outcome: GroupSearchOutcome::default(),
        }
    }

    /// Runs the search. `accept` decides whether the group centred at the
    /// given point fits.
    pub fn run<F>(mut self, ctx: &PlacementContext<'_>, mut accept: F) -> Result<GroupSearchOutcome>
    where
        F: FnMut(LatticeIndex, GeoPoint) -> Result<bool>,
    {
        ctx.check_cancelled()?;
        self.expand_row(ctx, 0, &mut accept)?;

        for k in 1..=self.row_bound {
            if self.outcome.budget_hit {
                break;
            }
            ctx.check_cancelled()?;
            let back = self.expand_row(ctx, -k, &mut accept)?;
            let front = self.expand_row(ctx, k, &mut accept)?;
            if back + front == 0 {
                break;
            }
        }

        self.fill_gaps(ctx, &mut accept)?;
        Ok(self.outcome)
    }

    fn try_place<F>(&mut self, ctx: &PlacementContext<'_>, index: LatticeIndex, accept: &mut F) -> Result<bool>
    where
        F: FnMut(LatticeIndex, GeoPoint) -> Result<bool>,
    {
        if self.outcome.budget_hit || !self.tested.insert(index) {
            return Ok(false);
        }
        if (self.outcome.placed.len() + 1) * self.units_per_group > self.budget {
            self.outcome.budget_hit = true;
            return Ok(false);
        }
        let planar = self.lattice.planar(&self.origin_local, index);
        if !ctx.site.may_contain(&planar, self.margin) {
            return Ok(false);
        }
        let center = self.lattice.center(ctx.geodesic, index)?;
        if accept(index, center)? {
            self.outcome.placed.push((index, center));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expand_row<F>(&mut self, ctx: &PlacementContext<'_>, row: i32, accept: &mut F) -> Result<usize>
    where
        F: FnMut(LatticeIndex, GeoPoint) -> Result<bool>,
    {
        let mut added = 0;
        let anchor = self.try_place(ctx, LatticeIndex::new(row, 0), accept)?;
        if anchor {
            added += 1;
        }
        for direction in [1, -1] {
            let mut found = anchor;
            for step in 1..=self.col_bound {
                if self.outcome.budget_hit {
                    return Ok(added);
                }
                if self.try_place(ctx, LatticeIndex::new(row, direction * step), accept)? {
                    added += 1;
                    found = true;
                } else if found {
                    break;
                }
            }
        }
        Ok(added)
    }

    fn fill_gaps<F>(&mut self, ctx: &PlacementContext<'_>, accept: &mut F) -> Result<()>
    where
        F: FnMut(LatticeIndex, GeoPoint) -> Result<bool>,
    {
        let Some((row_min, row_max, col_min, col_max)) = self.explored_range() else {
            return Ok(());
        };
        for sweep in 1..=self.sweeps as i32 {
            if self.outcome.budget_hit {
                break;
            }
            ctx.check_cancelled()?;
            let mut added = 0;
            for row in (row_min - sweep)..=(row_max + sweep) {
                for col in (col_min - sweep)..=(col_max + sweep) {
                    let index = LatticeIndex::new(row, col);
                    if self.tested.contains(&index) {
                        continue;
                    }
                    if self.try_place(ctx, index, accept)? {
                        added += 1;
                    }
                }
            }
            log::debug!("gap-fill sweep {} placed {} groups", sweep, added);
            if added == 0 {
                break;
            }
        }
        Ok(())
    }

    fn explored_range(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.tested.iter().next()?;
        let mut range = (first.row, first.row, first.col, first.col);
        for index in &self.tested {
            range.0 = range.0.min(index.row);
            range.1 = range.1.max(index.row);
            range.2 = range.2.min(index.col);
            range.3 = range.3.max(index.col);
        }
        Some(range)
    }
}
