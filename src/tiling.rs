//! Tiling a stencil across a target image.
//!
//! The stencil is scaled so that `tiles_per_row` copies fit side by side,
//! then repeated on a grid starting at `(0, 0)` until the whole target is
//! covered. Cells on the right and bottom edges may hang over the target and
//! are clipped. Every target pixel lies in exactly one cell, so rows of the
//! output can be produced independently.

use crate::blending;
use crate::error::{Error, Result};
use crate::pixel::{Argb, PixelBuffer};
use crate::resize;

/// Layout of the tile grid over a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    /// Width of one tile (the scaled stencil).
    pub tile_width: u32,
    /// Height of one tile (the scaled stencil).
    pub tile_height: u32,
    /// Number of tile columns, including a clipped last column.
    pub columns: u32,
    /// Number of tile rows, including a clipped last row.
    pub rows: u32,
}

impl TileGrid {
    /// Plan the grid for `stencil` over `target` at `tiles_per_row` tiles per row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `tiles_per_row` is zero or
    /// larger than the target width, and [`Error::InvalidDimension`] if the
    /// scaled stencil height collapses to zero.
    pub fn plan(target: &PixelBuffer, stencil: &PixelBuffer, tiles_per_row: u32) -> Result<Self> {
        if tiles_per_row == 0 {
            return Err(Error::invalid_argument("tiles per row must be >= 1"));
        }
        let tile_width = target.width() / tiles_per_row;
        if tile_width == 0 {
            return Err(Error::invalid_argument(format!(
                "{tiles_per_row} tiles per row do not fit into width {}",
                target.width()
            )));
        }

        let tile_height = resize::scaled_height(stencil.width(), stencil.height(), tile_width);
        let tile_height = match u32::try_from(tile_height) {
            Ok(h) if h > 0 => h,
            _ => return Err(Error::invalid_dimension(u64::from(tile_width), tile_height)),
        };

        Ok(Self {
            tile_width,
            tile_height,
            columns: target.width().div_ceil(tile_width),
            rows: target.height().div_ceil(tile_height),
        })
    }

    /// Total number of tiles drawn.
    #[must_use]
    pub fn tile_count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Top-left corner of every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |col| (col * self.tile_width, row * self.tile_height))
        })
    }
}

/// Tile `stencil` over `target`, returning a new buffer the size of `target`.
///
/// # Errors
///
/// See [`TileGrid::plan`]. Nothing is returned on failure.
pub fn composite(
    target: &PixelBuffer,
    stencil: &PixelBuffer,
    tiles_per_row: u32,
) -> Result<PixelBuffer> {
    let grid = TileGrid::plan(target, stencil, tiles_per_row)?;
    let tile = resize::scale_to_width(stencil, grid.tile_width)?;
    debug_assert_eq!(tile.height(), grid.tile_height);

    tracing::debug!(
        width = target.width(),
        height = target.height(),
        tile_width = grid.tile_width,
        tile_height = grid.tile_height,
        tiles = grid.tile_count(),
        "compositing stencil tiles"
    );

    let mut out = target.clone();
    let width = target.width() as usize;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.pixels_mut()
            .par_chunks_mut(width)
            .zip(target.pixels().par_chunks(width))
            .enumerate()
            .for_each(|(y, (out_row, base_row))| {
                composite_row(&tile, &grid, y, base_row, out_row);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.pixels_mut()
            .chunks_mut(width)
            .zip(target.pixels().chunks(width))
            .enumerate()
            .for_each(|(y, (out_row, base_row))| {
                composite_row(&tile, &grid, y, base_row, out_row);
            });
    }

    Ok(out)
}

/// Blend one target row against the matching row of every cell it crosses.
fn composite_row(
    tile: &PixelBuffer,
    grid: &TileGrid,
    y: usize,
    base_row: &[Argb],
    out_row: &mut [Argb],
) {
    let tile_width = grid.tile_width as usize;
    let tile_row = y % grid.tile_height as usize;
    let stencil_row = &tile.pixels()[tile_row * tile_width..(tile_row + 1) * tile_width];

    for (base, out) in base_row
        .chunks(tile_width)
        .zip(out_row.chunks_mut(tile_width))
    {
        blending::blend_row(stencil_row, base, out);
    }
}
