use crate::{pack, unpack, Block, BlockLayout, CartTopology, Direction, Grid2d, StrError, Transport};

/// Tag of the exchange preceding the red sweep
pub const TAG_RED: i32 = 0;

/// Tag of the exchange preceding the black sweep
pub const TAG_BLACK: i32 = 1;

/// Returns the (outgoing edge, incoming ghost) layouts of one side of a tile
///
/// Rows are contiguous; columns are strided by the tile width. Only the valid
/// cells of the block are described, so padding is never transferred.
fn side_layouts(ncol: usize, block: &Block, direction: Direction) -> (BlockLayout, BlockLayout) {
    let (rows, cols) = (block.valid[0], block.valid[1]);
    match direction {
        Direction::North => (BlockLayout::row(ncol, 1, 1, cols), BlockLayout::row(ncol, 0, 1, cols)),
        Direction::South => (
            BlockLayout::row(ncol, rows, 1, cols),
            BlockLayout::row(ncol, rows + 1, 1, cols),
        ),
        Direction::East => (
            BlockLayout::column(ncol, 1, cols, rows),
            BlockLayout::column(ncol, 1, cols + 1, rows),
        ),
        Direction::West => (BlockLayout::column(ncol, 1, 1, rows), BlockLayout::column(ncol, 1, 0, rows)),
    }
}

/// Returns the sides of a tile in exchange order and whether this process sends first
///
/// Along each axis, processes with an even coordinate exchange with their south
/// (east) neighbor first and send first; processes with an odd coordinate
/// exchange with their north (west) neighbor first and receive first. Each axis
/// thus takes two rounds of disjoint pairs, whatever the size of the process grid.
///
/// ```text
/// process rows:   0   1   2   3   4
/// round 1:        0 ↔ 1   2 ↔ 3
/// round 2:            1 ↔ 2   3 ↔ 4
/// ```
pub fn exchange_schedule(topology: &CartTopology) -> [(Direction, bool); 4] {
    let even_row = topology.coords[0] % 2 == 0;
    let even_col = topology.coords[1] % 2 == 0;
    let (north, south) = ((Direction::North, even_row), (Direction::South, even_row));
    let (east, west) = ((Direction::East, even_col), (Direction::West, even_col));
    match (even_row, even_col) {
        (true, true) => [south, north, east, west],
        (true, false) => [south, north, west, east],
        (false, true) => [north, south, east, west],
        (false, false) => [north, south, west, east],
    }
}

/// Refreshes the ghost ring of a tile
///
/// The north/south sides are processed before the east/west sides, in the
/// order given by [exchange_schedule]. Where a neighbor exists, the edge is
/// exchanged with it; otherwise the edge is copied into the adjacent ghost
/// cells (zero-gradient condition at the physical boundary). Corners of the
/// ring are not touched, so the ghost values do not depend on the order.
///
/// # Input
///
/// * `tile` -- the local tile with dimensions `(local_rows + 2) × (local_cols + 2)`
/// * `block` -- the valid sub-block owned by this process
/// * `tag` -- [TAG_RED] or [TAG_BLACK]
pub fn exchange_borders<T: Transport>(
    comm: &mut T,
    tile: &mut Grid2d,
    topology: &CartTopology,
    block: &Block,
    tag: i32,
) -> Result<(), StrError> {
    let (nrow, ncol) = tile.dims();
    if block.valid[0] + 2 > nrow || block.valid[1] + 2 > ncol {
        return Err("the block does not fit into the tile");
    }
    let mut edge = Vec::new();
    let mut ghost = Vec::new();
    for (direction, sends_first) in exchange_schedule(topology) {
        let (outgoing, incoming) = side_layouts(ncol, block, direction);
        edge.resize(outgoing.len(), 0.0);
        ghost.resize(incoming.len(), 0.0);
        pack(tile.as_data(), &outgoing, &mut edge)?;
        match topology.neighbor(direction) {
            Some(peer) => comm.send_receive(&edge, &mut ghost, peer, tag, sends_first)?,
            None => ghost.copy_from_slice(&edge),
        }
        unpack(&ghost, &incoming, tile.as_data_mut())?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
