use crate::{pack, unpack, Grid2d, Partition, StrError, Transport, ROOT};

const TAG_SCATTER: i32 = 10;
const TAG_GATHER: i32 = 11;

/// Checks that the transport and the tile agree with the partition
fn check(size: usize, partition: &Partition, tile: &Grid2d) -> Result<(), StrError> {
    if size != partition.size() {
        return Err("the number of processes must equal Px * Py");
    }
    if tile.dims() != partition.tile_dims() {
        return Err("the tile dimensions do not match the partition");
    }
    Ok(())
}

/// Distributes the global grid from the coordinator into the tile interiors of all ranks
///
/// The coordinator packs the valid block of each rank using the transfer
/// table and sends it; each rank unpacks its block into `tile`. The global grid
/// is consumed and freed on return.
///
/// # Input
///
/// * `global` -- the `global_rows × global_cols` grid on the coordinator; `None` on the other ranks
pub fn scatter<T: Transport>(
    comm: &mut T,
    partition: &Partition,
    global: Option<Grid2d>,
    tile: &mut Grid2d,
) -> Result<(), StrError> {
    check(comm.size(), partition, tile)?;
    let rank = comm.rank();
    let tile_layout = partition.tile_layout(partition.coords_of(rank));
    let mut buffer = Vec::new();
    if rank == ROOT {
        let global = global.ok_or("the coordinator must provide the global grid")?;
        if global.dims() != (partition.global[0], partition.global[1]) {
            return Err("the global grid dimensions do not match the partition");
        }
        for (to, layout) in partition.transfer_table().iter().enumerate() {
            buffer.resize(layout.len(), 0.0);
            pack(global.as_data(), layout, &mut buffer)?;
            if to == ROOT {
                unpack(&buffer, &tile_layout, tile.as_data_mut())?;
            } else {
                comm.send(&buffer, to, TAG_SCATTER)?;
            }
        }
    } else {
        buffer.resize(tile_layout.len(), 0.0);
        comm.receive(&mut buffer, ROOT, TAG_SCATTER)?;
        unpack(&buffer, &tile_layout, tile.as_data_mut())?;
    }
    Ok(())
}

/// Collects the tile interiors of all ranks into a newly allocated global grid
///
/// Returns the global grid on the coordinator and `None` on the other ranks.
pub fn gather<T: Transport>(comm: &mut T, partition: &Partition, tile: &Grid2d) -> Result<Option<Grid2d>, StrError> {
    check(comm.size(), partition, tile)?;
    let rank = comm.rank();
    let tile_layout = partition.tile_layout(partition.coords_of(rank));
    let mut own = vec![0.0; tile_layout.len()];
    pack(tile.as_data(), &tile_layout, &mut own)?;
    if rank != ROOT {
        comm.send(&own, ROOT, TAG_GATHER)?;
        return Ok(None);
    }
    let mut global = Grid2d::new(partition.global[0], partition.global[1])?;
    let mut buffer = Vec::new();
    for (from, layout) in partition.transfer_table().iter().enumerate() {
        if from == ROOT {
            unpack(&own, layout, global.as_data_mut())?;
        } else {
            buffer.resize(layout.len(), 0.0);
            comm.receive(&mut buffer, from, TAG_GATHER)?;
            unpack(&buffer, layout, global.as_data_mut())?;
        }
    }
    Ok(Some(global))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{gather, scatter};
    use crate::{run_on_threads, Grid2d, Partition, Transport, ROOT};

    #[test]
    fn scatter_captures_errors() {
        let part = Partition::new(4, 4, 1, 1).unwrap();
        let res = run_on_threads(1, |comm| {
            let mut tile = Grid2d::new(6, 6)?;
            scatter(comm, &part, None, &mut tile)
        });
        assert_eq!(res.err(), Some("the coordinator must provide the global grid"));
        let res = run_on_threads(1, |comm| {
            let mut tile = Grid2d::new(5, 6)?;
            scatter(comm, &part, Some(Grid2d::new(4, 4)?), &mut tile)
        });
        assert_eq!(res.err(), Some("the tile dimensions do not match the partition"));
        let part = Partition::new(4, 4, 2, 1).unwrap();
        let res = run_on_threads(1, |comm| {
            let mut tile = Grid2d::new(4, 6)?;
            scatter(comm, &part, None, &mut tile)
        });
        assert_eq!(res.err(), Some("the number of processes must equal Px * Py"));
    }

    #[test]
    fn scatter_fills_valid_interior_only() {
        // 5×3 over 2×2: local = 3×2; rank 3 owns rows 3..5 and column 2
        let part = Partition::new(5, 3, 2, 2).unwrap();
        let tiles = run_on_threads(4, |comm| {
            let global = if comm.rank() == ROOT {
                let mut g = Grid2d::new(5, 3)?;
                g.as_data_mut().iter_mut().enumerate().for_each(|(k, v)| *v = (k + 1) as f64);
                Some(g)
            } else {
                None
            };
            let mut tile = Grid2d::new(5, 4)?;
            scatter(comm, &part, global, &mut tile)?;
            Ok(tile)
        })
        .unwrap();
        //  1  2  3
        //  4  5  6
        //  7  8  9
        // 10 11 12
        // 13 14 15
        assert_eq!(tiles[0].row(1), &[0.0, 1.0, 2.0, 0.0]);
        assert_eq!(tiles[0].row(3), &[0.0, 7.0, 8.0, 0.0]);
        assert_eq!(tiles[3].row(1), &[0.0, 12.0, 0.0, 0.0]);
        assert_eq!(tiles[3].row(2), &[0.0, 15.0, 0.0, 0.0]);
        assert_eq!(tiles[3].row(3), &[0.0; 4]);
        // ghost ring untouched
        assert!(tiles.iter().all(|t| t.row(0) == &[0.0; 4] && t.row(4) == &[0.0; 4]));
    }

    #[test]
    fn gather_restores_the_scattered_grid() {
        for (gr, gc, px, py) in [(8, 8, 2, 2), (10, 7, 3, 2), (6, 10, 1, 4)] {
            let part = Partition::new(gr, gc, px, py).unwrap();
            let original = Grid2d::generate(gr, gc, 5).unwrap();
            let res = run_on_threads(px * py, |comm| {
                let global = if comm.rank() == ROOT { Some(original.clone()) } else { None };
                let (nrow, ncol) = part.tile_dims();
                let mut tile = Grid2d::new(nrow, ncol)?;
                scatter(comm, &part, global, &mut tile)?;
                gather(comm, &part, &tile)
            })
            .unwrap();
            assert_eq!(res[ROOT].as_ref(), Some(&original));
            assert!(res.iter().skip(1).all(|g| g.is_none()));
        }
    }
}
