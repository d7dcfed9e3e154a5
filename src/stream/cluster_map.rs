use log::trace;

use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};
use crate::stream::EntropyStream;

/// The number of slots of the move-to-front transform.
const MTF_SIZE: usize = 256;

/// Reads the cluster of every context into `cluster_map` and returns the number
/// of clusters, rejecting more than `max_clusters`.
pub fn read_cluster_map<R: BitReader>(
    reader: &mut R,
    cluster_map: &mut [usize],
    max_clusters: usize,
) -> Result<usize> {
    let num_contexts = cluster_map.len();

    if num_contexts == 1 {
        cluster_map[0] = 0;
    } else if reader.read_bool()? {
        let nbits = reader.read_bits(2)? as usize;
        for cluster in cluster_map.iter_mut() {
            *cluster = reader.read_bits(nbits)? as usize;
        }
    } else {
        let use_mtf = reader.read_bool()?;
        let mut nested = EntropyStream::new(reader, 1, num_contexts <= 2)?;
        for cluster in cluster_map.iter_mut() {
            *cluster = nested.read_symbol(reader, 0)? as usize;
        }
        if !nested.validate_final_state() {
            return Err(EntropyError::NestedFinalState);
        }
        if use_mtf {
            inverse_move_to_front(cluster_map)?;
        }
    }

    let num_clusters = cluster_map.iter().max().map_or(0, |&max| max + 1);
    if num_clusters > max_clusters {
        return Err(EntropyError::TooManyClusters {
            clusters: num_clusters,
            max: max_clusters,
        });
    }

    trace!("cluster map: {} contexts, {} clusters", num_contexts, num_clusters);
    Ok(num_clusters)
}

/// Replaces every move-to-front index with the value it designates.
fn inverse_move_to_front(values: &mut [usize]) -> Result<()> {
    let mut mtf: [usize; MTF_SIZE] = std::array::from_fn(|i| i);

    for value in values.iter_mut() {
        let index = *value;
        if index >= MTF_SIZE {
            return Err(EntropyError::MtfIndex(index as u32));
        }
        *value = mtf[index];
        if index != 0 {
            mtf[..=index].rotate_right(1);
        }
    }
    Ok(())
}
